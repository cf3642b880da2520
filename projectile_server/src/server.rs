//! Tick scheduler.
//!
//! Owns the live projectile set and drives it at a fixed tick rate:
//! - every live projectile is ticked once per pass;
//! - projectiles observed closed at the end of the pass are removed;
//! - other subsystems (explosions, commands) reach projectiles through
//!   shared `Arc`s while the pass runs.
//!
//! Determinism notes:
//! - Projectiles tick in insertion order.
//! - Avoid wall-clock-dependent branching in simulation code.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use projectile_shared::{
    config::SimConfig,
    ecs::EntityId,
    entity::{EntityType, Projectile},
    math::Vec3,
    physics::{CloseReason, Lifecycle},
    record::Record,
    world::World,
};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A projectile saved with its type identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProjectile {
    pub id: String,
    pub data: Record,
}

/// A projectile removed at the end of a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Removed {
    pub id: EntityId,
    pub reason: CloseReason,
    pub position: Vec3,
}

/// Running totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub spawned: u64,
    pub impacted: u64,
    pub expired: u64,
}

/// Fixed-rate driver for live projectiles.
pub struct TickScheduler {
    pub cfg: SimConfig,
    world: Arc<dyn World>,
    live: Vec<Arc<Projectile>>,
    tick: u64,
    stats: TickStats,
}

impl TickScheduler {
    pub fn new(cfg: SimConfig, world: Arc<dyn World>) -> Self {
        Self {
            cfg,
            world,
            live: Vec::new(),
            tick: 0,
            stats: TickStats::default(),
        }
    }

    /// Inserts a projectile into the live set.
    pub fn insert(&mut self, projectile: Arc<Projectile>) {
        debug!(
            id = %projectile.id(),
            kind = projectile.kind().network_id(),
            owner = ?projectile.owner(),
            "projectile spawned"
        );
        self.stats.spawned += 1;
        self.live.push(projectile);
    }

    /// Wraps and inserts a projectile, returning the shared handle.
    pub fn spawn(&mut self, projectile: Projectile) -> Arc<Projectile> {
        let projectile = Arc::new(projectile);
        self.insert(Arc::clone(&projectile));
        projectile
    }

    pub fn get(&self, id: EntityId) -> Option<&Arc<Projectile>> {
        self.live.iter().find(|p| p.id() == id)
    }

    pub fn live(&self) -> &[Arc<Projectile>] {
        &self.live
    }

    /// Number of completed passes.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Ticks every live projectile once and removes the closed ones.
    pub fn step(&mut self) -> Vec<Removed> {
        let tick = self.tick;
        for p in &self.live {
            p.tick(self.world.as_ref(), tick);
        }

        let mut removed = Vec::new();
        self.live.retain(|p| match p.state() {
            Lifecycle::Active => true,
            Lifecycle::Closed(reason) => {
                removed.push(Removed {
                    id: p.id(),
                    reason,
                    position: p.position(),
                });
                false
            }
        });

        for r in &removed {
            match r.reason {
                CloseReason::Impacted => self.stats.impacted += 1,
                CloseReason::Expired => self.stats.expired += 1,
            }
            debug!(id = %r.id, reason = ?r.reason, tick, "projectile removed");
        }

        self.tick += 1;
        removed
    }

    /// Runs the scheduler for a number of ticks at the configured rate.
    pub async fn run_for_ticks(&mut self, ticks: u64) -> anyhow::Result<()> {
        anyhow::ensure!(self.cfg.tick_hz > 0, "tick_hz must be positive");
        let dt = Duration::from_secs_f64(1.0 / self.cfg.tick_hz as f64);
        let mut next = Instant::now();

        for _ in 0..ticks {
            next += dt;
            self.step();
            tokio::time::sleep_until(next).await;
        }
        Ok(())
    }

    /// Pushes every live projectile within `radius` of `source` away from it.
    ///
    /// Force falls off linearly to zero at the edge of the radius. A radius
    /// that is not a positive finite number, or a non-finite force, affects
    /// nothing.
    pub fn explode(&self, source: Vec3, radius: f64, force: f64) -> usize {
        if !(radius > 0.0 && radius.is_finite() && force.is_finite()) {
            warn!(radius, force, "explosion ignored, bad radius or force");
            return 0;
        }
        let mut affected = 0;
        for p in &self.live {
            let dist = (p.position() - source).len();
            if dist <= radius {
                p.apply_impulse(source, force * (1.0 - dist / radius));
                affected += 1;
            }
        }
        info!(
            x = source.x,
            y = source.y,
            z = source.z,
            radius,
            affected,
            "explosion"
        );
        affected
    }

    /// Saves every live projectile.
    pub fn save(&self) -> Vec<SavedProjectile> {
        self.live
            .iter()
            .map(|p| SavedProjectile {
                id: p.kind().network_id().to_string(),
                data: p.encode(),
            })
            .collect()
    }

    /// Restores saved projectiles, skipping unknown types.
    pub fn restore(&mut self, saved: &[SavedProjectile]) -> usize {
        let mut restored = 0;
        for s in saved {
            match Projectile::decode(&s.id, &s.data) {
                Some(p) => {
                    self.spawn(p);
                    restored += 1;
                }
                None => warn!(id = %s.id, "unknown projectile type in save, skipped"),
            }
        }
        restored
    }

    /// Serializes the live set as JSON.
    pub fn save_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(&self.save()).context("serialize projectiles")
    }

    /// Restores projectiles from JSON produced by [`TickScheduler::save_json`].
    pub fn restore_json(&mut self, json: &str) -> anyhow::Result<usize> {
        let saved: Vec<SavedProjectile> =
            serde_json::from_str(json).context("parse saved projectiles")?;
        Ok(self.restore(&saved))
    }
}
