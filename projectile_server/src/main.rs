//! Standalone simulation binary.
//!
//! Usage:
//!   cargo run -p projectile_server -- [--config sim.json] [--tick-hz 20] [--ground-y 0] [--ticks 200] [--save out.json]
//!
//! Throws a volley of projectiles at a target dummy over a flat world every
//! couple of seconds and logs impacts, expiries and world effects.

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;
use projectile_server::{flat_world::WorldEvent, FlatWorld, TickScheduler};
use projectile_shared::{
    config::SimConfig,
    ecs::EntityId,
    entity::{Projectile, ProjectileKind},
    math::{Aabb, Vec3},
};
use tracing::{debug, info};

/// Ticks between volleys.
const VOLLEY_EVERY: u64 = 40;
const TARGET_HEALTH: f64 = 20.0;

struct Args {
    cfg: SimConfig,
    save: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = env::args().collect();

    let mut cfg = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args.get(i + 1).context("--config needs a path")?;
            SimConfig::from_json_file(path)?
        }
        None => SimConfig::default(),
    };
    let mut save = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tick-hz" if i + 1 < args.len() => {
                cfg.tick_hz = args[i + 1].parse().context("parse --tick-hz")?;
                i += 2;
            }
            "--ground-y" if i + 1 < args.len() => {
                cfg.ground_y = args[i + 1].parse().context("parse --ground-y")?;
                i += 2;
            }
            "--ticks" if i + 1 < args.len() => {
                cfg.run_ticks = Some(args[i + 1].parse().context("parse --ticks")?);
                i += 2;
            }
            "--save" if i + 1 < args.len() => {
                save = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            _ => i += 1,
        }
    }
    anyhow::ensure!(cfg.tick_hz > 0, "tick rate must be positive");
    Ok(Args { cfg, save })
}

fn throw_volley(scheduler: &mut TickScheduler, thrower: EntityId, ground_y: f64) {
    let hand = Vec3::new(0.0, ground_y + 1.6, 0.0);
    let volley = [
        (ProjectileKind::Egg, Vec3::new(0.0, 0.35, 0.9)),
        (ProjectileKind::Snowball, Vec3::new(0.2, 0.5, 1.2)),
        (ProjectileKind::Arrow, Vec3::new(0.0, 0.1, 2.5)),
    ];
    for (kind, velocity) in volley {
        scheduler.spawn(Projectile::spawn(kind, hand, velocity, Some(thrower)));
    }
}

fn report(world: &FlatWorld) {
    for event in world.drain_events() {
        match event {
            WorldEvent::Particle { .. } => debug!(?event, "world effect"),
            _ => info!(?event, "world effect"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let Args { cfg, save } = parse_args()?;
    info!(tick_hz = cfg.tick_hz, ground_y = cfg.ground_y, run_ticks = ?cfg.run_ticks, "Starting simulation");

    let world = Arc::new(FlatWorld::new(cfg.ground_y));
    let dummy = EntityId::new_unique();
    world.add_target(
        dummy,
        Aabb::new(
            Vec3::new(-0.3, cfg.ground_y, 12.0),
            Vec3::new(0.3, cfg.ground_y + 1.8, 12.6),
        ),
        TARGET_HEALTH,
    );
    let thrower = EntityId::new_unique();

    let tick_interval = std::time::Duration::from_secs_f64(1.0 / cfg.tick_hz as f64);
    let run_ticks = cfg.run_ticks;
    let ground_y = cfg.ground_y;
    let mut scheduler = TickScheduler::new(cfg, world.clone());

    let mut next_tick = tokio::time::Instant::now();
    loop {
        let tick = scheduler.current_tick();
        if run_ticks.is_some_and(|limit| tick >= limit) {
            break;
        }
        if tick % VOLLEY_EVERY == 0 {
            throw_volley(&mut scheduler, thrower, ground_y);
        }

        for removed in scheduler.step() {
            info!(
                id = %removed.id,
                reason = ?removed.reason,
                x = removed.position.x,
                y = removed.position.y,
                z = removed.position.z,
                "projectile closed"
            );
        }
        report(&world);

        next_tick += tick_interval;
        tokio::time::sleep_until(next_tick).await;
    }

    let stats = scheduler.stats();
    info!(
        spawned = stats.spawned,
        impacted = stats.impacted,
        expired = stats.expired,
        live = scheduler.live().len(),
        "Simulation finished"
    );

    if let Some(path) = save {
        let json = scheduler.save_json()?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        info!(path = %path.display(), "Saved live projectiles");
    }
    Ok(())
}
