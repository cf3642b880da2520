//! Impulses from other threads interleaved with ticking.

use std::{sync::Arc, thread, time::Duration};

use projectile_server::TickScheduler;
use projectile_shared::{
    config::SimConfig,
    entity::{Projectile, ProjectileKind},
    math::Vec3,
    physics::{Lifecycle, MotionProfile, NoImpact},
};
use projectile_tests::{init_tracing, OpenSkyWorld};

/// No gravity or drag: velocity changes only through impulses.
fn coasting(position: Vec3, velocity: Vec3) -> Projectile {
    let profile = MotionProfile::new(0.0, 0.0, 0.0, u32::MAX, NoImpact).expect("valid profile");
    Projectile::with_profile(
        ProjectileKind::Snowball,
        Arc::new(profile),
        position,
        velocity,
        None,
    )
}

#[test]
fn impulses_survive_concurrent_ticks() {
    let p = coasting(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
    let world = OpenSkyWorld::default();
    let source = Vec3::new(-100.0, 0.0, 0.0);

    thread::scope(|s| {
        s.spawn(|| {
            for tick in 0..2000 {
                p.tick(&world, tick);
            }
        });
        s.spawn(|| {
            for _ in 0..500 {
                p.apply_impulse(source, 0.001);
            }
        });
    });

    let v = p.velocity();
    assert!((v.x - 1.5).abs() < 1e-9, "lost impulses: {v:?}");
    assert_eq!(v.y, 0.0);
    assert_eq!(v.z, 0.0);
    assert_eq!(p.age(), 2000);
    assert_eq!(p.state(), Lifecycle::Active);
}

#[test]
fn impulse_order_does_not_matter_for_same_source() {
    let source = Vec3::new(0.0, -10.0, 0.0);
    let a = coasting(Vec3::ZERO, Vec3::ZERO);
    let b = coasting(Vec3::ZERO, Vec3::ZERO);

    a.apply_impulse(source, 0.3);
    a.apply_impulse(source, 0.7);
    b.apply_impulse(source, 0.7);
    b.apply_impulse(source, 0.3);

    assert!((a.velocity().y - b.velocity().y).abs() < 1e-12);
    assert!((a.velocity().y - 1.0).abs() < 1e-12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn impulses_while_scheduler_runs() -> anyhow::Result<()> {
    init_tracing();
    let cfg = SimConfig {
        tick_hz: 200,
        ..Default::default()
    };
    let mut scheduler = TickScheduler::new(cfg, Arc::new(OpenSkyWorld::default()));
    let p = scheduler.spawn(coasting(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)));

    let runner = tokio::spawn(async move {
        scheduler.run_for_ticks(20).await?;
        Ok::<_, anyhow::Error>(scheduler)
    });

    for _ in 0..10 {
        p.apply_impulse(Vec3::new(0.0, 0.0, -50.0), 0.1);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let scheduler = runner.await??;

    assert_eq!(scheduler.current_tick(), 20);
    assert_eq!(p.age(), 20);
    assert!((p.velocity().z - 2.0).abs() < 1e-9);
    assert!(p.position().z >= 20.0);
    Ok(())
}
