use expansion_core::{ParticleField, IDLE_COLOR};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn field(count: usize) -> ParticleField {
    let mut rng = StdRng::seed_from_u64(3);
    ParticleField::new(count, 50.0, 2.0, &mut rng)
}

#[test]
fn init_fills_the_shell_with_idle_particles() {
    let f = field(500);
    assert_eq!(f.len(), 500);
    assert_eq!(f.positions().len(), 1500);
    assert_eq!(f.base_positions().len(), 1500);
    assert_eq!(f.velocities().len(), 1500);
    assert_eq!(f.colors().len(), 1500);
    assert_eq!(f.positions(), f.base_positions());
    assert!(f.velocities().iter().all(|v| *v == 0.0));
    for i in 0..f.len() {
        let r = f.position(i).length();
        assert!((2.0 - 1e-3..=50.0 + 1e-3).contains(&r), "radius {r}");
        assert_eq!(f.color(i), IDLE_COLOR);
    }
}

#[test]
fn same_seed_same_layout() {
    assert_eq!(field(64).positions(), field(64).positions());
}

#[test]
fn update_integrates_velocity() {
    let mut f = field(2);
    let p0 = f.position(1);
    f.set_velocity(1, glam::Vec3::new(1.0, -2.0, 0.5));
    f.update(0.5);
    let p1 = f.position(1);
    assert!((p1 - p0 - glam::Vec3::new(0.5, -1.0, 0.25)).length() < 1e-5);
    assert_eq!(f.position(0), f.base_position(0));
}

#[test]
fn step_is_warped_by_time_scale() {
    let mut f = field(1);
    let p0 = f.position(0);
    f.set_velocity(0, glam::Vec3::X);
    f.set_time_scale(0.25);
    f.step(1.0);
    assert!((f.position(0).x - p0.x - 0.25).abs() < 1e-5);
    assert_eq!(f.time_scale(), 0.25);
}

#[test]
fn charge_inward_blends_toward_origin_per_call() {
    let mut f = field(10);
    let before: Vec<f32> = f.positions().to_vec();
    f.charge_inward(1.0);
    // 0.3 strength * 0.02 step
    for (a, b) in before.iter().zip(f.positions()) {
        assert!((b - a * (1.0 - 0.006)).abs() < 1e-4);
    }
    let snapshot = f.positions().to_vec();
    f.charge_inward(0.0);
    assert_eq!(f.positions(), snapshot.as_slice());
    // velocities are never touched
    assert!(f.velocities().iter().all(|v| *v == 0.0));
}

#[test]
fn charge_inward_keeps_radial_direction() {
    let mut f = field(20);
    for _ in 0..100 {
        f.charge_inward(0.8);
    }
    for i in 0..f.len() {
        let d = f.position(i).normalize().dot(f.base_position(i).normalize());
        assert!(d > 0.9999);
        assert!(f.position(i).length() < f.base_position(i).length());
    }
}

#[test]
fn reset_restores_base_velocity_and_color() {
    let mut f = field(30);
    for i in 0..f.len() {
        f.set_velocity(i, glam::Vec3::splat(i as f32));
        f.set_color(i, [1.0, 0.0, 0.0]);
    }
    f.update(2.0);
    f.charge_inward(1.0);
    f.reset();
    assert_eq!(f.positions(), f.base_positions());
    assert!(f.velocities().iter().all(|v| *v == 0.0));
    for i in 0..f.len() {
        assert_eq!(f.color(i), IDLE_COLOR);
    }
}

#[test]
fn byte_views_cover_the_arrays() {
    let f = field(8);
    assert_eq!(f.position_bytes().len(), 8 * 3 * 4);
    assert_eq!(f.color_bytes().len(), 8 * 3 * 4);
}
