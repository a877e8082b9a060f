use pimc_action::{CoulombLinkAction, LinkAction};
use pimc_core::Vec3;
use proptest::prelude::*;

fn vec3(range: std::ops::Range<f64>) -> impl Strategy<Value = Vec3> {
    [range.clone(), range.clone(), range].prop_map(Vec3::new)
}

fn unit_direction() -> impl Strategy<Value = Vec3> {
    vec3(-1.0..1.0)
        .prop_filter("direction must not vanish", |v| v.norm() > 1e-3)
        .prop_map(|v| v * (1.0 / v.norm()))
}

/// Classical end-point action `tau/2 (Z/r1 + Z/r2)`.
fn end_point_action(z: f64, tau: f64, d1: &Vec3, d2: &Vec3) -> f64 {
    0.5 * tau * (z / d1.norm() + z / d2.norm())
}

fn coupling() -> impl Strategy<Value = f64> {
    prop_oneof![-2.0..-0.01f64, 0.01..2.0f64]
}

proptest! {
    #[test]
    fn average_separation_bounds_half_chord(d1 in vec3(-5.0..5.0), d2 in vec3(-5.0..5.0)) {
        let q = CoulombLinkAction::calculate_average_separation(&d1, &d2);
        let s = CoulombLinkAction::calculate_s2(&d1, &d2).sqrt();
        prop_assert!(q >= 0.0);
        prop_assert!(s <= 2.0 * q + 1e-12);
    }

    #[test]
    fn value_is_symmetric_in_ends(
        z in coupling(),
        d1 in vec3(-2.0..2.0),
        d2 in vec3(-2.0..2.0),
    ) {
        let action = CoulombLinkAction::new(z, 1.0, 1.0, 0.1).unwrap();
        prop_assert_eq!(action.get_value(&d1, &d2), action.get_value(&d2, &d1));
    }

    #[test]
    fn value_is_finite_everywhere(
        z in coupling(),
        mu in 0.1..5.0f64,
        tau in 0.01..1.0f64,
        d1 in vec3(-3.0..3.0),
        d2 in vec3(-3.0..3.0),
    ) {
        let action = CoulombLinkAction::new(z, 1.0, mu, tau).unwrap();
        prop_assert!(action.get_value(&d1, &d2).is_finite());
        prop_assert!(action.get_value(&Vec3::zeros(), &d2).is_finite());
        prop_assert!(action.get_value(&Vec3::zeros(), &Vec3::zeros()).is_finite());
    }

    #[test]
    fn value_is_continuous_at_coincidence(
        z in coupling(),
        dir in unit_direction(),
        scale in 0.0..1e-7f64,
    ) {
        let action = CoulombLinkAction::new(z, 1.0, 1.0, 0.1).unwrap();
        let origin = action.origin_value();
        let near = action.get_value(&(dir * scale), &(dir * -scale));
        prop_assert!((near - origin).abs() <= 1e-5 * origin.abs());
    }

    #[test]
    fn value_is_rotation_invariant(
        z in coupling(),
        d1 in vec3(-2.0..2.0),
        d2 in vec3(-2.0..2.0),
    ) {
        let action = CoulombLinkAction::new(z, 1.0, 1.0, 0.1).unwrap();
        // Cyclic permutation of axes is a proper rotation.
        let rotate = |v: &Vec3| Vec3::new([v[2], v[0], v[1]]);
        let a = action.get_value(&d1, &d2);
        let b = action.get_value(&rotate(&d1), &rotate(&d2));
        prop_assert!((a - b).abs() <= 1e-12 * a.abs().max(1e-12));
    }

    #[test]
    fn approaches_damped_end_point_action_far_away(
        z in coupling(),
        dir in unit_direction(),
        r in 20.0..40.0f64,
        step in vec3(-0.5..0.5),
    ) {
        let tau = 0.1;
        let action = CoulombLinkAction::new(z, 1.0, 1.0, tau).unwrap();
        let d1 = dir * r;
        let d2 = d1 + step;
        let exact = action.value(&d1, &d2);
        let classical = end_point_action(z, tau, &d1, &d2) * action.far_field_factor();
        prop_assert!((exact - classical).abs() <= 5e-3 * classical.abs());
    }
}
