use acc_core::conditioner::MovingAverage;
use acc_core::postprocess::SafetyPostProcessor;
use acc_core::{ControllerConfig, ControllerLoop, Mode, TickInput};
use proptest::prelude::*;

fn finite_or_glitch(range: std::ops::Range<f64>) -> impl Strategy<Value = f64> {
    prop_oneof![
        10 => range,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

prop_compose! {
    fn tick_input()(
        lead in prop::option::weighted(0.9, finite_or_glitch(-5.0..400.0)),
        rel in finite_or_glitch(-30.0..30.0),
        ego in finite_or_glitch(-1.0..45.0),
    ) -> TickInput {
        TickInput { lead_dist: lead, rel_vel: rel, ego_vel: ego }
    }
}

prop_compose! {
    fn config()(
        filter_coeff in 0.01f64..=1.0,
        ma_window in 1usize..25,
    ) -> ControllerConfig {
        ControllerConfig { filter_coeff, ma_window, ..ControllerConfig::default() }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn command_always_within_limits(
        cfg in config(),
        inputs in prop::collection::vec(tick_input(), 1..300),
    ) {
        let (lo, hi) = (cfg.max_decel, cfg.max_accel);
        let mut c = ControllerLoop::new(cfg).unwrap();
        for input in &inputs {
            let out = c.tick(input);
            prop_assert!(out.cmd_accel.is_finite());
            prop_assert!(out.cmd_accel >= lo && out.cmd_accel <= hi, "cmd {} out of bounds", out.cmd_accel);
        }
    }

    #[test]
    fn modes_follow_legal_edges_and_never_return_to_initial(
        cfg in config(),
        inputs in prop::collection::vec(tick_input(), 1..300),
    ) {
        let mut c = ControllerLoop::new(cfg).unwrap();
        let mut prev = c.mode();
        for input in &inputs {
            let out = c.tick(input);
            prop_assert_ne!(out.mode, Mode::Initial);
            if out.mode != prev {
                prop_assert!(prev.can_transition_to(out.mode), "illegal {prev} -> {}", out.mode);
            }
            prev = out.mode;
        }
    }

    #[test]
    fn moving_average_settles_on_constant(
        window in 1usize..40,
        prefix in prop::collection::vec(-50.0f64..50.0, 0..60),
        v in -100.0f64..100.0,
    ) {
        let mut ma = MovingAverage::new(window);
        for x in prefix {
            ma.push(x);
        }
        let mut avg = 0.0;
        for _ in 0..window {
            avg = ma.push(v);
        }
        prop_assert!((avg - v).abs() <= 1e-9 * v.abs().max(1.0), "avg {avg} != {v}");
    }

    #[test]
    fn low_pass_converges_to_constant_request(
        filter_coeff in 0.05f64..=1.0,
        start in -3.0f64..1.5,
        target in -3.0f64..1.5,
    ) {
        let cfg = ControllerConfig { filter_coeff, ..ControllerConfig::default() };
        let mut pp = SafetyPostProcessor::new();
        pp.apply(start, 10.0, &cfg);
        let mut out = start;
        for _ in 0..2000 {
            out = pp.apply(target, 10.0, &cfg);
        }
        prop_assert!((out - target).abs() < 1e-9, "out {out} target {target}");
    }
}

#[test]
fn window_of_one_is_pass_through() {
    let mut ma = MovingAverage::new(1);
    for x in [0.1, -7.3, 1e6, 0.0, 42.42] {
        assert_eq!(ma.push(x), x);
    }
}

#[test]
fn dyadic_constant_is_reproduced_exactly() {
    let mut ma = MovingAverage::new(10);
    for x in [3.0, 9.0, -1.0, 4.5] {
        ma.push(x);
    }
    let mut avg = 0.0;
    for _ in 0..10 {
        avg = ma.push(12.5);
    }
    assert_eq!(avg, 12.5);
}
