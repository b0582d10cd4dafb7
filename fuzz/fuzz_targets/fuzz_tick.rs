#![no_main]
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Sample {
    lead_dist: Option<f64>,
    rel_vel: f64,
    ego_vel: f64,
}

fuzz_target!(|samples: Vec<Sample>| {
    // Arbitrary (including non-finite) inputs must always yield a bounded command.
    let Ok(mut ctl) = acc_core::ControllerLoop::new(acc_core::ControllerConfig::default()) else {
        return;
    };
    let (lo, hi) = (ctl.config().max_decel, ctl.config().max_accel);
    for s in samples {
        let out = ctl.tick(&acc_core::TickInput {
            lead_dist: s.lead_dist,
            rel_vel: s.rel_vel,
            ego_vel: s.ego_vel,
        });
        assert!(out.cmd_accel >= lo && out.cmd_accel <= hi);
        assert_ne!(out.mode, acc_core::Mode::Initial);
    }
});
