#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse, validate, merge onto the preset and build. Any stage may reject
    // the input; none may panic.
    let Ok(cfg) = toml::from_str::<acc_config::Config>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    let runtime = acc_core::ControllerConfig::from(&cfg);
    if let Ok(mut ctl) = acc_core::ControllerLoop::new(runtime) {
        let out = ctl.tick(&acc_core::TickInput::new(50.0, -1.0, 12.0));
        assert!(out.cmd_accel >= ctl.config().max_decel);
        assert!(out.cmd_accel <= ctl.config().max_accel);
    }
});
