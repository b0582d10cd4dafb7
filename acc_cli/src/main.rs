mod cli;
mod error_fmt;
mod logging;
mod replay;
mod setup;

use std::io::Write;

use acc_core::{ControllerLoop, Preset};
use clap::Parser;
use eyre::Result;

use crate::cli::{Cli, Commands, JSON_MODE, PresetArg};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    // clap prints usage errors itself and exits with 2.
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(err) = run(cli) {
        tracing::error!(error = %format!("{err:#}"), "acc failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let file_cfg = setup::load_file_config(&cli)?;
    let level = cli
        .log_level
        .clone()
        .or_else(|| file_cfg.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    logging::init(&level, cli.json, &file_cfg.logging)?;

    match &cli.cmd {
        Commands::Replay { trace, summary } => {
            let cfg = setup::controller_config(&cli, &file_cfg)?;
            let mut controller = ControllerLoop::new(cfg)?;
            tracing::info!(trace = %trace.display(), preset = ?file_cfg.preset, "replay starting");
            let stdout = std::io::stdout();
            let out = std::io::BufWriter::new(stdout.lock());
            replay::run_replay(trace, &mut controller, out, cli.json, *summary)?;
        }
        Commands::CheckConfig => {
            let cfg = setup::controller_config(&cli, &file_cfg)?;
            let controller = ControllerLoop::new(cfg)?;
            let preset = Preset::from(file_cfg.preset);
            print_config(preset, controller.config(), cli.json)?;
        }
        Commands::Presets { name } => match name {
            Some(p) => {
                let preset = preset_of(*p);
                print_config(preset, &preset.config(), cli.json)?;
            }
            None => list_presets(cli.json)?,
        },
    }
    Ok(())
}

fn preset_of(p: PresetArg) -> Preset {
    Preset::from(acc_config::PresetName::from(p))
}

fn print_config(preset: Preset, cfg: &acc_core::ControllerConfig, json: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    let body = setup::config_json(cfg);
    if json {
        let v = serde_json::json!({ "preset": preset.as_str(), "config": body });
        writeln!(out, "{v}")?;
    } else {
        writeln!(out, "config ok (preset {preset})")?;
        let mut lines = Vec::new();
        setup::flatten("", &body, &mut lines);
        for line in lines {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn list_presets(json: bool) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for p in Preset::ALL {
        let c = p.config();
        if json {
            let v = serde_json::json!({
                "preset": p.as_str(),
                "max_velo": c.max_velo,
                "max_accel": c.max_accel,
                "max_decel": c.max_decel,
                "filter_coeff": c.filter_coeff,
            });
            writeln!(out, "{v}")?;
        } else {
            writeln!(
                out,
                "{:<13} max_velo={:<5} max_accel={:<4} max_decel={:<5} filter_coeff={}",
                p.as_str(),
                c.max_velo,
                c.max_accel,
                c.max_decel,
                c.filter_coeff
            )?;
        }
    }
    Ok(())
}
