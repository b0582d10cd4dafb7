//! Trace replay: CSV tick inputs in, per-tick commands out.

use std::io::Write;
use std::path::Path;

use acc_core::runner::{self, RunStats};
use acc_core::{ControllerLoop, TickInput};
use acc_traits::{BoxError, CommandSink, LeadSource};
use eyre::WrapErr;
use serde::Deserialize;
use serde_json::json;

/// Trace CSV schema.
///
/// Expected headers:
/// lead_dist,rel_vel,ego_vel
///
/// An empty `lead_dist` (or `inf`) means no lead vehicle on that tick.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TraceRow {
    pub lead_dist: Option<f64>,
    pub rel_vel: f64,
    pub ego_vel: f64,
}

impl From<TraceRow> for TickInput {
    fn from(r: TraceRow) -> Self {
        TickInput {
            lead_dist: r.lead_dist,
            rel_vel: r.rel_vel,
            ego_vel: r.ego_vel,
        }
    }
}

/// Streams rows from a trace CSV, one per tick.
pub struct CsvSource<R: std::io::Read> {
    rows: csv::DeserializeRecordsIntoIter<R, TraceRow>,
    line: usize,
}

impl CsvSource<std::fs::File> {
    pub fn open(path: &Path) -> eyre::Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;
        Self::from_reader(file)
    }
}

impl<R: std::io::Read> CsvSource<R> {
    pub fn from_reader(reader: R) -> eyre::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        // Enforce exact headers
        let headers = rdr
            .headers()
            .map_err(|e| eyre::eyre!("read CSV headers: {}", e))?
            .clone();
        let expected = ["lead_dist", "rel_vel", "ego_vel"];
        let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        if actual != expected {
            eyre::bail!(
                "trace CSV must have headers 'lead_dist,rel_vel,ego_vel', got: {}",
                actual.join(",")
            );
        }
        Ok(Self {
            rows: rdr.into_deserialize(),
            line: 1,
        })
    }
}

impl<R: std::io::Read> LeadSource for CsvSource<R> {
    fn next_sample(&mut self) -> Result<Option<TickInput>, BoxError> {
        self.line += 1;
        match self.rows.next() {
            None => Ok(None),
            Some(Ok(row)) => Ok(Some(row.into())),
            Some(Err(e)) => Err(format!("invalid CSV row {}: {}", self.line, e).into()),
        }
    }
}

/// Writes one line per published command, as text or JSON.
pub struct OutputSink<W: Write> {
    out: W,
    json: bool,
    quiet: bool,
}

impl<W: Write> OutputSink<W> {
    pub fn new(out: W, json: bool, quiet: bool) -> Self {
        Self { out, json, quiet }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandSink for OutputSink<W> {
    fn publish(&mut self, tick: u64, cmd_accel: f64, mode: &'static str) -> Result<(), BoxError> {
        if self.quiet {
            return Ok(());
        }
        if self.json {
            let line = json!({ "tick": tick, "cmd_accel": cmd_accel, "mode": mode });
            writeln!(self.out, "{line}")?;
        } else {
            writeln!(self.out, "{tick:>6}  {mode:<12} {cmd_accel:>8.4}")?;
        }
        Ok(())
    }
}

pub fn summary_json(stats: &RunStats, controller: &ControllerLoop) -> serde_json::Value {
    json!({
        "summary": {
            "ticks": stats.ticks,
            "mode_changes": stats.mode_changes,
            "saturated_ticks": stats.saturated_ticks,
            "final_mode": controller.mode().as_str(),
        }
    })
}

/// Replay `trace` through `controller`, writing commands and a summary to `out`.
pub fn run_replay<W: Write>(
    trace: &Path,
    controller: &mut ControllerLoop,
    out: W,
    json: bool,
    summary_only: bool,
) -> eyre::Result<RunStats> {
    let mut source = CsvSource::open(trace)?;
    let mut sink = OutputSink::new(out, json, summary_only);
    let stats = runner::run(&mut source, &mut sink, controller)
        .wrap_err_with(|| format!("replaying {}", trace.display()))?;

    let mut out = sink.into_inner();
    if json {
        writeln!(out, "{}", summary_json(&stats, controller))?;
    } else {
        writeln!(
            out,
            "replayed {} ticks: {} mode changes, {} saturated, final mode {}",
            stats.ticks,
            stats.mode_changes,
            stats.saturated_ticks,
            controller.mode()
        )?;
    }
    out.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_inf_distance_mean_no_lead() {
        let csv = "lead_dist,rel_vel,ego_vel\n,0,20\ninf,0,20\n35.5,-1,12\n";
        let mut src = CsvSource::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(src.next_sample().unwrap().unwrap().lead_dist, None);
        assert_eq!(
            src.next_sample().unwrap().unwrap().lead_dist,
            Some(f64::INFINITY)
        );
        assert_eq!(
            src.next_sample().unwrap().unwrap(),
            TickInput::new(35.5, -1.0, 12.0)
        );
        assert!(src.next_sample().unwrap().is_none());
    }

    #[test]
    fn rejects_wrong_headers() {
        let err = CsvSource::from_reader("gap,rel,ego\n1,2,3\n".as_bytes())
            .err()
            .unwrap();
        assert!(err.to_string().contains("trace CSV must have headers"));
    }

    #[test]
    fn bad_row_reports_line_number() {
        let csv = "lead_dist,rel_vel,ego_vel\n10,0,5\n10,fast,5\n";
        let mut src = CsvSource::from_reader(csv.as_bytes()).unwrap();
        src.next_sample().unwrap();
        let err = src.next_sample().unwrap_err();
        assert!(err.to_string().contains("invalid CSV row 3"));
    }

    #[test]
    fn text_and_json_lines() {
        let mut sink = OutputSink::new(Vec::new(), true, false);
        sink.publish(3, -0.5, "in_wave").unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["tick"], 3);
        assert_eq!(v["mode"], "in_wave");

        let mut sink = OutputSink::new(Vec::new(), false, false);
        sink.publish(3, -0.5, "in_wave").unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.contains("in_wave"));
        assert!(out.contains("-0.5000"));
    }
}
