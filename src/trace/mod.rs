//! Per-domain trace collaborators.
//!
//! Each collaborator reads one event table (`<role>.txt`) from a run
//! directory and keeps its records with raw timestamps. Time normalization
//! only stores the base; reported times are always `raw - basetime`, so
//! re-basing never accumulates.

pub mod parse;
pub mod pid;
pub mod power;
pub mod row;
pub mod thermal;

pub use pid::PidController;
pub use power::{ActorLabelMap, FreqSample, InPower, OutPower, PowerDirection, PowerRecord};
pub use row::EventRow;
pub use thermal::{Thermal, ThermalGovernor};

use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A typed event decoded from one row of an event table.
pub trait Record: Sized {
    /// Role name; also the event table's file stem.
    const ROLE: &'static str;

    fn from_row(row: &EventRow) -> anyhow::Result<Self>;

    /// Raw (un-normalized) timestamp.
    fn time(&self) -> f64;
}

/// All records of one role for a run.
#[derive(Debug, Clone)]
pub struct Trace<R> {
    records: Vec<R>,
    basetime: f64,
}

impl<R: Record> Trace<R> {
    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(format!("{}.txt", R::ROLE))
    }

    /// Load the role's event table from a run directory.
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        let path = Self::file_path(dir);
        let rows = parse::parse_event_file(&path)?;
        let records = rows
            .iter()
            .map(R::from_row)
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(|| format!("decode {} event in {}", R::ROLE, path.display()))?;

        debug!("loaded {} {} events from {}", records.len(), R::ROLE, path.display());
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<R>) -> Self {
        Self {
            records,
            basetime: 0.0,
        }
    }

    /// Re-base reported times on `basetime`. The last call wins.
    pub fn normalize_time(&mut self, basetime: f64) {
        self.basetime = basetime;
    }

    #[cfg(test)]
    pub fn basetime(&self) -> f64 {
        self.basetime
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Smallest raw timestamp, ignoring normalization.
    pub fn first_raw_time(&self) -> Option<f64> {
        self.records.iter().map(R::time).min_by(f64::total_cmp)
    }

    /// Records paired with their normalized time, in file order.
    pub fn records(&self) -> impl Iterator<Item = (f64, &R)> + '_ {
        self.records.iter().map(|r| (r.time() - self.basetime, r))
    }

    /// Normalized (first, last) timestamps.
    pub fn span(&self) -> Option<(f64, f64)> {
        let mut times = self.records().map(|(t, _)| t);
        let first = times.next()?;
        Some(times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// Largest value of `metric` over all records.
    pub fn peak(&self, metric: impl Fn(&R) -> f64) -> Option<f64> {
        self.records.iter().map(metric).max_by(f64::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::pid::PidRecord;
    use std::fs;

    fn pid_trace() -> Trace<PidRecord> {
        Trace::from_records(vec![
            PidRecord {
                time: 12.0,
                err: 3.0,
                output: 400.0,
            },
            PidRecord {
                time: 10.0,
                err: -1.0,
                output: 900.0,
            },
        ])
    }

    #[test]
    fn test_normalize_time_last_call_wins() {
        let mut trace = pid_trace();
        trace.normalize_time(4.0);
        trace.normalize_time(10.0);

        let times: Vec<f64> = trace.records().map(|(t, _)| t).collect();
        assert_eq!(times, vec![2.0, 0.0]);
        assert_eq!(trace.basetime(), 10.0);
        assert_eq!(trace.first_raw_time(), Some(10.0));
    }

    #[test]
    fn test_span_and_peak() {
        let mut trace = pid_trace();
        trace.normalize_time(10.0);

        assert_eq!(trace.span(), Some((0.0, 2.0)));
        assert_eq!(trace.peak(|r| r.output), Some(900.0));

        let empty: Trace<PidRecord> = Trace::from_records(vec![]);
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.span(), None);
        assert_eq!(empty.peak(|r| r.output), None);
    }

    #[test]
    fn test_open_reads_role_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("pid_controller.txt"),
            "5.0: err=2 output=100\n6.0: err=1 output=150\n",
        )
        .unwrap();

        let trace: Trace<PidRecord> = Trace::open(dir.path()).unwrap();
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.peak(|r| r.err), Some(2.0));
    }

    #[test]
    fn test_open_reports_role_and_file_on_bad_record() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pid_controller.txt"), "5.0: err=2\n").unwrap();

        let err = Trace::<PidRecord>::open(dir.path()).unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("decode pid_controller event"));
        assert!(chain.contains("missing field output"));
    }
}
