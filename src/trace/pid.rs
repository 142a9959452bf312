use crate::trace::{EventRow, Record, Trace};

/// One step of the power allocator's PID controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PidRecord {
    pub time: f64,
    pub err: f64,
    pub output: f64,
}

impl Record for PidRecord {
    const ROLE: &'static str = "pid_controller";

    fn from_row(row: &EventRow) -> anyhow::Result<Self> {
        Ok(Self {
            time: row.time,
            err: row.f64_field("err")?,
            output: row.f64_field("output")?,
        })
    }

    fn time(&self) -> f64 {
        self.time
    }
}

pub type PidController = Trace<PidRecord>;
