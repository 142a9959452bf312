//! Power actor collaborators.
//!
//! `InPower` holds what each actor requested (its current frequency and load
//! when the governor asked it for its power); `OutPower` holds what the
//! governor granted back as a frequency limit.

use crate::trace::{EventRow, Record, Trace};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Actor id (cpumask) -> display label.
pub type ActorLabelMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FreqSample {
    pub time: f64,
    pub freq: f64,
}

/// Label -> frequency samples in trace order.
pub type FreqMap = BTreeMap<String, Vec<FreqSample>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerDirection {
    In,
    Out,
}

impl PowerDirection {
    pub fn role(self) -> &'static str {
        match self {
            PowerDirection::In => InPowerRecord::ROLE,
            PowerDirection::Out => OutPowerRecord::ROLE,
        }
    }
}

impl fmt::Display for PowerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerDirection::In => f.write_str("in"),
            PowerDirection::Out => f.write_str("out"),
        }
    }
}

/// Common view of a power event: which actor, at what frequency.
pub trait PowerRecord: Record {
    fn actor(&self) -> &str;
    fn freq(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct InPowerRecord {
    pub time: f64,
    pub cpus: String,
    pub freq: f64,
    pub load: f64,
    pub power: f64,
}

impl Record for InPowerRecord {
    const ROLE: &'static str = "in_power";

    fn from_row(row: &EventRow) -> anyhow::Result<Self> {
        Ok(Self {
            time: row.time,
            cpus: row.field("cpus")?.to_string(),
            freq: row.f64_field("freq")?,
            load: row.f64_field("load")?,
            power: row.f64_field("power")?,
        })
    }

    fn time(&self) -> f64 {
        self.time
    }
}

impl PowerRecord for InPowerRecord {
    fn actor(&self) -> &str {
        &self.cpus
    }

    fn freq(&self) -> f64 {
        self.freq
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutPowerRecord {
    pub time: f64,
    pub cpus: String,
    pub freq: f64,
    pub power: f64,
}

impl Record for OutPowerRecord {
    const ROLE: &'static str = "out_power";

    fn from_row(row: &EventRow) -> anyhow::Result<Self> {
        Ok(Self {
            time: row.time,
            cpus: row.field("cpus")?.to_string(),
            freq: row.f64_field("freq")?,
            power: row.f64_field("power")?,
        })
    }

    fn time(&self) -> f64 {
        self.time
    }
}

impl PowerRecord for OutPowerRecord {
    fn actor(&self) -> &str {
        &self.cpus
    }

    fn freq(&self) -> f64 {
        self.freq
    }
}

pub type InPower = Trace<InPowerRecord>;
pub type OutPower = Trace<OutPowerRecord>;

impl<R: PowerRecord> Trace<R> {
    /// Frequency series per labelled actor, keyed by the actor's label.
    ///
    /// Only actors present in `map_label` are kept. Two ids mapped to the
    /// same label share one series.
    pub fn get_all_freqs(&self, map_label: &ActorLabelMap) -> FreqMap {
        let mut out = FreqMap::new();
        let mut skipped = 0usize;
        for (time, record) in self.records() {
            let Some(label) = map_label.get(record.actor()) else {
                skipped += 1;
                continue;
            };
            out.entry(label.clone()).or_default().push(FreqSample {
                time,
                freq: record.freq(),
            });
        }
        if skipped > 0 {
            debug!("{}: skipped {} events of unlabelled actors", R::ROLE, skipped);
        }
        out
    }
}
