//! Thermal zone and thermal governor collaborators.

use crate::trace::{EventRow, Record, Trace};

/// A thermal zone temperature reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalRecord {
    pub time: f64,
    pub zone: u32,
    /// Millidegrees Celsius, as the kernel reports it.
    pub temp: f64,
}

impl Record for ThermalRecord {
    const ROLE: &'static str = "thermal";

    fn from_row(row: &EventRow) -> anyhow::Result<Self> {
        Ok(Self {
            time: row.time,
            zone: row.u32_field("id")?,
            temp: row.f64_field("temp")?,
        })
    }

    fn time(&self) -> f64 {
        self.time
    }
}

/// One power-allocator governor decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalGovernorRecord {
    pub time: f64,
    pub current_temperature: f64,
    pub total_granted_power: f64,
}

impl Record for ThermalGovernorRecord {
    const ROLE: &'static str = "thermal_governor";

    fn from_row(row: &EventRow) -> anyhow::Result<Self> {
        Ok(Self {
            time: row.time,
            current_temperature: row.f64_field("current_temperature")?,
            total_granted_power: row.f64_field("total_granted_power")?,
        })
    }

    fn time(&self) -> f64 {
        self.time
    }
}

pub type Thermal = Trace<ThermalRecord>;
pub type ThermalGovernor = Trace<ThermalGovernorRecord>;
