use anyhow::{Context, anyhow, bail};
use std::collections::BTreeMap;

/// A single line of an event table: timestamp plus its `key=value` payload.
#[derive(Debug, Clone)]
pub struct EventRow {
    pub lineno: usize,
    pub time: f64,
    pub fields: BTreeMap<String, String>,
}

impl EventRow {
    pub fn field(&self, name: &str) -> anyhow::Result<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("line {}: missing field {}", self.lineno, name))
    }

    pub fn f64_field(&self, name: &str) -> anyhow::Result<f64> {
        let raw = self.field(name)?;
        let value: f64 = raw
            .parse()
            .with_context(|| format!("line {}: bad number for {}: {:?}", self.lineno, name, raw))?;
        if !value.is_finite() {
            bail!("line {}: non-finite value for {}: {:?}", self.lineno, name, raw);
        }
        Ok(value)
    }

    pub fn u32_field(&self, name: &str) -> anyhow::Result<u32> {
        let raw = self.field(name)?;
        raw.parse()
            .with_context(|| format!("line {}: bad integer for {}: {:?}", self.lineno, name, raw))
    }
}
