//! Configuration file handling.
//!
//! A `runviz.toml` carries the actor label map and plot defaults so they do
//! not have to be repeated on every invocation. Command-line flags win over
//! file values.

use crate::RunArgs;
use crate::trace::ActorLabelMap;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "runviz.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub plot: PlotConfig,

    /// Actor id (cpumask) -> display label.
    #[serde(default)]
    pub actors: ActorLabelMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Time origin for every trace. Defaults to the run's earliest event.
    #[serde(default)]
    pub basetime: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Prefixed to every figure title.
    #[serde(default)]
    pub title: String,

    /// Figure width in inches.
    #[serde(default)]
    pub width: Option<f64>,

    /// Figure height in inches.
    #[serde(default)]
    pub height: Option<f64>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply command-line overrides. `--actor` entries are merged over the
    /// file's `[actors]` table.
    pub fn merge_with_args(&mut self, args: &RunArgs) {
        if let Some(basetime) = args.basetime {
            self.run.basetime = Some(basetime);
        }
        if let Some(title) = &args.title {
            self.plot.title = title.clone();
        }
        if let Some(width) = args.width {
            self.plot.width = Some(width);
        }
        if let Some(height) = args.height {
            self.plot.height = Some(height);
        }
        for (id, label) in &args.actors {
            self.actors.insert(id.clone(), label.clone());
        }
    }

    /// Commented starter config written by `init-config`.
    pub fn default_toml() -> String {
        r#"# trace-run-viz configuration

[run]
# Time origin for all traces; defaults to the earliest event of the run.
# basetime = 0.0

[plot]
# Prefixed to every figure title.
title = ""
# Figure size in inches.
width = 8.0
height = 6.0

# Actor id (cpumask as it appears in the power traces) -> label.
[actors]
"00000000,0000000f" = "little"
"00000000,000000f0" = "big"
"#
        .to_string()
    }
}
