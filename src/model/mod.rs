//! Report model: per-role summary of the run plus the recorded figures.

use crate::config::Config;
use crate::plot::Figure;
use crate::run::Run;
use crate::trace::{Record, Trace};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize)]
pub struct RoleView {
    pub role: String,
    pub events: usize,
    /// Normalized time of the first and last event.
    pub first: Option<f64>,
    pub last: Option<f64>,
    pub peak_metric: String,
    pub peak: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub events: usize,
    /// Labelled actors with at least one power event.
    pub actors: usize,
    pub figures: usize,
    pub basetime: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub title: String,
    pub roles: Vec<RoleView>,
    pub actors: BTreeMap<String, String>,
    pub totals: TotalsView,
    pub figures: Vec<Figure>,
}

fn role_view<R: Record>(
    trace: &Trace<R>,
    peak_metric: &str,
    metric: impl Fn(&R) -> f64,
) -> RoleView {
    let span = trace.span();
    RoleView {
        role: R::ROLE.to_string(),
        events: trace.len(),
        first: span.map(|(first, _)| first),
        last: span.map(|(_, last)| last),
        peak_metric: peak_metric.to_string(),
        peak: trace.peak(metric),
    }
}

/// Build report data from a normalized run and the figures drawn for it.
pub fn build_report_data(
    run: &Run,
    config: &Config,
    basetime: f64,
    figures: Vec<Figure>,
) -> ReportData {
    let roles = vec![
        role_view(&run.thermal, "max temp (mC)", |r| r.temp),
        role_view(&run.thermal_governor, "max granted power (mW)", |r| {
            r.total_granted_power
        }),
        role_view(&run.pid_controller, "max output", |r| r.output),
        role_view(&run.in_power, "max requested freq (KHz)", |r| r.freq),
        role_view(&run.out_power, "max granted freq (KHz)", |r| r.freq),
    ];

    let seen: BTreeSet<String> = run
        .in_power
        .get_all_freqs(&config.actors)
        .into_keys()
        .chain(run.out_power.get_all_freqs(&config.actors).into_keys())
        .collect();

    ReportData {
        title: config.plot.title.clone(),
        totals: TotalsView {
            events: roles.iter().map(|r| r.events).sum(),
            actors: seen.len(),
            figures: figures.len(),
            basetime,
        },
        roles,
        actors: config.actors.clone(),
        figures,
    }
}
