//! Recording plot backend.

use crate::align::AlignedTable;
use crate::plot::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Plotter, YLimits};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub index: Vec<f64>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FigureBody {
    Histogram {
        /// `counts.len() + 1` bin edges; empty when there was nothing to bin.
        edges: Vec<f64>,
        counts: Vec<u64>,
    },
    Lines {
        series: Vec<LineSeries>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub xlabel: Option<String>,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    pub legend: bool,
    pub body: FigureBody,
}

/// Handle to a figure opened by `PlotBook::pre_plot_setup`.
#[derive(Debug, PartialEq, Eq)]
pub struct FigureId(usize);

#[derive(Debug, Default)]
pub struct PlotBook {
    figures: Vec<Figure>,
}

impl PlotBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn into_figures(self) -> Vec<Figure> {
        self.figures
    }

    fn finish(
        &mut self,
        id: FigureId,
        title: &str,
        xlabel: &str,
        xlim: Option<(f64, f64)>,
        ylim: YLimits,
        legend: bool,
    ) {
        let Some(fig) = self.figures.get_mut(id.0) else {
            return;
        };
        fig.title = title.to_string();
        fig.xlabel = Some(xlabel.to_string());
        fig.xlim = xlim;
        fig.legend = legend;
        fig.ylim = match ylim {
            YLimits::Default => None,
            YLimits::Range => padded_range(&fig.body),
        };
    }
}

impl Plotter for PlotBook {
    type Surface = FigureId;

    fn plot_hist(
        &mut self,
        samples: &[f64],
        title: &str,
        bins: usize,
        xlabel: &str,
        xlim: (f64, f64),
        ylim: YLimits,
    ) {
        let id = self.pre_plot_setup(None, None);
        let (edges, counts) = histogram(samples, bins);
        self.figures[id.0].body = FigureBody::Histogram { edges, counts };
        self.finish(id, title, xlabel, Some(xlim), ylim, false);
    }

    fn pre_plot_setup(&mut self, width: Option<f64>, height: Option<f64>) -> FigureId {
        self.figures.push(Figure {
            title: String::new(),
            width: width.unwrap_or(DEFAULT_WIDTH),
            height: height.unwrap_or(DEFAULT_HEIGHT),
            xlabel: None,
            xlim: None,
            ylim: None,
            legend: false,
            body: FigureBody::Lines { series: Vec::new() },
        });
        FigureId(self.figures.len() - 1)
    }

    fn plot_table(&mut self, surface: &FigureId, table: &AlignedTable) {
        let Some(fig) = self.figures.get_mut(surface.0) else {
            return;
        };
        if let FigureBody::Lines { series } = &mut fig.body {
            series.extend(table.columns.iter().map(|col| LineSeries {
                name: col.name.clone(),
                index: table.index.clone(),
                values: col.values.clone(),
            }));
        }
    }

    fn post_plot_setup(&mut self, surface: FigureId, title: &str) {
        self.finish(surface, title, "Time", None, YLimits::Range, true);
    }
}

/// Equal-width bins over the finite samples' range, last bin closed.
///
/// A single distinct value gets the unit-wide range around it.
pub fn histogram(samples: &[f64], bins: usize) -> (Vec<f64>, Vec<u64>) {
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return (Vec::new(), Vec::new());
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0u64; bins];
    for v in finite {
        let bin = (((v - lo) / width) as usize).min(bins - 1);
        counts[bin] += 1;
    }

    (edges, counts)
}

fn padded_range(body: &FigureBody) -> Option<(f64, f64)> {
    let values: Vec<f64> = match body {
        FigureBody::Lines { series } => series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .collect(),
        FigureBody::Histogram { counts, .. } => counts.iter().map(|&c| c as f64).collect(),
    };
    if values.is_empty() {
        return None;
    }

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let delta = (hi - lo) * 0.1;
    Some((lo - delta, hi + delta))
}
