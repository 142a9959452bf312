//! Plotting seam.
//!
//! `Run` never draws anything itself: it describes figures through the
//! `Plotter` trait. `PlotBook` is the backend used by the CLI; it records
//! each figure as data for the HTML report.

pub mod book;

pub use book::{Figure, PlotBook};

use crate::align::AlignedTable;
use serde::Serialize;

/// Figure size used when the caller gives none, in inches.
pub const DEFAULT_WIDTH: f64 = 8.0;
pub const DEFAULT_HEIGHT: f64 = 6.0;

/// How the y axis of a figure is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YLimits {
    /// Whatever the viewer picks.
    Default,
    /// Data range widened by 10% on both sides.
    Range,
}

pub trait Plotter {
    type Surface;

    /// Request a complete histogram figure.
    fn plot_hist(
        &mut self,
        samples: &[f64],
        title: &str,
        bins: usize,
        xlabel: &str,
        xlim: (f64, f64),
        ylim: YLimits,
    );

    /// Open a new figure; `None` picks the default size.
    fn pre_plot_setup(&mut self, width: Option<f64>, height: Option<f64>) -> Self::Surface;

    /// Draw every column of `table` as a line series against its index.
    fn plot_table(&mut self, surface: &Self::Surface, table: &AlignedTable);

    /// Title, axis labels and legend. Consumes the surface.
    fn post_plot_setup(&mut self, surface: Self::Surface, title: &str);
}

/// Prefix `title` with the caller-wide `base` title, if any.
pub fn normalize_title(title: &str, base: &str) -> String {
    if base.is_empty() {
        title.to_string()
    } else {
        format!("{} - {}", base, title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("freq in cpu0", ""), "freq in cpu0");
        assert_eq!(
            normalize_title("freq in cpu0", "hikey"),
            "hikey - freq in cpu0"
        );
    }
}
