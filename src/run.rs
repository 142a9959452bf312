//! One run's worth of trace collaborators, aligned and plotted together.

use crate::align::{AlignedTable, pad_join};
use crate::error::RunError;
use crate::plot::{Plotter, YLimits, normalize_title};
use crate::trace::{
    ActorLabelMap, InPower, OutPower, PidController, PowerDirection, PowerRecord, Record,
    Thermal, ThermalGovernor, Trace,
};
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub const HIST_BINS: usize = 20;
pub const HIST_XLABEL: &str = "Frequency (KHz)";

/// All trace collaborators of a single run.
#[derive(Debug, Clone)]
pub struct Run {
    pub thermal: Thermal,
    pub thermal_governor: ThermalGovernor,
    pub pid_controller: PidController,
    pub in_power: InPower,
    pub out_power: OutPower,
}

impl Run {
    /// Load every collaborator from the run directory at `path`.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            thermal: open_role(path)?,
            thermal_governor: open_role(path)?,
            pid_controller: open_role(path)?,
            in_power: open_role(path)?,
            out_power: open_role(path)?,
        })
    }

    /// Re-base every collaborator's timestamps on `basetime`.
    pub fn normalize_time(&mut self, basetime: f64) {
        debug!("normalizing run time on basetime {}", basetime);
        self.thermal.normalize_time(basetime);
        self.thermal_governor.normalize_time(basetime);
        self.pid_controller.normalize_time(basetime);
        self.in_power.normalize_time(basetime);
        self.out_power.normalize_time(basetime);
    }

    /// Earliest raw timestamp seen by any collaborator.
    pub fn earliest_time(&self) -> Option<f64> {
        [
            self.thermal.first_raw_time(),
            self.thermal_governor.first_raw_time(),
            self.pid_controller.first_raw_time(),
            self.in_power.first_raw_time(),
            self.out_power.first_raw_time(),
        ]
        .into_iter()
        .flatten()
        .min_by(f64::total_cmp)
    }

    /// Input and output frequency of every labelled actor on a shared,
    /// forward-filled time axis. Columns are `<label>_freq_in` and
    /// `<label>_freq_out`.
    pub fn get_all_freqs_data(
        &self,
        map_label: &ActorLabelMap,
    ) -> Result<BTreeMap<String, AlignedTable>, RunError> {
        let in_freqs = self.in_power.get_all_freqs(map_label);
        let out_freqs = self.out_power.get_all_freqs(map_label);

        let mut out = BTreeMap::new();
        for label in map_label.values() {
            let freq_in = in_freqs.get(label).ok_or_else(|| RunError::MissingActor {
                direction: PowerDirection::In,
                label: label.clone(),
            })?;
            let freq_out = out_freqs.get(label).ok_or_else(|| RunError::MissingActor {
                direction: PowerDirection::Out,
                label: label.clone(),
            })?;

            let table = pad_join(&[
                (format!("{}_freq_in", label), freq_in.as_slice()),
                (format!("{}_freq_out", label), freq_out.as_slice()),
            ]);
            debug!("aligned {} rows for actor {}", table.len(), label);
            out.insert(label.clone(), table);
        }

        Ok(out)
    }

    /// Frequency histograms for every labelled output power actor, then
    /// every labelled input power actor.
    pub fn plot_power_hists<P: Plotter>(
        &self,
        map_label: &ActorLabelMap,
        title: &str,
        plotter: &mut P,
    ) {
        plot_power_hists(&self.out_power, map_label, PowerDirection::Out, title, plotter);
        plot_power_hists(&self.in_power, map_label, PowerDirection::In, title, plotter);
    }

    /// One input-vs-output frequency figure per labelled actor.
    pub fn plot_allfreqs<P: Plotter>(
        &self,
        map_label: &ActorLabelMap,
        title: &str,
        width: Option<f64>,
        height: Option<f64>,
        plotter: &mut P,
    ) -> Result<(), RunError> {
        let all_freqs = self.get_all_freqs_data(map_label)?;

        for (label, table) in &all_freqs {
            let this_title = normalize_title(&format!("allfreqs {}", label), title);

            let surface = plotter.pre_plot_setup(width, height);
            plotter.plot_table(&surface, table);
            plotter.post_plot_setup(surface, &this_title);
        }

        Ok(())
    }
}

fn open_role<R: Record>(path: &Path) -> anyhow::Result<Trace<R>> {
    Trace::open(path).with_context(|| {
        format!(
            "load {} trace from {}",
            R::ROLE,
            Trace::<R>::file_path(path).display()
        )
    })
}

/// Histogram x limits for one actor: zero up to its highest frequency.
///
/// An actor without samples gets `(0.0, 0.0)`.
pub fn hist_bounds(samples: &[f64]) -> (f64, f64) {
    let max = samples.iter().copied().fold(None, |acc: Option<f64>, v| {
        Some(acc.map_or(v, |m| m.max(v)))
    });
    (0.0, max.unwrap_or(0.0))
}

fn plot_power_hists<R: PowerRecord, P: Plotter>(
    power: &Trace<R>,
    map_label: &ActorLabelMap,
    direction: PowerDirection,
    title: &str,
    plotter: &mut P,
) {
    let freqs = power.get_all_freqs(map_label);
    for (actor, samples) in &freqs {
        let this_title = normalize_title(&format!("freq {} {}", direction, actor), title);
        let values: Vec<f64> = samples.iter().map(|s| s.freq).collect();
        if values.is_empty() {
            warn!(
                "actor {} has no {} samples; histogram will be empty",
                actor,
                direction.role()
            );
        }
        let xlim = hist_bounds(&values);

        plotter.plot_hist(&values, &this_title, HIST_BINS, HIST_XLABEL, xlim, YLimits::Default);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::pid::PidRecord;
    use crate::trace::power::{InPowerRecord, OutPowerRecord};
    use crate::trace::thermal::{ThermalGovernorRecord, ThermalRecord};
    use pretty_assertions::assert_eq;
    use std::fs;

    /// Plot calls as seen by a backend, in order.
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Hist {
            title: String,
            samples: Vec<f64>,
            bins: usize,
            xlabel: String,
            xlim: (f64, f64),
        },
        Pre {
            width: Option<f64>,
            height: Option<f64>,
        },
        Table {
            surface: usize,
            columns: Vec<String>,
        },
        Post {
            surface: usize,
            title: String,
        },
    }

    #[derive(Default)]
    struct RecordingPlotter {
        calls: Vec<Call>,
        opened: usize,
    }

    impl Plotter for RecordingPlotter {
        type Surface = usize;

        fn plot_hist(
            &mut self,
            samples: &[f64],
            title: &str,
            bins: usize,
            xlabel: &str,
            xlim: (f64, f64),
            _ylim: YLimits,
        ) {
            self.calls.push(Call::Hist {
                title: title.to_string(),
                samples: samples.to_vec(),
                bins,
                xlabel: xlabel.to_string(),
                xlim,
            });
        }

        fn pre_plot_setup(&mut self, width: Option<f64>, height: Option<f64>) -> usize {
            self.calls.push(Call::Pre { width, height });
            self.opened += 1;
            self.opened
        }

        fn plot_table(&mut self, surface: &usize, table: &AlignedTable) {
            self.calls.push(Call::Table {
                surface: *surface,
                columns: table.columns.iter().map(|c| c.name.clone()).collect(),
            });
        }

        fn post_plot_setup(&mut self, surface: usize, title: &str) {
            self.calls.push(Call::Post {
                surface,
                title: title.to_string(),
            });
        }
    }

    fn in_rec(time: f64, cpus: &str, freq: f64) -> InPowerRecord {
        InPowerRecord {
            time,
            cpus: cpus.to_string(),
            freq,
            load: 50.0,
            power: 100.0,
        }
    }

    fn out_rec(time: f64, cpus: &str, freq: f64) -> OutPowerRecord {
        OutPowerRecord {
            time,
            cpus: cpus.to_string(),
            freq,
            power: 100.0,
        }
    }

    fn run_with(in_power: Vec<InPowerRecord>, out_power: Vec<OutPowerRecord>) -> Run {
        Run {
            thermal: Trace::from_records(vec![ThermalRecord {
                time: 3.0,
                zone: 0,
                temp: 50_000.0,
            }]),
            thermal_governor: Trace::from_records(vec![ThermalGovernorRecord {
                time: 4.0,
                current_temperature: 50_000.0,
                total_granted_power: 2_000.0,
            }]),
            pid_controller: Trace::from_records(vec![PidRecord {
                time: 5.0,
                err: 1.0,
                output: 2.0,
            }]),
            in_power: Trace::from_records(in_power),
            out_power: Trace::from_records(out_power),
        }
    }

    /// Actor "A" is cpu0 and "B" is cpu1.
    /// in: A @ {0: 100, 2: 200}, B @ {1: 50}; out: A @ {1: 150}.
    fn scenario_run() -> Run {
        run_with(
            vec![
                in_rec(0.0, "A", 100.0),
                in_rec(1.0, "B", 50.0),
                in_rec(2.0, "A", 200.0),
            ],
            vec![out_rec(1.0, "A", 150.0)],
        )
    }

    fn labels(pairs: &[(&str, &str)]) -> ActorLabelMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_get_all_freqs_data_reports_actor_missing_from_out_power() {
        let run = scenario_run();
        let map = labels(&[("A", "cpu0"), ("B", "cpu1")]);

        let err = run.get_all_freqs_data(&map).unwrap_err();
        assert_eq!(
            err,
            RunError::MissingActor {
                direction: PowerDirection::Out,
                label: "cpu1".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "actor \"cpu1\" has no samples in the out_power trace"
        );
    }

    #[test]
    fn test_get_all_freqs_data_aligns_in_and_out() {
        let run = scenario_run();
        let tables = run.get_all_freqs_data(&labels(&[("A", "cpu0")])).unwrap();

        assert_eq!(tables.len(), 1);
        let table = &tables["cpu0"];
        assert_eq!(table.index, vec![0.0, 1.0, 2.0]);
        assert_eq!(
            table.column("cpu0_freq_in").unwrap().values,
            vec![Some(100.0), Some(100.0), Some(200.0)]
        );
        assert_eq!(
            table.column("cpu0_freq_out").unwrap().values,
            vec![None, Some(150.0), Some(150.0)]
        );
    }

    #[test]
    fn test_get_all_freqs_data_maps_actor_ids_to_labels() {
        let run = run_with(
            vec![in_rec(0.0, "0000000f", 1.0), in_rec(0.0, "000000f0", 2.0)],
            vec![out_rec(0.5, "0000000f", 3.0), out_rec(0.5, "000000f0", 4.0)],
        );
        let map = labels(&[("0000000f", "little"), ("000000f0", "big")]);

        let tables = run.get_all_freqs_data(&map).unwrap();
        assert_eq!(tables.keys().collect::<Vec<_>>(), vec!["big", "little"]);
        for (label, table) in &tables {
            assert!(table.column(&format!("{}_freq_in", label)).is_some());
            assert!(table.column(&format!("{}_freq_out", label)).is_some());
            assert_eq!(table.columns.len(), 2);
        }
    }

    #[test]
    fn test_get_all_freqs_data_missing_from_in_power() {
        let run = run_with(vec![], vec![out_rec(1.0, "cpu0", 150.0)]);
        let err = run.get_all_freqs_data(&labels(&[("cpu0", "cpu0")])).unwrap_err();
        assert_eq!(
            err,
            RunError::MissingActor {
                direction: PowerDirection::In,
                label: "cpu0".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_actor_map_builds_and_plots_nothing() {
        let run = scenario_run();
        let map = ActorLabelMap::new();

        assert!(run.get_all_freqs_data(&map).unwrap().is_empty());

        let mut plotter = RecordingPlotter::default();
        run.plot_power_hists(&map, "", &mut plotter);
        run.plot_allfreqs(&map, "", None, None, &mut plotter).unwrap();
        assert!(plotter.calls.is_empty());
    }

    #[test]
    fn test_power_hists_only_for_labelled_actors() {
        let run = scenario_run();
        let mut plotter = RecordingPlotter::default();
        run.plot_power_hists(&labels(&[("B", "cpu1")]), "", &mut plotter);

        let titles: Vec<&str> = plotter
            .calls
            .iter()
            .map(|c| match c {
                Call::Hist { title, .. } => title.as_str(),
                other => panic!("unexpected call {:?}", other),
            })
            .collect();
        assert_eq!(titles, vec!["freq in cpu1"]);
    }

    #[test]
    fn test_power_hists_for_run_without_power_events() {
        let run = run_with(vec![], vec![]);
        let mut plotter = RecordingPlotter::default();
        run.plot_power_hists(&labels(&[("A", "cpu0")]), "", &mut plotter);
        assert!(plotter.calls.is_empty());
    }

    #[test]
    fn test_normalize_time_reaches_every_collaborator() {
        let mut run = scenario_run();
        run.normalize_time(7.5);

        assert_eq!(run.thermal.basetime(), 7.5);
        assert_eq!(run.thermal_governor.basetime(), 7.5);
        assert_eq!(run.pid_controller.basetime(), 7.5);
        assert_eq!(run.in_power.basetime(), 7.5);
        assert_eq!(run.out_power.basetime(), 7.5);

        run.normalize_time(1.0);
        assert_eq!(run.thermal.basetime(), 1.0);
        assert_eq!(run.out_power.records().next().map(|(t, _)| t), Some(0.0));
    }

    #[test]
    fn test_earliest_time_spans_all_collaborators() {
        let run = scenario_run();
        assert_eq!(run.earliest_time(), Some(0.0));

        let later = run_with(vec![], vec![]);
        assert_eq!(later.earliest_time(), Some(3.0));
    }

    #[test]
    fn test_plot_power_hists_out_before_in_with_bounds() {
        let run = scenario_run();
        let mut plotter = RecordingPlotter::default();
        let map = labels(&[("A", "cpu0"), ("B", "cpu1")]);
        run.plot_power_hists(&map, "run1", &mut plotter);

        let hist = |title: &str, samples: Vec<f64>, max: f64| Call::Hist {
            title: title.to_string(),
            samples,
            bins: HIST_BINS,
            xlabel: HIST_XLABEL.to_string(),
            xlim: (0.0, max),
        };
        assert_eq!(
            plotter.calls,
            vec![
                hist("run1 - freq out cpu0", vec![150.0], 150.0),
                hist("run1 - freq in cpu0", vec![100.0, 200.0], 200.0),
                hist("run1 - freq in cpu1", vec![50.0], 50.0),
            ]
        );
    }

    #[test]
    fn test_plot_allfreqs_figure_per_label() {
        let run = run_with(
            vec![in_rec(0.0, "a", 1.0), in_rec(0.0, "b", 2.0)],
            vec![out_rec(1.0, "a", 3.0), out_rec(1.0, "b", 4.0)],
        );
        let mut plotter = RecordingPlotter::default();
        let map = labels(&[("a", "a"), ("b", "b")]);
        run.plot_allfreqs(&map, "", Some(10.0), Some(4.0), &mut plotter)
            .unwrap();

        assert_eq!(plotter.calls.len(), 6);
        assert_eq!(
            plotter.calls[..3],
            [
                Call::Pre {
                    width: Some(10.0),
                    height: Some(4.0),
                },
                Call::Table {
                    surface: 1,
                    columns: vec!["a_freq_in".to_string(), "a_freq_out".to_string()],
                },
                Call::Post {
                    surface: 1,
                    title: "allfreqs a".to_string(),
                },
            ]
        );
        assert_eq!(
            plotter.calls[5],
            Call::Post {
                surface: 2,
                title: "allfreqs b".to_string(),
            }
        );
    }

    #[test]
    fn test_plot_allfreqs_requests_nothing_on_lookup_failure() {
        let run = scenario_run();
        let mut plotter = RecordingPlotter::default();
        let map = labels(&[("A", "cpu0"), ("B", "cpu1")]);
        let result = run.plot_allfreqs(&map, "t", None, None, &mut plotter);

        assert!(result.is_err());
        assert!(plotter.calls.is_empty());
    }

    #[test]
    fn test_hist_bounds() {
        assert_eq!(hist_bounds(&[3.0, 9.0, 1.0]), (0.0, 9.0));
        assert_eq!(hist_bounds(&[]), (0.0, 0.0));
    }

    #[test]
    fn test_open_loads_every_role_and_names_failing_one() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("thermal.txt", "10.0: id=0 temp=45000\n"),
            (
                "thermal_governor.txt",
                "10.1: current_temperature=45000 total_granted_power=3000\n",
            ),
            ("pid_controller.txt", "10.1: err=500 output=3000\n"),
            ("in_power.txt", "10.2: cpus=0000000f freq=1900000 load=80 power=1200\n"),
            ("out_power.txt", "10.3: cpus=0000000f freq=1400000 power=900\n"),
        ];
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }

        let run = Run::open(dir.path()).unwrap();
        assert_eq!(run.earliest_time(), Some(10.0));
        assert_eq!(run.out_power.len(), 1);

        fs::remove_file(dir.path().join("in_power.txt")).unwrap();
        let err = Run::open(dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("load in_power trace from"));
    }
}
