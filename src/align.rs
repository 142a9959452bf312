//! Forward-filled alignment of independently sampled series.
//!
//! Input and output frequencies of an actor are sampled at unrelated
//! instants. `pad_join` puts them on the union of their timestamps and
//! carries each column's last observed value forward, so every row can be
//! read as "the state of each series at that time".

use crate::trace::FreqSample;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedColumn {
    pub name: String,
    /// One cell per index row; `None` before the series' first sample.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedTable {
    /// Sorted, de-duplicated timestamps.
    pub index: Vec<f64>,
    pub columns: Vec<AlignedColumn>,
}

impl AlignedTable {
    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<&AlignedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }
}

/// Join named series on the union of their timestamps, padding forward.
///
/// Samples need not be sorted. Samples sharing a timestamp within one series
/// resolve to the one that comes last in input order. Samples with a NaN
/// timestamp are dropped.
pub fn pad_join(series: &[(String, &[FreqSample])]) -> AlignedTable {
    let sorted: Vec<Vec<FreqSample>> = series
        .iter()
        .map(|(_, samples)| {
            let mut s: Vec<FreqSample> =
                samples.iter().copied().filter(|s| !s.time.is_nan()).collect();
            // Stable, so equal timestamps keep input order.
            s.sort_by(|a, b| a.time.total_cmp(&b.time));
            s
        })
        .collect();

    let mut index: Vec<f64> = sorted.iter().flatten().map(|s| s.time).collect();
    index.sort_by(f64::total_cmp);
    index.dedup();

    let columns = series
        .iter()
        .zip(&sorted)
        .map(|((name, _), samples)| AlignedColumn {
            name: name.clone(),
            values: pad_column(&index, samples),
        })
        .collect();

    AlignedTable { index, columns }
}

/// Value of `samples` at or before each index time.
fn pad_column(index: &[f64], samples: &[FreqSample]) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(index.len());
    let mut next = 0;
    let mut last = None;

    for &t in index {
        while next < samples.len() && samples[next].time <= t {
            last = Some(samples[next].freq);
            next += 1;
        }
        values.push(last);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn samples(points: &[(f64, f64)]) -> Vec<FreqSample> {
        points
            .iter()
            .map(|&(time, freq)| FreqSample { time, freq })
            .collect()
    }

    #[test]
    fn test_pad_join_fills_forward_and_leaves_leading_gaps() {
        let freq_in = samples(&[(0.0, 100.0), (2.0, 200.0)]);
        let freq_out = samples(&[(1.0, 150.0)]);

        let table = pad_join(&[
            ("cpu0_freq_in".to_string(), freq_in.as_slice()),
            ("cpu0_freq_out".to_string(), freq_out.as_slice()),
        ]);

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
    fn test_pad_join_sorts_and_last_sample_wins_on_ties() {
        let a = samples(&[(3.0, 30.0), (1.0, 10.0), (1.0, 11.0)]);
        let b = samples(&[(2.0, 5.0)]);

        let table = pad_join(&[
            ("a".to_string(), a.as_slice()),
            ("b".to_string(), b.as_slice()),
        ]);

        assert_eq!(table.index, vec![1.0, 2.0, 3.0]);
        assert_eq!(
            table.column("a").unwrap().values,
            vec![Some(11.0), Some(11.0), Some(30.0)]
        );
        assert_eq!(table.column("b").unwrap().values, vec![None, Some(5.0), Some(5.0)]);
    }

    #[test]
    fn test_pad_join_cell_matches_latest_sample_at_or_before_row() {
        let a = samples(&[(0.5, 1.0), (1.5, 2.0), (4.0, 3.0), (4.25, 4.0)]);
        let b = samples(&[(0.0, 9.0), (2.0, 8.0), (4.25, 7.0), (6.0, 6.0)]);
        let table = pad_join(&[
            ("a".to_string(), a.as_slice()),
            ("b".to_string(), b.as_slice()),
        ]);

        for (col, src) in table.columns.iter().zip([&a, &b]) {
            for (row, &t) in table.index.iter().enumerate() {
                let expected = src
                    .iter()
                    .filter(|s| s.time <= t)
                    .max_by(|x, y| x.time.total_cmp(&y.time))
                    .map(|s| s.freq);
                assert_eq!(col.values[row], expected, "column {} at t={}", col.name, t);
            }
        }
    }

    #[test]
    fn test_pad_join_empty_series() {
        let a = samples(&[(1.0, 10.0)]);
        let table = pad_join(&[
            ("a".to_string(), a.as_slice()),
            ("b".to_string(), &[] as &[FreqSample]),
        ]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.column("b").unwrap().values, vec![None]);

        let empty = pad_join(&[]);
        assert_eq!(empty.len(), 0);
        assert!(empty.columns.is_empty());
    }
}
