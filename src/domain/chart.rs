// Chart view-state: the per-frame projection of a snapshot into parallel
// plotting arrays. Rebuilt from scratch on every snapshot, never persisted.

use super::telemetry::Snapshot;

/// The right (effort) axis is fixed to 0..=100 percent.
pub const OUTPUT_AXIS_MAX: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub labels: Vec<String>,
    pub current: Vec<Option<f64>>,
    pub target: Vec<Option<f64>>,
    pub output: Vec<Option<f64>>,
    pub left_min: f64,
    pub left_max: f64,
}

impl ChartView {
    /// Project a snapshot into index-aligned series arrays. Returns None when
    /// there is nothing to plot. The snapshot itself is never mutated.
    pub fn project(snapshot: &Snapshot) -> Option<Self> {
        if snapshot.samples.is_empty() {
            return None;
        }

        let labels = snapshot.samples.iter().map(|s| s.label.clone()).collect();
        let current: Vec<Option<f64>> = snapshot.samples.iter().map(|s| s.current).collect();
        let target = snapshot.samples.iter().map(|s| s.target).collect();
        let output = snapshot.samples.iter().map(|s| s.output).collect();
        let (left_min, left_max) = left_axis_bounds(&current);

        Some(Self {
            labels,
            current,
            target,
            output,
            left_min,
            left_max,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Left axis bounds over the displayed window: [min - 5, max + 10],
/// recomputed every frame. Nulls in the series are skipped.
pub fn left_axis_bounds(values: &[Option<f64>]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.iter().flatten() {
        min = min.min(*v);
        max = max.max(*v);
    }
    if !min.is_finite() || !max.is_finite() {
        // Entirely-null series: keep a unit range so the axis can still build
        return (0.0, 1.0);
    }
    (min - 5.0, max + 10.0)
}

/// Split an index-aligned nullable series into contiguous runs of plotted
/// points. A null at an index is a gap at that time, not the series' end.
pub fn contiguous_runs(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut run: Vec<(usize, f64)> = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) => run.push((i, *v)),
            None => {
                if !run.is_empty() {
                    runs.push(std::mem::take(&mut run));
                }
            }
        }
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}
