// Telemetry data domain models

/// One observation from the heater control loop. Any of the three readings
/// can be missing for a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label: String,
    pub current: Option<f64>,
    pub target: Option<f64>,
    pub output: Option<f64>,
}

impl Sample {
    pub fn new(
        label: String,
        current: Option<f64>,
        target: Option<f64>,
        output: Option<f64>,
    ) -> Self {
        Self {
            label,
            current,
            target,
            output,
        }
    }
}

/// One polled response: a stability flag plus a time-ordered run of samples.
/// Immutable once received; the next snapshot supersedes it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub stable: bool,
    pub samples: Vec<Sample>,
}

impl Snapshot {
    pub fn new(stable: bool, samples: Vec<Sample>) -> Self {
        Self { stable, samples }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
