// Wire format for the poll endpoint, mapped to and from domain types here
// so the domain stays serialization-free.
use crate::domain::telemetry::{Sample, Snapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphData {
    pub stable: bool,
    #[serde(default)]
    pub data: Vec<GraphPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphPoint {
    pub t: String,
    pub tempr: Option<f64>,
    pub setp: Option<f64>,
    pub out: Option<f64>,
}

impl GraphData {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            stable: snapshot.stable,
            data: snapshot
                .samples
                .iter()
                .map(|s| GraphPoint {
                    t: s.label.clone(),
                    tempr: s.current,
                    setp: s.target,
                    out: s.output,
                })
                .collect(),
        }
    }

    pub fn into_snapshot(self) -> Snapshot {
        let samples = self
            .data
            .into_iter()
            .map(|p| Sample::new(p.t, p.tempr, p.setp, p.out))
            .collect();
        Snapshot::new(self.stable, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poll_body() {
        let body = r#"{"stable":true,"data":[{"t":"10:00","tempr":37.8,"setp":40,"out":60},{"t":"10:01","tempr":null,"setp":40}]}"#;
        let data: GraphData = serde_json::from_str(body).unwrap();
        let snapshot = data.into_snapshot();

        assert!(snapshot.stable);
        assert_eq!(snapshot.samples.len(), 2);
        assert_eq!(snapshot.samples[0].label, "10:00");
        assert_eq!(snapshot.samples[0].current, Some(37.8));
        assert_eq!(snapshot.samples[0].output, Some(60.0));
        // Missing and null fields both mean "no reading at that time"
        assert_eq!(snapshot.samples[1].current, None);
        assert_eq!(snapshot.samples[1].output, None);
    }

    #[test]
    fn test_parse_missing_data_field() {
        let data: GraphData = serde_json::from_str(r#"{"stable":false}"#).unwrap();
        assert!(data.into_snapshot().is_empty());
    }

    #[test]
    fn test_from_snapshot_keeps_order_and_nulls() {
        let snapshot = Snapshot::new(
            false,
            vec![
                Sample::new("a".into(), Some(1.0), None, Some(3.0)),
                Sample::new("b".into(), None, Some(2.0), None),
            ],
        );
        let wire = GraphData::from_snapshot(&snapshot);
        assert_eq!(wire.data[0].t, "a");
        assert_eq!(wire.data[0].setp, None);
        assert_eq!(wire.data[1].tempr, None);
        assert_eq!(wire.data[1].setp, Some(2.0));
    }
}
