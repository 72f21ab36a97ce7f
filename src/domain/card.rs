// Rendered card domain model
use super::chart::ChartView;

/// What the card currently shows: a stability banner (only while the kettle
/// is holding its target), an instructional notice when there is nothing to
/// plot, and the chart projection when there is.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub indicator: Option<String>,
    pub notice: Option<String>,
    pub chart: Option<ChartView>,
}

impl Card {
    pub fn new(
        title: String,
        indicator: Option<String>,
        notice: Option<String>,
        chart: Option<ChartView>,
    ) -> Self {
        Self {
            title,
            indicator,
            notice,
            chart,
        }
    }
}
