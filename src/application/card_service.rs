// Card service - Use case for projecting the latest poll result into a card
use crate::domain::card::Card;
use crate::domain::chart::ChartView;
use crate::domain::kettle::Kettle;
use crate::domain::telemetry::Snapshot;

pub const NOTICE_UNCONFIGURED: &str =
    "Set entry_id in the card config (or an entity from this device).";
pub const NOTICE_NO_DATA: &str = "No data yet. Turn on the Live Heating Graph switch.";
pub const NOTICE_NO_SNAPSHOT: &str =
    "Turn on the Live Heating Graph switch and wait a few seconds.";

const DEFAULT_STABLE_TEXT: &str = "Temperature stable at target.";

#[derive(Clone)]
pub struct CardService {
    kettle: Kettle,
    stable_text: String,
}

impl CardService {
    pub fn new(kettle: Kettle, stable_text: Option<String>) -> Self {
        let stable_text = stable_text
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_STABLE_TEXT.to_string());
        Self {
            kettle,
            stable_text,
        }
    }

    /// Build the card for this cycle's poll result. `None` means no snapshot
    /// could be fetched at all.
    pub fn build_card(&self, snapshot: Option<&Snapshot>) -> Card {
        let title = format!("{} heating", self.kettle.name);

        let Some(snapshot) = snapshot else {
            return Card::new(title, None, Some(NOTICE_NO_SNAPSHOT.to_string()), None);
        };

        let indicator = snapshot.stable.then(|| self.stable_text.clone());
        match ChartView::project(snapshot) {
            Some(chart) => Card::new(title, indicator, None, Some(chart)),
            None => Card::new(title, indicator, Some(NOTICE_NO_DATA.to_string()), None),
        }
    }

    /// Card shown when the target id never resolved. Polling does not start
    /// in that case, so this is built exactly once.
    pub fn unconfigured_card(title: String) -> Card {
        Card::new(title, None, Some(NOTICE_UNCONFIGURED.to_string()), None)
    }
}
