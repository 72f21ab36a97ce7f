use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct KettleConfig {
    pub kettle: KettleSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KettleSettings {
    /// The entry id this collector serves snapshots under.
    pub entry_id: String,
    /// Base URL of the kettle's HTTP CLI, e.g. "http://192.168.1.50".
    pub base_url: String,
    #[serde(default = "default_cli_path")]
    pub cli_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CardConfig {
    pub card: CardSettings,
    #[serde(default)]
    pub registry: RegistryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CardSettings {
    /// Explicit target. Takes precedence over `entity` when set.
    pub entry_id: Option<String>,
    /// Fallback: an entity whose backing device identifies the target.
    pub entity: Option<String>,
    /// Remote poll endpoint base URL; unset means the in-process collector.
    pub poll_url: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Replaces the default stability banner text.
    pub stable_text: Option<String>,
}

/// A slice of the host's device registry, enough to follow
/// entity -> device -> config entries.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RegistryConfig {
    #[serde(default)]
    pub entities: Vec<EntityEntry>,
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EntityEntry {
    pub id: String,
    pub device: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceEntry {
    pub id: String,
    #[serde(default)]
    pub entries: Vec<String>,
}

fn default_cli_path() -> String {
    "/cli".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

pub fn load_kettle_config() -> anyhow::Result<KettleConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/kettle"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_card_config() -> anyhow::Result<CardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/card"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Resolve the card's target id. Order: explicit entry_id, else the named
/// entity's backing device, taking that device's first associated entry.
/// A device backing several entries resolves to whichever is listed first;
/// the registry order decides the tie.
pub fn resolve_target(card: &CardSettings, registry: &RegistryConfig) -> Option<String> {
    if let Some(entry_id) = card.entry_id.as_deref() {
        if !entry_id.is_empty() {
            return Some(entry_id.to_string());
        }
    }

    let entity = card.entity.as_deref()?;
    let device = &registry.entities.iter().find(|e| e.id == entity)?.device;
    registry
        .devices
        .iter()
        .find(|d| &d.id == device)?
        .entries
        .first()
        .cloned()
}
