// tiledash-core/src/config.rs
use crate::colors::ColorName;
use crate::context::FileSystem;
use crate::position::PositionConfig;
use crate::sample::SAMPLE_CONFIG;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config directory not found")]
    NoConfigDir,
    #[error("Widget #{index} has no `type` field")]
    MissingType { index: usize },
}

/// Fully loaded configuration: global settings plus the ordered panel blocks
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub widgets: Vec<RawPanelConfig>,
}

/// Global application settings. Shared panel fields (refresh interval,
/// colours, paging) also act as defaults for every panel.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default refresh interval in seconds; -1 disables refreshing
    pub refresh_interval: i64,
    /// Command used to open files with the OS default handler
    pub open_file_util: String,
    pub grid: GridConfig,
    pub navigation: NavConfig,
    pub log: LogConfig,
    pub colors: ColorsConfig,
    pub paging: PagingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 300,
            open_file_util: default_open_util().to_string(),
            grid: GridConfig::default(),
            navigation: NavConfig { shortcuts: true },
            log: LogConfig::default(),
            colors: ColorsConfig::default(),
            paging: PagingConfig::default(),
        }
    }
}

fn default_open_util() -> &'static str {
    #[cfg(target_os = "macos")]
    return "open";

    #[cfg(target_os = "windows")]
    return "explorer";

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    return "xdg-open";
}

/// Grid sizing. Either list track sizes explicitly (`columns`, `rows`) or
/// give a track count (`num_cols`, `num_rows`) to split the terminal evenly.
///
/// Track sizes: positive = fixed cells, 0 = flexible, -n = flexible with weight n.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub columns: Vec<i32>,
    pub rows: Vec<i32>,
    pub num_cols: u16,
    pub num_rows: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NavConfig {
    /// Enables the hotkeys that focus panels directly
    pub shortcuts: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file name, relative to the application directory
    pub file: String,
    pub level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: "log.txt".to_string(),
            level: LogLevel::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub foreground: ColorName,
    pub background: ColorName,
    pub title: ColorName,
    pub highlight: TextColors,
    pub border: BorderColors,
    pub rows: RowColors,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            foreground: "default".into(),
            background: "default".into(),
            title: "default".into(),
            highlight: TextColors {
                foreground: "black".into(),
                background: "orange".into(),
            },
            border: BorderColors::default(),
            rows: RowColors::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TextColors {
    pub foreground: ColorName,
    pub background: ColorName,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BorderColors {
    /// Borders of panels that can't take focus
    pub normal: ColorName,
    /// Borders of panels that can take focus
    pub focusable: ColorName,
    /// Border of the panel holding focus
    pub focused: ColorName,
}

impl Default for BorderColors {
    fn default() -> Self {
        Self {
            normal: "gray".into(),
            focusable: "red".into(),
            focused: "gray".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RowColors {
    pub even: ColorName,
    pub odd: ColorName,
}

impl Default for RowColors {
    fn default() -> Self {
        Self {
            even: "lightblue".into(),
            odd: "white".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Marker drawn for every page
    pub page_sigil: String,
    /// Marker drawn for the current page
    pub selected_sigil: String,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_sigil: "*".to_string(),
            selected_sigil: "_".to_string(),
        }
    }
}

/// Fields every panel block shares. Panel-specific configs embed this with
/// `#[serde(flatten)]` next to their own fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PanelConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Seconds between refreshes; zero or negative disables scheduled refresh
    pub refresh_interval: i64,
    /// Key that focuses the panel; assigned automatically when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_key: Option<String>,
    pub position: PositionConfig,
    pub colors: ColorsConfig,
    pub paging: PagingConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            kind: String::new(),
            enabled: true,
            title: None,
            refresh_interval: AppConfig::default().refresh_interval,
            focus_key: None,
            position: PositionConfig::default(),
            colors: ColorsConfig::default(),
            paging: PagingConfig::default(),
        }
    }
}

/// A panel block with only `type` and `enabled` decoded; the rest stays raw
/// until the panel's own constructor decodes it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPanelConfig {
    kind: String,
    enabled: bool,
    table: toml::Table,
}

impl RawPanelConfig {
    fn from_table(index: usize, table: toml::Table) -> Result<Self, ConfigError> {
        let kind = table
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(ConfigError::MissingType { index })?
            .to_string();
        // Blocks must opt in explicitly
        let enabled = table
            .get("enabled")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Ok(Self {
            kind,
            enabled,
            table,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn table(&self) -> &toml::Table {
        &self.table
    }
}

/// Decoder handed to a panel constructor. Decoding first lays down the
/// shared defaults taken from the global config, then the panel's own block.
pub struct PanelConfigSource<'a> {
    raw: &'a RawPanelConfig,
    app: &'a AppConfig,
}

impl<'a> PanelConfigSource<'a> {
    pub fn new(raw: &'a RawPanelConfig, app: &'a AppConfig) -> Self {
        Self { raw, app }
    }

    pub fn kind(&self) -> &str {
        self.raw.kind()
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let defaults = PanelConfig {
            kind: self.raw.kind().to_string(),
            enabled: true,
            title: None,
            refresh_interval: self.app.refresh_interval,
            focus_key: None,
            position: PositionConfig::default(),
            colors: self.app.colors.clone(),
            paging: self.app.paging.clone(),
        };

        let mut merged = toml::Value::try_from(&defaults)?;
        merge_values(&mut merged, toml::Value::Table(self.raw.table().clone()));
        Ok(merged.try_into()?)
    }
}

/// Deep merge `overlay` into `base`. Tables merge key by key; any other
/// value present in `overlay` replaces the one in `base`.
pub fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[derive(Serialize)]
struct DefaultsDocument<'a> {
    app: &'a AppConfig,
}

#[derive(Deserialize)]
struct MergedDocument {
    app: AppConfig,
    #[serde(default)]
    widgets: Vec<toml::Table>,
}

/// Parse a config document, filling missing globals from the defaults
pub fn parse(content: &str) -> Result<Config, ConfigError> {
    let loaded: toml::Table = toml::from_str(content)?;

    let defaults = AppConfig::default();
    let mut merged = toml::Value::try_from(DefaultsDocument { app: &defaults })?;
    merge_values(&mut merged, toml::Value::Table(loaded));

    let document: MergedDocument = merged.try_into()?;
    let widgets = document
        .widgets
        .into_iter()
        .enumerate()
        .map(|(index, table)| RawPanelConfig::from_table(index, table))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Config {
        app: document.app,
        widgets,
    })
}

/// Reads the config file, seeding it with a sample document the first time
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let fs = FileSystem::default();
        let path = fs.expand_home_dir(path.as_ref())?;
        fs.create_file(&path)?;

        if std::fs::metadata(&path)?.len() == 0 {
            std::fs::write(&path, SAMPLE_CONFIG)?;
        }

        Ok(Self { path })
    }

    /// Default location: `<config dir>/tiledash/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("tiledash/config.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(&self.path)?;
        parse(&content)
    }
}
