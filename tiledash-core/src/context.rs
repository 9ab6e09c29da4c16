// tiledash-core/src/context.rs
use crate::config::{AppConfig, PagingConfig, PanelConfig, RowColors};
use crate::overlay::Overlays;
use crate::signal::SignalSender;
use ratatui::style::Color;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Services and settings handed to every panel constructor
#[derive(Clone)]
pub struct AppContext {
    /// Directory holding the config and log files
    pub app_dir: PathBuf,
    /// Merged global configuration
    pub config: Arc<AppConfig>,
    pub formatter: Formatter,
    pub fs: FileSystem,
    /// Path of the application log file
    pub log_file: PathBuf,
    /// Hand-off channel to the UI loop
    pub signals: SignalSender,
    /// Mounts modal overlays such as help text
    pub overlays: Overlays,
}

impl AppContext {
    pub fn new(
        app_dir: impl Into<PathBuf>,
        config: Arc<AppConfig>,
        signals: SignalSender,
        overlays: Overlays,
    ) -> Self {
        let app_dir = app_dir.into();
        let log_file = app_dir.join(&config.log.file);

        Self {
            formatter: Formatter::new(&config),
            fs: FileSystem::new(&config.open_file_util),
            app_dir,
            config,
            log_file,
            signals,
            overlays,
        }
    }
}

/// Text helpers shared by panels
#[derive(Debug, Clone)]
pub struct Formatter {
    paging: PagingConfig,
    rows: RowColors,
}

impl Formatter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            paging: config.paging.clone(),
            rows: config.colors.rows.clone(),
        }
    }

    /// Formatter using a panel's own paging and row colours, which already
    /// fall back to the global ones when the panel block leaves them out
    pub fn for_panel(config: &PanelConfig) -> Self {
        Self {
            paging: config.paging.clone(),
            rows: config.colors.rows.clone(),
        }
    }

    /// Center `text` in a field `width` characters wide
    pub fn center_text(&self, text: &str, width: usize) -> String {
        format!("{:^width$}", text, width = width)
    }

    /// Padding that extends a row starting at `offset` out to `max`
    pub fn pad_row(&self, offset: usize, max: usize) -> String {
        " ".repeat(max.saturating_sub(offset))
    }

    /// Page markers for a multi-source panel, e.g. `**_*` for page 2 of 4.
    /// Empty when there is only one page.
    pub fn sigil_str(&self, len: usize, pos: usize) -> String {
        if len <= 1 {
            return String::new();
        }

        let pos = pos.min(len - 1);
        let mut sigils = self.paging.page_sigil.repeat(pos);
        sigils.push_str(&self.paging.selected_sigil);
        sigils.push_str(&self.paging.page_sigil.repeat(len - 1 - pos));
        sigils
    }

    /// Alternating row colour
    pub fn row_color(&self, idx: usize) -> Color {
        if idx % 2 == 0 {
            self.rows.even.to_color()
        } else {
            self.rows.odd.to_color()
        }
    }
}

/// File-system helpers shared by panels
#[derive(Debug, Clone)]
pub struct FileSystem {
    open_file_util: String,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new(&AppConfig::default().open_file_util)
    }
}

impl FileSystem {
    pub fn new(open_file_util: &str) -> Self {
        Self {
            open_file_util: open_file_util.to_string(),
        }
    }

    pub fn home(&self) -> io::Result<PathBuf> {
        dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "cannot find user-specific home dir")
        })
    }

    /// Expand a leading `~` to the home directory. Other paths are returned as-is.
    pub fn expand_home_dir(&self, path: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = path.as_ref();
        let Some(text) = path.to_str() else {
            return Ok(path.to_path_buf());
        };

        if text == "~" {
            return self.home();
        }
        match text.strip_prefix("~/").or_else(|| text.strip_prefix("~\\")) {
            Some(rest) => Ok(self.home()?.join(rest)),
            None if text.starts_with('~') => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot expand user-specific home dir",
            )),
            None => Ok(path.to_path_buf()),
        }
    }

    pub fn read_to_string(&self, path: impl AsRef<Path>) -> io::Result<String> {
        std::fs::read_to_string(self.expand_home_dir(path)?)
    }

    /// Create the file and its parent directories unless it already exists
    pub fn create_file(&self, path: &Path) -> io::Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::File::create(path)?;
        Ok(())
    }

    /// Open the file with the configured OS handler
    pub fn open_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = self.expand_home_dir(path)?;
        std::process::Command::new(&self.open_file_util)
            .arg(&path)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigils() {
        let formatter = Formatter::new(&AppConfig::default());
        assert_eq!(formatter.sigil_str(1, 0), "");
        assert_eq!(formatter.sigil_str(4, 1), "*_**");
        assert_eq!(formatter.sigil_str(3, 2), "**_");
        // Out-of-range position is clamped
        assert_eq!(formatter.sigil_str(2, 9), "*_");
    }

    #[test]
    fn test_center_and_pad() {
        let formatter = Formatter::new(&AppConfig::default());
        assert_eq!(formatter.center_text("ab", 6), "  ab  ");
        assert_eq!(formatter.pad_row(3, 5), "  ");
        assert_eq!(formatter.pad_row(7, 5), "");
    }

    #[test]
    fn test_row_colors_alternate() {
        let formatter = Formatter::new(&AppConfig::default());
        assert_eq!(formatter.row_color(0), Color::LightBlue);
        assert_eq!(formatter.row_color(1), Color::White);
        assert_eq!(formatter.row_color(2), Color::LightBlue);
    }

    #[test]
    fn test_panel_formatter_uses_panel_colors() {
        let mut config = PanelConfig::default();
        config.colors.rows.even = "green".into();
        config.paging.selected_sigil = "o".to_string();

        let formatter = Formatter::for_panel(&config);
        assert_eq!(formatter.row_color(0), Color::Green);
        assert_eq!(formatter.sigil_str(2, 0), "o*");
    }

    #[test]
    fn test_expand_home_dir() {
        let fs = FileSystem::default();
        assert_eq!(
            fs.expand_home_dir("/etc/hosts").unwrap(),
            PathBuf::from("/etc/hosts")
        );
        assert!(fs.expand_home_dir("~someone/x").is_err());

        if let Some(home) = dirs::home_dir() {
            assert_eq!(fs.expand_home_dir("~/a/b").unwrap(), home.join("a/b"));
        }
    }

    #[test]
    fn test_create_file_makes_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.txt");
        let fs = FileSystem::default();

        fs.create_file(&path).unwrap();
        assert!(path.exists());
        // Second call leaves it alone
        std::fs::write(&path, "keep").unwrap();
        fs.create_file(&path).unwrap();
        assert_eq!(fs.read_to_string(&path).unwrap(), "keep");
    }
}
