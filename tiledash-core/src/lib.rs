pub mod app;
pub mod colors;
pub mod config;
pub mod context;
pub mod display;
pub mod focus;
pub mod grid;
pub mod logging;
pub mod overlay;
pub mod pager;
pub mod panel;
pub mod panel_set;
pub mod position;
pub mod registry;
pub mod sample;
pub mod scheduler;
pub mod signal;
pub mod surface;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{App, AppError};
pub use config::{AppConfig, Config, ConfigError, ConfigLoader, PanelConfig, PanelConfigSource};
pub use context::{AppContext, FileSystem, Formatter};
pub use display::{Display, FocusHost, InputFocus};
pub use focus::{FocusState, FocusTracker};
pub use grid::{Grid, Track, split_size};
pub use overlay::Overlays;
pub use pager::MultiSource;
pub use panel::{EventResult, Panel, PanelBase, PanelError};
pub use panel_set::ActivePanelSet;
pub use position::Position;
pub use registry::{PanelFactory, PanelRegistry, RegistryError};
pub use scheduler::RefreshScheduler;
pub use signal::{Signal, SignalSender};
pub use surface::{Surface, SurfaceId};
