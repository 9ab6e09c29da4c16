pub mod clocks;
pub mod common;
pub mod git;
pub mod logger;
pub mod security;
pub mod status;
pub mod system;
pub mod textfile;

#[cfg(test)]
pub(crate) mod testing;

pub use clocks::{Clock, ClockSort, ClocksPanel, Zone};
pub use git::{CommitInfo, GitPanel, GitStatus};
pub use logger::{LogLine, LoggerPanel};
pub use security::{SecurityData, SecurityPanel};
pub use status::StatusPanel;
pub use system::SystemPanel;
pub use textfile::TextfilePanel;

use tiledash_core::{PanelRegistry, register_panel};

/// Register every built-in panel type under the name used in `type = "..."`
pub fn register_all(registry: &mut PanelRegistry) {
    register_panel!(registry, "clocks", ClocksPanel);
    register_panel!(registry, "git", GitPanel);
    register_panel!(registry, "logger", LoggerPanel);
    register_panel!(registry, "security", SecurityPanel);
    register_panel!(registry, "status", StatusPanel);
    register_panel!(registry, "system", SystemPanel);
    register_panel!(registry, "textfile", TextfilePanel);
}
