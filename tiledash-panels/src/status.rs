// tiledash-panels/src/status.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use tiledash_core::{AppContext, Panel, PanelBase, PanelConfig, PanelConfigSource, PanelError};

const ICONS: [&str; 4] = ["|", "/", "-", "\\"];

/// Spinner that advances on every refresh, showing the dashboard is alive
pub struct StatusPanel {
    base: PanelBase,
    frame: AtomicUsize,
}

impl StatusPanel {
    pub fn new(source: &PanelConfigSource<'_>, ctx: &AppContext) -> Result<Self, PanelError> {
        let config: PanelConfig = source.decode()?;

        Ok(Self {
            base: PanelBase::new("Status", &config, false, ctx),
            frame: AtomicUsize::new(0),
        })
    }

    fn next_icon(&self) -> &'static str {
        let frame = self.frame.fetch_add(1, Ordering::Relaxed);
        ICONS[frame % ICONS.len()]
    }
}

impl Panel for StatusPanel {
    fn base(&self) -> &PanelBase {
        &self.base
    }

    fn refresh(&self) {
        self.base.surface().set_text(self.next_icon());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    #[test]
    fn test_spinner_cycles() {
        let panel = Fixture::new("[[widgets]]\ntype = \"status\"\nenabled = true\n")
            .build(StatusPanel::new)
            .unwrap();

        let frames: Vec<String> = (0..5)
            .map(|_| {
                panel.refresh();
                panel.surface().content()
            })
            .collect();
        assert_eq!(frames, ["|", "/", "-", "\\", "|"]);
        assert!(!panel.focusable());
        assert_eq!(panel.title(), "Status");
    }
}
