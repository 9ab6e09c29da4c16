// tiledash-core/src/focus.rs
use crate::config::AppConfig;
use crate::display::{FocusHost, InputFocus};
use crate::panel::Panel;
use crate::panel_set::ActivePanelSet;
use crate::surface::SurfaceId;
use std::sync::Arc;

/// Where keyboard focus sits, from the tracker's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    /// No panel has been focused since the tracker was built
    NeverFocused,
    /// A panel holds focus, or focus was cleared with Esc
    ItemFocused,
    /// Something outside the panel grid (a modal) holds focus
    BoardFocused,
}

/// Tracks which focusable panel holds input focus and moves focus between
/// panels.
///
/// The focusable sublist is recomputed on every call, so panels disabled
/// at runtime silently leave the cycle.
pub struct FocusTracker {
    index: Option<usize>,
    panels: Vec<Arc<dyn Panel>>,
    host: FocusHost,
    shortcuts: bool,
    auto_keyed: Vec<SurfaceId>,
}

impl FocusTracker {
    pub fn new(panels: &ActivePanelSet, config: &AppConfig, host: FocusHost) -> Self {
        Self {
            index: None,
            panels: panels.as_slice().to_vec(),
            host,
            shortcuts: config.navigation.shortcuts,
            auto_keyed: Vec::new(),
        }
    }

    fn focusable(&self) -> Vec<Arc<dyn Panel>> {
        self.panels.iter().filter(|p| p.focusable()).cloned().collect()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn state(&self) -> FocusState {
        if self.index.is_none() {
            return FocusState::NeverFocused;
        }

        match self.host.current() {
            InputFocus::Overlay => FocusState::BoardFocused,
            InputFocus::Surface(id) if !self.panels.iter().any(|p| p.surface().id() == id) => {
                FocusState::BoardFocused
            }
            _ => FocusState::ItemFocused,
        }
    }

    fn board_focused(&self) -> bool {
        self.state() == FocusState::BoardFocused
    }

    /// Give the first nine focusable panels without a configured key the
    /// keys "1" to "9", in construction order. Later panels are reachable
    /// through next/prev only.
    pub fn assign_hotkeys(&mut self) {
        if !self.shortcuts {
            return;
        }

        let mut number = 1;
        for panel in self.focusable() {
            if number > 9 {
                break;
            }

            let id = panel.surface().id();
            let configured = panel.focus_key().is_some() && !self.auto_keyed.contains(&id);
            if configured {
                continue;
            }

            tracing::debug!(panel = panel.title(), key = number, "assigning focus key");
            panel.set_focus_key(&number.to_string());
            if !self.auto_keyed.contains(&id) {
                self.auto_keyed.push(id);
            }
            number += 1;
        }
    }

    /// Focus the panel bound to `key`. Returns true if one matched.
    pub fn focus_on(&mut self, key: &str) -> bool {
        if !self.shortcuts || self.board_focused() {
            return false;
        }

        let Some(idx) = self
            .focusable()
            .iter()
            .position(|p| p.focus_key().as_deref() == Some(key))
        else {
            return false;
        };

        self.blur(self.index);
        self.index = Some(idx);
        self.focus(self.index);
        true
    }

    pub fn next(&mut self) {
        if self.board_focused() {
            return;
        }
        let len = self.focusable().len();
        if len == 0 {
            return;
        }

        self.blur(self.index);
        self.index = Some(match self.index {
            Some(i) => (i + 1) % len,
            None => 0,
        });
        self.focus(self.index);
    }

    pub fn prev(&mut self) {
        if self.board_focused() {
            return;
        }
        let len = self.focusable().len();
        if len == 0 {
            return;
        }

        self.blur(self.index);
        self.index = Some(match self.index {
            Some(i) if i > 0 && i <= len => i - 1,
            _ => len - 1,
        });
        self.focus(self.index);
    }

    /// Clear focus but remember the index for [`FocusTracker::refocus`]
    pub fn none(&mut self) {
        if self.board_focused() {
            return;
        }
        self.blur(self.index);
    }

    /// Focus the recorded index again without moving it
    pub fn refocus(&self) {
        self.focus(self.index);
    }

    /// Panel currently holding input focus
    pub fn focused_panel(&self) -> Option<Arc<dyn Panel>> {
        let InputFocus::Surface(id) = self.host.current() else {
            return None;
        };
        self.panels.iter().find(|p| p.surface().id() == id).cloned()
    }

    fn at(&self, idx: Option<usize>) -> Option<Arc<dyn Panel>> {
        idx.and_then(|i| self.focusable().get(i).cloned())
    }

    fn blur(&self, idx: Option<usize>) {
        let Some(panel) = self.at(idx) else {
            return;
        };
        let surface = panel.surface();
        self.host.blur(surface.id());
        surface.set_border_color(panel.border_color());
    }

    fn focus(&self, idx: Option<usize>) {
        let Some(panel) = self.at(idx) else {
            return;
        };
        let surface = panel.surface();
        surface.set_border_color(panel.base().focused_border_color());
        self.host.set_focus(surface.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::Overlays;
    use crate::signal;
    use crate::testing::{ProbePanel, context, panel_config};
    use ratatui::style::Color;

    struct Fixture {
        probes: Vec<Arc<ProbePanel>>,
        host: FocusHost,
        tracker: FocusTracker,
    }

    /// `panels` holds (focusable, explicit key) per panel
    fn fixture_with(panels: &[(bool, Option<&str>)], config: &AppConfig) -> Fixture {
        let ctx = context();
        let probes: Vec<_> = panels
            .iter()
            .enumerate()
            .map(|(i, (focusable, key))| {
                let mut config = panel_config(&format!("p{i}"), 0);
                config.focus_key = key.map(str::to_string);
                Arc::new(ProbePanel::new(&config, *focusable, &ctx))
            })
            .collect();
        let set: ActivePanelSet = probes.iter().map(|p| p.clone() as Arc<dyn Panel>).collect();
        let host = FocusHost::default();
        let mut tracker = FocusTracker::new(&set, config, host.clone());
        tracker.assign_hotkeys();
        Fixture {
            probes,
            host,
            tracker,
        }
    }

    fn fixture(count: usize) -> Fixture {
        fixture_with(&vec![(true, None); count], &AppConfig::default())
    }

    fn focused(f: &Fixture) -> Option<String> {
        f.tracker.focused_panel().map(|p| p.title().to_string())
    }

    #[test]
    fn test_starts_never_focused() {
        let f = fixture(3);
        assert_eq!(f.tracker.state(), FocusState::NeverFocused);
        assert_eq!(f.tracker.index(), None);
        assert_eq!(focused(&f), None);
    }

    #[test]
    fn test_next_wraps_around() {
        let mut f = fixture(3);
        f.tracker.next();
        assert_eq!(focused(&f).as_deref(), Some("p0"));
        f.tracker.next();
        f.tracker.next();
        assert_eq!(focused(&f).as_deref(), Some("p2"));
        f.tracker.next();
        assert_eq!(focused(&f).as_deref(), Some("p0"));
        assert_eq!(f.tracker.state(), FocusState::ItemFocused);
    }

    #[test]
    fn test_prev_undoes_next() {
        for count in 1..6 {
            let mut f = fixture(count);
            for start in 0..count {
                f.tracker.focus_on(&(start + 1).to_string());
                f.tracker.next();
                f.tracker.prev();
                assert_eq!(f.tracker.index(), Some(start), "count {count}");
            }
        }
    }

    #[test]
    fn test_prev_from_never_focused_goes_to_last() {
        let mut f = fixture(3);
        f.tracker.prev();
        assert_eq!(focused(&f).as_deref(), Some("p2"));
    }

    #[test]
    fn test_no_focusable_panels_is_noop() {
        let mut f = fixture_with(&[(false, None), (false, None)], &AppConfig::default());
        f.tracker.next();
        f.tracker.prev();
        f.tracker.none();
        f.tracker.refocus();
        assert_eq!(f.tracker.index(), None);
        assert_eq!(f.host.current(), InputFocus::Nothing);
    }

    #[test]
    fn test_focus_moves_border_colors() {
        let mut f = fixture(2);
        f.tracker.next();
        assert_eq!(f.probes[0].surface().border_color(), Color::Gray);
        f.tracker.next();
        assert_eq!(f.probes[0].surface().border_color(), Color::Red);
        assert_eq!(f.probes[1].surface().border_color(), Color::Gray);
    }

    #[test]
    fn test_hotkeys_are_numbered_in_order() {
        let f = fixture_with(
            &[(true, None), (false, None), (true, None), (true, None)],
            &AppConfig::default(),
        );
        let keys: Vec<_> = f.probes.iter().map(|p| p.focus_key()).collect();
        assert_eq!(
            keys,
            [Some("1".to_string()), None, Some("2".to_string()), Some("3".to_string())]
        );
    }

    #[test]
    fn test_hotkeys_capped_at_nine() {
        let mut f = fixture(11);
        assert_eq!(f.probes[8].focus_key().as_deref(), Some("9"));
        assert_eq!(f.probes[9].focus_key(), None);
        assert_eq!(f.probes[10].focus_key(), None);

        // Still reachable by cycling
        f.tracker.prev();
        assert_eq!(focused(&f).as_deref(), Some("p10"));
    }

    #[test]
    fn test_hotkeys_are_idempotent() {
        let mut f = fixture(11);
        let before: Vec<_> = f.probes.iter().map(|p| p.focus_key()).collect();
        f.tracker.assign_hotkeys();
        let after: Vec<_> = f.probes.iter().map(|p| p.focus_key()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_configured_keys_are_kept() {
        let f = fixture_with(
            &[(true, Some("g")), (true, None), (true, None)],
            &AppConfig::default(),
        );
        assert_eq!(f.probes[0].focus_key().as_deref(), Some("g"));
        assert_eq!(f.probes[1].focus_key().as_deref(), Some("1"));
        assert_eq!(f.probes[2].focus_key().as_deref(), Some("2"));
    }

    #[test]
    fn test_hotkeys_disabled_by_config() {
        let mut config = AppConfig::default();
        config.navigation.shortcuts = false;
        let mut f = fixture_with(&[(true, None), (true, Some("x"))], &config);

        assert_eq!(f.probes[0].focus_key(), None);
        assert!(!f.tracker.focus_on("x"));
        assert_eq!(f.tracker.index(), None);
    }

    #[test]
    fn test_focus_on() {
        let mut f = fixture(3);
        assert!(f.tracker.focus_on("2"));
        assert_eq!(focused(&f).as_deref(), Some("p1"));

        assert!(!f.tracker.focus_on("7"));
        assert_eq!(focused(&f).as_deref(), Some("p1"));
    }

    #[test]
    fn test_disabled_panel_leaves_cycle() {
        let mut f = fixture(3);
        f.probes[1].base().set_enabled(false);

        f.tracker.next();
        f.tracker.next();
        assert_eq!(focused(&f).as_deref(), Some("p2"));
        f.tracker.next();
        assert_eq!(focused(&f).as_deref(), Some("p0"));
    }

    #[test]
    fn test_none_then_refocus() {
        let mut f = fixture(2);
        f.tracker.focus_on("2");
        f.tracker.none();
        assert_eq!(focused(&f), None);
        assert_eq!(f.tracker.index(), Some(1));
        assert_eq!(f.probes[1].surface().border_color(), Color::Red);

        f.tracker.refocus();
        assert_eq!(focused(&f).as_deref(), Some("p1"));

        // Cycling keeps working after Esc
        f.tracker.none();
        f.tracker.next();
        assert_eq!(focused(&f).as_deref(), Some("p0"));
    }

    #[test]
    fn test_board_focused_blocks_navigation() {
        let mut f = fixture(3);
        f.tracker.next();

        let overlays = Overlays::new(f.host.clone(), signal::channel().0);
        overlays.show_help("Help", "text");
        assert_eq!(f.tracker.state(), FocusState::BoardFocused);

        f.tracker.next();
        f.tracker.prev();
        f.tracker.none();
        assert!(!f.tracker.focus_on("3"));
        assert_eq!(f.tracker.index(), Some(0));

        overlays.dismiss();
        assert_eq!(f.tracker.state(), FocusState::ItemFocused);
        f.tracker.next();
        assert_eq!(focused(&f).as_deref(), Some("p1"));
    }
}
