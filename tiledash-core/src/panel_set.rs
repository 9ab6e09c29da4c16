// tiledash-core/src/panel_set.rs
use crate::panel::{Panel, PanelError};
use std::sync::Arc;

/// Ordered collection of the live panels of one config generation.
/// Order is construction order, which drives hotkeys, focus order and
/// drawing order.
#[derive(Clone, Default)]
pub struct ActivePanelSet {
    items: Vec<Arc<dyn Panel>>,
}

impl ActivePanelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, panel: Arc<dyn Panel>) {
        self.items.push(panel);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Panel>> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Arc<dyn Panel>] {
        &self.items
    }

    pub fn enabled(&self) -> Vec<Arc<dyn Panel>> {
        self.items.iter().filter(|p| p.enabled()).cloned().collect()
    }

    /// Close every panel. A failing panel does not stop the others from
    /// being closed; the last error is returned.
    pub fn close_all(&self) -> Result<(), PanelError> {
        let mut result = Ok(());
        for panel in &self.items {
            if let Err(e) = panel.close() {
                tracing::warn!(panel = panel.title(), error = %e, "failed to close panel");
                result = Err(e);
            }
        }
        result
    }
}

impl FromIterator<Arc<dyn Panel>> for ActivePanelSet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Panel>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
