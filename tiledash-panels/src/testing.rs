// tiledash-panels/src/testing.rs
//! Helpers for constructing panels from inline config documents.

use std::path::Path;
use std::sync::Arc;
use tiledash_core::config::parse;
use tiledash_core::{
    AppContext, Config, FocusHost, Overlays, PanelConfigSource, PanelError, signal,
};

/// Parsed document plus a context built from its `[app]` table
pub struct Fixture {
    pub config: Config,
    pub ctx: AppContext,
}

impl Fixture {
    pub fn new(doc: &str) -> Self {
        Self::in_dir(doc, &std::env::temp_dir())
    }

    pub fn in_dir(doc: &str, app_dir: &Path) -> Self {
        let config = parse(doc).unwrap();
        let (tx, _rx) = signal::channel();
        let overlays = Overlays::new(FocusHost::default(), tx.clone());
        let ctx = AppContext::new(app_dir, Arc::new(config.app.clone()), tx, overlays);
        Self { config, ctx }
    }

    /// Build the first widget block with `new`
    pub fn build<T>(
        &self,
        new: impl FnOnce(&PanelConfigSource<'_>, &AppContext) -> Result<T, PanelError>,
    ) -> Result<T, PanelError> {
        let source = PanelConfigSource::new(&self.config.widgets[0], &self.ctx.config);
        new(&source, &self.ctx)
    }
}
