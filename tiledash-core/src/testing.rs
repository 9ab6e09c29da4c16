// tiledash-core/src/testing.rs
//! Test doubles shared by the unit tests of this crate.

use crate::config::{AppConfig, PanelConfig};
use crate::context::AppContext;
use crate::display::FocusHost;
use crate::overlay::Overlays;
use crate::panel::{EventResult, Panel, PanelBase, PanelError};
use crate::registry::PanelFactory;
use crate::signal;
use crossterm::event::KeyEvent;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub fn context() -> AppContext {
    context_with(AppConfig::default())
}

pub fn context_with(config: AppConfig) -> AppContext {
    let (tx, _rx) = signal::channel();
    let overlays = Overlays::new(FocusHost::default(), tx.clone());
    AppContext::new(std::env::temp_dir(), Arc::new(config), tx, overlays)
}

pub fn panel_config(kind: &str, refresh_interval: i64) -> PanelConfig {
    PanelConfig {
        kind: kind.to_string(),
        refresh_interval,
        ..PanelConfig::default()
    }
}

#[derive(Deserialize)]
struct ProbeConfig {
    #[serde(flatten)]
    base: PanelConfig,
    #[serde(default = "default_true")]
    focusable: bool,
    #[serde(default)]
    delay_ms: u64,
}

fn default_true() -> bool {
    true
}

/// Panel that records every call made to it
pub struct ProbePanel {
    base: PanelBase,
    delay: Duration,
    refreshes: Mutex<Vec<Instant>>,
    closes: AtomicUsize,
    keys: Mutex<Vec<KeyEvent>>,
}

impl ProbePanel {
    pub fn new(config: &PanelConfig, focusable: bool, ctx: &AppContext) -> Self {
        Self {
            base: PanelBase::new(&config.kind, config, focusable, ctx),
            delay: Duration::ZERO,
            refreshes: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shorthand for a focusable probe with the given interval
    pub fn build(kind: &str, interval: i64, focusable: bool) -> Arc<ProbePanel> {
        Arc::new(Self::new(&panel_config(kind, interval), focusable, &context()))
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.lock().unwrap().len()
    }

    pub fn refresh_times(&self) -> Vec<Instant> {
        self.refreshes.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<KeyEvent> {
        self.keys.lock().unwrap().clone()
    }
}

impl Panel for ProbePanel {
    fn base(&self) -> &PanelBase {
        &self.base
    }

    fn refresh(&self) {
        self.refreshes.lock().unwrap().push(Instant::now());
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let count = self.refresh_count();
        self.base.surface().set_text(format!("refreshed {count}"));
    }

    fn handle_key(&self, key: KeyEvent) -> EventResult {
        self.keys.lock().unwrap().push(key);
        EventResult::Consumed
    }

    fn close(&self) -> Result<(), PanelError> {
        let n = self.closes.fetch_add(1, Ordering::SeqCst);
        if self.base.kind() == "fails-close" && n == 0 {
            return Err(PanelError::Other("close failed".to_string()));
        }
        Ok(())
    }
}

/// Factory building probes; every instance is also pushed into `built`
pub fn probe_factory(built: Arc<Mutex<Vec<Arc<ProbePanel>>>>) -> PanelFactory {
    Box::new(move |source, ctx| {
        let config: ProbeConfig = source.decode()?;
        let panel = Arc::new(
            ProbePanel::new(&config.base, config.focusable, ctx)
                .with_delay(Duration::from_millis(config.delay_ms)),
        );
        built.lock().unwrap().push(panel.clone());
        Ok(panel as Arc<dyn Panel>)
    })
}
