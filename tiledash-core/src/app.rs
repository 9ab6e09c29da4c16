// tiledash-core/src/app.rs
use crate::config::{AppConfig, ConfigError, ConfigLoader};
use crate::context::AppContext;
use crate::display::{Display, FocusHost};
use crate::focus::{FocusState, FocusTracker};
use crate::overlay::Overlays;
use crate::panel::EventResult;
use crate::panel_set::ActivePanelSet;
use crate::registry::{PanelRegistry, RegistryError};
use crate::scheduler::RefreshScheduler;
use crate::signal::{self, Signal, SignalSender};
use crate::watcher;
use crossbeam::channel::Receiver;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Registry(#[from] RegistryError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

type SizeProbe = Box<dyn Fn() -> io::Result<(u16, u16)>>;

/// Everything derived from one loaded config. Replaced as a whole on reload.
struct Generation {
    config: Arc<AppConfig>,
    panels: ActivePanelSet,
    display: Display,
    focus: FocusTracker,
}

/// Owns the active panel set and wires keyboard input, refresh scheduling
/// and config reloads together.
pub struct App {
    app_dir: PathBuf,
    loader: ConfigLoader,
    registry: PanelRegistry,
    signals: SignalSender,
    receiver: Receiver<Signal>,
    host: FocusHost,
    overlays: Overlays,
    size_probe: SizeProbe,
    scheduler: RefreshScheduler,
    generation: Option<Generation>,
    quit: bool,
}

impl App {
    pub fn new(app_dir: impl Into<PathBuf>, loader: ConfigLoader, registry: PanelRegistry) -> Self {
        let (signals, receiver) = signal::channel();
        let host = FocusHost::default();
        let overlays = Overlays::new(host.clone(), signals.clone());

        Self {
            app_dir: app_dir.into(),
            loader,
            registry,
            signals,
            receiver,
            host,
            overlays,
            size_probe: Box::new(crossterm::terminal::size),
            scheduler: RefreshScheduler::new(),
            generation: None,
            quit: false,
        }
    }

    /// Replace the terminal size query used for even grid splits
    pub fn with_size_probe(mut self, probe: impl Fn() -> io::Result<(u16, u16)> + 'static) -> Self {
        self.size_probe = Box::new(probe);
        self
    }

    /// Count refresh intervals in `unit` instead of seconds
    pub fn with_refresh_unit(mut self, unit: Duration) -> Self {
        self.scheduler = RefreshScheduler::with_unit(unit);
        self
    }

    pub fn signals(&self) -> &SignalSender {
        &self.signals
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn panels(&self) -> Option<&ActivePanelSet> {
        self.generation.as_ref().map(|g| &g.panels)
    }

    pub fn focus(&self) -> Option<&FocusTracker> {
        self.generation.as_ref().map(|g| &g.focus)
    }

    pub fn display(&self) -> Option<&Display> {
        self.generation.as_ref().map(|g| &g.display)
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Tear down the active panel set and build a new one from the config
    /// file.
    ///
    /// Not transactional: once closing has begun there is nothing to roll
    /// back to, so any error leaves the app without panels and must be
    /// treated as fatal.
    pub fn reload(&mut self) -> Result<(), AppError> {
        let config = self.loader.load()?;
        tracing::info!(widgets = config.widgets.len(), "loading panels");

        self.teardown();

        let app_config = Arc::new(config.app);
        let ctx = AppContext::new(
            self.app_dir.clone(),
            app_config.clone(),
            self.signals.clone(),
            self.overlays.clone(),
        );
        let panels = self.registry.build(&config.widgets, &ctx)?;

        self.scheduler.start(&panels);
        let display = Display::new(&panels, &app_config, self.overlays.clone(), &*self.size_probe);
        let mut focus = FocusTracker::new(&panels, &app_config, self.host.clone());
        focus.assign_hotkeys();

        tracing::info!(panels = panels.len(), "panels ready");
        self.generation = Some(Generation {
            config: app_config,
            panels,
            display,
            focus,
        });
        self.signals.repaint();
        Ok(())
    }

    /// Stop refreshing and close every panel of the current generation
    fn teardown(&mut self) {
        self.scheduler.stop();
        self.overlays.dismiss();

        if let Some(generation) = self.generation.take()
            && let Err(e) = generation.panels.close_all()
        {
            tracing::warn!(error = %e, "panels did not close cleanly");
        }
        self.host.reset();
    }

    /// Rebuild the grid, e.g. after the terminal was resized
    pub fn relayout(&mut self) {
        if let Some(generation) = self.generation.as_mut() {
            generation.display = Display::new(
                &generation.panels,
                &generation.config,
                self.overlays.clone(),
                &*self.size_probe,
            );
        }
    }

    /// Global keyboard handling. Keys the app does not claim go to the open
    /// overlay or else to the focused panel.
    pub fn handle_key(&mut self, key: KeyEvent) -> EventResult {
        if key.kind != KeyEventKind::Press {
            return EventResult::Ignored;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => {
                self.quit = true;
                return EventResult::Consumed;
            }
            KeyCode::Char('r') if ctrl => {
                tracing::debug!("manual refresh");
                self.scheduler.manual_refresh();
                return EventResult::Consumed;
            }
            _ => {}
        }

        let Some(generation) = self.generation.as_mut() else {
            return EventResult::Ignored;
        };
        let focus = &mut generation.focus;
        let board_focused = focus.state() == FocusState::BoardFocused;

        match key.code {
            KeyCode::Tab if !board_focused => {
                focus.next();
                return EventResult::Consumed;
            }
            KeyCode::BackTab if !board_focused => {
                focus.prev();
                return EventResult::Consumed;
            }
            KeyCode::Esc if !board_focused => {
                focus.none();
                return EventResult::Consumed;
            }
            KeyCode::Char(c) if !ctrl => {
                if focus.focus_on(&c.to_string()) {
                    return EventResult::Consumed;
                }
            }
            _ => {}
        }

        if self.overlays.is_open() {
            let result = self.overlays.handle_key(key);
            if !self.overlays.is_open() {
                focus.refocus();
            }
            return result;
        }

        match focus.focused_panel() {
            Some(panel) => panel.handle_key(key),
            None => EventResult::Ignored,
        }
    }

    /// Act on everything background threads sent since the last call.
    /// Returns true when the screen needs a redraw.
    pub fn process_signals(&mut self) -> Result<bool, AppError> {
        let mut dirty = false;
        let mut reload = false;
        for signal in self.receiver.try_iter() {
            match signal {
                Signal::Repaint => dirty = true,
                Signal::ConfigChanged => reload = true,
            }
        }

        if reload {
            self.reload()?;
            dirty = true;
        }
        Ok(dirty)
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        if let Some(generation) = &self.generation {
            generation.display.render(area, buf);
        }
    }

    /// Load the panels, take over the terminal and run until Ctrl-C.
    ///
    /// With `watch` set the config file is watched and every write reloads
    /// the dashboard. If the watch cannot be set up the dashboard still
    /// runs, without hot reload.
    pub fn run(&mut self, watch: bool) -> Result<(), AppError> {
        self.reload()?;

        let _watcher = if watch {
            match watcher::watch_config(self.loader.path(), self.signals.clone()) {
                Ok(w) => Some(w),
                Err(e) => {
                    tracing::warn!(error = %e, "could not watch config file, hot reload disabled");
                    None
                }
            }
        } else {
            None
        };

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let result = self.event_loop(&mut terminal);

        let restored = restore_terminal(&mut terminal);
        self.teardown();
        result.and(restored.map_err(AppError::from))
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), AppError> {
        let mut dirty = true;

        loop {
            if dirty {
                terminal.draw(|frame| {
                    let area = frame.area();
                    self.render(area, frame.buffer_mut());
                })?;
                dirty = false;
            }

            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => {
                        self.handle_key(key);
                        dirty = true;
                    }
                    Event::Resize(_, _) => {
                        self.relayout();
                        dirty = true;
                    }
                    _ => {}
                }
            }

            if self.quit {
                return Ok(());
            }

            dirty |= self.process_signals()?;
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
