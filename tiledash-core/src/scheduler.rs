// tiledash-core/src/scheduler.rs
use crate::panel::Panel;
use crate::panel_set::ActivePanelSet;
use crossbeam::channel::{Receiver, Sender, TryRecvError, bounded, select, tick};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A panel plus the lock that keeps its refreshes sequential
#[derive(Clone)]
struct Scheduled {
    panel: Arc<dyn Panel>,
    running: Arc<Mutex<()>>,
}

impl Scheduled {
    fn refresh(&self) {
        let _guard = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        self.panel.refresh();
    }
}

/// Runs one periodic refresh loop per panel.
///
/// Each call to [`RefreshScheduler::start`] begins a new generation. All
/// tasks of a generation share one cancellation token; dropping it ends
/// every task of that generation at its next tick.
pub struct RefreshScheduler {
    unit: Duration,
    panels: Vec<Scheduled>,
    cancel: Option<Sender<()>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::with_unit(Duration::from_secs(1))
    }

    /// Scheduler whose intervals are counted in `unit` instead of seconds
    pub fn with_unit(unit: Duration) -> Self {
        Self {
            unit,
            panels: Vec::new(),
            cancel: None,
            tasks: Vec::new(),
        }
    }

    /// Cancel the running generation (if any) and schedule `panels`.
    ///
    /// Every panel is refreshed right away on its own thread. Panels with a
    /// positive interval keep refreshing on a fixed cadence until they are
    /// disabled or the generation is cancelled.
    pub fn start(&mut self, panels: &ActivePanelSet) {
        self.stop();

        let (cancel_tx, cancel_rx) = bounded::<()>(0);
        self.cancel = Some(cancel_tx);
        self.panels = panels
            .iter()
            .map(|panel| Scheduled {
                panel: panel.clone(),
                running: Arc::new(Mutex::new(())),
            })
            .collect();

        for scheduled in &self.panels {
            let interval = scheduled.panel.refresh_interval();
            let period = (interval > 0).then(|| self.unit * interval.min(u32::MAX as i64) as u32);
            let scheduled = scheduled.clone();
            let cancel = cancel_rx.clone();
            let title = scheduled.panel.title().to_string();

            match thread::Builder::new()
                .name(format!("refresh-{title}"))
                .spawn(move || run_task(scheduled, period, cancel))
            {
                Ok(handle) => self.tasks.push(handle),
                Err(e) => tracing::error!(panel = %title, error = %e, "failed to spawn refresh task"),
            }
        }

        tracing::debug!(panels = self.panels.len(), "refresh schedule started");
    }

    /// Cancel the running generation and wait for its tasks to finish.
    /// Does nothing when nothing is scheduled.
    pub fn stop(&mut self) {
        let Some(cancel) = self.cancel.take() else {
            return;
        };
        drop(cancel);

        for handle in self.tasks.drain(..) {
            if handle.join().is_err() {
                tracing::error!("refresh task panicked");
            }
        }
        self.panels.clear();
        tracing::debug!("refresh schedule cancelled");
    }

    /// Refresh every scheduled panel now, on the calling thread.
    /// Timers keep their phase.
    pub fn manual_refresh(&self) {
        for scheduled in &self.panels {
            scheduled.refresh();
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel.is_some()
    }

    /// Number of refresh tasks that have not exited yet
    pub fn live_tasks(&self) -> usize {
        self.tasks.iter().filter(|h| !h.is_finished()).count()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn cancelled(cancel: &Receiver<()>) -> bool {
    matches!(cancel.try_recv(), Err(TryRecvError::Disconnected))
}

/// Refresh unless the generation is cancelled or the panel was disabled.
/// Returns false when the task should end.
fn tick_once(scheduled: &Scheduled, cancel: &Receiver<()>) -> bool {
    if cancelled(cancel) {
        return false;
    }
    if !scheduled.panel.enabled() {
        tracing::debug!(panel = scheduled.panel.title(), "panel disabled, refresh task ends");
        return false;
    }
    scheduled.refresh();
    true
}

fn run_task(scheduled: Scheduled, period: Option<Duration>, cancel: Receiver<()>) {
    // Started before the first refresh: ticks keep their phase no matter
    // how long each refresh takes
    let ticker = period.map(tick);
    if !tick_once(&scheduled, &cancel) {
        return;
    }
    let Some(ticker) = ticker else {
        return;
    };

    loop {
        select! {
            recv(ticker) -> _ => {
                if !tick_once(&scheduled, &cancel) {
                    return;
                }
            }
            recv(cancel) -> _ => return,
        }
    }
}
