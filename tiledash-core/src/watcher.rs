// tiledash-core/src/watcher.rs
use crate::signal::SignalSender;
use crossbeam::channel::{Receiver, RecvTimeoutError, unbounded};
use notify::event::ModifyKind;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Quiet period that ends a burst of file events
pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// Live watch on a single file. Watching stops when this is dropped.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher").finish_non_exhaustive()
    }
}

/// Call `on_change` after `path` is written or recreated.
///
/// Events are debounced: a burst of writes yields one call, made on a
/// background thread once the file has been quiet for [`DEBOUNCE`].
pub fn watch_file(
    path: &Path,
    on_change: impl Fn() + Send + 'static,
) -> Result<FileWatcher, notify::Error> {
    let (tx, rx) = unbounded::<()>();
    let name: Option<OsString> = path.file_name().map(|n| n.to_os_string());

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(ev) => {
                let ours = ev.paths.iter().any(|p| p.file_name() == name.as_deref());
                if ours && is_write(&ev.kind) {
                    let _ = tx.send(());
                }
            }
            Err(e) => tracing::error!("watch error: {e:?}"),
        },
        Config::default(),
    )?;

    // Editors often replace the file instead of writing it in place, so
    // watch the directory and filter by name
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    thread::Builder::new()
        .name("file-watch".to_string())
        .spawn(move || debounce(rx, on_change))
        .map_err(notify::Error::io)?;

    tracing::debug!(path = %path.display(), "watching file");
    Ok(FileWatcher { _watcher: watcher })
}

/// Content writes, creation, and a file renamed into place. Metadata-only
/// changes (chmod, touch) are not writes.
fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    )
}

/// Watch the config file and ask the UI loop to reload when it changes
pub fn watch_config(path: &Path, signals: SignalSender) -> Result<FileWatcher, notify::Error> {
    watch_file(path, move || {
        tracing::info!("config file changed");
        signals.config_changed();
    })
}

fn debounce(events: Receiver<()>, on_change: impl Fn()) {
    // Ends once the watcher, and with it the sender, is dropped
    while events.recv().is_ok() {
        loop {
            match events.recv_timeout(DEBOUNCE) {
                Ok(()) => continue,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
        on_change();
    }
}
