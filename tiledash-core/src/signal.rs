// tiledash-core/src/signal.rs
use crossbeam::channel::{Receiver, Sender, unbounded};

/// Requests delivered from background threads to the UI loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A render surface changed and the screen should be redrawn
    Repaint,
    /// The config file was written and the panel set must be rebuilt
    ConfigChanged,
}

/// Cloneable producer half of the application's signal channel.
///
/// Background work never touches UI state directly: it sends a signal and
/// the UI loop, the single consumer, acts on it.
#[derive(Debug, Clone)]
pub struct SignalSender(Sender<Signal>);

impl SignalSender {
    pub fn send(&self, signal: Signal) {
        // Ignore send errors (the UI loop is gone)
        let _ = self.0.send(signal);
    }

    pub fn repaint(&self) {
        self.send(Signal::Repaint);
    }

    pub fn config_changed(&self) {
        self.send(Signal::ConfigChanged);
    }
}

/// Create the signal channel. The receiver belongs to the UI loop.
pub fn channel() -> (SignalSender, Receiver<Signal>) {
    let (tx, rx) = unbounded();
    (SignalSender(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals_arrive_in_order() {
        let (tx, rx) = channel();
        tx.repaint();
        tx.config_changed();

        assert_eq!(rx.recv().unwrap(), Signal::Repaint);
        assert_eq!(rx.recv().unwrap(), Signal::ConfigChanged);
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (tx, rx) = channel();
        drop(rx);
        tx.repaint(); // must not panic
    }
}
