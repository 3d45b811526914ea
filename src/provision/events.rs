//! Progress events emitted while the shell is installed.

use camino::Utf8PathBuf;
use tokio::sync::mpsc::UnboundedSender;

/// Lifecycle event reported by [`crate::ShellProvisioner`].
///
/// An install reports `InstallStart` first and `InstallEnd` last. Download
/// events only appear when the archive has to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionEvent {
    /// Installation into `target` has begun.
    InstallStart {
        /// Directory receiving the executable.
        target: Utf8PathBuf,
    },
    /// The archive download has begun.
    DownloadStart {
        /// Location being fetched.
        url: String,
        /// Announced archive size, when the server sends one.
        total_bytes: Option<u64>,
    },
    /// The download crossed a new whole percentage.
    DownloadProgress {
        /// Completion in the range `0..=100`.
        percent: u8,
    },
    /// The archive has been written to disk.
    DownloadEnd {
        /// Location of the downloaded archive.
        archive: Utf8PathBuf,
    },
    /// Installation finished.
    InstallEnd {
        /// Path of the executable, or `None` when extraction left it missing.
        binary: Option<Utf8PathBuf>,
    },
}

/// Receives [`ProvisionEvent`]s from a provisioning call.
pub trait ProgressObserver: Send + Sync {
    /// Handles a single event.
    fn on_event(&self, event: &ProvisionEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProvisionEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProvisionEvent) {
        self(event);
    }
}

impl ProgressObserver for UnboundedSender<ProvisionEvent> {
    fn on_event(&self, event: &ProvisionEvent) {
        // A dropped receiver only means nobody is listening any more.
        drop(self.send(event.clone()));
    }
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_event(&self, _event: &ProvisionEvent) {}
}

/// Converts byte counts into whole percentages, reporting each value once.
#[derive(Debug)]
pub(crate) struct PercentTracker {
    total: Option<u64>,
    received: u64,
    last: Option<u8>,
}

impl PercentTracker {
    pub(crate) const fn new(total: Option<u64>) -> Self {
        Self {
            total,
            received: 0,
            last: None,
        }
    }

    /// Records `len` more bytes and returns the new percentage when it changed.
    pub(crate) fn advance(&mut self, len: u64) -> Option<u8> {
        self.received = self.received.saturating_add(len);
        let total = self.total.filter(|total| *total > 0)?;
        let scaled = self
            .received
            .min(total)
            .saturating_mul(100)
            .checked_div(total)?;
        let percent = u8::try_from(scaled).unwrap_or(100);
        if self.last.is_some_and(|last| last >= percent) {
            return None;
        }
        self.last = Some(percent);
        Some(percent)
    }

    /// Returns the final `100` if it was never reported.
    pub(crate) fn finish(&mut self) -> Option<u8> {
        if self.last == Some(100) {
            return None;
        }
        self.last = Some(100);
        Some(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn tracker_reports_each_percentage_once() {
        let mut tracker = PercentTracker::new(Some(200));
        assert_eq!(tracker.advance(1), Some(0));
        assert_eq!(tracker.advance(0), None);
        assert_eq!(tracker.advance(99), Some(50));
        assert_eq!(tracker.advance(100), Some(100));
        assert_eq!(tracker.finish(), None);
    }

    #[test]
    fn tracker_without_total_only_reports_completion() {
        let mut tracker = PercentTracker::new(None);
        assert_eq!(tracker.advance(4096), None);
        assert_eq!(tracker.finish(), Some(100));
    }

    #[test]
    fn tracker_clamps_overshoot() {
        let mut tracker = PercentTracker::new(Some(10));
        assert_eq!(tracker.advance(25), Some(100));
    }

    #[test]
    fn closures_observe_events() {
        let seen = Mutex::new(Vec::new());
        let observer = |event: &ProvisionEvent| {
            seen.lock().expect("lock").push(event.clone());
        };
        observer.on_event(&ProvisionEvent::DownloadProgress { percent: 5 });
        assert_eq!(
            seen.into_inner().expect("lock"),
            vec![ProvisionEvent::DownloadProgress { percent: 5 }]
        );
    }

    #[test]
    fn channel_observer_tolerates_closed_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        tx.on_event(&ProvisionEvent::DownloadProgress { percent: 1 });
    }
}
