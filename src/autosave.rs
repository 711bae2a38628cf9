//! Debounced background persistence for form state.
//!
//! A controller owns one worker task and one persist closure. Snapshots of
//! form state are pushed on every edit; the worker restarts a countdown on
//! each snapshot and persists only the latest one once the countdown runs
//! out. Persists are serialized through the worker, so two saves for the
//! same record can never race an insert-vs-update decision.

use std::cell::Cell;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::error;

/// Save state exposed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl SaveStatus {
    pub fn indicator(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved",
            SaveStatus::Error => "Save failed",
        }
    }
}

/// Published save state: the current status plus the sequence number of
/// the last snapshot whose persist attempt has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct SaveState {
    status: SaveStatus,
    acked: u64,
}

enum Command<T> {
    Update(u64, T),
    Flush,
}

/// Debounced persister for one editable record.
///
/// Dropping the controller cancels any pending countdown; a snapshot that
/// was still waiting out its debounce is discarded, never written.
pub struct AutosaveController<T> {
    tx: mpsc::UnboundedSender<Command<T>>,
    status_rx: watch::Receiver<SaveState>,
    sent: Cell<u64>,
}

impl<T: Send + 'static> AutosaveController<T> {
    /// Spawn the worker. `persist` runs on the worker task, at most one
    /// call in flight at a time.
    pub fn new<F>(debounce: Duration, persist: F) -> Self
    where
        F: FnMut(T) -> anyhow::Result<()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SaveState::default());
        tokio::spawn(worker(rx, status_tx, debounce, persist));
        Self {
            tx,
            status_rx,
            sent: Cell::new(0),
        }
    }

    /// Record a new snapshot of the form state, restarting the countdown.
    pub fn update(&self, snapshot: T) {
        let seq = self.sent.get() + 1;
        self.sent.set(seq);
        let _ = self.tx.send(Command::Update(seq, snapshot));
    }

    /// Persist any pending snapshot immediately, skipping the countdown.
    pub fn flush(&self) {
        let _ = self.tx.send(Command::Flush);
    }

    pub fn status(&self) -> SaveStatus {
        self.status_rx.borrow().status
    }

    /// Whether the persist attempt covering the latest snapshot has
    /// finished. A `Saved` left over from an earlier cycle does not count
    /// while a newer snapshot is still queued or in flight.
    pub fn settled(&self) -> bool {
        let state = *self.status_rx.borrow();
        state.acked >= self.sent.get()
            && matches!(state.status, SaveStatus::Saved | SaveStatus::Error)
    }
}

async fn worker<T, F>(
    mut rx: mpsc::UnboundedReceiver<Command<T>>,
    status_tx: watch::Sender<SaveState>,
    debounce: Duration,
    mut persist: F,
) where
    F: FnMut(T) -> anyhow::Result<()>,
{
    let mut pending: Option<(u64, T)> = None;
    let mut acked = 0u64;

    loop {
        let command = if pending.is_some() {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(cmd) => Some(cmd),
                    // Controller dropped: cancel the pending write
                    None => return,
                },
                () = tokio::time::sleep(debounce) => None,
            }
        } else {
            match rx.recv().await {
                Some(cmd) => Some(cmd),
                None => return,
            }
        };

        match command {
            Some(Command::Update(seq, snapshot)) => {
                pending = Some((seq, snapshot));
                let _ = status_tx.send(SaveState { status: SaveStatus::Idle, acked });
            }
            Some(Command::Flush) | None => {
                if let Some((seq, snapshot)) = pending.take() {
                    let _ = status_tx.send(SaveState { status: SaveStatus::Saving, acked });
                    let status = match persist(snapshot) {
                        Ok(()) => SaveStatus::Saved,
                        Err(e) => {
                            error!("autosave persist failed: {:#}", e);
                            SaveStatus::Error
                        }
                    };
                    acked = seq;
                    let _ = status_tx.send(SaveState { status, acked });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(String) -> anyhow::Result<()>) {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let sink = saved.clone();
        let persist = move |snapshot: String| {
            sink.lock().unwrap().push(snapshot);
            Ok(())
        };
        (saved, persist)
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_persist_once_with_latest() {
        let (saved, persist) = recorder();
        let ctl = AutosaveController::new(Duration::from_millis(500), persist);

        for i in 0..5 {
            ctl.update(format!("edit-{}", i));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(saved.lock().unwrap().as_slice(), ["edit-4"]);
        assert_eq!(ctl.status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_quiet_periods_persist_separately() {
        let (saved, persist) = recorder();
        let ctl = AutosaveController::new(Duration::from_millis(200), persist);

        ctl.update("first".to_string());
        tokio::time::sleep(Duration::from_millis(300)).await;
        ctl.update("second".to_string());
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(saved.lock().unwrap().as_slice(), ["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persist_failure_sets_error_status() {
        let calls = Arc::new(Mutex::new(0usize));
        let counter = calls.clone();
        let ctl = AutosaveController::new(Duration::from_millis(100), move |_: String| {
            let mut n = counter.lock().unwrap();
            *n += 1;
            if *n == 1 {
                anyhow::bail!("disk full");
            }
            Ok(())
        });

        ctl.update("doomed".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ctl.status(), SaveStatus::Error);

        // Next edit restarts the cycle and recovers
        ctl.update("retry".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ctl.status(), SaveStatus::Saved);
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_write() {
        let (saved, persist) = recorder();
        let ctl = AutosaveController::new(Duration::from_millis(500), persist);

        ctl.update("never-written".to_string());
        drop(ctl);
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert!(saved.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_persists_without_waiting() {
        let (saved, persist) = recorder();
        let ctl = AutosaveController::new(Duration::from_secs(60), persist);

        ctl.update("now".to_string());
        ctl.flush();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(saved.lock().unwrap().as_slice(), ["now"]);
        assert_eq!(ctl.status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_only_after_final_snapshot_persists() {
        let (saved, persist) = recorder();
        let ctl = AutosaveController::new(Duration::from_millis(100), persist);

        ctl.update("a".to_string());
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(ctl.settled());

        // The Saved left over from "a" must not count for "b"
        ctl.update("b".to_string());
        assert!(!ctl.settled());

        ctl.flush();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(ctl.settled());
        assert_eq!(saved.lock().unwrap().as_slice(), ["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_returns_to_idle_on_new_edit() {
        let (_saved, persist) = recorder();
        let ctl = AutosaveController::new(Duration::from_millis(100), persist);

        ctl.update("a".to_string());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ctl.status(), SaveStatus::Saved);

        ctl.update("b".to_string());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ctl.status(), SaveStatus::Idle);
    }
}
