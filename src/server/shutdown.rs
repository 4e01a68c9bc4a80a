//! Graceful-shutdown plumbing shared by the acceptor, the control loops and
//! the data transfers.

use tokio::sync::{broadcast, mpsc, Mutex, RwLock};

// Notifier lets other tasks know that we're shutting down.
//
// Tasks subscribe and get a Listener. Dropping the broadcast sender wakes
// every listener; each listener in turn holds a clone of the completion
// sender, so once all of them have gone out of scope the mpsc channel closes
// and linger() returns.
#[derive(Debug)]
pub struct Notifier {
    shutdown_tx: RwLock<Option<broadcast::Sender<()>>>,
    complete_tx: RwLock<Option<mpsc::Sender<()>>>,
    complete_rx: Mutex<mpsc::Receiver<()>>,
}

impl Notifier {
    pub fn new() -> Notifier {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (complete_tx, complete_rx) = mpsc::channel(1);
        Notifier {
            shutdown_tx: RwLock::new(Some(shutdown_tx)),
            complete_tx: RwLock::new(Some(complete_tx)),
            complete_rx: Mutex::new(complete_rx),
        }
    }

    // Tells all listeners to wind down. Listeners signal completion by
    // simply going out of scope.
    pub async fn notify(&self) {
        drop(self.shutdown_tx.write().await.take());
        drop(self.complete_tx.write().await.take());
    }

    // Waits until every listener handed out by subscribe() has been dropped.
    pub async fn linger(&self) {
        let _ = self.complete_rx.lock().await.recv().await;
    }

    pub async fn subscribe(&self) -> Listener {
        let shutdown_tx = self.shutdown_tx.read().await;
        let complete_tx = self.complete_tx.read().await;
        Listener {
            fired: shutdown_tx.is_none(),
            shutdown_rx: shutdown_tx.as_ref().map(|tx| tx.subscribe()),
            _complete_tx: complete_tx.clone(),
        }
    }
}

// Listener waits for the shutdown notification. Its existence also marks the
// owning task as still busy, see Notifier::linger.
#[derive(Debug)]
pub struct Listener {
    fired: bool,
    shutdown_rx: Option<broadcast::Receiver<()>>,
    _complete_tx: Option<mpsc::Sender<()>>,
}

impl Listener {
    /// Receives the shutdown notice, waiting if necessary.
    pub async fn listen(&mut self) {
        if self.fired {
            return;
        }
        if let Some(rx) = self.shutdown_rx.as_mut() {
            // Only one value is ever "sent" (by closing the channel), so a
            // lag error is impossible.
            let _ = rx.recv().await;
        }
        self.fired = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn notify_wakes_listeners_and_linger_waits_for_them() {
        let notifier = Arc::new(Notifier::new());
        let mut listener = notifier.subscribe().await;

        let task = tokio::spawn(async move {
            listener.listen().await;
        });

        notifier.notify().await;
        notifier.linger().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn late_subscribers_observe_shutdown_immediately() {
        let notifier = Notifier::new();
        notifier.notify().await;
        let mut listener = notifier.subscribe().await;
        // Must not hang.
        listener.listen().await;
    }
}
