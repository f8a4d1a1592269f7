//! Bounded in-process view queue.
//!
//! Views are accepted without blocking the request and recorded by worker tasks.
//! When the queue is full new events are dropped. Pending events are lost on
//! process restart.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use campus_core::ports::{ViewEvent, ViewQueueStats, ViewSink};

/// View queue configuration.
#[derive(Debug, Clone)]
pub struct ViewQueueConfig {
    pub capacity: usize,
    pub workers: usize,
}

impl Default for ViewQueueConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            workers: 2,
        }
    }
}

impl ViewQueueConfig {
    pub fn from_env() -> Self {
        Self {
            capacity: std::env::var("VIEW_QUEUE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10_000),
            workers: std::env::var("VIEW_QUEUE_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }
}

#[derive(Default)]
struct Stats {
    pending: AtomicUsize,
    recorded: AtomicUsize,
    dropped: AtomicUsize,
}

pub struct ViewQueue {
    sender: RwLock<Option<mpsc::Sender<ViewEvent>>>,
    stats: Arc<Stats>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ViewQueue {
    /// Spawns the workers. `handler` records a single event and must not fail.
    pub fn start<F, Fut>(config: ViewQueueConfig, handler: F) -> Self
    where
        F: Fn(ViewEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let receiver = Arc::new(tokio::sync::Mutex::new(rx));
        let handler = Arc::new(handler);
        let stats = Arc::new(Stats::default());

        let workers = (0..config.workers.max(1))
            .map(|worker_id| {
                let receiver = receiver.clone();
                let handler = handler.clone();
                let stats = stats.clone();

                tokio::spawn(async move {
                    tracing::debug!(worker = worker_id, "View worker started");
                    loop {
                        let event = {
                            let mut rx = receiver.lock().await;
                            rx.recv().await
                        };
                        let Some(event) = event else {
                            tracing::debug!(worker = worker_id, "View worker shutting down");
                            break;
                        };

                        stats.pending.fetch_sub(1, Ordering::Relaxed);
                        handler(event).await;
                        stats.recorded.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();

        Self {
            sender: RwLock::new(Some(tx)),
            stats,
            workers: Mutex::new(workers),
        }
    }

    /// Stops accepting events, lets the workers drain what is queued, and waits for them.
    pub async fn shutdown(&self) {
        if let Ok(mut sender) = self.sender.write() {
            sender.take();
        }
        let workers = match self.workers.lock() {
            Ok(mut workers) => std::mem::take(&mut *workers),
            Err(_) => Vec::new(),
        };
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "View worker panicked");
            }
        }
    }
}

impl ViewSink for ViewQueue {
    fn submit(&self, event: ViewEvent) -> bool {
        let sender = match self.sender.read() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        };
        let Some(sender) = sender else {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        };

        // Counted before sending so a fast worker never sees a zero pending count.
        self.stats.pending.fetch_add(1, Ordering::Relaxed);
        match sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                self.stats.pending.fetch_sub(1, Ordering::Relaxed);
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("View queue full, dropping event");
                false
            }
        }
    }

    fn stats(&self) -> ViewQueueStats {
        ViewQueueStats {
            pending: self.stats.pending.load(Ordering::Relaxed),
            recorded: self.stats.recorded.load(Ordering::Relaxed),
            dropped: self.stats.dropped.load(Ordering::Relaxed),
        }
    }
}
