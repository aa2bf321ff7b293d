//! Batch Runner - Background thread that works through a creation batch
//!
//! Each attempt can block for as long as the automation engine needs, so UI
//! callers hand the batch to this runner instead of calling
//! [`AccountCreator::batch_create`] on their own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::creator::AccountCreator;
use crate::records::{AccountRecord, AccountRequest};

/// Reported after every attempt.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// 1-based attempt number
    pub attempt: usize,
    pub total: usize,
    /// `None` when the attempt failed
    pub record: Option<AccountRecord>,
}

/// Runs one batch at a time on a worker thread
pub struct BatchRunner {
    is_running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<Vec<AccountRecord>>>,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self {
            is_running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start `count` creation attempts with `template`.
    ///
    /// # Arguments
    /// * `creator` - Shared creator whose ledger receives the accounts
    /// * `count` - Number of attempts
    /// * `template` - Request re-filled for every attempt
    /// * `callback` - Called with the outcome of each attempt
    ///
    /// Returns `false` without doing anything if a batch is already running.
    pub fn start<F>(
        &mut self,
        creator: Arc<AccountCreator>,
        count: usize,
        template: AccountRequest,
        callback: F,
    ) -> bool
    where
        F: Fn(BatchProgress) + Send + 'static,
    {
        if self.is_running.load(Ordering::SeqCst) {
            warn!("Batch runner already running");
            return false;
        }
        // Collect a finished batch that nobody joined.
        self.join();

        info!("Starting batch of {} accounts", count);
        self.is_running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.is_running);

        let handle = thread::spawn(move || {
            let mut created = Vec::new();
            for attempt in 1..=count {
                if !running.load(Ordering::SeqCst) {
                    info!("Batch stopped after {} of {} attempts", attempt - 1, count);
                    break;
                }

                let record = creator.create_account(&template);
                if let Some(record) = &record {
                    created.push(record.clone());
                }
                callback(BatchProgress {
                    attempt,
                    total: count,
                    record,
                });
            }
            info!("Batch finished: {}/{} accounts created", created.len(), count);
            running.store(false, Ordering::SeqCst);
            created
        });

        self.thread_handle = Some(handle);
        true
    }

    /// Ask the worker to stop after the in-flight attempt and wait for it.
    pub fn stop(&mut self) -> Vec<AccountRecord> {
        self.is_running.store(false, Ordering::SeqCst);
        self.join()
    }

    /// Wait for the batch to finish on its own.
    pub fn join(&mut self) -> Vec<AccountRecord> {
        let Some(handle) = self.thread_handle.take() else {
            return Vec::new();
        };
        match handle.join() {
            Ok(created) => created,
            Err(_) => {
                warn!("Batch worker panicked");
                self.is_running.store(false, Ordering::SeqCst);
                Vec::new()
            }
        }
    }

    /// Check if a batch is currently running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BatchRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
