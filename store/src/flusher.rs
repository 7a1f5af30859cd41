//! Background owner of a [`VoteSequenceCache`].
//!
//! A dedicated thread flushes the cache every interval and once more when
//! stopped, each time in its own write transaction over `VoteSequence`.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Sender};

use crate::{Store, StoreError, Table, VoteSequenceCache};

/// Flush `cache` into `store` and commit. Returns the number of sequences
/// written.
pub fn flush_vote_cache(store: &dyn Store, cache: &VoteSequenceCache) -> Result<usize, StoreError> {
    let mut txn = store.begin_write(&[Table::VoteSequence])?;
    let written = cache.flush(txn.as_mut())?;
    txn.commit()?;
    Ok(written)
}

fn flush_logged(store: &dyn Store, cache: &VoteSequenceCache) {
    if let Err(error) = flush_vote_cache(store, cache) {
        tracing::error!(%error, "vote sequence flush failed");
    }
}

pub struct VoteCacheFlusher {
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl VoteCacheFlusher {
    pub fn spawn(
        store: Arc<dyn Store>,
        cache: Arc<VoteSequenceCache>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let (stop, stopped) = bounded::<()>(1);
        let handle = std::thread::Builder::new()
            .name("vote-cache-flush".into())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => flush_logged(store.as_ref(), &cache),
                        recv(stopped) -> _ => {
                            flush_logged(store.as_ref(), &cache);
                            tracing::debug!("vote cache flusher stopped");
                            return;
                        }
                    }
                }
            })?;
        tracing::debug!(interval_ms = interval.as_millis() as u64, "vote cache flusher started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Flush one last time and join the thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        // A full channel means a stop is already queued.
        let _ = self.stop.try_send(());
        if handle.join().is_err() {
            tracing::error!("vote cache flush thread panicked");
        }
    }
}

impl Drop for VoteCacheFlusher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
