//! Background read-ahead for frame iterators.
//!
//! [`Prefetch`] moves an iterator onto a worker thread and hands its items
//! over through a bounded channel, so decoding the next frame overlaps with
//! whatever the consumer does with the current one.

use crate::cancel::CancelToken;
use crossbeam_channel::{bounded, Receiver};
use std::io;
use std::iter::FusedIterator;
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// Default number of items buffered ahead of the consumer.
pub const DEFAULT_DEPTH: usize = 2;

/// Iterator adapter that produces items on a worker thread.
///
/// Dropping the adapter cancels the token, disconnects the channel and joins
/// the worker. An inner iterator that can block (such as a live
/// [`FrameSequenceReader`]) should observe the same token so the join is
/// prompt.
///
/// [`FrameSequenceReader`]: crate::sequence::FrameSequenceReader
pub struct Prefetch<T: Send + 'static> {
    rx: Option<Receiver<T>>,
    worker: Option<JoinHandle<()>>,
    cancel: CancelToken,
}

impl<T: Send + 'static> Prefetch<T> {
    /// Start prefetching `inner` with up to `depth` items queued (clamped to
    /// 1..=2). Fails if the worker thread cannot be started.
    pub fn new<I>(inner: I, depth: usize) -> io::Result<Self>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::with_cancel(inner, depth, CancelToken::new())
    }

    /// Like [`Prefetch::new`], sharing `cancel` with the inner iterator.
    pub fn with_cancel<I>(inner: I, depth: usize, cancel: CancelToken) -> io::Result<Self>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        let builder = std::thread::Builder::new().name("scenecut-prefetch".into());
        Self::spawn_on(builder, inner, depth, cancel)
    }

    fn spawn_on<I>(
        builder: std::thread::Builder,
        inner: I,
        depth: usize,
        cancel: CancelToken,
    ) -> io::Result<Self>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        let depth = depth.clamp(1, DEFAULT_DEPTH);
        let (tx, rx) = bounded(depth);
        let iter = inner.into_iter();
        let token = cancel.clone();

        let worker = builder
            .spawn(move || {
                let mut sent = 0usize;
                for item in iter {
                    if token.is_cancelled() || tx.send(item).is_err() {
                        break;
                    }
                    sent += 1;
                }
                debug!(items = sent, "Prefetch worker finished");
            })
            .map_err(|e| {
                warn!(error = %e, "Failed to start prefetch worker");
                e
            })?;

        Ok(Self {
            rx: Some(rx),
            worker: Some(worker),
            cancel,
        })
    }
}

impl<T: Send + 'static> Iterator for Prefetch<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.rx.as_ref()?.recv().ok();
        if item.is_none() {
            self.rx = None;
        }
        item
    }
}

impl<T: Send + 'static> FusedIterator for Prefetch<T> {}

impl<T: Send + 'static> Drop for Prefetch<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.rx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Prefetch worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_preserves_order() {
        let items: Vec<u32> = Prefetch::new(0..100u32, 2).unwrap().collect();
        assert_eq!(items, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_early_drop_stops_worker() {
        let produced = Arc::new(AtomicUsize::new(0));
        let counter = produced.clone();
        let source = (0..).map(move |i: u64| {
            counter.fetch_add(1, Ordering::SeqCst);
            i
        });

        let mut prefetch = Prefetch::new(source, 1).unwrap();
        assert_eq!(prefetch.next(), Some(0));
        drop(prefetch);

        // The worker is joined: the count no longer moves and stays bounded
        // by the queue depth.
        let after = produced.load(Ordering::SeqCst);
        assert!(after <= 4, "worker ran ahead: {after}");
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(produced.load(Ordering::SeqCst), after);
    }

    #[test]
    fn test_fused_after_end() {
        let mut prefetch = Prefetch::new(vec![1, 2], 2).unwrap();
        assert_eq!(prefetch.next(), Some(1));
        assert_eq!(prefetch.next(), Some(2));
        assert_eq!(prefetch.next(), None);
        assert_eq!(prefetch.next(), None);
    }

    #[test]
    fn test_depth_is_clamped() {
        let items: Vec<i32> = Prefetch::new(vec![7, 8, 9], 0).unwrap().collect();
        assert_eq!(items, vec![7, 8, 9]);
    }

    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn test_spawn_failure_is_reported() {
        // No address space can hold this stack.
        let builder = std::thread::Builder::new().stack_size(usize::MAX / 2);
        let result = Prefetch::spawn_on(builder, vec![1, 2, 3], 2, CancelToken::new());
        assert!(result.is_err());
    }
}
