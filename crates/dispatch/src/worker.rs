//! One worker: a named thread draining its own SPSC buffer.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use metrics::counter;
use spsc::{channel_with_config, BufferConfig, Producer};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub(crate) type Handler<T> = Arc<dyn Fn(&str, T) + Send + Sync + 'static>;

/// The dispatcher's end of a worker. Holding the producer makes the
/// dispatcher the buffer's only writer.
pub(crate) struct Worker<T> {
    pub(crate) producer: Producer<T>,
    thread: Option<JoinHandle<u64>>,
}

impl<T: Send + 'static> Worker<T> {
    pub(crate) fn spawn(name: &str, buffer: &BufferConfig, handler: Handler<T>) -> Result<Self> {
        let (producer, mut consumer) = channel_with_config(buffer)?;
        let thread_name = name.to_string();

        let thread = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let items_processed =
                    counter!("dispatch.items.processed", "worker" => thread_name.clone());
                let mut processed = 0u64;
                // Ends once the producer is dropped and the buffer is drained.
                while let Ok(item) = consumer.block_pop() {
                    handler(&thread_name, item);
                    processed += 1;
                    items_processed.increment(1);
                }
                debug!(worker = %thread_name, processed, "worker drained");
                processed
            })
            .map_err(|e| Error::Spawn(e.to_string()))?;

        debug!(worker = name, size = buffer.size, "worker started");
        Ok(Self {
            producer,
            thread: Some(thread),
        })
    }
}

impl<T> Worker<T> {
    /// Closes the buffer and waits for the thread to drain it.
    ///
    /// Returns the number of items the worker handled, or `None` if its
    /// handler panicked.
    pub(crate) fn stop(mut self, name: &str) -> Option<u64> {
        let thread = self.thread.take();
        drop(self);
        match thread?.join() {
            Ok(processed) => Some(processed),
            Err(_) => {
                warn!(worker = name, "worker thread panicked");
                None
            }
        }
    }
}
