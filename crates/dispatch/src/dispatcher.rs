//! Hash-routed worker pool.
//!
//! # Routing
//!
//! Every worker is a node on a [`HashRing`]. A key goes to the worker owning
//! it on the ring, so items with the same key are always handled by the same
//! thread, in dispatch order, while the worker set is unchanged. Adding or
//! removing a worker only re-routes the keys that worker gains or loses.
//!
//! # Ownership
//!
//! Each worker has its own SPSC buffer. The dispatcher holds every producer
//! and each worker thread holds its consumer, which is why dispatching takes
//! `&mut self`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use hashring::{AnyHasher, HashRing};
use metrics::{counter, gauge, Counter, Gauge};
use spsc::{BufferConfig, PushError};
use tracing::{debug, info, warn};

use crate::config::DispatchConfig;
use crate::error::{DispatchError, Error, Result};
use crate::worker::{Handler, Worker};

/// Metric handles, registered once per dispatcher.
struct DispatchMetrics {
    enqueued: Counter,
    rejected: Counter,
    active_workers: Gauge,
}

impl DispatchMetrics {
    fn register() -> Self {
        Self {
            enqueued: counter!("dispatch.items.enqueued"),
            rejected: counter!("dispatch.items.rejected"),
            active_workers: gauge!("dispatch.workers.active"),
        }
    }
}

/// Routes keyed items to a pool of worker threads.
pub struct Dispatcher<T> {
    ring: HashRing<String, AnyHasher>,
    workers: BTreeMap<String, Worker<T>>,
    buffer: BufferConfig,
    handler: Handler<T>,
    next_id: usize,
    metrics: DispatchMetrics,
}

impl<T: Send + 'static> Dispatcher<T> {
    /// Starts `config.workers` workers, each running `handler` on the items
    /// routed to it.
    pub fn new<F>(config: &DispatchConfig, handler: F) -> Result<Self>
    where
        F: Fn(&str, T) + Send + Sync + 'static,
    {
        config.validate()?;

        let mut dispatcher = Self {
            ring: HashRing::from_config(&config.ring)?,
            workers: BTreeMap::new(),
            buffer: config.buffer,
            handler: Arc::new(handler),
            next_id: 0,
            metrics: DispatchMetrics::register(),
        };
        for _ in 0..config.workers {
            dispatcher.add_worker()?;
        }

        info!(
            workers = config.workers,
            replica_factor = config.ring.replica_factor,
            buffer_size = config.buffer.size,
            "dispatcher started"
        );
        Ok(dispatcher)
    }

    /// Starts one more worker and returns its name.
    pub fn add_worker(&mut self) -> Result<String> {
        let name = format!("worker-{}", self.next_id);
        let worker = Worker::spawn(&name, &self.buffer, Arc::clone(&self.handler))?;
        self.next_id += 1;

        self.ring.add_node(name.clone());
        self.workers.insert(name.clone(), worker);
        self.metrics
            .active_workers
            .set(self.workers.len() as f64);
        debug!(worker = %name, "worker added to ring");
        Ok(name)
    }
}

impl<T> Dispatcher<T> {
    /// Sends `item` to the worker owning `key`, waiting while its buffer is
    /// full. Returns the worker's name.
    ///
    /// # Errors
    /// The item is handed back in every case:
    /// - [`DispatchError::NoWorkers`] if no workers are registered.
    /// - [`DispatchError::Stopped`] if the worker's thread has died.
    pub fn dispatch<K: AsRef<[u8]>>(
        &mut self,
        key: K,
        item: T,
    ) -> std::result::Result<String, DispatchError<T>> {
        self.enqueue(key, item, |producer, item| producer.block_push(item))
    }

    /// Sends `item` to the worker owning `key` without waiting.
    pub fn try_dispatch<K: AsRef<[u8]>>(
        &mut self,
        key: K,
        item: T,
    ) -> std::result::Result<String, DispatchError<T>> {
        self.enqueue(key, item, |producer, item| {
            if !producer.is_consumer_alive() {
                return Err(PushError::Disconnected(item));
            }
            producer.push(item).map_err(PushError::Timeout)
        })
    }

    /// Like [`dispatch`](Self::dispatch), but gives up after `timeout`.
    pub fn dispatch_timeout<K: AsRef<[u8]>>(
        &mut self,
        key: K,
        item: T,
        timeout: Duration,
    ) -> std::result::Result<String, DispatchError<T>> {
        self.enqueue(key, item, |producer, item| {
            producer.push_timeout(item, timeout)
        })
    }

    /// Routes `key` and hands `item` to `push` with the owning worker's
    /// producer. A push that gives up for any reason other than
    /// disconnection is reported as a full buffer.
    fn enqueue<K, P>(
        &mut self,
        key: K,
        item: T,
        push: P,
    ) -> std::result::Result<String, DispatchError<T>>
    where
        K: AsRef<[u8]>,
        P: FnOnce(&mut spsc::Producer<T>, T) -> std::result::Result<(), PushError<T>>,
    {
        let name = match self.ring.get_node(key) {
            Ok(name) => name,
            Err(_) => return Err(DispatchError::NoWorkers(item)),
        };
        let worker = match self.workers.get_mut(name) {
            Some(worker) => worker,
            None => return Err(DispatchError::NoWorkers(item)),
        };

        match push(&mut worker.producer, item) {
            Ok(()) => {
                self.metrics.enqueued.increment(1);
                Ok(name.clone())
            }
            Err(PushError::Disconnected(item)) => {
                self.metrics.rejected.increment(1);
                warn!(worker = %name, "dispatch to stopped worker");
                Err(DispatchError::Stopped {
                    worker: name.clone(),
                    item,
                })
            }
            Err(e) => {
                self.metrics.rejected.increment(1);
                Err(DispatchError::Full {
                    worker: name.clone(),
                    item: e.into_inner(),
                })
            }
        }
    }

    /// Removes a worker from the ring, lets it drain what it already has,
    /// and joins its thread. Returns the number of items it handled.
    ///
    /// Keys it owned move to the remaining workers.
    pub fn remove_worker(&mut self, name: &str) -> Result<u64> {
        let worker = self
            .workers
            .remove(name)
            .ok_or_else(|| Error::UnknownWorker(name.to_string()))?;
        self.ring.remove_node(&name.to_string());
        self.metrics
            .active_workers
            .set(self.workers.len() as f64);

        let processed = worker
            .stop(name)
            .ok_or_else(|| Error::WorkerStopped(name.to_string()))?;
        debug!(worker = name, processed, "worker removed");
        Ok(processed)
    }

    /// The worker that `key` currently routes to.
    pub fn route<K: AsRef<[u8]>>(&self, key: K) -> Result<&str> {
        Ok(self.ring.get_node(key)?.as_str())
    }

    /// Names of the active workers, sorted.
    pub fn workers(&self) -> Vec<&str> {
        self.workers.keys().map(String::as_str).collect()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Items queued but not yet taken by `name`'s thread.
    pub fn pending(&self, name: &str) -> Option<usize> {
        self.workers.get(name).map(|w| w.producer.len())
    }

    /// Stops every worker after it drains its buffer. Returns how many
    /// items each handled; workers whose handler panicked are left out.
    pub fn shutdown(mut self) -> BTreeMap<String, u64> {
        self.stop_all()
    }

    fn stop_all(&mut self) -> BTreeMap<String, u64> {
        self.ring.clear();
        let mut report = BTreeMap::new();
        for (name, worker) in std::mem::take(&mut self.workers) {
            if let Some(processed) = worker.stop(&name) {
                report.insert(name, processed);
            }
        }
        self.metrics.active_workers.set(0.0);
        if !report.is_empty() {
            info!(total = report.values().sum::<u64>(), "dispatcher stopped");
        }
        report
    }
}

impl<T> Drop for Dispatcher<T> {
    fn drop(&mut self) {
        self.stop_all();
    }
}
