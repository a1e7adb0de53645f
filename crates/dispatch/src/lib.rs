//! Hash-routed worker pool built on `hashring` and `spsc`.
//!
//! A [`Dispatcher`] owns a consistent hash ring of worker names and one
//! single-producer/single-consumer buffer per worker. Items are routed by
//! key, so everything sent under one key is handled by one thread in order.
//!
//! ```
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! use dispatch::{DispatchConfig, Dispatcher};
//!
//! let total = Arc::new(AtomicU64::new(0));
//! let sink = Arc::clone(&total);
//! let mut dispatcher = Dispatcher::new(&DispatchConfig::default(), move |_worker: &str, n: u64| {
//!     sink.fetch_add(n, Ordering::Relaxed);
//! })
//! .unwrap();
//!
//! for n in 1..=10u64 {
//!     dispatcher.dispatch(format!("user-{}", n % 3), n).unwrap();
//! }
//! dispatcher.shutdown();
//! assert_eq!(total.load(Ordering::Relaxed), 55);
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
mod worker;

pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Error, Result};
