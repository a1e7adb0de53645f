//! Lock-free single-producer/single-consumer ring buffer.
//!
//! One thread pushes, one thread pops, and the two exchange values through a
//! fixed array of slots. The only synchronization on the non-blocking paths
//! is an acquire/release pair on the `head` and `tail` indices.
//!
//! ```
//! let (mut tx, mut rx) = spsc::channel::<u32>(4).unwrap();
//! assert!(tx.push(1).is_ok());
//! assert_eq!(rx.pop(), Some(1));
//! assert_eq!(rx.pop(), None);
//! ```
//!
//! The producer and consumer are separate handles taking `&mut self`, so a
//! second producer or consumer cannot exist: the single-writer contract is
//! checked by the compiler instead of by convention.

pub mod config;
pub mod error;
pub mod ring;
mod sync;
pub mod wait;

pub use config::{BufferConfig, WaitConfig};
pub use error::{Error, PopError, PushError, Result};
pub use ring::{channel, channel_with_config, Consumer, Producer};
pub use wait::CancelToken;
