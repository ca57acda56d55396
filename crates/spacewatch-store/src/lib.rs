//! Durable alert state for spacewatch.
//!
//! The store holds exactly one [`AlertState`] record. [`JsonStateStore`]
//! keeps it in a JSON file that is replaced atomically, so readers such as
//! the dashboard never see a partial write.
//!
//! A missing or unreadable record is reported through [`LoadOutcome`] rather
//! than as an error; both mean "no prior severity".

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod state;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use state::{AlertState, LoadOutcome};
pub use store::{JsonStateStore, MemoryStateStore, StateStore};
