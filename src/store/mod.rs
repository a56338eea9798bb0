//! Concurrent keyed stores
//!
//! [`KeyedStore`] is used at every level of the cluster hierarchy: hosts by
//! name, and per host the built-in and user-defined metrics by name.
//!
//! ## Design
//!
//! - **Fixed buckets**: the bucket layout never changes, so a [`Cursor`] stays
//!   valid for the lifetime of the store
//! - **Per-bucket locking**: producers, readers and the sweeper only contend
//!   when they touch the same bucket
//! - **Ownership on delete**: removing an entry moves its value to the caller,
//!   which disposes of whatever the value owns

pub mod cursor;
pub mod error;
pub mod keyed;

pub use cursor::{Cursor, Removal, Visit, Walk};
pub use error::{StoreError, StoreResult};
pub use keyed::KeyedStore;
