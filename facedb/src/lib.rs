//! Durable person/descriptor storage backed by redb.
//!
//! Implements [`facewhiz_faceid::PersonStore`] over a single-file redb
//! database. Every write runs in one redb write transaction, so the cascade
//! on person deletion is atomic; reads and snapshots run in one read
//! transaction and see a consistent point-in-time view regardless of
//! concurrent writers.

mod keys;
mod store;

pub use store::RedbStore;
