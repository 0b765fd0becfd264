//! Record Storage Module
//!
//! Holds the keyed records of one map within one partition.
//!
//! ## Core Concepts
//! - **Record**: A single key/value slot. Carries an id that is unique across the
//!   service, the owning partition, activity/dirty flags and expiry metadata.
//! - **RecordStore**: The `key -> Record` table for one map name. The partition
//!   container creates one lazily on first access and owns it exclusively.
//! - **IdGenerator**: The service-wide source of record ids.
//!
//! Keys and values are opaque bytes (`Data`). Serialization belongs to the callers.

pub mod ids;
pub mod store;
pub mod types;
