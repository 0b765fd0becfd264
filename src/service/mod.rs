//! Map Service Module
//!
//! Hosts every partition container of the local node and serializes access to them.
//!
//! ## Dispatch Model
//! - **One worker per partition**: Each `PartitionContainer` is moved into its own
//!   tokio task and is never touched from anywhere else. Callers send it commands
//!   over an mpsc channel; the worker runs them one at a time, which is the
//!   single-writer discipline the partition core relies on.
//! - **Replies**: Every command carries a oneshot channel for its result, so the
//!   async surface of `MapService` mirrors the synchronous one of the container.
//! - **Routing**: `Partitioner` maps a key to its partition id by hashing.
//!
//! ## Collaborators
//! The service owns the node-wide pieces the containers share: the map
//! configuration, the record id generator and this node's address. Member-death
//! notifications from the membership layer are fanned out to every partition.

pub mod map_service;
pub mod partitioner;
