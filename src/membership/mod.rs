//! Membership Interface Module
//!
//! Failure detection and cluster discovery live outside this crate. This module only
//! defines what the partition layer consumes from them.
//!
//! ## Core Types
//! - **`Address`**: The network identity of a member. Used as owner of records and
//!   scheduled operations, and as log context for the local node.
//! - **`MemberEvent`**: Notifications published by the membership layer. A `Dead`
//!   event is fanned out to every partition container by the `MapService`.

pub mod types;
