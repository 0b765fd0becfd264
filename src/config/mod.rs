//! Configuration Module
//!
//! Service-level settings and per-map settings, loaded from JSON.
//!
//! ## Map Config Resolution
//! Partition containers ask for the configuration of a map by its name with the
//! service prefix stripped. Resolution tries, in order:
//! 1. An entry whose name equals the map name.
//! 2. A wildcard entry (`"orders-*"`, `"*-cache"`) matching the name. The one with
//!    the longest literal part wins.
//! 3. The entry named `default`.
//! 4. A built-in `MapConfig::default()`.
//!
//! Results are cached per name, since every partition worker resolves against
//! the same shared `ServiceConfig`.

pub mod map_config;
pub mod service;
