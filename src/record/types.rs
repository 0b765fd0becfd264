use crate::membership::types::Address;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque serialized key or value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Data(pub Vec<u8>);

impl Data {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for Data {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Data {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// Time-to-live and max-idle bounds of a record, in milliseconds.
///
/// `None` means unset: the record never expires on that criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryPolicy {
    pub ttl_ms: Option<u64>,
    pub max_idle_ms: Option<u64>,
}

impl ExpiryPolicy {
    pub const UNSET: Self = Self {
        ttl_ms: None,
        max_idle_ms: None,
    };

    /// Builds a policy from map configuration values, where 0 means unset.
    pub fn from_seconds(ttl_seconds: u64, max_idle_seconds: u64) -> Self {
        let to_ms = |secs: u64| (secs > 0).then(|| secs.saturating_mul(1000));
        Self {
            ttl_ms: to_ms(ttl_seconds),
            max_idle_ms: to_ms(max_idle_seconds),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.ttl_ms.is_none() && self.max_idle_ms.is_none()
    }
}

/// Construction contract of a `Record`.
///
/// Owner and expiry are spelled out so every creation site states them.
/// Records created by a transaction commit have no owner and `ExpiryPolicy::UNSET`.
#[derive(Debug, Clone)]
pub struct RecordInit {
    pub id: u64,
    pub partition_id: u32,
    pub key: Data,
    pub value: Data,
    pub owner: Option<Address>,
    pub expiry: ExpiryPolicy,
}

/// A single key/value slot of a map within one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: u64,
    partition_id: u32,
    key: Data,
    value: Data,
    owner: Option<Address>,
    expiry: ExpiryPolicy,
    active: bool,
    dirty: bool,
    /// Number of in-place value replacements since creation.
    version: u64,
    hits: u64,
    creation_time: u64,
    last_update_time: u64,
    last_access_time: u64,
}

impl Record {
    pub fn new(init: RecordInit) -> Self {
        let now = now_ms();
        Self {
            id: init.id,
            partition_id: init.partition_id,
            key: init.key,
            value: init.value,
            owner: init.owner,
            expiry: init.expiry,
            active: false,
            dirty: false,
            version: 0,
            hits: 0,
            creation_time: now,
            last_update_time: now,
            last_access_time: now,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    pub fn key(&self) -> &Data {
        &self.key
    }

    pub fn value(&self) -> &Data {
        &self.value
    }

    pub fn owner(&self) -> Option<&Address> {
        self.owner.as_ref()
    }

    pub fn expiry(&self) -> ExpiryPolicy {
        self.expiry
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn creation_time(&self) -> u64 {
        self.creation_time
    }

    pub fn last_update_time(&self) -> u64 {
        self.last_update_time
    }

    pub fn last_access_time(&self) -> u64 {
        self.last_access_time
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replaces the value in place. Identity, owner and expiry are kept.
    pub fn set_value(&mut self, value: Data) {
        self.value = value;
        self.version += 1;
        self.last_update_time = now_ms();
    }

    pub fn set_active(&mut self) {
        self.active = true;
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Records a read access.
    pub fn touch(&mut self) {
        self.hits += 1;
        self.last_access_time = now_ms();
    }

    /// TTL counts from the last update, max-idle from the last read or update.
    pub fn is_expired(&self, now: u64) -> bool {
        if let Some(ttl) = self.expiry.ttl_ms
            && now.saturating_sub(self.last_update_time) >= ttl
        {
            return true;
        }
        if let Some(max_idle) = self.expiry.max_idle_ms {
            let last_used = self.last_access_time.max(self.last_update_time);
            return now.saturating_sub(last_used) >= max_idle;
        }
        false
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
