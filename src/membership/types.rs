use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Network address of a cluster member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Address(pub SocketAddr);

impl Address {
    pub fn new(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

/// Events published by the membership layer.
///
/// - `Joined`: A member became reachable.
/// - `Dead`: The failure detector gave up on a member. Partitions may own
///   transactions, scheduled operations and locks on its behalf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MemberEvent {
    Joined(Address),
    Dead(Address),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display_matches_socket_addr() {
        let addr = Address::new("10.0.0.1:5701".parse().unwrap());
        assert_eq!(addr.to_string(), "10.0.0.1:5701");
    }

    #[test]
    fn test_member_event_serialization() {
        let event = MemberEvent::Dead("127.0.0.1:5000".parse::<SocketAddr>().unwrap().into());

        let json = serde_json::to_string(&event).expect("Serialization failed");
        let restored: MemberEvent = serde_json::from_str(&json).expect("Deserialization failed");

        assert_eq!(restored, event);
    }
}
