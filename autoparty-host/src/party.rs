//! Party service seam
//!
//! The party subsystem itself (join/leave/create semantics, passphrase
//! exchange, peer discovery) is owned by the host. Plugins only query
//! membership and request a switch.

/// Host-owned party subsystem, call-through only
pub trait PartyService {
    /// Whether the user is currently in a party
    fn is_in_party(&self) -> bool;

    /// Request a switch to the party identified by `party_id`
    ///
    /// Fire-and-forget: the host queues the request on its own dispatch
    /// thread and the outcome is never reported back to the caller.
    fn change_party(&self, party_id: &str);
}
