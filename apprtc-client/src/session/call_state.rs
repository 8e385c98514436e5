#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Joining,
    AwaitingIceServers,
    Negotiating,
    /// Descriptions exchanged; only candidates flow from here on.
    Active,
    Terminated,
}

/// Whether we hold a seat in the room. Local candidates are only forwarded
/// while `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    New,
    Connected,
    Terminated,
}
