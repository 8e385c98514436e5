/// Lifecycle of the relay socket. Moves strictly forward; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    New,
    Connected,
    Registered,
    Closed,
}
