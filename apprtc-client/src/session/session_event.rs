use crate::error::TransportError;
use crate::room::RoomJoinResult;
use apprtc_core::IceServer;

/// Completions of request/response work spawned by the session.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    Joined(Result<RoomJoinResult, TransportError>),
    IceServersResolved(Result<Vec<IceServer>, TransportError>),
}
