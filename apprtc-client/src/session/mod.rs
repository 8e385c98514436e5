mod call_command;
mod call_observer;
mod call_session;
mod call_state;
mod room_session;
mod session_event;

pub use call_command::CallCommand;
pub use call_observer::CallObserver;
pub use call_session::{CallHandle, CallServices, CallSession};
pub use call_state::{CallState, RoomState};
pub use room_session::RoomSession;
