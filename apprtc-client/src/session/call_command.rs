/// Requests from the application to a running call session.
#[derive(Debug)]
pub enum CallCommand {
    /// Join `room_id` and start negotiating once the room answers.
    Join { room_id: String },

    /// Tear the call down: close media, say bye on the relay, leave the room.
    Hangup,
}
