use crate::error::CallError;
use crate::session::CallState;
use crate::transport::MediaKind;
use async_trait::async_trait;

/// Application-facing notifications of a call session.
#[async_trait]
pub trait CallObserver: Send + Sync {
    async fn on_state_change(&self, state: CallState);

    async fn on_error(&self, error: CallError);

    async fn on_remote_track(&self, _kind: MediaKind) {}
}
