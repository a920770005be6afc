/// Where an exchange is in its lifecycle.
///
/// Transitions only move forward; `Failed` is reachable from every state
/// after `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing has happened yet.
    #[default]
    Idle,

    /// The request method has been decided.
    MethodResolved,

    /// The body (if any) has been encoded and its headers filled in.
    BodyPrepared,

    /// The request has been handed to the transport.
    Sent,

    /// Response headers arrived; body chunks are being accumulated.
    AwaitingResponse,

    /// The full body is in memory and being decoded.
    Decoding,

    /// The exchange produced a value.
    Resolved,

    /// The exchange produced an error.
    Failed,
}

impl LoadState {
    /// True once the exchange has settled either way.
    pub fn is_terminal(self) -> bool {
        matches!(self, LoadState::Resolved | LoadState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::MethodResolved => "method_resolved",
            LoadState::BodyPrepared => "body_prepared",
            LoadState::Sent => "sent",
            LoadState::AwaitingResponse => "awaiting_response",
            LoadState::Decoding => "decoding",
            LoadState::Resolved => "resolved",
            LoadState::Failed => "failed",
        }
    }
}
