//! Request context for discovery calls

use std::fmt;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Per-request data carried through instance discovery
///
/// The correlation id is sent as the `client-request-id` header and attached to
/// log lines. The cancellation token aborts the live discovery call.
#[derive(Clone)]
pub struct RequestContext {
    /// Correlation id for this request
    pub correlation_id: Uuid,

    /// Cancellation token
    pub cancellation_token: CancellationToken,
}

impl RequestContext {
    /// Create a context with a fresh correlation id
    #[must_use]
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Use an existing correlation id
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    /// Tie this request to the caller's cancellation token
    #[must_use]
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Whether the caller has cancelled this request
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("correlation_id", &self.correlation_id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
