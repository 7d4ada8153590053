use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque token handed to oracles and presenters with every signal.
///
/// The sequencer only passes it through; `scope` names the UI surface the
/// session belongs to (for example a screen visit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ContextToken {
    pub session_id: Uuid,
    pub scope: String,
}

impl ContextToken {
    /// Create a token for a fresh session in the given scope.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            scope: scope.into(),
        }
    }

    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = session_id;
        self
    }
}
