//! Signal types carried by the bus

use chrono::{DateTime, Utc};
use sequencer_core::{ContextToken, PromptId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping every signal with delivery metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEnvelope {
    /// Unique signal ID
    pub id: Uuid,
    /// Position in the bus's emission order
    pub sequence: u64,
    /// When the signal was emitted
    pub timestamp: DateTime<Utc>,
    /// The actual signal
    pub signal: Signal,
}

impl SignalEnvelope {
    pub fn new(sequence: u64, signal: Signal) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence,
            timestamp: Utc::now(),
            signal,
        }
    }
}

/// All signals that travel over the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// Look further down the sequence for the next available prompt
    #[serde(rename = "sequence.evaluate")]
    Evaluate { context: ContextToken },

    /// The active prompt slot is free, show the next available prompt
    #[serde(rename = "sequence.resume")]
    Resume { context: ContextToken },

    /// A presenter put a prompt on screen
    #[serde(rename = "prompt.shown")]
    PromptShown {
        prompt: PromptId,
        context: ContextToken,
    },

    /// A presenter took a prompt off screen
    #[serde(rename = "prompt.dismissed")]
    PromptDismissed {
        prompt: PromptId,
        action: DismissAction,
        context: ContextToken,
    },
}

/// Coarse signal classification used for subscription filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Evaluate,
    Resume,
    /// Anything the sequence engine does not act on
    Other,
}

/// How the user got rid of a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum DismissAction {
    Accepted,
    Declined,
    #[default]
    Closed,
    /// The presenter ended without the user dismissing the prompt
    Failed,
}

impl DismissAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "closed" => Some(Self::Closed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl Signal {
    pub fn evaluate(context: ContextToken) -> Self {
        Signal::Evaluate { context }
    }

    pub fn resume(context: ContextToken) -> Self {
        Signal::Resume { context }
    }

    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Evaluate { .. } => SignalKind::Evaluate,
            Signal::Resume { .. } => SignalKind::Resume,
            Signal::PromptShown { .. } | Signal::PromptDismissed { .. } => SignalKind::Other,
        }
    }

    /// Get the context token carried by this signal
    pub fn context(&self) -> &ContextToken {
        match self {
            Signal::Evaluate { context }
            | Signal::Resume { context }
            | Signal::PromptShown { context, .. }
            | Signal::PromptDismissed { context, .. } => context,
        }
    }

    /// Get the prompt this signal refers to, if any
    pub fn prompt(&self) -> Option<PromptId> {
        match self {
            Signal::PromptShown { prompt, .. } | Signal::PromptDismissed { prompt, .. } => {
                Some(*prompt)
            }
            Signal::Evaluate { .. } | Signal::Resume { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_creation() {
        let envelope = SignalEnvelope::new(7, Signal::evaluate(ContextToken::new("home")));

        assert!(!envelope.id.is_nil());
        assert_eq!(envelope.sequence, 7);
        assert!(envelope.timestamp <= Utc::now());
    }

    #[test]
    fn test_signal_kind() {
        let context = ContextToken::new("home");

        assert_eq!(Signal::evaluate(context.clone()).kind(), SignalKind::Evaluate);
        assert_eq!(Signal::resume(context.clone()).kind(), SignalKind::Resume);
        assert_eq!(
            Signal::PromptShown {
                prompt: PromptId::RateApp,
                context,
            }
            .kind(),
            SignalKind::Other
        );
    }

    #[test]
    fn test_signal_serialization() {
        let signal = Signal::PromptDismissed {
            prompt: PromptId::WhatsNew,
            action: DismissAction::Accepted,
            context: ContextToken::new("home"),
        };

        let json = serde_json::to_string(&signal).unwrap();
        assert!(json.contains("prompt.dismissed"));
        assert!(json.contains("whats_new"));
        assert!(json.contains("accepted"));
    }

    #[test]
    fn test_signal_deserialization() {
        let json = r#"{"type":"sequence.resume","context":{"session_id":"550e8400-e29b-41d4-a716-446655440000","scope":"home"}}"#;
        let signal: Signal = serde_json::from_str(json).unwrap();

        match signal {
            Signal::Resume { context } => {
                assert_eq!(context.scope, "home");
                assert!(!context.session_id.is_nil());
            }
            _ => panic!("Wrong signal type"),
        }
    }

    #[test]
    fn test_signal_accessors() {
        let context = ContextToken::new("home");
        let shown = Signal::PromptShown {
            prompt: PromptId::BackupReminder,
            context: context.clone(),
        };

        assert_eq!(shown.prompt(), Some(PromptId::BackupReminder));
        assert_eq!(shown.context(), &context);
        assert_eq!(Signal::evaluate(context).prompt(), None);
    }

    #[test]
    fn test_dismiss_action_parse() {
        assert_eq!(DismissAction::parse("declined"), Some(DismissAction::Declined));
        assert_eq!(DismissAction::parse("later"), None);
        assert_eq!(DismissAction::default().as_str(), "closed");
    }
}
