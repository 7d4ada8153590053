use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Interruptive prompts the sequencer knows about.
///
/// Declaration order is presentation priority: `Ord` and [`PromptId::ALL`]
/// both follow it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum PromptId {
    /// Release notes for the installed version
    WhatsNew,
    /// Ask for permission to send notifications
    NotificationPermission,
    /// Ask the user to rate the app
    RateApp,
    /// Remind the user to back up their data
    BackupReminder,
}

impl PromptId {
    /// Every prompt, in declared order.
    pub const ALL: [PromptId; 4] = [
        PromptId::WhatsNew,
        PromptId::NotificationPermission,
        PromptId::RateApp,
        PromptId::BackupReminder,
    ];

    /// The default presentation sequence.
    pub fn sequence() -> Vec<PromptId> {
        Self::ALL.to_vec()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WhatsNew => "whats_new",
            Self::NotificationPermission => "notification_permission",
            Self::RateApp => "rate_app",
            Self::BackupReminder => "backup_reminder",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "whats_new" => Some(Self::WhatsNew),
            "notification_permission" => Some(Self::NotificationPermission),
            "rate_app" => Some(Self::RateApp),
            "backup_reminder" => Some(Self::BackupReminder),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::WhatsNew => "What's new",
            Self::NotificationPermission => "Turn on notifications",
            Self::RateApp => "Enjoying the app?",
            Self::BackupReminder => "Back up your data",
        }
    }

    /// Position in the declared order.
    pub fn position(&self) -> usize {
        match self {
            Self::WhatsNew => 0,
            Self::NotificationPermission => 1,
            Self::RateApp => 2,
            Self::BackupReminder => 3,
        }
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that a custom sequence lists each prompt at most once.
pub fn validate_sequence(sequence: &[PromptId]) -> Result<(), CoreError> {
    let mut seen = [false; PromptId::ALL.len()];
    for prompt in sequence {
        let slot = &mut seen[prompt.position()];
        if *slot {
            return Err(CoreError::DuplicatePrompt(*prompt));
        }
        *slot = true;
    }
    Ok(())
}
