//! Project configuration stored in `.prompt-sequencer/config.toml`.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use events::DismissAction;
use sequencer::{EngineConfig, StaticOracle};
use sequencer_core::{validate_sequence, CoreError, PromptId};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_DIR: &str = ".prompt-sequencer";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    /// Whether each prompt may be shown, keyed by prompt name
    #[serde(default)]
    pub availability: BTreeMap<String, bool>,
    #[serde(default)]
    pub presenter: PresenterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Prompt names in presentation order
    pub sequence: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// Dismiss prompts automatically after this many milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_dismiss_ms: Option<u64>,
    /// Action recorded for automatic dismissals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_action: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scope: "home".to_string(),
        }
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            sequence: PromptId::ALL
                .iter()
                .map(|prompt| prompt.as_str().to_string())
                .collect(),
        }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        let availability = [
            (PromptId::WhatsNew, true),
            (PromptId::NotificationPermission, false),
            (PromptId::RateApp, true),
            (PromptId::BackupReminder, false),
        ]
        .into_iter()
        .map(|(prompt, available)| (prompt.as_str().to_string(), available))
        .collect();

        Self {
            session: SessionConfig::default(),
            prompts: PromptsConfig::default(),
            availability,
            presenter: PresenterConfig::default(),
        }
    }
}

impl SequencerConfig {
    /// Read config from `path`, falling back to defaults if it does not exist.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;

        debug!(path = %path.display(), "Config loaded successfully");
        Ok(config)
    }

    pub async fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        debug!(path = %path.display(), "Config saved successfully");
        Ok(())
    }

    /// Check prompt names and actions without building anything.
    pub fn validate(&self) -> Result<()> {
        self.sequence()?;
        self.availability()?;
        self.auto_action()?;
        Ok(())
    }

    pub fn sequence(&self) -> Result<Vec<PromptId>> {
        let sequence = self
            .prompts
            .sequence
            .iter()
            .map(|name| parse_prompt(name))
            .collect::<Result<Vec<_>, _>>()?;
        validate_sequence(&sequence)?;
        Ok(sequence)
    }

    pub fn availability(&self) -> Result<Vec<(PromptId, bool)>> {
        self.availability
            .iter()
            .map(|(name, available)| -> Result<(PromptId, bool)> {
                Ok((parse_prompt(name)?, *available))
            })
            .collect()
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig::with_sequence(self.sequence()?))
    }

    pub fn oracle(&self) -> Result<StaticOracle> {
        Ok(self.availability()?.into_iter().collect())
    }

    pub fn auto_dismiss(&self) -> Option<Duration> {
        self.presenter.auto_dismiss_ms.map(Duration::from_millis)
    }

    pub fn auto_action(&self) -> Result<DismissAction> {
        match self.presenter.auto_action.as_deref() {
            None => Ok(DismissAction::default()),
            Some(name) => DismissAction::parse(name)
                .ok_or_else(|| anyhow!("Unknown dismiss action in config: {}", name)),
        }
    }
}

fn parse_prompt(name: &str) -> Result<PromptId, CoreError> {
    PromptId::parse(name).ok_or_else(|| CoreError::UnknownPrompt(name.to_string()))
}
