//! Terminal presenter: prints each prompt and waits for the user.

use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use events::{DismissAction, SignalBus};
use sequencer::{DismissGuard, PresentError, Presenter};
use sequencer_core::{ContextToken, PromptId};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

pub struct ConsolePresenter {
    bus: SignalBus,
    auto_dismiss: Option<Duration>,
    auto_action: DismissAction,
    input: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsolePresenter {
    pub fn new(bus: SignalBus) -> Self {
        Self {
            bus,
            auto_dismiss: None,
            auto_action: DismissAction::default(),
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Dismiss every prompt on its own after `delay`, recording `action`.
    pub fn with_auto_dismiss(mut self, delay: Duration, action: DismissAction) -> Self {
        self.auto_dismiss = Some(delay);
        self.auto_action = action;
        self
    }

    async fn wait_for_user(&self) -> Result<DismissAction, PresentError> {
        if let Some(delay) = self.auto_dismiss {
            tokio::time::sleep(delay).await;
            println!("  {}", format!("(dismissed: {})", self.auto_action.as_str()).dimmed());
            return Ok(self.auto_action);
        }

        println!(
            "  {}",
            "[a]ccept  [d]ecline  [Enter] close".dimmed()
        );
        let line = self.input.lock().await.next_line().await?;
        Ok(line.as_deref().map(parse_answer).unwrap_or_default())
    }
}

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn present(&self, prompt: PromptId, context: ContextToken) -> Result<(), PresentError> {
        let guard = DismissGuard::begin(self.bus.clone(), prompt, context);

        println!();
        println!("{}", prompt.title().bold().cyan());
        println!("  {}", body(prompt));

        let action = self.wait_for_user().await?;
        guard.dismiss(action);
        Ok(())
    }
}

fn body(prompt: PromptId) -> &'static str {
    match prompt {
        PromptId::WhatsNew => "See what changed since your last visit.",
        PromptId::NotificationPermission => "Get notified when something needs your attention.",
        PromptId::RateApp => "A quick rating helps other people find the app.",
        PromptId::BackupReminder => "It has been a while since your last backup.",
    }
}

fn parse_answer(line: &str) -> DismissAction {
    match line.trim().to_ascii_lowercase().as_str() {
        "a" | "accept" | "y" | "yes" => DismissAction::Accepted,
        "d" | "decline" | "n" | "no" => DismissAction::Declined,
        _ => DismissAction::Closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::{Signal, SignalKind};

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("a"), DismissAction::Accepted);
        assert_eq!(parse_answer(" Yes \n"), DismissAction::Accepted);
        assert_eq!(parse_answer("d"), DismissAction::Declined);
        assert_eq!(parse_answer(""), DismissAction::Closed);
        assert_eq!(parse_answer("later"), DismissAction::Closed);
    }

    #[test]
    fn test_every_prompt_has_body() {
        for prompt in PromptId::ALL {
            assert!(!body(prompt).is_empty());
        }
    }

    #[tokio::test]
    async fn test_auto_dismiss_emits_protocol_signals() {
        let bus = SignalBus::new();
        let mut rx = bus.subscribe();
        let presenter = ConsolePresenter::new(bus.clone())
            .with_auto_dismiss(Duration::from_millis(1), DismissAction::Declined);

        presenter
            .present(PromptId::RateApp, ContextToken::new("test"))
            .await
            .unwrap();

        let mut signals = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            signals.push(envelope.signal);
        }

        let kinds: Vec<_> = signals.iter().map(Signal::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SignalKind::Evaluate,
                SignalKind::Other,
                SignalKind::Other,
                SignalKind::Resume
            ]
        );
        assert!(matches!(
            signals[2],
            Signal::PromptDismissed {
                action: DismissAction::Declined,
                ..
            }
        ));
    }
}
