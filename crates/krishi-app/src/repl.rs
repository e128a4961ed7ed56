//! Interactive terminal chat.
//!
//! Reads lines from stdin and submits them to a local conversation. Replies
//! are printed by a separate task as they are appended, so typing is never
//! blocked by the simulated delay.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use krishi_chat::{ConversationEngine, IntentMatcher};
use krishi_core::config::KrishiConfig;
use krishi_core::events::ConversationEvent;
use krishi_core::types::{Locale, Message};

/// One line of terminal input.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand {
    /// `/lang <code>`: switch the conversation language.
    Lang(String),
    /// `/prompts`: list quick questions.
    Prompts,
    /// `/quit` or `/exit`.
    Quit,
    /// A bare number: send the quick question at that position (1-based).
    QuickPrompt(usize),
    /// Anything else is sent as a message.
    Message(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("/lang") {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return ReplCommand::Lang(rest.trim().to_string());
            }
        }
        match trimmed {
            "/prompts" => ReplCommand::Prompts,
            "/quit" | "/exit" => ReplCommand::Quit,
            _ => match trimmed.parse::<usize>() {
                Ok(n) if n > 0 => ReplCommand::QuickPrompt(n),
                _ => ReplCommand::Message(line.to_string()),
            },
        }
    }
}

fn print_message(message: &Message) {
    let label = if message.is_user() { "you" } else { "krishi" };
    println!("{}> {}", label, message.text);
}

fn print_prompts(engine: &ConversationEngine) {
    for (i, prompt) in engine.suggested_prompts().iter().enumerate() {
        println!("  {}. {}", i + 1, prompt);
    }
    println!("  ({})", engine.placeholder());
}

/// Run the terminal chat until `/quit` or end of input.
pub async fn run(config: &KrishiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = Arc::new(IntentMatcher::from_config(&config.chat)?);
    let engine = ConversationEngine::start(matcher, &config.chat, config.general.default_locale)?;

    for message in engine.history() {
        print_message(&message);
    }
    print_prompts(&engine);

    let mut events = engine.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ConversationEvent::MessageAppended { message, .. }) if !message.is_user() => {
                    print_message(&message);
                }
                Ok(ConversationEvent::LocaleChanged { locale, .. }) => {
                    println!("[{}]", locale.native_name());
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Terminal output fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match ReplCommand::parse(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Prompts => print_prompts(&engine),
            ReplCommand::Lang(code) => match code.parse::<Locale>() {
                Ok(locale) => {
                    engine.set_locale(locale);
                }
                Err(e) => eprintln!("{} (supported: en, ml)", e),
            },
            ReplCommand::QuickPrompt(n) => match engine.suggested_prompts().get(n - 1) {
                Some(prompt) => {
                    engine.submit(prompt);
                }
                None => eprintln!("No quick question #{}", n),
            },
            ReplCommand::Message(text) => {
                engine.submit(&text);
            }
        }
    }

    engine.wait_idle().await;
    drop(engine);
    printer.await?;
    Ok(())
}
