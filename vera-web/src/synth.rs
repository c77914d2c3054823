//! Answer synthesis: one grounded chat-completion call over the context.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::WebError;

/// Returned when the model call fails.
pub const SYNTHESIS_FALLBACK: &str = "I was unable to generate an answer right now.";

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author (`system`, `user`, `assistant`).
    pub role: String,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// A `system` message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_owned(),
            content: content.into(),
        }
    }

    /// A `user` message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            content: content.into(),
        }
    }
}

/// Sampling options forwarded to the model. `None` leaves the model default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    /// Maximum number of tokens to generate.
    pub max_tokens: Option<usize>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Nucleus sampling threshold.
    pub top_p: Option<f64>,
}

impl GenerationOptions {
    /// Options for the synthesis call under `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_tokens: (config.synthesis_max_tokens > 0).then_some(config.synthesis_max_tokens),
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

/// A chat-completion language model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete `messages`, returning the assistant's reply text.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Llm`] (or a transport error) if no reply could
    /// be produced.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &GenerationOptions,
    ) -> Result<String, WebError>;
}

/// Outcome of the synthesis step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesis {
    /// Cleaned model answer.
    Answer(String),
    /// The model call failed. [`SYNTHESIS_FALLBACK`] is shown instead.
    Fallback,
}

impl Synthesis {
    /// Text to show the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Answer(answer) => answer,
            Self::Fallback => SYNTHESIS_FALLBACK,
        }
    }
}

/// System instruction: caller persona first, then grounding rules.
pub fn system_instruction(system_prompt: &str, has_context: bool, today: &str) -> String {
    let mut parts = Vec::new();
    let persona = system_prompt.trim();
    if !persona.is_empty() {
        parts.push(persona.to_owned());
    }
    parts.push("Answer ONLY from the provided context. Do not invent facts.".to_owned());
    parts.push(
        "Give dates, numbers and names exactly as they appear in the context.".to_owned(),
    );
    parts.push(format!("Today's date is {today}."));
    if has_context {
        parts.push(
            "The context is not empty: give a short, substantive answer from its key facts. \
             Do not reply that no information was found when the context contains data."
                .to_owned(),
        );
    }
    parts.join(" ")
}

/// User message carrying the question and the assembled context.
pub fn user_message(query: &str, context: &str) -> String {
    format!("Question: {query}\nContext:\n{context}\n\nShort answer:")
}

/// Remove `<think>…</think>` blocks. An unclosed block discards the rest.
pub fn strip_think_blocks(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut remaining = text;
    while let Some(start) = remaining.find("<think>") {
        result.push_str(&remaining[..start]);
        match remaining[start..].find("</think>") {
            Some(end) => remaining = &remaining[start + end + "</think>".len()..],
            None => return result,
        }
    }
    result.push_str(remaining);
    result
}

/// Ask `llm` for a short answer to `query` grounded in `context`.
///
/// Never fails: a model error is logged and reported as
/// [`Synthesis::Fallback`].
pub async fn synthesize(
    query: &str,
    context: &str,
    system_prompt: &str,
    llm: &dyn ChatModel,
    config: &PipelineConfig,
) -> Synthesis {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    let messages = [
        ChatMessage::system(system_instruction(
            system_prompt,
            !context.trim().is_empty(),
            &today,
        )),
        ChatMessage::user(user_message(query, context)),
    ];
    let options = GenerationOptions::from_config(config);

    match llm.complete(&messages, &options).await {
        Ok(raw) => {
            let answer = strip_think_blocks(raw.trim()).trim().to_owned();
            tracing::trace!(chars = answer.chars().count(), "answer synthesised");
            Synthesis::Answer(answer)
        }
        Err(err) => {
            tracing::warn!(error = %err, "answer synthesis failed");
            Synthesis::Fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingModel {
        reply: Result<String, String>,
        seen: Mutex<Vec<(Vec<ChatMessage>, GenerationOptions)>>,
    }

    impl RecordingModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_owned()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err("backend down".to_owned()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            options: &GenerationOptions,
        ) -> Result<String, WebError> {
            self.seen
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((messages.to_vec(), *options));
            self.reply.clone().map_err(WebError::Llm)
        }
    }

    #[test]
    fn strip_think_blocks_removes_thinking() {
        assert_eq!(
            strip_think_blocks("Hello <think>reasoning here</think>World"),
            "Hello World"
        );
    }

    #[test]
    fn strip_think_blocks_no_blocks() {
        assert_eq!(strip_think_blocks("Hello World"), "Hello World");
    }

    #[test]
    fn strip_think_blocks_unclosed() {
        assert_eq!(strip_think_blocks("Hello <think>never ends"), "Hello ");
    }

    #[test]
    fn strip_think_blocks_multiple() {
        assert_eq!(
            strip_think_blocks("<think>a</think>One <think>b</think>Two"),
            "One Two"
        );
    }

    #[test]
    fn system_instruction_puts_persona_first() {
        let text = system_instruction("You are Vera.", true, "2024-05-01");
        assert!(text.starts_with("You are Vera. Answer ONLY from the provided context."));
        assert!(text.contains("Today's date is 2024-05-01."));
        assert!(text.contains("no information was found"));
    }

    #[test]
    fn empty_context_omits_no_information_rule() {
        let text = system_instruction("", false, "2024-05-01");
        assert!(text.starts_with("Answer ONLY"));
        assert!(!text.contains("no information was found"));
    }

    #[test]
    fn user_message_layout() {
        assert_eq!(
            user_message("who?", "[a.com] text"),
            "Question: who?\nContext:\n[a.com] text\n\nShort answer:"
        );
    }

    #[test]
    fn zero_max_tokens_means_unset() {
        let config = PipelineConfig {
            synthesis_max_tokens: 0,
            temperature: Some(0.2),
            ..Default::default()
        };
        let options = GenerationOptions::from_config(&config);
        assert_eq!(options.max_tokens, None);
        assert_eq!(options.temperature, Some(0.2));
        assert_eq!(
            GenerationOptions::from_config(&PipelineConfig::default()).max_tokens,
            Some(500)
        );
    }

    #[tokio::test]
    async fn answer_is_cleaned() {
        let model = RecordingModel::replying("  <think>hmm</think>\n Paris is the capital.  ");
        let result = synthesize(
            "capital of France",
            "[a.com] Paris",
            "You are Vera.",
            &model,
            &PipelineConfig::default(),
        )
        .await;
        assert_eq!(result, Synthesis::Answer("Paris is the capital.".into()));

        let seen = model.seen.lock().unwrap();
        let (messages, options) = &seen[0];
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.starts_with("Question: capital of France"));
        assert_eq!(options.max_tokens, Some(500));
    }

    #[tokio::test]
    async fn model_failure_yields_fallback() {
        let model = RecordingModel::failing();
        let result = synthesize("q", "ctx", "", &model, &PipelineConfig::default()).await;
        assert_eq!(result, Synthesis::Fallback);
        assert_eq!(result.text(), SYNTHESIS_FALLBACK);
    }
}
