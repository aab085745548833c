use anyhow::{anyhow, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::error;

use crate::chat::intent::{ChatEntities, Intent, IntentResult, RawIntentResult};
use crate::prompts::Prompts;

/// Classification boundary. Implementations must never fail a turn: any
/// upstream problem degrades to `IntentResult::fallback()` or `None`.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, message: &str, context: &str) -> IntentResult;

    /// Free-form answer for general inquiries; `None` when the backing
    /// service is unavailable so the dispatcher can substitute canned text.
    async fn answer(&self, message: &str) -> Option<String>;
}

/// Classifier backed by an OpenAI-compatible inference API (Groq).
pub struct GroqClassifier {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GroqClassifier {
    pub fn new(api_key: &str, api_base: &str, model: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        GroqClassifier {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    async fn classify_inner(&self, message: &str, context: &str) -> Result<IntentResult> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.1)
            .max_tokens(300u16)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(Prompts::INTENT_SYSTEM)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(Prompts::intent_analysis(message, context))
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow!("No response from model"))?;

        parse_intent_response(&content)
    }

    async fn answer_inner(&self, message: &str) -> Result<Option<String>> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.7)
            .max_tokens(200u16)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(Prompts::INQUIRY_SYSTEM)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(Prompts::general_inquiry(message))
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;
        Ok(response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|text| !text.trim().is_empty()))
    }
}

#[async_trait]
impl IntentClassifier for GroqClassifier {
    async fn classify(&self, message: &str, context: &str) -> IntentResult {
        match self.classify_inner(message, context).await {
            Ok(result) => result,
            Err(e) => {
                error!("Intent analysis error: {:?}", e);
                IntentResult::fallback()
            }
        }
    }

    async fn answer(&self, message: &str) -> Option<String> {
        match self.answer_inner(message).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("General inquiry error: {:?}", e);
                None
            }
        }
    }
}

/// Parses the model's JSON reply, tolerating prose or code fences around the
/// object. Malformed JSON is an error (the caller degrades to the fallback);
/// missing fields inside valid JSON take defaults.
pub(crate) fn parse_intent_response(content: &str) -> Result<IntentResult> {
    let json = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => &content[start..=end],
        _ => content,
    };
    let raw: RawIntentResult = serde_json::from_str(json)?;
    Ok(raw.into())
}

const COLOR_WORDS: &[&str] = &[
    "black", "white", "red", "blue", "green", "brown", "grey", "gray", "pink", "purple",
    "yellow", "orange", "beige", "navy", "tan",
];

/// Rule-based classifier for tests and offline operation. Intent detection is
/// keyword driven; entity extraction is limited to size and color, product
/// names remain the model's job.
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn classify_message(message: &str) -> IntentResult {
        let lower = message.to_lowercase();
        let first_word: String = lower
            .split_whitespace()
            .next()
            .unwrap_or("")
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();

        let intent = if matches!(first_word.as_str(), "hello" | "hi" | "hey" | "greetings") {
            Intent::Greeting
        } else if lower.contains("checkout")
            || lower.contains("check out")
            || lower.contains("place order")
            || lower.contains("ready to buy")
        {
            Intent::Checkout
        } else if lower.contains("remove") || lower.contains("delete") {
            Intent::RemoveFromCart
        } else if lower.contains("cart")
            && (lower.contains("view") || lower.contains("show") || lower.contains("what"))
        {
            Intent::ViewCart
        } else if lower.contains("add") || lower.contains("i want") {
            Intent::AddToCart
        } else if lower.contains("show")
            || lower.contains("looking for")
            || lower.contains("do you have")
            || lower.contains("i need")
        {
            Intent::BrowseProducts
        } else {
            Intent::Unknown
        };

        let confidence = if intent == Intent::Unknown { 0.3 } else { 0.9 };

        IntentResult {
            intent,
            entities: Self::extract_entities(&lower),
            confidence,
        }
    }

    fn extract_entities(lower: &str) -> ChatEntities {
        let tokens: Vec<&str> = lower.split_whitespace().collect();
        let mut entities = ChatEntities::default();

        for (i, token) in tokens.iter().enumerate() {
            if *token == "size" {
                if let Some(next) = tokens.get(i + 1) {
                    let cleaned: String = next
                        .chars()
                        .filter(|c| c.is_ascii_digit() || *c == '.')
                        .collect();
                    if !cleaned.is_empty() {
                        entities.size = Some(cleaned);
                    }
                }
            }
        }

        for color in COLOR_WORDS {
            let found = tokens.iter().any(|t| {
                t.trim_matches(|c: char| !c.is_ascii_alphanumeric()) == *color
            });
            if found {
                entities.color = Some((*color).to_string());
                break;
            }
        }

        entities
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, message: &str, _context: &str) -> IntentResult {
        Self::classify_message(message)
    }

    async fn answer(&self, _message: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_clean_json_reply() {
        let result = parse_intent_response(
            r#"{"intent":"browse_products","entities":{"category":"boots"},"confidence":0.8}"#,
        )
        .unwrap();
        assert_eq!(result.intent, Intent::BrowseProducts);
        assert_eq!(result.entities.category.as_deref(), Some("boots"));
    }

    #[test]
    fn parses_a_fenced_json_reply() {
        let content = "Here you go:\n```json\n{\"intent\":\"greeting\"}\n```";
        let result = parse_intent_response(content).unwrap();
        assert_eq!(result.intent, Intent::Greeting);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn malformed_reply_is_an_error() {
        assert!(parse_intent_response("I think they want boots").is_err());
        assert!(parse_intent_response("{not json").is_err());
    }

    #[tokio::test]
    async fn groq_classifier_degrades_to_fallback_on_transport_failure() {
        let classifier = GroqClassifier::new("test-key", "http://127.0.0.1:9", "test-model");
        let result = classifier.classify("show me boots", "").await;
        assert_eq!(result.intent, Intent::Unknown);
        assert_eq!(result.confidence, 0.0);
        assert!(classifier.answer("do you ship overseas?").await.is_none());
    }

    #[tokio::test]
    async fn keyword_classifier_maps_common_phrasings() {
        let c = KeywordClassifier;
        assert_eq!(c.classify("Hello there!", "").await.intent, Intent::Greeting);
        assert_eq!(
            c.classify("show me running shoes", "").await.intent,
            Intent::BrowseProducts
        );
        assert_eq!(
            c.classify("add the air max to my cart", "").await.intent,
            Intent::AddToCart
        );
        assert_eq!(
            c.classify("remove the boots", "").await.intent,
            Intent::RemoveFromCart
        );
        assert_eq!(
            c.classify("what's in my cart", "").await.intent,
            Intent::ViewCart
        );
        assert_eq!(
            c.classify("I'm ready to buy", "").await.intent,
            Intent::Checkout
        );
        assert_eq!(c.classify("zzz", "").await.intent, Intent::Unknown);
    }

    #[tokio::test]
    async fn keyword_classifier_extracts_size_and_color() {
        let c = KeywordClassifier;
        let result = c.classify("Add Nike Air Max in black size 9", "").await;
        assert_eq!(result.intent, Intent::AddToCart);
        assert_eq!(result.entities.size.as_deref(), Some("9"));
        assert_eq!(result.entities.color.as_deref(), Some("black"));
    }
}
