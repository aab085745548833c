use serde::{Deserialize, Serialize};

/// The eight intents the dialogue engine supports. Anything the classifier
/// cannot place lands on `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    BrowseProducts,
    AddToCart,
    RemoveFromCart,
    ViewCart,
    Checkout,
    GeneralInquiry,
    Greeting,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::BrowseProducts => "browse_products",
            Intent::AddToCart => "add_to_cart",
            Intent::RemoveFromCart => "remove_from_cart",
            Intent::ViewCart => "view_cart",
            Intent::Checkout => "checkout",
            Intent::GeneralInquiry => "general_inquiry",
            Intent::Greeting => "greeting",
            Intent::Unknown => "unknown",
        }
    }
}

/// Structured slot values extracted per turn. All optional; absence is a
/// valid state, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatEntities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl ChatEntities {
    /// Drops empty-string slots and zero quantities before persisting to chat
    /// history.
    pub fn sanitized(mut self) -> Self {
        let clean = |slot: &mut Option<String>| {
            if slot.as_deref().map_or(false, |s| s.trim().is_empty()) {
                *slot = None;
            }
        };
        clean(&mut self.product_name);
        clean(&mut self.category);
        clean(&mut self.size);
        clean(&mut self.color);
        if self.quantity == Some(0) {
            self.quantity = None;
        }
        self
    }
}

/// Classifier output for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub entities: ChatEntities,
    pub confidence: f32,
}

impl IntentResult {
    /// Degraded result used whenever the model call or its JSON cannot be
    /// used; never propagated as an error.
    pub fn fallback() -> Self {
        IntentResult {
            intent: Intent::Unknown,
            entities: ChatEntities::default(),
            confidence: 0.0,
        }
    }
}

/// Wire shape of the model's JSON reply; every field may be missing or null
/// and is defaulted during normalization.
#[derive(Debug, Deserialize)]
pub(crate) struct RawIntentResult {
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub entities: Option<ChatEntities>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl From<RawIntentResult> for IntentResult {
    fn from(raw: RawIntentResult) -> Self {
        IntentResult {
            intent: raw.intent.unwrap_or_default(),
            entities: raw.entities.unwrap_or_default(),
            confidence: raw.confidence.filter(|c| *c > 0.0).unwrap_or(0.5),
        }
    }
}
