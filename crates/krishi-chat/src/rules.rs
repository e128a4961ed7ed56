//! Intent rule tables, one per locale.
//!
//! Each [`RuleTable`] holds an ordered list of keyword rules plus a mandatory
//! fallback response. The fallback is a dedicated field rather than a list
//! entry, so it is always consulted last and can never go missing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use krishi_core::types::Locale;

use crate::error::ChatError;
use crate::matcher::normalize;

// =============================================================================
// IntentRule / RuleTable
// =============================================================================

/// A keyword set paired with the response it triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRule {
    /// Normalized keywords. The rule matches when any of them occurs in the
    /// normalized input.
    pub keywords: Vec<String>,
    pub response: String,
}

impl IntentRule {
    pub fn new(keywords: &[&str], response: impl Into<String>) -> Self {
        Self {
            keywords: keywords.iter().map(|k| normalize(k)).collect(),
            response: response.into(),
        }
    }

    /// Whether any keyword is a substring of `normalized_input`.
    pub fn matches(&self, normalized_input: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| normalized_input.contains(keyword.as_str()))
    }
}

/// Ordered rules and static copy for a single locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    /// Checked in order; the first match wins.
    #[serde(default)]
    pub rules: Vec<IntentRule>,
    /// Returned when no rule matches.
    pub fallback: String,
    /// First assistant message of a new conversation.
    pub welcome: String,
    /// Quick questions offered to the user. Display only.
    #[serde(default)]
    pub prompts: Vec<String>,
    /// Hint shown in an empty input box. Display only.
    #[serde(default)]
    pub placeholder: String,
}

impl RuleTable {
    /// Normalize keywords and reject tables that could produce an empty
    /// response or match every input by accident.
    fn validated(mut self, locale: Locale) -> Result<Self, ChatError> {
        let invalid = |reason: String| ChatError::InvalidRuleTable { locale, reason };

        if self.fallback.trim().is_empty() {
            return Err(invalid("fallback response is empty".to_string()));
        }
        if self.welcome.trim().is_empty() {
            return Err(invalid("welcome message is empty".to_string()));
        }

        for (index, rule) in self.rules.iter_mut().enumerate() {
            if rule.keywords.is_empty() {
                return Err(invalid(format!("rule {} has no keywords", index)));
            }
            if rule.response.trim().is_empty() {
                return Err(invalid(format!("rule {} has an empty response", index)));
            }
            for keyword in rule.keywords.iter_mut() {
                *keyword = normalize(keyword);
                if keyword.is_empty() {
                    return Err(invalid(format!("rule {} has a blank keyword", index)));
                }
            }
        }

        Ok(self)
    }
}

// =============================================================================
// RuleCatalog
// =============================================================================

/// One [`RuleTable`] per supported locale.
///
/// Tables are distinct fields, so adding a [`Locale`] variant fails to compile
/// until [`RuleCatalog::table`] handles it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCatalog {
    #[serde(rename = "en")]
    pub english: RuleTable,
    #[serde(rename = "ml")]
    pub malayalam: RuleTable,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleCatalog {
    /// Table for `locale`.
    pub fn table(&self, locale: Locale) -> &RuleTable {
        match locale {
            Locale::English => &self.english,
            Locale::Malayalam => &self.malayalam,
        }
    }

    /// Normalize and validate every table.
    pub fn validated(self) -> Result<Self, ChatError> {
        Ok(Self {
            english: self.english.validated(Locale::English)?,
            malayalam: self.malayalam.validated(Locale::Malayalam)?,
        })
    }

    /// Parse a TOML catalog and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ChatError> {
        let catalog: RuleCatalog = toml::from_str(content)
            .map_err(|e| ChatError::Config(format!("rule catalog: {}", e)))?;
        catalog.validated()
    }

    /// Load a TOML catalog from disk.
    pub fn load(path: &Path) -> Result<Self, ChatError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ChatError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            en_rules = catalog.english.rules.len(),
            ml_rules = catalog.malayalam.rules.len(),
            "Rule catalog loaded"
        );
        Ok(catalog)
    }

    /// Catalog shipped with the assistant.
    pub fn builtin() -> Self {
        Self {
            english: RuleTable {
                rules: vec![
                    IntentRule::new(
                        &["rice", "paddy"],
                        "Rice cultivation in Kerala is best during the monsoon season. Ensure proper water management, use disease-resistant varieties, and apply organic fertilizers. Watch out for blast disease and brown plant hopper.",
                    ),
                    IntentRule::new(
                        &["coconut"],
                        "Coconut palms thrive in Kerala's coastal climate. Regular watering, proper fertilization with organic matter, and pest control are essential. Watch for red palm weevil and apply neem-based treatments.",
                    ),
                    IntentRule::new(
                        &["pepper", "spice"],
                        "Black pepper grows well in Kerala's hill regions. Ensure good drainage, provide support structures, and maintain proper spacing. Apply organic compost and watch for quick wilt disease.",
                    ),
                    IntentRule::new(
                        &["weather", "rain"],
                        "Kerala receives heavy monsoon rains from June to September. Plan your planting accordingly, ensure proper drainage, and protect crops during heavy rainfall periods.",
                    ),
                ],
                fallback: "I can help you with information about crops, weather, diseases, fertilizers, and farming techniques specific to Kerala. Please ask me a specific question about farming.".to_string(),
                welcome: "Hello! I'm your AI farming assistant. Ask me anything about crops, weather, diseases, or farming techniques in Kerala.".to_string(),
                prompts: vec![
                    "Best time to plant rice in Kerala?".to_string(),
                    "How to prevent coconut diseases?".to_string(),
                    "Current weather suitable for planting?".to_string(),
                    "Organic fertilizer recommendations".to_string(),
                ],
                placeholder: "Ask your farming question...".to_string(),
            },
            malayalam: RuleTable {
                rules: vec![IntentRule::new(
                    &["നെല്ല്", "rice"],
                    "നെല്ല് കൃഷിക്ക് കേരളത്തിലെ കാലാവസ്ഥ വളരെ അനുകൂലമാണ്. മൺസൂൺ സമയത്ത് നടീൽ നടത്തുകയും, ശരിയായ വളപ്രയോഗം നടത്തുകയും ചെയ്യുക. രോഗ നിയന്ത്രണത്തിന് ജൈവ കീടനാശിനികൾ ഉപയോഗിക്കുക.",
                )],
                fallback: "നിങ്ങളുടെ ചോദ്യത്തിന് കൂടുതൽ വിവരങ്ങൾ ആവശ്യമാണ്. ദയവായി കൂടുതൽ വിശദമായി ചോദിക്കുക.".to_string(),
                welcome: "ഹലോ! ഞാൻ നിങ്ങളുടെ AI കൃഷി സഹായിയാണ്. കേരളത്തിലെ വിളകൾ, കാലാവസ്ഥ, രോഗങ്ങൾ, അല്ലെങ്കിൽ കൃഷി സാങ്കേതികതകൾ എന്നിവയെക്കുറിച്ച് എന്തും ചോദിക്കുക.".to_string(),
                prompts: vec![
                    "കേരളത്തിൽ നെല്ല് നടാൻ ഏറ്റവും നല്ല സമയം ഏത്?".to_string(),
                    "തെങ്ങിന്റെ രോഗങ്ങൾ എങ്ങനെ തടയാം?".to_string(),
                    "ഇപ്പോഴത്തെ കാലാവസ്ഥ നടീലിന് അനുയോജ്യമാണോ?".to_string(),
                    "ജൈവ വള ശുപാർശകൾ".to_string(),
                ],
                placeholder: "നിങ്ങളുടെ കൃഷി ചോദ്യം ചോദിക്കുക...".to_string(),
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
