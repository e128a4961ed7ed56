//! Keyword intent matcher.
//!
//! Normalizes raw user input and walks the active locale's rule table in
//! declared order. The first rule with a keyword contained in the input
//! wins; otherwise the table's fallback response is returned.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use krishi_core::config::ChatConfig;
use krishi_core::types::Locale;

use crate::error::ChatError;
use crate::rules::RuleCatalog;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Trim, lowercase, and collapse internal whitespace runs to one space.
///
/// Lowercasing is Unicode-aware; scripts without case (Malayalam) pass
/// through unchanged.
pub fn normalize(input: &str) -> String {
    WHITESPACE_RE
        .replace_all(input.trim(), " ")
        .to_lowercase()
}

// =============================================================================
// Responder
// =============================================================================

/// Produces the reply text for one user message.
///
/// The rule-based [`IntentMatcher`] answers instantly. A remote backend would
/// implement this trait as well and rely on the scheduler's timeout.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, input: &str, locale: Locale) -> String;
}

// =============================================================================
// IntentMatcher
// =============================================================================

/// Outcome of classifying one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    /// Index of the matching rule, or `None` when the fallback answered.
    pub rule: Option<usize>,
    pub response: &'a str,
}

/// Pure keyword classifier over a validated [`RuleCatalog`].
#[derive(Debug, Clone, Default)]
pub struct IntentMatcher {
    catalog: RuleCatalog,
}

impl IntentMatcher {
    /// Create a matcher, validating the catalog first.
    pub fn new(catalog: RuleCatalog) -> Result<Self, ChatError> {
        Ok(Self {
            catalog: catalog.validated()?,
        })
    }

    /// Matcher over the catalog at `chat.rules_path`, or the built-in one.
    pub fn from_config(chat: &ChatConfig) -> Result<Self, ChatError> {
        match chat.rules_path.as_deref() {
            Some(path) => Self::new(RuleCatalog::load(std::path::Path::new(path))?),
            None => Ok(Self::default()),
        }
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Response text for `raw_input` in `locale`. Never empty.
    pub fn classify(&self, raw_input: &str, locale: Locale) -> &str {
        self.classify_detailed(raw_input, locale).response
    }

    /// Like [`classify`](Self::classify), also reporting which rule matched.
    pub fn classify_detailed(&self, raw_input: &str, locale: Locale) -> Classification<'_> {
        let normalized = normalize(raw_input);
        let table = self.catalog.table(locale);

        if !normalized.is_empty() {
            for (index, rule) in table.rules.iter().enumerate() {
                if rule.matches(&normalized) {
                    return Classification {
                        rule: Some(index),
                        response: &rule.response,
                    };
                }
            }
        }

        Classification {
            rule: None,
            response: &table.fallback,
        }
    }

    pub fn fallback(&self, locale: Locale) -> &str {
        &self.catalog.table(locale).fallback
    }

    pub fn welcome(&self, locale: Locale) -> &str {
        &self.catalog.table(locale).welcome
    }

    pub fn suggested_prompts(&self, locale: Locale) -> &[String] {
        &self.catalog.table(locale).prompts
    }

    pub fn placeholder(&self, locale: Locale) -> &str {
        &self.catalog.table(locale).placeholder
    }
}

#[async_trait]
impl Responder for IntentMatcher {
    async fn respond(&self, input: &str, locale: Locale) -> String {
        let classification = self.classify_detailed(input, locale);
        tracing::debug!(
            locale = %locale,
            rule = ?classification.rule,
            "Input classified"
        );
        classification.response.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{IntentRule, RuleTable};

    fn table(rules: Vec<IntentRule>, fallback: &str) -> RuleTable {
        RuleTable {
            rules,
            fallback: fallback.to_string(),
            welcome: "welcome".to_string(),
            prompts: vec![],
            placeholder: String::new(),
        }
    }

    fn scenario_matcher() -> IntentMatcher {
        IntentMatcher::new(RuleCatalog {
            english: table(vec![IntentRule::new(&["rice", "paddy"], "R1")], "F"),
            malayalam: table(vec![IntentRule::new(&["നെല്ല്"], "ML1")], "MF"),
        })
        .unwrap()
    }

    // ---- Normalization ----

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Best Time To Plant RICE?  "), "best time to plant rice?");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("brown\t\tplant \n hopper"), "brown plant hopper");
    }

    #[test]
    fn test_normalize_keeps_malayalam() {
        assert_eq!(normalize(" നെല്ല് കൃഷി "), "നെല്ല് കൃഷി");
    }

    // ---- Classification ----

    #[test]
    fn test_scenario_rice_matches_rule() {
        let m = scenario_matcher();
        assert_eq!(m.classify("Best time to plant rice?", Locale::English), "R1");
    }

    #[test]
    fn test_scenario_unknown_returns_fallback() {
        let m = scenario_matcher();
        assert_eq!(m.classify("xyz123", Locale::English), "F");
    }

    #[test]
    fn test_first_match_wins() {
        let m = IntentMatcher::new(RuleCatalog {
            english: table(
                vec![
                    IntentRule::new(&["coconut"], "first"),
                    IntentRule::new(&["rice"], "second"),
                    IntentRule::new(&["coconut", "rice"], "third"),
                ],
                "F",
            ),
            malayalam: table(vec![], "MF"),
        })
        .unwrap();

        let c = m.classify_detailed("rice after coconut", Locale::English);
        assert_eq!(c.response, "first");
        assert_eq!(c.rule, Some(0));
        assert_eq!(m.classify("just rice", Locale::English), "second");
    }

    #[test]
    fn test_fallback_reports_no_rule() {
        let m = scenario_matcher();
        let c = m.classify_detailed("bananas", Locale::English);
        assert_eq!(c.rule, None);
        assert_eq!(c.response, m.fallback(Locale::English));
    }

    #[test]
    fn test_locale_selects_table() {
        let m = scenario_matcher();
        assert_eq!(m.classify("നെല്ല് എപ്പോൾ നടണം", Locale::Malayalam), "ML1");
        assert_eq!(m.classify("നെല്ല് എപ്പോൾ നടണം", Locale::English), "F");
        assert_eq!(m.classify("rice", Locale::Malayalam), "MF");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let m = scenario_matcher();
        assert_eq!(m.classify("PADDY fields", Locale::English), "R1");
    }

    #[test]
    fn test_total_coverage() {
        let m = IntentMatcher::default();
        let inputs = [
            "",
            "   ",
            "rice",
            "?",
            "🌾🌾",
            "നെല്ല്",
            "a very long question about nothing in particular",
            "\u{0}",
        ];
        for locale in Locale::ALL {
            for input in inputs {
                assert!(!m.classify(input, locale).is_empty(), "{:?} / {}", input, locale);
            }
        }
    }

    #[test]
    fn test_empty_input_returns_fallback() {
        let m = scenario_matcher();
        assert_eq!(m.classify("   ", Locale::English), "F");
    }

    #[test]
    fn test_classify_is_deterministic() {
        let m = IntentMatcher::default();
        let a = m.classify("How to prevent coconut diseases?", Locale::English).to_string();
        let b = m.classify("How to prevent coconut diseases?", Locale::English).to_string();
        assert_eq!(a, b);
    }

    // ---- Built-in catalog ----

    #[test]
    fn test_builtin_english_rules() {
        let m = IntentMatcher::default();
        assert!(m.classify("Best time to plant rice in Kerala?", Locale::English).starts_with("Rice cultivation"));
        assert!(m.classify("How to prevent coconut diseases?", Locale::English).starts_with("Coconut palms"));
        assert!(m.classify("spice garden", Locale::English).starts_with("Black pepper"));
        assert!(m.classify("Current weather suitable for planting?", Locale::English).starts_with("Kerala receives"));
        assert_eq!(
            m.classify("Organic fertilizer recommendations", Locale::English),
            m.fallback(Locale::English)
        );
    }

    #[test]
    fn test_builtin_malayalam_accepts_latin_keyword() {
        let m = IntentMatcher::default();
        let native = m.classify("നെല്ല്", Locale::Malayalam);
        let latin = m.classify("rice", Locale::Malayalam);
        assert_eq!(native, latin);
        assert_ne!(native, m.fallback(Locale::Malayalam));
    }

    #[test]
    fn test_builtin_prompts_and_placeholder() {
        let m = IntentMatcher::default();
        assert_eq!(m.suggested_prompts(Locale::English)[0], "Best time to plant rice in Kerala?");
        assert!(m.placeholder(Locale::Malayalam).ends_with("..."));
        assert!(m.welcome(Locale::English).starts_with("Hello!"));
    }

    #[test]
    fn test_from_config_without_rules_path_uses_builtin() {
        let m = IntentMatcher::from_config(&ChatConfig::default()).unwrap();
        assert_eq!(m.catalog(), &RuleCatalog::builtin());
    }

    #[test]
    fn test_from_config_bad_rules_path() {
        let chat = ChatConfig {
            rules_path: Some("/nonexistent/rules.toml".to_string()),
            ..ChatConfig::default()
        };
        assert!(IntentMatcher::from_config(&chat).is_err());
    }

    #[tokio::test]
    async fn test_responder_returns_classification() {
        let m = scenario_matcher();
        assert_eq!(m.respond("paddy", Locale::English).await, "R1");
        assert_eq!(m.respond("nothing", Locale::Malayalam).await, "MF");
    }
}
