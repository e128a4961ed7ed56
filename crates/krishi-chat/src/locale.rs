//! Active conversation language.

use std::sync::Arc;

use krishi_core::types::Locale;
use tokio::sync::watch;

/// Holds the single active [`Locale`] and notifies subscribers when it changes.
///
/// Clones share the same underlying value.
#[derive(Debug, Clone)]
pub struct LanguageSelector {
    tx: Arc<watch::Sender<Locale>>,
}

impl Default for LanguageSelector {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}

impl LanguageSelector {
    pub fn new(initial: Locale) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Currently active locale.
    pub fn get(&self) -> Locale {
        *self.tx.borrow()
    }

    /// Switch the active locale. Returns `true` if the value changed; setting
    /// the current locale again notifies nobody.
    pub fn set(&self, locale: Locale) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == locale {
                false
            } else {
                *current = locale;
                true
            }
        });
        if changed {
            tracing::debug!(locale = %locale, "Active locale changed");
        }
        changed
    }

    /// Receive change notifications. The current value counts as already seen.
    pub fn subscribe(&self) -> watch::Receiver<Locale> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_english() {
        assert_eq!(LanguageSelector::default().get(), Locale::English);
    }

    #[test]
    fn test_set_changes_value() {
        let selector = LanguageSelector::new(Locale::English);
        assert!(selector.set(Locale::Malayalam));
        assert_eq!(selector.get(), Locale::Malayalam);
    }

    #[test]
    fn test_set_same_value_is_not_a_change() {
        let selector = LanguageSelector::new(Locale::Malayalam);
        assert!(!selector.set(Locale::Malayalam));
    }

    #[test]
    fn test_clones_share_state() {
        let selector = LanguageSelector::new(Locale::English);
        let other = selector.clone();
        other.set(Locale::Malayalam);
        assert_eq!(selector.get(), Locale::Malayalam);
    }

    #[tokio::test]
    async fn test_subscriber_notified_on_change() {
        let selector = LanguageSelector::new(Locale::English);
        let mut rx = selector.subscribe();
        assert!(!rx.has_changed().unwrap());

        selector.set(Locale::Malayalam);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Locale::Malayalam);

        selector.set(Locale::Malayalam);
        assert!(!rx.has_changed().unwrap());
    }
}
