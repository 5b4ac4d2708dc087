//! Localized user-facing messages.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

pub const ERROR_TITLE: &str = "general.error.title";
pub const ERROR_DESCRIPTION: &str = "general.error.desc";
pub const ERROR_UNAUTHORIZED: &str = "general.error.unauthorized";
pub const FALLBACK_NOTICE: &str = "general.fallback";

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    En,
    Tr,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::En, Self::Tr];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Tr => "tr",
        }
    }

    /// Regional variant sent as `Accept-Language`.
    pub const fn variant(self) -> &'static str {
        match self {
            Self::En => "en-US",
            Self::Tr => "tr-TR",
        }
    }

    /// Exact stored key, `en` or `tr`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|language| language.as_str() == key)
    }

    /// Lenient match for user input: case-insensitive, region suffix ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let key = value.trim().to_ascii_lowercase();
        let base = key.split(['-', '_']).next().unwrap_or_default();
        Self::ALL.into_iter().find(|language| language.as_str() == base)
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Accept-Language` value for a stored language key. Only exact `en` and
/// `tr` have a variant; any other stored key maps to `tr-TR`.
pub fn accept_language(stored: Option<&str>) -> &'static str {
    match stored {
        None => Language::default().variant(),
        Some(key) => Language::from_key(key).unwrap_or(Language::Tr).variant(),
    }
}

/// Resolves message keys to localized text.
pub trait Translator: Send + Sync {
    /// Returns the text for `key`, or the key itself when it is unknown.
    fn translate(&self, key: &str, language: Language) -> String;
}

/// Built-in message catalog for the dashboard.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    messages: HashMap<(Language, String), String>,
    fallback_language: Language,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty(Language::En);
        for (key, en, tr) in BUILTIN_MESSAGES {
            catalog.insert(Language::En, *key, *en);
            catalog.insert(Language::Tr, *key, *tr);
        }
        catalog
    }
}

impl MessageCatalog {
    pub fn empty(fallback_language: Language) -> Self {
        Self {
            messages: HashMap::new(),
            fallback_language,
        }
    }

    pub fn insert(&mut self, language: Language, key: impl Into<String>, text: impl Into<String>) {
        self.messages.insert((language, key.into()), text.into());
    }

    pub fn with(
        mut self,
        language: Language,
        key: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.insert(language, key, text);
        self
    }

    fn lookup(&self, key: &str, language: Language) -> Option<&str> {
        self.messages
            .get(&(language, key.to_owned()))
            .map(String::as_str)
    }
}

impl Translator for MessageCatalog {
    fn translate(&self, key: &str, language: Language) -> String {
        self.lookup(key, language)
            .or_else(|| self.lookup(key, self.fallback_language))
            .map_or_else(|| key.to_owned(), str::to_owned)
    }
}

const BUILTIN_MESSAGES: &[(&str, &str, &str)] = &[
    (ERROR_TITLE, "Something went wrong", "Bir hata oluştu"),
    (
        ERROR_DESCRIPTION,
        "The request could not be completed. Please try again.",
        "İstek tamamlanamadı. Lütfen tekrar deneyin.",
    ),
    (
        ERROR_UNAUTHORIZED,
        "Your session has expired. Please sign in again.",
        "Oturumunuzun süresi doldu. Lütfen tekrar giriş yapın.",
    ),
    (
        FALLBACK_NOTICE,
        "The server is unreachable. Showing offline data.",
        "Sunucuya ulaşılamıyor. Çevrimdışı veriler gösteriliyor.",
    ),
    (
        "dashboard.errors.customers",
        "Customers could not be loaded.",
        "Müşteriler yüklenemedi.",
    ),
    (
        "dashboard.errors.transactions",
        "Transactions could not be loaded.",
        "İşlemler yüklenemedi.",
    ),
    (
        "dashboard.errors.createCustomer",
        "The customer could not be saved.",
        "Müşteri kaydedilemedi.",
    ),
    (
        "dashboard.errors.updateLimit",
        "The wallet limits could not be updated.",
        "Cüzdan limitleri güncellenemedi.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_stored_keys_to_variants() {
        assert_eq!(accept_language(None), "en-US");
        assert_eq!(accept_language(Some("en")), "en-US");
        assert_eq!(accept_language(Some("tr")), "tr-TR");
        assert_eq!(accept_language(Some("de")), "tr-TR");
    }

    #[test]
    fn regional_or_cased_stored_keys_are_not_variants() {
        assert_eq!(accept_language(Some("en-GB")), "tr-TR");
        assert_eq!(accept_language(Some("en_US")), "tr-TR");
        assert_eq!(accept_language(Some("EN")), "tr-TR");
        assert_eq!(Language::parse("en-GB"), Some(Language::En));
    }

    #[test]
    fn translates_with_language_then_fallback_then_key() {
        let catalog = MessageCatalog::empty(Language::En)
            .with(Language::En, "only.en", "English only")
            .with(Language::Tr, "both", "İkisi")
            .with(Language::En, "both", "Both");

        assert_eq!(catalog.translate("both", Language::Tr), "İkisi");
        assert_eq!(catalog.translate("only.en", Language::Tr), "English only");
        assert_eq!(catalog.translate("missing.key", Language::Tr), "missing.key");
    }

    #[test]
    fn builtin_catalog_covers_both_languages() {
        let catalog = MessageCatalog::default();
        for (key, _, _) in BUILTIN_MESSAGES {
            assert_ne!(catalog.translate(key, Language::En), *key);
            assert_ne!(catalog.translate(key, Language::Tr), *key);
        }
        assert_ne!(
            catalog.translate(ERROR_UNAUTHORIZED, Language::En),
            catalog.translate(ERROR_DESCRIPTION, Language::En)
        );
    }
}
