use std::{collections::HashMap, sync::OnceLock};

use rust_embed::RustEmbed;
use tracing::warn;

use crate::domain::{Language, MessageKey};

/// Embed the `locales/` directory into the binary.
#[derive(RustEmbed)]
#[folder = "locales"]
struct EmbeddedLocales;

static PT_CATALOG: OnceLock<MessageCatalog> = OnceLock::new();
static EN_CATALOG: OnceLock<MessageCatalog> = OnceLock::new();

/// Key → text table for one language.
#[derive(Debug, Default)]
pub struct MessageCatalog {
    entries: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            entries: serde_json::from_str(raw)?,
        })
    }

    pub fn get(&self, key: MessageKey) -> Option<&str> {
        self.entries.get(key.as_ref()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the embedded catalog for `language`.
pub fn catalog(language: Language) -> &'static MessageCatalog {
    let cell = match language {
        Language::Pt => &PT_CATALOG,
        Language::En => &EN_CATALOG,
    };
    cell.get_or_init(|| load_catalog(language))
}

/// Text for `key`, falling back to the other language and then to the key.
pub fn text(language: Language, key: MessageKey) -> &'static str {
    catalog(language)
        .get(key)
        .or_else(|| catalog(language.toggled()).get(key))
        .unwrap_or_else(|| key.into())
}

fn load_catalog(language: Language) -> MessageCatalog {
    let path = format!("{}.json", language.code());
    let Some(file) = EmbeddedLocales::get(&path) else {
        warn!(%path, "embedded locale missing");
        return MessageCatalog::default();
    };
    let raw = String::from_utf8_lossy(file.data.as_ref());
    MessageCatalog::from_json(&raw).unwrap_or_else(|err| {
        warn!(%path, %err, "embedded locale is not valid JSON");
        MessageCatalog::default()
    })
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_key_has_text_in_both_languages() {
        for language in Language::iter() {
            let table = catalog(language);
            for key in MessageKey::iter() {
                assert!(
                    table.get(key).is_some_and(|text| !text.is_empty()),
                    "{language} catalog lacks {key}"
                );
            }
            assert_eq!(table.len(), MessageKey::iter().count());
        }
    }

    #[test]
    fn languages_differ() {
        assert_eq!(text(Language::Pt, MessageKey::GetQuote), "Obter Cotação");
        assert_eq!(text(Language::En, MessageKey::GetQuote), "Get Quote");
    }

    #[test]
    fn empty_catalog_has_no_entries() {
        let table = MessageCatalog::from_json("{}").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.get(MessageKey::Weight), None);
    }
}
