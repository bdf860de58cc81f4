// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const DEFAULT_LANG: &str = "es";

// Catálogos embutidos no binário; um arquivo plano por idioma.
const CATALOGS: [(&str, &str); 2] = [
    ("es", include_str!("../../locales/es.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// Mensagens traduzidas indexadas por idioma e chave (`error.not_found`, `validation.dni`...).
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load_embedded() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Catálogo de idioma '{}' inválido", lang))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs })
    }

    // Idioma pedido -> idioma padrão -> a própria chave
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Traduz e substitui os marcadores `{nome}` pelos argumentos.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.translate(lang, key), |message, (name, value)| {
            message.replace(&format!("{{{}}}", name), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogs_have_the_same_keys() {
        let store = I18nStore::load_embedded().unwrap();
        let es = &store.catalogs["es"];
        let en = &store.catalogs["en"];
        let mut missing: Vec<_> = es.keys().filter(|k| !en.contains_key(*k)).collect();
        missing.extend(en.keys().filter(|k| !es.contains_key(*k)));
        assert!(missing.is_empty(), "chaves sem tradução: {:?}", missing);
    }

    #[test]
    fn test_unknown_language_falls_back_to_spanish() {
        let store = I18nStore::load_embedded().unwrap();
        assert_eq!(
            store.translate("pt", "error.csrf"),
            store.translate("es", "error.csrf")
        );
    }

    #[test]
    fn test_unknown_key_is_returned_as_is() {
        let store = I18nStore::load_embedded().unwrap();
        assert_eq!(store.translate("es", "nao.existe"), "nao.existe");
    }

    #[test]
    fn test_placeholders_are_replaced() {
        let store = I18nStore::load_embedded().unwrap();
        let msg = store.translate_with("en", "error.not_found", &[("entity", "Lease")]);
        assert!(msg.contains("Lease"));
        assert!(!msg.contains("{entity}"));
    }
}
