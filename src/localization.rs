//! # Localization Module
//!
//! Fluent bundles for every user-facing string. Resources are compiled into the
//! binary so the bot does not depend on its working directory.

use anyhow::Result;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::warn;
use unic_langid::LanguageIdentifier;

pub const DEFAULT_LANGUAGE: &str = "en";

const RESOURCES: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en/main.ftl")),
    ("ru", include_str!("../locales/ru/main.ftl")),
];

/// Localization manager for the bot
pub struct LocalizationManager {
    bundles: HashMap<String, Arc<FluentBundle<FluentResource>>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every shipped language loaded
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (language, source) in RESOURCES {
            let locale: LanguageIdentifier = language.parse()?;
            let bundle = Self::create_bundle(&locale, source)?;
            bundles.insert(language.to_string(), Arc::new(bundle));
        }

        Ok(Self { bundles })
    }

    fn create_bundle(locale: &LanguageIdentifier, source: &str) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Telegram renders the Unicode isolation marks literally
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow::anyhow!("Invalid Fluent resource for {locale}: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow::anyhow!("Duplicate Fluent messages for {locale}: {errors:?}"))?;

        Ok(bundle)
    }

    /// Map a Telegram language code (`ru`, `en-US`, ...) to a loaded language
    pub fn resolve_language(&self, language_code: Option<&str>) -> &str {
        language_code
            .and_then(|code| code.split(['-', '_']).next())
            .map(|primary| primary.to_lowercase())
            .and_then(|primary| self.bundles.get_key_value(primary.as_str()))
            .map(|(language, _)| language.as_str())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    /// Get a localized message in a specific language, falling back to English
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match bundle.get_message(key).and_then(|msg| msg.value()) {
            Some(pattern) => pattern,
            None => {
                warn!(key, language, "Missing translation");
                return format!("Missing translation: {key}");
            }
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            warn!(key, language, errors = ?errors, "Fluent formatting errors");
        }

        value.into_owned()
    }

    /// Whether `text` equals the message `key` in any loaded language
    pub fn matches_any_language(&self, key: &str, text: &str) -> bool {
        let text = text.trim();
        self.bundles
            .keys()
            .any(|language| self.get_message_in_language(key, language, None) == text)
    }
}

static LOCALIZATION_MANAGER: LazyLock<LocalizationManager> = LazyLock::new(|| {
    LocalizationManager::new().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load localization resources");
        LocalizationManager {
            bundles: HashMap::new(),
        }
    })
});

/// Get the global localization manager
pub fn get_localization_manager() -> &'static LocalizationManager {
    &LOCALIZATION_MANAGER
}

/// Get a localized message for a Telegram language code
pub fn t_lang(key: &str, language_code: Option<&str>) -> String {
    let manager = get_localization_manager();
    let language = manager.resolve_language(language_code);
    manager.get_message_in_language(key, language, None)
}

/// Get a localized message with arguments for a Telegram language code
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language_code: Option<&str>) -> String {
    let manager = get_localization_manager();
    let language = manager.resolve_language(language_code);
    let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
    manager.get_message_in_language(key, language, Some(&args_map))
}
