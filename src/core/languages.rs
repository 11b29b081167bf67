//! Provider-specific language codes

use crate::core::models::ProviderKind;

/// Map a user-facing language code to the code a provider expects.
///
/// Unknown codes pass through unchanged.
pub fn normalize(provider: ProviderKind, code: &str) -> String {
    let mapped = match (provider, code) {
        (ProviderKind::Deepl, "en") => "EN-US",
        (ProviderKind::Deepl, "ch") => "ZH",
        (ProviderKind::Google, "ch") => "zh",
        _ => code,
    };
    mapped.to_string()
}

/// DeepL only accepts base languages as the source (`EN`, not `EN-US`)
pub fn deepl_source(code: &str) -> String {
    let normalized = normalize(ProviderKind::Deepl, code);
    normalized
        .split('-')
        .next()
        .unwrap_or_default()
        .to_uppercase()
}
