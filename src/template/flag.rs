//! Regional-indicator flags for country codes.

/// Offset from an ASCII uppercase letter to its regional indicator symbol.
const REGIONAL_INDICATOR_OFFSET: u32 = 0x1F1E6 - 'A' as u32;

/// What: Build the flag emoji for a two-letter country code.
///
/// Inputs:
/// - `country_code`: ISO 3166-1 alpha-2 code, any case (e.g. `"de"`)
///
/// Output:
/// - Two regional indicator symbols (`"🇩🇪"`), or an empty string when the
///   code is not exactly two ASCII letters
#[must_use]
pub fn country_flag(country_code: &str) -> String {
    let code = country_code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return String::new();
    }
    code.chars()
        .filter_map(|c| char::from_u32(c.to_ascii_uppercase() as u32 + REGIONAL_INDICATOR_OFFSET))
        .collect()
}
