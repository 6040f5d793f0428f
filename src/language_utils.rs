//! Locale tag utilities
//!
//! A language row stores a locale tag such as `en-US` or `cmn-Hans-CN`.
//! Only the primary subtag is checked against ISO 639; region and script
//! subtags are passed through to the synthesis voice untouched.

use isolang::Language;

use crate::errors::{AppError, AppResult};

/// ISO 639-2/B codes that differ from their 639-2/T counterparts
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Lower-cased primary subtag of a locale tag (`en-US` -> `en`)
pub fn primary_subtag(locale: &str) -> String {
    locale
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Resolve the language named by a locale tag's primary subtag
pub fn resolve_locale(locale: &str) -> AppResult<Language> {
    let code = primary_subtag(locale);

    let language = match code.len() {
        2 => Language::from_639_1(&code),
        3 => {
            let part2t = PART2B_TO_PART2T
                .iter()
                .find(|(b, _)| *b == code)
                .map(|(_, t)| *t)
                .unwrap_or(code.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    };

    language.ok_or_else(|| AppError::Validation(format!("Invalid language code: {}", locale)))
}

/// Validate a locale tag; empty tags and unknown primary subtags are rejected
pub fn validate_locale(locale: &str) -> AppResult<()> {
    if locale.trim().is_empty() {
        return Err(AppError::Validation("language code must not be empty".into()));
    }
    resolve_locale(locale).map(|_| ())
}

/// English name of the language behind a locale tag
pub fn language_name(locale: &str) -> AppResult<String> {
    Ok(resolve_locale(locale)?.to_name().to_string())
}
