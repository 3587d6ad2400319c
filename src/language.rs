use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Code of the synthetic source entry that asks for automatic detection.
pub const AUTO_CODE: &str = "auto";
pub const AUTO_NAME: &str = "Auto Detect";

/// Target selected after the catalog is populated, when present.
pub const DEFAULT_TARGET: &str = "es";

/// A language offered for translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl Language {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    pub fn auto() -> Self {
        Self::new(AUTO_CODE, AUTO_NAME)
    }

    pub fn is_auto(&self) -> bool {
        self.code == AUTO_CODE
    }
}

const FALLBACK: [(&str, &str); 19] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("sr", "Serbian"),
    ("hr", "Croatian"),
    ("bs", "Bosnian"),
    ("nl", "Dutch"),
    ("el", "Greek"),
    ("pl", "Polish"),
    ("tr", "Turkish"),
];

/// Built-in languages used when the remote catalog is unavailable.
pub fn fallback_languages() -> Vec<Language> {
    FALLBACK
        .iter()
        .map(|(code, name)| Language::new(*code, *name))
        .collect()
}

/// Compare display names the way a UI collator would: accents and case
/// are ignored first, the raw string breaks ties.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Primary sort key: canonical decomposition with combining marks removed,
/// letters that have no decomposition spelled out, then lowercased.
pub fn collation_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    for c in name.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'Æ' | 'æ' => key.push_str("ae"),
            'Œ' | 'œ' => key.push_str("oe"),
            'Ø' | 'ø' => key.push('o'),
            'Ł' | 'ł' => key.push('l'),
            'Đ' | 'đ' | 'Ð' | 'ð' => key.push('d'),
            'Þ' | 'þ' => key.push_str("th"),
            'ß' => key.push_str("ss"),
            'ı' => key.push('i'),
            other => key.extend(other.to_lowercase()),
        }
    }
    key
}

/// Sort by display name and drop entries without a code.
pub fn sorted_by_name(languages: Vec<Language>) -> Vec<Language> {
    let mut languages: Vec<Language> = languages
        .into_iter()
        .filter(|lang| !lang.code.is_empty())
        .collect();
    languages.sort_by(|a, b| compare_names(&a.name, &b.name));
    languages
}
