//! The three supported languages and their properties.
//!
//! A closed set: English, Korean, Khmer. Korean and Khmer carry a
//! grammaticalized formality register, which is what the polite/casual
//! toggle keys off.

/// A supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Korean,
    Khmer,
}

/// All supported languages, in UI order.
pub const ALL_LANGUAGES: [Language; 3] = [Language::English, Language::Korean, Language::Khmer];

impl Language {
    /// English display name, as used in model instructions.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Korean => "Korean",
            Language::Khmer => "Khmer",
        }
    }

    /// BCP-47 locale tag for the speech engines.
    pub fn locale_tag(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Korean => "ko-KR",
            Language::Khmer => "km-KH",
        }
    }

    /// Whether the language distinguishes polite and casual registers.
    pub fn supports_formality(&self) -> bool {
        matches!(self, Language::Korean | Language::Khmer)
    }

    /// Parse a language from a name or ISO code, case-insensitive.
    pub fn from_str_lc(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "korean" | "ko" => Ok(Language::Korean),
            "khmer" | "km" => Ok(Language::Khmer),
            _ => Err(format!("unknown language: '{s}'")),
        }
    }

    /// The next language in UI order, wrapping around. Used by the
    /// language-cycling keys.
    pub fn cycled(&self) -> Self {
        match self {
            Language::English => Language::Korean,
            Language::Korean => Language::Khmer,
            Language::Khmer => Language::English,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
