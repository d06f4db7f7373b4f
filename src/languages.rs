//! Supported languages and code-to-name resolution.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { code: "es-ES", name: "Spanish" },
    Language { code: "en-US", name: "English" },
    Language { code: "fr-FR", name: "French" },
    Language { code: "de-DE", name: "German" },
    Language { code: "it-IT", name: "Italian" },
    Language { code: "pt-BR", name: "Portuguese" },
    Language { code: "ja-JP", name: "Japanese" },
    Language { code: "ko-KR", name: "Korean" },
    Language { code: "zh-CN", name: "Chinese (Mandarin)" },
    Language { code: "ru-RU", name: "Russian" },
    Language { code: "hi-IN", name: "Hindi" },
    Language { code: "ar-SA", name: "Arabic" },
];

pub const UNKNOWN_LANGUAGE: &str = "Unknown";

pub fn find(code: &str) -> Option<&'static Language> {
    LANGUAGES
        .iter()
        .find(|lang| lang.code.eq_ignore_ascii_case(code.trim()))
}

/// Human-readable name for a language code, `"Unknown"` when unlisted.
pub fn display_name(code: &str) -> &'static str {
    find(code).map(|lang| lang.name).unwrap_or(UNKNOWN_LANGUAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_resolves_known_codes() {
        assert_eq!(display_name("es-ES"), "Spanish");
        assert_eq!(display_name("en-us"), "English");
    }

    #[test]
    fn test_display_name_unknown_code() {
        assert_eq!(display_name("xx-XX"), UNKNOWN_LANGUAGE);
        assert_eq!(display_name(""), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in LANGUAGES.iter().enumerate() {
            for b in &LANGUAGES[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}
