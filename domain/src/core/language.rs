//! Response language selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language agents are instructed to answer in.
///
/// Unknown codes parse to [`Language::EnUs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "es-ES")]
    EsEs,
    #[serde(rename = "fr-FR")]
    FrFr,
    #[serde(rename = "de-DE")]
    DeDe,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::EnUs => "en-US",
            Language::PtBr => "pt-BR",
            Language::EsEs => "es-ES",
            Language::FrFr => "fr-FR",
            Language::DeDe => "de-DE",
        }
    }

    /// Instruction appended to every agent prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            Language::EnUs => "IMPORTANT: Respond ONLY in English.",
            Language::PtBr => "IMPORTANTE: Responda APENAS em português brasileiro.",
            Language::EsEs => "IMPORTANTE: Responde SOLO en español.",
            Language::FrFr => "IMPORTANT : Répondez UNIQUEMENT en français.",
            Language::DeDe => "WICHTIG: Antworten Sie NUR auf Deutsch.",
        }
    }

    pub fn all() -> &'static [Language] {
        &[
            Language::EnUs,
            Language::PtBr,
            Language::EsEs,
            Language::FrFr,
            Language::DeDe,
        ]
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "-").to_lowercase();
        let language = match normalized.as_str() {
            "pt-br" | "pt" => Language::PtBr,
            "es-es" | "es" => Language::EsEs,
            "fr-fr" | "fr" => Language::FrFr,
            "de-de" | "de" => Language::DeDe,
            _ => Language::EnUs,
        };
        Ok(language)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!("pt-BR".parse::<Language>().unwrap(), Language::PtBr);
        assert_eq!("pt_br".parse::<Language>().unwrap(), Language::PtBr);
        assert_eq!("es".parse::<Language>().unwrap(), Language::EsEs);
        assert_eq!("klingon".parse::<Language>().unwrap(), Language::EnUs);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Language::DeDe).unwrap();
        assert_eq!(json, "\"de-DE\"");
        let parsed: Language = serde_json::from_str("\"fr-FR\"").unwrap();
        assert_eq!(parsed, Language::FrFr);
    }
}
