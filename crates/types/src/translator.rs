//! Translation engines and the per-engine progress counters.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The translation engines whose output is tracked per chapter.
///
/// Every per-engine field in the data model is keyed by this enum, so adding
/// an engine only means adding a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Translator {
    /// Baidu machine translation API.
    Baidu,
    /// Youdao machine translation API.
    Youdao,
    /// General purpose LLM.
    Gpt,
    /// Community translation model.
    Sakura,
}

impl Translator {
    pub const ALL: [Translator; 4] = [
        Translator::Baidu,
        Translator::Youdao,
        Translator::Gpt,
        Translator::Sakura,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baidu => "baidu",
            Self::Youdao => "youdao",
            Self::Gpt => "gpt",
            Self::Sakura => "sakura",
        }
    }
}

impl std::fmt::Display for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTranslator(pub String);

impl std::fmt::Display for UnknownTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown translator: {}", self.0)
    }
}

impl std::error::Error for UnknownTranslator {}

impl FromStr for Translator {
    type Err = UnknownTranslator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownTranslator(s.to_string()))
    }
}

/// Which chapter field a completion count is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountTarget {
    /// Chapters holding original-language text.
    Original,
    /// Chapters holding a translation from the given engine.
    Translator(Translator),
}

impl std::fmt::Display for CountTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Original => f.write_str("jp"),
            Self::Translator(t) => f.write_str(t.as_str()),
        }
    }
}

/// Number of chapters stored per language/engine for one novel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationCounts {
    pub jp: u32,
    #[serde(default)]
    pub translated: BTreeMap<Translator, u32>,
}

impl TranslationCounts {
    pub fn get(&self, target: CountTarget) -> u32 {
        match target {
            CountTarget::Original => self.jp,
            CountTarget::Translator(t) => self.translated.get(&t).copied().unwrap_or(0),
        }
    }

    pub fn set(&mut self, target: CountTarget, value: u32) {
        match target {
            CountTarget::Original => self.jp = value,
            CountTarget::Translator(t) => {
                self.translated.insert(t, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translator_parsing() {
        assert_eq!("gpt".parse::<Translator>().unwrap(), Translator::Gpt);
        assert_eq!("Sakura".parse::<Translator>().unwrap(), Translator::Sakura);
        assert!("deepl".parse::<Translator>().is_err());
    }

    #[test]
    fn test_counts_default_to_zero() {
        let mut counts = TranslationCounts::default();
        assert_eq!(counts.get(CountTarget::Translator(Translator::Youdao)), 0);

        counts.set(CountTarget::Translator(Translator::Youdao), 7);
        counts.set(CountTarget::Original, 12);
        assert_eq!(counts.get(CountTarget::Translator(Translator::Youdao)), 7);
        assert_eq!(counts.get(CountTarget::Original), 12);
        assert_eq!(counts.get(CountTarget::Translator(Translator::Baidu)), 0);
    }
}
