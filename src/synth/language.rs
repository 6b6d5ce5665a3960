//! Languages understood by the synthesis engine.

use clap::ValueEnum;
use std::fmt;

/// Languages supported by the synthesis model.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    It,
    Pt,
    Pl,
    Tr,
    Ru,
    Nl,
    Cs,
    Ar,
    #[value(name = "zh-cn")]
    ZhCn,
    Ja,
    Hu,
    Ko,
}

impl Language {
    /// Returns the language code sent to the engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::It => "it",
            Language::Pt => "pt",
            Language::Pl => "pl",
            Language::Tr => "tr",
            Language::Ru => "ru",
            Language::Nl => "nl",
            Language::Cs => "cs",
            Language::Ar => "ar",
            Language::ZhCn => "zh-cn",
            Language::Ja => "ja",
            Language::Hu => "hu",
            Language::Ko => "ko",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
