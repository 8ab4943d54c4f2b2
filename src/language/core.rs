use crate::error::EngineError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// CJK reading speed, in characters per minute
pub const CJK_READING_SPEED: u32 = 400;
/// Latin-like reading speed, in words per minute
pub const LATIN_READING_SPEED: u32 = 200;

/// How a language's text is broken into countable units
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum CountingFamily {
    /// Significant characters are the unit
    #[strum(serialize = "cjk")]
    Cjk,
    /// Runs of word characters are the unit
    #[default]
    #[strum(serialize = "latin-like")]
    LatinLike,
}

impl CountingFamily {
    /// Units per minute a reader gets through for this family
    pub fn reading_speed(self) -> u32 {
        match self {
            CountingFamily::Cjk => CJK_READING_SPEED,
            CountingFamily::LatinLike => LATIN_READING_SPEED,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LanguageTag {
    #[default]
    Zh,
    En,
    Es,
    Ja,
    Ko,
}

impl LanguageTag {
    pub const ALL: [LanguageTag; 5] = [
        LanguageTag::Zh,
        LanguageTag::En,
        LanguageTag::Es,
        LanguageTag::Ja,
        LanguageTag::Ko,
    ];

    pub fn family(self) -> CountingFamily {
        match self {
            LanguageTag::Zh | LanguageTag::Ja | LanguageTag::Ko => CountingFamily::Cjk,
            LanguageTag::En | LanguageTag::Es => CountingFamily::LatinLike,
        }
    }

    pub fn reading_speed(self) -> u32 {
        self.family().reading_speed()
    }

    pub fn is_cjk(self) -> bool {
        self.family() == CountingFamily::Cjk
    }

    /// Value for an HTML `lang` attribute
    pub fn html_lang(self) -> &'static str {
        match self {
            LanguageTag::Zh => "zh-CN",
            LanguageTag::Ja => "ja-JP",
            LanguageTag::Ko => "ko-KR",
            LanguageTag::Es => "es-ES",
            LanguageTag::En => "en",
        }
    }
}

impl FromStr for LanguageTag {
    type Err = EngineError;

    /// Accepts `zh`, `ZH`, `zh-CN`, `zh_TW` and the like; only the primary subtag matters
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        LanguageTag::ALL
            .into_iter()
            .find(|tag| tag.to_string() == primary)
            .ok_or_else(|| EngineError::UnknownLanguageTag(s.to_string()))
    }
}

/// Map any tag string to its counting family. Unrecognized tags count as Latin-like.
pub fn classify(tag: &str) -> CountingFamily {
    match tag.parse::<LanguageTag>() {
        Ok(tag) => tag.family(),
        Err(err) => {
            log::debug!("{err}; counting as {}", CountingFamily::default());
            CountingFamily::default()
        }
    }
}

/// Reading speed for any tag string, with the same fallback as [`classify`]
pub fn reading_speed(tag: &str) -> u32 {
    classify(tag).reading_speed()
}
