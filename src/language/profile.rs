use super::core::LanguageTag;
use include_dir::{include_dir, Dir};
use serde::Deserialize;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// Localized labels bundled for each supported language
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct LanguageProfile {
    pub tag: LanguageTag,
    pub name: String,
    pub words: String,
    pub chars: String,
    pub paragraphs: String,
    pub reading_time: String,
    pub untitled: String,
}

impl LanguageProfile {
    /// Load the bundled profile, falling back to the English labels
    pub fn for_tag(tag: LanguageTag) -> Self {
        read_profile(tag).unwrap_or_else(|| {
            log::warn!("No bundled profile for '{tag}', using English labels");
            Self::english()
        })
    }

    fn english() -> Self {
        Self {
            tag: LanguageTag::En,
            name: "English".to_string(),
            words: "words".to_string(),
            chars: "chars".to_string(),
            paragraphs: "paragraphs".to_string(),
            reading_time: "min read".to_string(),
            untitled: "Untitled".to_string(),
        }
    }
}

/// Placeholder title for a document saved with a blank title
pub fn untitled_placeholder(tag: LanguageTag) -> String {
    LanguageProfile::for_tag(tag).untitled
}

fn read_profile(tag: LanguageTag) -> Option<LanguageProfile> {
    let file = LANG_DIR.get_file(format!("{tag}.json"))?;
    let contents = file.contents_utf8()?;
    match serde_json::from_str::<LanguageProfile>(contents) {
        Ok(profile) if profile.tag == tag => Some(profile),
        Ok(profile) => {
            log::warn!("Profile {tag}.json declares tag '{}'", profile.tag);
            None
        }
        Err(err) => {
            log::warn!("Unable to deserialize profile {tag}.json: {err}");
            None
        }
    }
}
