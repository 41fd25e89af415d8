//! Header tags of the form `[<language>-x-ai-<model>]`.
//!
//! The bracketed payload must split on `-` into exactly four segments, so a
//! language code cannot itself contain a hyphen (`[zh-Hans-x-ai-google]` is
//! not a tag). `x`, `ai` and the model compare case-insensitively; the
//! language code keeps its casing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Translation models a column may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Google,
    Acts2,
    PigLatin,
}

impl Model {
    /// Ordered the way target tags are probed.
    pub const ALL: [Model; 3] = [Model::Acts2, Model::Google, Model::PigLatin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Google => "google",
            Model::Acts2 => "acts2",
            Model::PigLatin => "piglatin",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| token.eq_ignore_ascii_case(m.as_str()))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnTag {
    pub language_code: String,
    pub model: Model,
}

impl ColumnTag {
    pub fn new(language_code: impl Into<String>, model: Model) -> Self {
        Self {
            language_code: language_code.into(),
            model,
        }
    }

    /// `fr-x-ai-google`, the form handed to the dispatcher.
    pub fn target_tag(&self) -> String {
        format!("{}-x-ai-{}", self.language_code, self.model)
    }
}

/// Parses a column header. Returns `None` for anything that is not exactly
/// a bracketed four-segment AI tag naming a supported model.
pub fn parse_tag(header: &str) -> Option<ColumnTag> {
    let payload = header.strip_prefix('[')?.strip_suffix(']')?;
    if payload.contains(['[', ']']) {
        return None;
    }

    let segments: Vec<&str> = payload.split('-').collect();
    let [language_code, x, ai, model] = segments.as_slice() else {
        return None;
    };

    if language_code.is_empty()
        || !x.eq_ignore_ascii_case("x")
        || !ai.eq_ignore_ascii_case("ai")
    {
        return None;
    }

    Some(ColumnTag {
        language_code: language_code.to_string(),
        model: Model::from_token(model)?,
    })
}

/// `[<language>]`, the plain column holding human text for a language.
pub fn language_column(language_code: &str) -> String {
    format!("[{language_code}]")
}
