use crate::columns::Model;
use crate::translation::Translator;
use crate::utils::Result;
use async_trait::async_trait;

/// Offline backend that rewrites each word in pig latin. Useful for
/// exercising a whole run without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct PigLatinTranslator;

#[async_trait]
impl Translator for PigLatinTranslator {
    fn model(&self) -> Model {
        Model::PigLatin
    }

    fn check_config(&self) -> Result<()> {
        Ok(())
    }

    async fn translate(
        &self,
        texts: &[String],
        _target_language: &str,
        _source_language: &str,
    ) -> Result<Vec<String>> {
        Ok(texts.iter().map(|t| to_pig_latin(t)).collect())
    }
}

/// Transforms every whitespace-delimited word; the whitespace itself is
/// copied through untouched.
pub fn to_pig_latin(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 2);
    let mut word_start = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(start) = word_start.take() {
                out.push_str(&transform_word(&text[start..i]));
            }
            out.push(c);
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(start) = word_start {
        out.push_str(&transform_word(&text[start..]));
    }

    out
}

/// `"Hello,"` becomes `"elloHay,"`: punctuation before the first letter and
/// after the last letter stays where it is.
fn transform_word(word: &str) -> String {
    let (Some(first), Some(last)) = (
        word.find(|c: char| c.is_ascii_alphabetic()),
        word.rfind(|c: char| c.is_ascii_alphabetic()),
    ) else {
        return word.to_string();
    };

    // Both ends are ASCII letters, so these byte offsets are char boundaries.
    let letters = &word[first..=last];
    format!(
        "{}{}{}ay{}",
        &word[..first],
        &letters[1..],
        &letters[..1],
        &word[last + 1..]
    )
}
