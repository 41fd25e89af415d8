pub mod acts2;
pub mod google;
pub mod language_codes;
pub mod piglatin;

pub use acts2::{poll_until_complete, Acts2Translator, PollPolicy};
pub use google::GoogleTranslator;
pub use language_codes::to_iso_639_3;
pub use piglatin::{to_pig_latin, PigLatinTranslator};

use crate::columns::Model;
use crate::utils::{AppConfig, BackendCredentials, BloomTranslateError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

/// One translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    fn model(&self) -> Model;

    /// Fails with a `Configuration` error naming whatever setting is
    /// missing. Called before any network activity.
    fn check_config(&self) -> Result<()>;

    /// Translates `texts` in order. The result must have the same length.
    async fn translate(
        &self,
        texts: &[String],
        target_language: &str,
        source_language: &str,
    ) -> Result<Vec<String>>;
}

/// Finds the model named by a target tag such as `fr-x-ai-google`.
pub fn parse_model_from_tag(target_tag: &str) -> Option<Model> {
    let lower = target_tag.to_ascii_lowercase();
    Model::ALL
        .into_iter()
        .find(|m| lower.contains(&format!("-{}", m.as_str())))
}

/// Routes a batch to the backend its target tag names.
pub struct Dispatcher {
    backends: HashMap<Model, Box<dyn Translator>>,
}

impl Dispatcher {
    pub fn new(config: &AppConfig, credentials: BackendCredentials) -> Result<Self> {
        let BackendCredentials {
            google_service_account_email,
            google_private_key,
            acts2_key,
        } = credentials;

        let backends: [Box<dyn Translator>; 3] = [
            Box::new(GoogleTranslator::new(
                config.google.clone(),
                google_service_account_email,
                google_private_key,
            )?),
            Box::new(Acts2Translator::new(config.acts2.clone(), acts2_key)?),
            Box::new(PigLatinTranslator),
        ];

        Ok(Self {
            backends: backends.into_iter().map(|b| (b.model(), b)).collect(),
        })
    }

    /// A dispatcher with no backends; register them with `with_backend`.
    pub fn empty() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    pub fn with_backend(mut self, backend: Box<dyn Translator>) -> Self {
        self.backends.insert(backend.model(), backend);
        self
    }

    pub fn resolve(&self, target_tag: &str) -> Result<&dyn Translator> {
        let model = parse_model_from_tag(target_tag).ok_or_else(|| {
            BloomTranslateError::UnsupportedModel(format!(
                "No supported translation model found in language code: {target_tag}"
            ))
        })?;

        self.backends
            .get(&model)
            .map(|b| &**b)
            .ok_or_else(|| {
                BloomTranslateError::UnsupportedModel(format!(
                    "Translation model {model} is not available"
                ))
            })
    }

    /// Checks that the tag names a usable, configured backend without
    /// translating anything.
    pub fn ensure_ready(&self, target_tag: &str) -> Result<()> {
        self.resolve(target_tag)?.check_config()
    }

    pub async fn translate(
        &self,
        texts: &[String],
        target_tag: &str,
        source_language: &str,
    ) -> Result<Vec<String>> {
        let backend = self.resolve(target_tag)?;

        let language = target_tag.split('-').next().unwrap_or_default();
        if language.is_empty() {
            return Err(BloomTranslateError::ConfigError(format!(
                "Invalid language code format: {target_tag}"
            )));
        }

        backend.check_config()?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %backend.model(), language, texts = texts.len(), "Dispatching batch");
        let translated = backend.translate(texts, language, source_language).await?;

        if translated.len() != texts.len() {
            return Err(BloomTranslateError::BackendError(format!(
                "{} returned {} translations for {} texts",
                backend.model(),
                translated.len(),
                texts.len()
            )));
        }

        info!(model = %backend.model(), language, texts = texts.len(), "Batch translated");
        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        calls: Arc<AtomicUsize>,
        drop_last: bool,
    }

    #[async_trait]
    impl Translator for Counting {
        fn model(&self) -> Model {
            Model::Google
        }

        fn check_config(&self) -> Result<()> {
            Ok(())
        }

        async fn translate(&self, texts: &[String], target: &str, _: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut out: Vec<String> = texts.iter().map(|t| format!("{target}:{t}")).collect();
            if self.drop_last {
                out.pop();
            }
            Ok(out)
        }
    }

    fn counting(drop_last: bool) -> (Dispatcher, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::empty().with_backend(Box::new(Counting {
            calls: calls.clone(),
            drop_last,
        }));
        (dispatcher, calls)
    }

    #[test]
    fn model_detection() {
        assert_eq!(parse_model_from_tag("es-x-ai-acts2"), Some(Model::Acts2));
        assert_eq!(parse_model_from_tag("fr-x-ai-google"), Some(Model::Google));
        assert_eq!(parse_model_from_tag("fr-x-ai-GOOGLE"), Some(Model::Google));
        assert_eq!(parse_model_from_tag("en-x-ai-piglatin"), Some(Model::PigLatin));
        assert_eq!(parse_model_from_tag("fr"), None);
        assert_eq!(parse_model_from_tag("fr-x-ai-gt"), None);
    }

    #[tokio::test]
    async fn unknown_model_is_rejected() {
        let dispatcher = Dispatcher::new(&AppConfig::default(), BackendCredentials::default()).unwrap();
        let err = dispatcher
            .translate(&["Hello".to_string()], "invalid", "en")
            .await
            .unwrap_err();
        assert!(matches!(err, BloomTranslateError::UnsupportedModel(_)));
    }

    #[tokio::test]
    async fn missing_credentials_fail_fast() {
        let dispatcher = Dispatcher::new(&AppConfig::default(), BackendCredentials::default()).unwrap();

        let err = dispatcher.ensure_ready("fr-x-ai-google").unwrap_err();
        assert!(err.to_string().contains("BLOOM_GOOGLE_TRANSLATION_SERVICE_ACCOUNT_EMAIL"));

        let err = dispatcher
            .translate(&["Hello".to_string()], "es-x-ai-acts2", "en")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("BLOOM_ACTS2_KEY"));

        assert!(dispatcher.ensure_ready("es-x-ai-piglatin").is_ok());
    }

    #[tokio::test]
    async fn piglatin_through_the_dispatcher() {
        let dispatcher = Dispatcher::new(&AppConfig::default(), BackendCredentials::default()).unwrap();
        let out = dispatcher
            .translate(&["Hello world".to_string()], "es-x-ai-piglatin", "en")
            .await
            .unwrap();
        assert_eq!(out, vec!["elloHay orldway"]);
    }

    #[tokio::test]
    async fn empty_batch_skips_backend() {
        let (dispatcher, calls) = counting(false);
        let out = dispatcher.translate(&[], "fr-x-ai-google", "en").await.unwrap();
        assert!(out.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn language_is_the_first_subtag() {
        let (dispatcher, calls) = counting(false);
        let out = dispatcher
            .translate(&["a".to_string(), "b".to_string()], "fr-x-ai-google", "en")
            .await
            .unwrap();
        assert_eq!(out, vec!["fr:a", "fr:b"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn short_response_is_a_backend_error() {
        let (dispatcher, _) = counting(true);
        let err = dispatcher
            .translate(&["a".to_string(), "b".to_string()], "fr-x-ai-google", "en")
            .await
            .unwrap_err();
        assert!(matches!(err, BloomTranslateError::BackendError(_)));
    }

    #[tokio::test]
    async fn unregistered_model_is_unsupported() {
        let (dispatcher, _) = counting(false);
        let err = dispatcher.ensure_ready("es-x-ai-acts2").unwrap_err();
        assert!(matches!(err, BloomTranslateError::UnsupportedModel(_)));
    }
}
