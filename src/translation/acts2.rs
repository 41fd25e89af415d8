use crate::columns::Model;
use crate::translation::language_codes::to_iso_639_3;
use crate::translation::Translator;
use crate::utils::config::{Acts2Config, ACTS2_KEY_VAR};
use crate::utils::{BloomTranslateError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Fixed-delay polling with an attempt ceiling. The delay comes before
/// every attempt, including the first.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl From<&Acts2Config> for PollPolicy {
    fn from(config: &Acts2Config) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
        }
    }
}

/// Runs `attempt` until it yields a value. Errors from an attempt end the
/// loop immediately; running out of attempts is a `Timeout`.
pub async fn poll_until_complete<T, F, Fut>(policy: PollPolicy, mut attempt: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    for n in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        if let Some(done) = attempt(n).await? {
            return Ok(done);
        }
        debug!(attempt = n, max_attempts = policy.max_attempts, "Translations not complete yet");
    }

    Err(BloomTranslateError::TimeoutError {
        attempts: policy.max_attempts,
    })
}

/// Client for the ACTS2 text-collection API: submit the texts as a
/// collection, ask for a translation, then poll until every text is done.
pub struct Acts2Translator {
    client: Client,
    config: Acts2Config,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
    name: String,
    language: String,
    texts: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct Collection {
    id: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollectionText {
    #[serde(default)]
    translations: Vec<TextTranslation>,
}

#[derive(Debug, Deserialize)]
struct TextTranslation {
    translation_status: Option<String>,
    text: Option<String>,
}

impl Acts2Translator {
    pub fn new(config: Acts2Config, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            BloomTranslateError::ConfigError(format!(
                "Translating with Acts2 requires the environment variable {ACTS2_KEY_VAR}. \
                 After setting it, you may have to restart your terminal."
            ))
        })
    }

    async fn create_collection(&self, key: &str, texts: Vec<&str>, language: String) -> Result<String> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let request = CreateCollectionRequest {
            name: format!("Translation {now}"),
            language,
            texts,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("api_key", key)
            .json(&request)
            .send()
            .await?;
        let response = check_status(response, "Failed to create text collection").await?;

        let collection: Collection = response.json().await?;
        Ok(match collection.id {
            serde_json::Value::String(id) => id,
            other => other.to_string(),
        })
    }

    async fn request_translation(&self, key: &str, collection_id: &str, target: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/{}/translate", self.config.endpoint, collection_id))
            .header("api_key", key)
            .query(&[("target_language", target)])
            .send()
            .await?;
        check_status(response, "Failed to translate text collection").await?;
        Ok(())
    }

    async fn fetch_completed(
        &self,
        key: &str,
        collection_id: &str,
        target: &str,
        texts: &[String],
    ) -> Result<Option<Vec<String>>> {
        let response = self
            .client
            .get(format!("{}/{}/texts", self.config.endpoint, collection_id))
            .header("api_key", key)
            .query(&[("include_translations", "true"), ("target_language", target)])
            .send()
            .await?;
        let response = check_status(response, "Failed to get translations").await?;

        let items: Vec<CollectionText> = response.json().await?;
        Ok(collect_completed(texts, &items))
    }
}

#[async_trait]
impl Translator for Acts2Translator {
    fn model(&self) -> Model {
        Model::Acts2
    }

    fn check_config(&self) -> Result<()> {
        self.key().map(|_| ())
    }

    async fn translate(
        &self,
        texts: &[String],
        target_language: &str,
        source_language: &str,
    ) -> Result<Vec<String>> {
        let key = self.key()?;

        let submitted: Vec<&str> = texts
            .iter()
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
            .collect();
        if submitted.is_empty() {
            return Ok(vec![String::new(); texts.len()]);
        }

        let target = to_iso_639_3(target_language);
        let source = to_iso_639_3(source_language);
        let submitted_count = submitted.len();

        let collection_id = self.create_collection(key, submitted, source).await?;
        self.request_translation(key, &collection_id, &target).await?;
        info!(
            collection = %collection_id,
            texts = submitted_count,
            target = %target,
            "Submitted ACTS2 translation"
        );

        let id = collection_id.as_str();
        let target = target.as_str();
        poll_until_complete(PollPolicy::from(&self.config), move |_| {
            self.fetch_completed(key, id, target, texts)
        })
        .await
    }
}

/// Lines the polled items up with the submitted batch. Blank inputs were
/// never submitted and come back blank. `None` until every submitted text
/// has a complete translation.
pub(crate) fn collect_completed(texts: &[String], items: &[CollectionText]) -> Option<Vec<String>> {
    let mut items = items.iter();

    texts
        .iter()
        .map(|text| {
            if text.trim().is_empty() {
                return Some(String::new());
            }
            items.next()?.translations.iter().find_map(|t| {
                match (t.translation_status.as_deref(), &t.text) {
                    (Some("complete"), Some(translated)) => Some(translated.clone()),
                    _ => None,
                }
            })
        })
        .collect()
}

async fn check_status(response: Response, context: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(BloomTranslateError::BackendError(format!(
        "{context} ({status}): {}",
        error_detail(&body)
    )))
}

/// The API's `detail` field when the body is JSON that carries one.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(detail) => detail.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    }
}
