use crate::columns::Model;
use crate::translation::Translator;
use crate::utils::config::{GoogleConfig, GOOGLE_EMAIL_VAR, GOOGLE_PRIVATE_KEY_VAR};
use crate::utils::{BloomTranslateError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

const TRANSLATION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-translation";

/// The v2 API accepts at most this many `q` entries per request.
const MAX_SEGMENTS_PER_REQUEST: usize = 128;

pub struct GoogleTranslator {
    client: Client,
    config: GoogleConfig,
    service_account_email: Option<String>,
    private_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    target: &'a str,
    source: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

impl GoogleTranslator {
    pub fn new(
        config: GoogleConfig,
        service_account_email: Option<String>,
        private_key: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            service_account_email,
            private_key,
        })
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        let missing = |var: &str, other: &str| {
            BloomTranslateError::ConfigError(format!(
                "Translating with Google requires the environment variable {var} \
                 (and also {other}). After setting it, you may have to restart your terminal."
            ))
        };

        let email = self
            .service_account_email
            .as_deref()
            .ok_or_else(|| missing(GOOGLE_EMAIL_VAR, GOOGLE_PRIVATE_KEY_VAR))?;
        let key = self
            .private_key
            .as_deref()
            .ok_or_else(|| missing(GOOGLE_PRIVATE_KEY_VAR, GOOGLE_EMAIL_VAR))?;
        Ok((email, key))
    }

    async fn access_token(&self, email: &str, private_key: &str) -> Result<String> {
        let key: ServiceAccountKey = serde_json::from_value(serde_json::json!({
            "type": "service_account",
            "client_email": email,
            "private_key": private_key,
            "token_uri": self.config.token_uri,
        }))?;

        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| BloomTranslateError::OAuthError(e.to_string()))?;
        let token = auth
            .token(&[TRANSLATION_SCOPE])
            .await
            .map_err(|e| BloomTranslateError::OAuthError(e.to_string()))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| BloomTranslateError::OAuthError("no access token returned".to_string()))
    }

    async fn translate_segment(
        &self,
        token: &str,
        texts: &[String],
        target: &str,
        source: &str,
    ) -> Result<Vec<String>> {
        let request = TranslateRequest {
            q: texts,
            target,
            source,
            format: "text",
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BloomTranslateError::BackendError(format!(
                "Google Translate returned {status}: {body}"
            )));
        }

        let body: TranslateResponse = response.json().await?;
        Ok(body
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn model(&self) -> Model {
        Model::Google
    }

    fn check_config(&self) -> Result<()> {
        self.credentials().map(|_| ())
    }

    async fn translate(
        &self,
        texts: &[String],
        target_language: &str,
        source_language: &str,
    ) -> Result<Vec<String>> {
        let (email, private_key) = self.credentials()?;
        let token = self.access_token(email, private_key).await?;

        let mut translated = Vec::with_capacity(texts.len());
        for segment in texts.chunks(MAX_SEGMENTS_PER_REQUEST) {
            let mut part = self
                .translate_segment(&token, segment, target_language, source_language)
                .await?;
            if part.len() != segment.len() {
                return Err(BloomTranslateError::BackendError(format!(
                    "Google Translate returned {} translations for {} texts",
                    part.len(),
                    segment.len()
                )));
            }
            translated.append(&mut part);
        }

        tracing::debug!(texts = texts.len(), target = %target_language, "Google translation done");
        Ok(translated)
    }
}
