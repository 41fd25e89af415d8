use crate::utils::errors::{BloomTranslateError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const GOOGLE_EMAIL_VAR: &str = "BLOOM_GOOGLE_TRANSLATION_SERVICE_ACCOUNT_EMAIL";
pub const GOOGLE_PRIVATE_KEY_VAR: &str = "BLOOM_GOOGLE_TRANSLATION_SERVICE_PRIVATE_KEY";
pub const ACTS2_KEY_VAR: &str = "BLOOM_ACTS2_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sheet: SheetConfig,
    pub google: GoogleConfig,
    pub acts2: Acts2Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub name: String,
    pub row_type_column: String,
    pub translatable_row_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub endpoint: String,
    pub token_uri: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Acts2Config {
    pub endpoint: String,
    pub poll_interval_seconds: u64,
    pub max_poll_attempts: u32,
    pub timeout_seconds: u64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            name: "BloomBook".to_string(),
            row_type_column: "[row type]".to_string(),
            translatable_row_types: vec![
                "[bookTitle]".to_string(),
                "[page content]".to_string(),
                "[page description]".to_string(),
            ],
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translation.googleapis.com/language/translate/v2".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            timeout_seconds: 120,
        }
    }
}

impl Default for Acts2Config {
    fn default() -> Self {
        Self {
            endpoint: "https://acts2.multilingualai.com/api/v2/text_collections".to_string(),
            poll_interval_seconds: 5,
            max_poll_attempts: 30,
            timeout_seconds: 120,
        }
    }
}

impl Acts2Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BloomTranslateError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            BloomTranslateError::ConfigError(format!("{}: {}", path.display(), e))
        })
    }

    /// An explicitly requested file must load; the implicit one is optional.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => {
                let implicit = Path::new("bloom-translate.toml");
                if implicit.exists() {
                    Ok(Self::load_from_file(implicit).unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "Ignoring unreadable bloom-translate.toml");
                        Self::default()
                    }))
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Backend secrets, captured once and handed to the dispatcher.
#[derive(Clone, Default)]
pub struct BackendCredentials {
    pub google_service_account_email: Option<String>,
    pub google_private_key: Option<String>,
    pub acts2_key: Option<String>,
}

impl std::fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("google_service_account_email", &self.google_service_account_email)
            .field("google_private_key", &self.google_private_key.as_ref().map(|_| "<set>"))
            .field("acts2_key", &self.acts2_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl BackendCredentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            google_service_account_email: non_empty(GOOGLE_EMAIL_VAR),
            google_private_key: non_empty(GOOGLE_PRIVATE_KEY_VAR)
                .map(|key| key.replace("\\n", "\n")),
            acts2_key: non_empty(ACTS2_KEY_VAR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let config: AppConfig = toml::from_str(
            r#"
            [acts2]
            max_poll_attempts = 3

            [sheet]
            name = "Sheet1"
            "#,
        )
        .unwrap();

        assert_eq!(config.acts2.max_poll_attempts, 3);
        assert_eq!(config.acts2.poll_interval_seconds, 5);
        assert_eq!(config.sheet.name, "Sheet1");
        assert_eq!(config.sheet.row_type_column, "[row type]");
        assert!(config.google.endpoint.ends_with("/language/translate/v2"));
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let err = AppConfig::load_or_default(Some(Path::new("/nonexistent/bloom.toml")))
            .unwrap_err();
        assert!(err.is_fatal_for_run());
    }

    #[test]
    fn credentials_expand_escaped_newlines_and_ignore_blanks() {
        let vars: HashMap<&str, &str> = [
            (GOOGLE_EMAIL_VAR, "svc@example.iam.gserviceaccount.com"),
            (GOOGLE_PRIVATE_KEY_VAR, "-----BEGIN-----\\nabc\\n-----END-----"),
            (ACTS2_KEY_VAR, "   "),
        ]
        .into_iter()
        .collect();

        let creds = BackendCredentials::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(
            creds.google_private_key.as_deref(),
            Some("-----BEGIN-----\nabc\n-----END-----")
        );
        assert!(creds.acts2_key.is_none());
        assert!(!format!("{:?}", creds).contains("abc"));
    }
}
