//! Configuração do pebble carregada a partir de `pebble.toml`.
//!
//! A struct [`PebbleConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `GEMINI_API_KEY` tem precedência sobre o arquivo,
//! e as flags da CLI têm precedência sobre ambos.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::PebbleError;
use crate::gemini::client::{API_BASE_URL, DEFAULT_MODEL};
use crate::node::NodeSettings;

/// Nome do arquivo procurado no diretório atual quando `--config` não é usado.
pub const DEFAULT_CONFIG_FILE: &str = "pebble.toml";

/// Variável de ambiente com a chave da API Gemini.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuração de nível superior carregada de `pebble.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PebbleConfig {
    /// Chave da API Gemini.
    #[serde(default)]
    pub api_key: String,

    /// Modelo usado pelo nó de imagem.
    #[serde(default = "default_model")]
    pub model: String,

    /// URL base da API (útil para proxies e testes).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Limite de tempo por tentativa, em segundos.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Número máximo de tentativas por geração.
    #[serde(default = "default_retry_times")]
    pub retry_times: u32,

    /// Espera fixa, em milissegundos, após uma falha transitória.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Diretório com `sop-template.md` e `sop-mvp.md`.
    /// Quando ausente, os templates embutidos no binário são usados.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

// Valor padrão para o modelo: "gemini-3-pro-image-preview".
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    API_BASE_URL.to_string()
}

// Valor padrão para o timeout por tentativa: 60s.
fn default_timeout_seconds() -> u64 {
    60
}

// Valor padrão para tentativas: 6.
fn default_retry_times() -> u32 {
    6
}

// Valor padrão para a espera após sobrecarga: 1500ms.
fn default_retry_backoff_ms() -> u64 {
    1500
}

impl Default for PebbleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            retry_times: default_retry_times(),
            retry_backoff_ms: default_retry_backoff_ms(),
            templates_dir: None,
        }
    }
}

impl PebbleConfig {
    /// Carrega a configuração de `path`, ou de `pebble.toml` no diretório atual.
    ///
    /// Um caminho explícito precisa existir; o arquivo padrão é opcional.
    pub fn load(path: Option<&Path>) -> Result<Self, PebbleError> {
        let config = match path {
            Some(path) if !path.exists() => {
                return Err(PebbleError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        Ok(config.with_env_key(std::env::var(API_KEY_ENV).ok()))
    }

    fn from_file(path: &Path) -> Result<Self, PebbleError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<PebbleConfig>(&contents)?)
    }

    // Variável de ambiente tem precedência sobre o arquivo de configuração para a chave API.
    fn with_env_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key
            && !key.is_empty()
        {
            self.api_key = key;
        }
        self
    }

    /// Parâmetros do nó de imagem que não vêm do grafo.
    pub fn node_settings(&self) -> NodeSettings {
        NodeSettings {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = PebbleConfig::default();
        assert_eq!(config.model, "gemini-3-pro-image-preview");
        assert_eq!(config.timeout_seconds, 60);
        assert_eq!(config.retry_times, 6);
        assert_eq!(config.retry_backoff_ms, 1500);
        assert!(config.api_key.is_empty());
        assert!(config.templates_dir.is_none());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_key = "file-key"
            retry_times = 3
            templates_dir = "docs/templates"
        "#;
        let config: PebbleConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.retry_times, 3);
        assert_eq!(config.timeout_seconds, 60);
        assert_eq!(config.templates_dir, Some(PathBuf::from("docs/templates")));
    }

    #[test]
    fn env_key_overrides_file_unless_empty() {
        let config = PebbleConfig {
            api_key: "file-key".into(),
            ..PebbleConfig::default()
        };
        let config = config.with_env_key(Some(String::new()));
        assert_eq!(config.api_key, "file-key");
        let config = config.with_env_key(Some("env-key".into()));
        assert_eq!(config.api_key, "env-key");
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "timeout_seconds = 120\nretry_backoff_ms = 250\n").unwrap();

        let config = PebbleConfig::load(Some(&path)).unwrap();
        assert_eq!(config.timeout_seconds, 120);
        assert_eq!(config.node_settings().retry_backoff, Duration::from_millis(250));
    }

    #[test]
    fn load_rejects_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PebbleConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, PebbleError::Config(_)));
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "retry_times = \"many\"").unwrap();
        assert!(matches!(PebbleConfig::load(Some(&path)), Err(PebbleError::Toml(_))));
    }
}
