//! Tipos de erro para o cliente da API Gemini.
//!
//! Define [`GeminiError`] e a classificação de retentativa usada pelo
//! controlador de retentativas. Usa `thiserror` para derivar `Display` e
//! `Error` a partir dos atributos `#[error(...)]`.

use thiserror::Error;
use tracing::debug;

use crate::retry::{Retryable, looks_transient};

/// Erros que podem ocorrer ao interagir com a API Gemini.
///
/// - [`Api`](GeminiError::Api): o servidor respondeu com status HTTP de erro
/// - [`Network`](GeminiError::Network): falha na camada de rede
/// - [`Parse`](GeminiError::Parse): corpo de resposta que não pôde ser decodificado
/// - [`Cancelled`](GeminiError::Cancelled): a tentativa foi cancelada pelo controlador
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Erro retornado pela API (ex.: 400 argumento inválido, 503 modelo sobrecarregado).
    /// `status_text` é o campo `error.status` do corpo (ex.: "UNAVAILABLE"), quando presente.
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        status_text: Option<String>,
        message: String,
    },

    /// Falha de rede subjacente (DNS, conexão recusada, TLS).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A resposta chegou mas não corresponde ao formato esperado.
    #[error("failed to parse API response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A requisição foi interrompida porque a tentativa expirou.
    #[error("request cancelled")]
    Cancelled,
}

impl Retryable for GeminiError {
    fn is_retryable(&self) -> bool {
        match self {
            GeminiError::Api { status: 503, .. } => true,
            GeminiError::Api {
                status_text: Some(text),
                ..
            } if text == "UNAVAILABLE" => true,
            GeminiError::Cancelled => false,
            other => {
                // Formatos sem sinal tipado caem na verificação textual.
                let transient = looks_transient(&other.to_string());
                if transient {
                    debug!(error = %other, "classified as transient by message text");
                }
                transient
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, status_text: Option<&str>, message: &str) -> GeminiError {
        GeminiError::Api {
            status,
            status_text: status_text.map(str::to_string),
            message: message.into(),
        }
    }

    #[test]
    fn api_error_display() {
        let err = api(400, Some("INVALID_ARGUMENT"), "API key not valid");
        assert_eq!(err.to_string(), "API error (status 400): API key not valid");
    }

    #[test]
    fn service_unavailable_is_retryable() {
        assert!(api(503, None, "try again").is_retryable());
        assert!(api(500, Some("UNAVAILABLE"), "backend busy").is_retryable());
    }

    #[test]
    fn overload_message_is_retryable_by_text() {
        assert!(api(500, Some("INTERNAL"), "The model is overloaded.").is_retryable());
    }

    #[test]
    fn client_errors_are_fatal() {
        assert!(!api(400, Some("INVALID_ARGUMENT"), "bad request").is_retryable());
        assert!(!api(429, Some("RESOURCE_EXHAUSTED"), "quota exceeded").is_retryable());
        assert!(!GeminiError::Cancelled.is_retryable());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeminiError>();
    }
}
