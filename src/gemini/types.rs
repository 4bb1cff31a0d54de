//! Tipos de dados para o endpoint `generateContent` da API Gemini.
//!
//! Todas as structs usam `camelCase` no JSON, conforme o formato REST da
//! Google. Campos opcionais ausentes são omitidos na serialização.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// Tipo MIME das imagens enviadas como partes inline.
pub const PNG_MIME: &str = "image/png";

/// Corpo da requisição para `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conteúdos da conversa; este cliente envia um único turno do usuário.
    pub contents: Vec<Content>,
    /// Parâmetros de geração (modalidades, limite de tokens, imagem).
    pub generation_config: GenerationConfig,
}

/// Um turno de conversa composto por partes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    /// Papel do remetente: "user" ou "model".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".into()),
            parts,
        }
    }
}

/// Uma parte de conteúdo: texto, dados binários inline, ou ambos.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    /// Cria uma parte inline a partir de bytes PNG, codificando em base64.
    pub fn png(bytes: &[u8]) -> Self {
        Self {
            text: None,
            inline_data: Some(Blob {
                mime_type: PNG_MIME.into(),
                data: BASE64.encode(bytes),
            }),
        }
    }
}

/// Dados binários inline, com o conteúdo em base64.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

impl Blob {
    /// Decodifica o conteúdo base64 para bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.data.as_bytes())
    }
}

/// Configuração de geração enviada junto com a requisição.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Modalidades aceitas na resposta (ex.: `["IMAGE", "TEXT"]`).
    pub response_modalities: Vec<String>,
    pub max_output_tokens: u32,
    pub image_config: ImageConfig,
}

/// Tamanho e proporção da imagem gerada.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// "1K", "2K" ou "4K".
    pub image_size: String,
    /// Omitido quando o modelo deve escolher a proporção.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
}

/// Resposta do endpoint `generateContent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Partes do primeiro candidato, ou uma fatia vazia se não houver nenhuma.
    pub fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }
}

/// Um candidato de resposta gerado pelo modelo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    /// Motivo da parada (ex.: "STOP", "SAFETY").
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Estatísticas de consumo de tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

/// Corpo de erro padrão das APIs Google: `{"error": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_in_camel_case() {
        let req = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::png(b"abc"), Part::text("a cat")])],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".into(), "TEXT".into()],
                max_output_tokens: 2048,
                image_config: ImageConfig {
                    image_size: "1K".into(),
                    aspect_ratio: None,
                },
            },
        };
        let json = serde_json::to_value(&req).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "YWJj");
        assert!(parts[0].get("text").is_none());
        assert_eq!(parts[1]["text"], "a cat");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(json["generationConfig"]["imageConfig"]["imageSize"], "1K");
        assert!(json["generationConfig"]["imageConfig"].get("aspectRatio").is_none());
    }

    #[test]
    fn response_deserialize_from_api_format() {
        let api_json = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here is your image"},
                        {"inlineData": {"mimeType": "image/png", "data": "YWJj"}}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 1290, "totalTokenCount": 1302}
        }"#;
        let resp: GenerateContentResponse = serde_json::from_str(api_json).unwrap();

        let parts = resp.parts();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text.as_deref(), Some("Here is your image"));
        assert_eq!(parts[1].inline_data.as_ref().unwrap().decode().unwrap(), b"abc");
        assert_eq!(resp.candidates[0].finish_reason.as_deref(), Some("STOP"));
        assert_eq!(resp.usage_metadata.unwrap().total_token_count, 1302);
    }

    #[test]
    fn response_without_candidates_has_no_parts() {
        let resp: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(resp.parts().is_empty());
    }

    #[test]
    fn error_envelope_parses_google_shape() {
        let body = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        let env: ApiErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.error.message, "The model is overloaded.");
        assert_eq!(env.error.status.as_deref(), Some("UNAVAILABLE"));
    }
}
