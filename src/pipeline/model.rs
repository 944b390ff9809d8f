//! The single outbound call to the generative image endpoint.
//!
//! One request per restoration, no retries: a failed attempt surfaces its
//! error and the user decides whether to try again. The wire types mirror
//! the `generateContent` REST shape — a `contents` array whose parts are
//! either text or inline base64 image data, answered by candidates whose
//! parts follow the same scheme. Zero or one image part is expected back;
//! everything else is an error the caller can show verbatim.

use crate::config::RestoreConfig;
use crate::error::RestoreError;
use crate::output::MediaType;
use crate::pipeline::encode::{self, InlinePayload};
use crate::prompts::DEFAULT_RESTORE_PROMPT;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// What the model sent back: exactly one image, plus any accompanying text.
#[derive(Debug)]
pub struct ModelReply {
    pub image_bytes: Vec<u8>,
    pub media_type: MediaType,
    pub text: Option<String>,
    pub duration_ms: u64,
}

/// Send the uploaded photo and the restoration prompt; await the image.
pub async fn generate(
    payload: &InlinePayload,
    api_key: &str,
    config: &RestoreConfig,
) -> Result<ModelReply, RestoreError> {
    let start = Instant::now();
    let prompt = config.prompt.as_deref().unwrap_or(DEFAULT_RESTORE_PROMPT);

    let request = GenerateRequest {
        contents: vec![RequestContent {
            parts: vec![
                RequestPart::InlineData {
                    inline_data: InlineData {
                        mime_type: payload.mime_type.to_string(),
                        data: payload.data.clone(),
                    },
                },
                RequestPart::Text {
                    text: prompt.to_string(),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
        },
    };

    let body = serde_json::to_vec(&request)
        .map_err(|e| RestoreError::Internal(format!("request serialisation: {e}")))?;

    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        config.api_base_url.trim_end_matches('/'),
        config.model
    );
    info!("Calling {} ({} bytes inline)", config.model, payload.data.len());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| RestoreError::Internal(format!("http client: {e}")))?;

    let response = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                RestoreError::ApiTimeout {
                    secs: config.api_timeout_secs,
                }
            } else {
                RestoreError::ApiError {
                    status: 0,
                    message: e.to_string(),
                }
            }
        })?;

    let status = response.status();
    let raw = response.bytes().await.map_err(|e| RestoreError::ApiError {
        status: status.as_u16(),
        message: format!("reading response body: {e}"),
    })?;

    if !status.is_success() {
        return Err(RestoreError::ApiError {
            status: status.as_u16(),
            message: extract_error_message(&raw),
        });
    }

    let reply: GenerateResponse =
        serde_json::from_slice(&raw).map_err(|e| RestoreError::ApiError {
            status: status.as_u16(),
            message: format!("unexpected response shape: {e}"),
        })?;

    let duration = start.elapsed();
    debug!("Model answered in {:?}", duration);

    into_reply(reply, duration.as_millis() as u64)
}

/// Pull the image part (and any text) out of the parsed response.
fn into_reply(response: GenerateResponse, duration_ms: u64) -> Result<ModelReply, RestoreError> {
    let parts = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .unwrap_or_default();

    let mut texts: Vec<String> = Vec::new();
    let mut image: Option<(Vec<u8>, MediaType)> = None;

    for part in parts {
        if let Some(text) = part.text {
            if !text.trim().is_empty() {
                texts.push(text.trim().to_string());
            }
        }
        if image.is_none() {
            if let Some(inline) = part.inline_data {
                image = Some(encode::from_inline(&inline.data, &inline.mime_type)?);
            }
        }
    }

    let text = if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    };

    match image {
        Some((image_bytes, media_type)) => Ok(ModelReply {
            image_bytes,
            media_type,
            text,
            duration_ms,
        }),
        None => Err(RestoreError::NoImageInResponse { model_text: text }),
    }
}

/// Best-effort extraction of the server's human-readable error message.
///
/// Error bodies come as `{"error": {"message": ...}}`; anything else is
/// surfaced raw (truncated) so the user is never left with just a status code.
fn extract_error_message(raw: &[u8]) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    if let Ok(body) = serde_json::from_slice::<ErrorBody>(raw) {
        return body.error.message;
    }

    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    if text.is_empty() {
        "(empty response body)".to_string()
    } else if text.len() > 300 {
        let mut cut = 300;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…", &text[..cut])
    } else {
        text.to_string()
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn png_base64() -> String {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.resize(32, 0);
        STANDARD.encode(bytes)
    }

    #[test]
    fn request_serialises_to_camel_case_inline_data() {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png".into(),
                            data: "QUJD".into(),
                        },
                    },
                    RequestPart::Text {
                        text: "restore".into(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".into(), "TEXT".into()],
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"inlineData\""), "got: {json}");
        assert!(json.contains("\"mimeType\":\"image/png\""));
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"responseModalities\":[\"IMAGE\",\"TEXT\"]"));
        assert!(json.contains("\"text\":\"restore\""));
    }

    #[test]
    fn reply_with_image_and_text_parses() {
        let json = format!(
            r#"{{"candidates":[{{"content":{{"parts":[
                {{"text":"Repaired the tear in the corner."}},
                {{"inlineData":{{"mimeType":"image/png","data":"{}"}}}}
            ]}}}}]}}"#,
            png_base64()
        );
        let response: GenerateResponse = serde_json::from_str(&json).unwrap();
        let reply = into_reply(response, 1200).unwrap();
        assert_eq!(reply.media_type, MediaType::Png);
        assert_eq!(reply.text.as_deref(), Some("Repaired the tear in the corner."));
        assert_eq!(reply.duration_ms, 1200);
    }

    #[test]
    fn text_only_reply_is_no_image_error() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"I cannot restore this."}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let err = into_reply(response, 0).unwrap_err();
        match err {
            RestoreError::NoImageInResponse { model_text } => {
                assert_eq!(model_text.as_deref(), Some("I cannot restore this."));
            }
            other => panic!("expected NoImageInResponse, got {other:?}"),
        }
    }

    #[test]
    fn empty_candidates_is_no_image_error() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        let err = into_reply(response, 0).unwrap_err();
        assert!(matches!(err, RestoreError::NoImageInResponse { model_text: None }));
    }

    #[test]
    fn only_first_image_part_is_used() {
        let json = format!(
            r#"{{"candidates":[{{"content":{{"parts":[
                {{"inlineData":{{"mimeType":"image/png","data":"{b64}"}}}},
                {{"inlineData":{{"mimeType":"image/png","data":"ignored"}}}}
            ]}}}}]}}"#,
            b64 = png_base64()
        );
        let response: GenerateResponse = serde_json::from_str(&json).unwrap();
        // The second part's invalid base64 must never be touched.
        assert!(into_reply(response, 0).is_ok());
    }

    #[test]
    fn error_message_extracted_from_json_body() {
        let raw = br#"{"error":{"code":400,"message":"Invalid image payload.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(extract_error_message(raw), "Invalid image payload.");
    }

    #[test]
    fn error_message_falls_back_to_raw_text() {
        assert_eq!(extract_error_message(b"Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_error_message(b""), "(empty response body)");
    }
}
