//! Google Cloud Vision API連携
//!
//! 1回の `images:annotate` 呼び出しでランドマーク・ラベル・OCRをまとめて取得する。
//! 再試行はしない（呼び出し側の判断）。

use super::{ExtractionError, SignalExtractor};
use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use base64::Engine;
use landmark_guide_common::{parse_annotate_response, Error as CommonError, ImageAnnotations};
use serde::Serialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("landmark-guide/", env!("CARGO_PKG_VERSION"));
const MAX_LANDMARK_RESULTS: u32 = 5;
const MAX_LABEL_RESULTS: u32 = 10;

/// Vision APIリクエスト
#[derive(Serialize)]
struct AnnotateBatchRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<FeatureRequest>,
    image_context: ImageContext,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeatureRequest {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageContext {
    language_hints: Vec<String>,
}

pub struct VisionExtractor {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    language_hint: String,
    timeout: Duration,
    max_image_bytes: usize,
}

impl VisionExtractor {
    pub fn new(
        api_key: String,
        endpoint: String,
        language_hint: String,
        timeout: Duration,
        max_image_bytes: usize,
    ) -> std::result::Result<Self, ExtractionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractionError::Unreachable(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
            language_hint,
            timeout,
            max_image_bytes,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        Ok(Self::new(
            api_key,
            config.vision_endpoint.clone(),
            config.language_hint.clone(),
            Duration::from_secs(config.timeout_seconds),
            config.max_image_bytes,
        )?)
    }

    /// 送信前のローカル検証（空・サイズ超過・画像形式不明は送らない）
    pub fn validate(&self, image: &[u8]) -> std::result::Result<(), ExtractionError> {
        if image.is_empty() {
            return Err(ExtractionError::InvalidImage("image is empty".into()));
        }
        if image.len() > self.max_image_bytes {
            return Err(ExtractionError::InvalidImage(format!(
                "image is {} bytes, limit is {} bytes",
                image.len(),
                self.max_image_bytes
            )));
        }
        let format = image::guess_format(image)
            .map_err(|e| ExtractionError::InvalidImage(format!("unrecognized image format: {}", e)))?;
        tracing::debug!(format = ?format, bytes = image.len(), "image accepted for vision request");
        Ok(())
    }

    fn build_request(&self, image: &[u8]) -> AnnotateBatchRequest {
        AnnotateBatchRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: base64::engine::general_purpose::STANDARD.encode(image),
                },
                features: vec![
                    FeatureRequest {
                        kind: "LANDMARK_DETECTION",
                        max_results: MAX_LANDMARK_RESULTS,
                    },
                    FeatureRequest {
                        kind: "LABEL_DETECTION",
                        max_results: MAX_LABEL_RESULTS,
                    },
                    FeatureRequest {
                        kind: "TEXT_DETECTION",
                        max_results: MAX_LABEL_RESULTS,
                    },
                ],
                image_context: ImageContext {
                    language_hints: vec![self.language_hint.clone()],
                },
            }],
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> ExtractionError {
        if err.is_timeout() {
            ExtractionError::Timeout(self.timeout)
        } else {
            ExtractionError::Unreachable(err.to_string())
        }
    }
}

#[async_trait]
impl SignalExtractor for VisionExtractor {
    fn name(&self) -> &'static str {
        "vision"
    }

    async fn extract(&self, image: &[u8]) -> std::result::Result<ImageAnnotations, ExtractionError> {
        self.validate(image)?;

        let request = self.build_request(image);
        tracing::debug!(endpoint = %self.endpoint, "calling vision api");

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let message: String = body.chars().take(300).collect();
            return Err(ExtractionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let annotations = parse_annotate_response(&body).map_err(|e| match e {
            CommonError::Provider { code, message } => ExtractionError::Provider { code, message },
            other => ExtractionError::Parse(other.to_string()),
        })?;

        tracing::info!(
            landmarks = annotations.landmarks.len(),
            labels = annotations.labels.len(),
            text_tokens = annotations.text_tokens.len(),
            "vision annotations received"
        );

        Ok(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn extractor(endpoint: &str, max_image_bytes: usize) -> VisionExtractor {
        VisionExtractor::new(
            "test-key".into(),
            endpoint.into(),
            "en".into(),
            Duration::from_secs(2),
            max_image_bytes,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_rejects_empty() {
        let ex = extractor("http://127.0.0.1:9", 1024);
        assert!(matches!(ex.validate(&[]), Err(ExtractionError::InvalidImage(_))));
    }

    #[test]
    fn test_validate_rejects_oversized() {
        let ex = extractor("http://127.0.0.1:9", 8);
        let err = ex.validate(PNG_HEADER).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn test_validate_rejects_non_image() {
        let ex = extractor("http://127.0.0.1:9", 1024);
        assert!(matches!(
            ex.validate(b"hello, this is plain text"),
            Err(ExtractionError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_validate_accepts_png() {
        let ex = extractor("http://127.0.0.1:9", 1024);
        assert!(ex.validate(PNG_HEADER).is_ok());
    }

    #[test]
    fn test_request_shape() {
        let ex = extractor("http://127.0.0.1:9", 1024);
        let value = serde_json::to_value(ex.build_request(b"abc")).unwrap();
        let request = &value["requests"][0];
        assert_eq!(request["image"]["content"], "YWJj");
        assert_eq!(request["features"][0]["type"], "LANDMARK_DETECTION");
        assert_eq!(request["features"][1]["type"], "LABEL_DETECTION");
        assert_eq!(request["features"][2]["maxResults"], 10);
        assert_eq!(request["imageContext"]["languageHints"][0], "en");
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // ポート9（discard）は通常閉じている
        let ex = extractor("http://127.0.0.1:9/v1/images:annotate", 1024);
        let result = ex.extract(PNG_HEADER).await;
        assert!(matches!(
            result,
            Err(ExtractionError::Unreachable(_)) | Err(ExtractionError::Timeout(_))
        ));
    }
}
