//! Vision APIレスポンスパーサー
//!
//! `images:annotate` のレスポンスJSONを ImageAnnotations に変換する。
//! スコアはプロバイダの値をそのまま使う（再正規化しない）。

use crate::error::{Error, Result};
use crate::types::{ImageAnnotations, Label, Landmark};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AnnotateBatchResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AnnotateImageResponse {
    landmark_annotations: Vec<EntityAnnotation>,
    label_annotations: Vec<EntityAnnotation>,
    text_annotations: Vec<EntityAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EntityAnnotation {
    description: String,
    score: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Status {
    code: i32,
    message: String,
}

/// レスポンスJSONをパース
///
/// # Returns
/// * `Ok(ImageAnnotations)` - 成功（ランドマーク0件も成功）
/// * `Err(Error::Provider)` - レスポンス内にエラーオブジェクトがある
/// * `Err(Error::Parse)` - JSONとして不正、または responses が空
pub fn parse_annotate_response(body: &str) -> Result<ImageAnnotations> {
    let batch: AnnotateBatchResponse = serde_json::from_str(body)
        .map_err(|e| Error::Parse(format!("Vision JSONパースエラー: {}", e)))?;

    let response = batch
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| Error::Parse("responses が空です".into()))?;

    if let Some(status) = response.error {
        return Err(Error::Provider {
            code: status.code,
            message: status.message,
        });
    }

    let mut annotations = ImageAnnotations {
        landmarks: response
            .landmark_annotations
            .into_iter()
            .filter(|a| !a.description.trim().is_empty())
            .map(|a| Landmark {
                name: a.description,
                confidence: a.score,
            })
            .collect(),
        labels: response
            .label_annotations
            .into_iter()
            .filter(|a| !a.description.trim().is_empty())
            .map(|a| Label {
                keyword: a.description,
                score: a.score,
            })
            .collect(),
        text_tokens: text_tokens(response.text_annotations),
        features: None,
    };
    annotations.sort_landmarks();

    Ok(annotations)
}

/// OCR結果をトークン列に変換
///
/// 先頭要素は全文ブロック、2番目以降が単語単位。単語がなければ全文を空白で分割する。
fn text_tokens(annotations: Vec<EntityAnnotation>) -> Vec<String> {
    let tokens: Vec<String> = if annotations.len() > 1 {
        annotations
            .into_iter()
            .skip(1)
            .map(|a| a.description.trim().to_string())
            .collect()
    } else {
        annotations
            .into_iter()
            .flat_map(|a| {
                a.description
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    };

    tokens.into_iter().filter(|t| !t.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let body = r#"{
          "responses": [{
            "landmarkAnnotations": [
              {"mid": "/m/0d5_c", "description": "Colosseum", "score": 0.91},
              {"description": "Roman Forum", "score": 0.95}
            ],
            "labelAnnotations": [
              {"description": "Amphitheatre", "score": 0.97},
              {"description": "Ancient history", "score": 0.88}
            ],
            "textAnnotations": [
              {"description": "COLOSSEO\nROMA"},
              {"description": "COLOSSEO"},
              {"description": "ROMA"}
            ]
          }]
        }"#;

        let annotations = parse_annotate_response(body).unwrap();
        // スコア降順に並ぶ
        assert_eq!(annotations.landmarks[0].name, "Roman Forum");
        assert_eq!(annotations.landmarks[1].confidence, Some(0.91));
        assert_eq!(annotations.labels.len(), 2);
        assert_eq!(annotations.labels[0].score, Some(0.97));
        assert_eq!(annotations.text_tokens, vec!["COLOSSEO", "ROMA"]);
        assert!(annotations.features.is_none());
    }

    #[test]
    fn test_parse_empty_response_is_success() {
        let annotations = parse_annotate_response(r#"{"responses": [{}]}"#).unwrap();
        assert!(annotations.landmarks.is_empty());
        assert!(annotations.is_empty());
    }

    #[test]
    fn test_parse_landmark_without_score() {
        let body = r#"{"responses":[{"landmarkAnnotations":[{"description":"Colosseum"}]}]}"#;
        let annotations = parse_annotate_response(body).unwrap();
        assert_eq!(annotations.landmarks[0].name, "Colosseum");
        assert_eq!(annotations.landmarks[0].confidence, None);
    }

    #[test]
    fn test_parse_single_text_block_is_split() {
        let body = r#"{"responses": [{"textAnnotations": [{"description": "TOUR  EIFFEL\nPARIS"}]}]}"#;
        let annotations = parse_annotate_response(body).unwrap();
        assert_eq!(annotations.text_tokens, vec!["TOUR", "EIFFEL", "PARIS"]);
    }

    #[test]
    fn test_parse_provider_error() {
        let body = r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#;
        match parse_annotate_response(body) {
            Err(Error::Provider { code, message }) => {
                assert_eq!(code, 3);
                assert_eq!(message, "Bad image data.");
            }
            other => panic!("Expected Provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_annotate_response("not json"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_parse_missing_responses() {
        assert!(matches!(
            parse_annotate_response("{}"),
            Err(Error::Parse(_))
        ));
    }
}
