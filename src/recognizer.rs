//! 認識オーケストレーター
//!
//! 画像 → 信号抽出 → カタログ照合 → 総合信頼度。
//! どの失敗経路でも整形済みの MatchResult を返し、呼び出し側にエラーを投げない。

use crate::catalog::CatalogProvider;
use crate::extractor::SignalExtractor;
use landmark_guide_common::{match_site, Diagnostics, ImageAnnotations, MatchResult, Outcome};
use std::sync::Arc;

/// ランドマーク単位の信頼度がない場合の既定値
pub const DEFAULT_LANDMARK_CONFIDENCE: f64 = 0.5;

pub const NO_MATCH_MESSAGE: &str =
    "No matching cultural site found. Try a different angle or a more famous landmark.";

pub struct Recognizer {
    extractor: Box<dyn SignalExtractor>,
    catalog: Arc<dyn CatalogProvider>,
    catalog_limit: usize,
}

impl Recognizer {
    pub fn new(
        extractor: Box<dyn SignalExtractor>,
        catalog: Arc<dyn CatalogProvider>,
        catalog_limit: usize,
    ) -> Self {
        Self {
            extractor,
            catalog,
            catalog_limit,
        }
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// 画像を認識してカタログのサイトに照合する
    pub async fn recognize(&self, image: &[u8]) -> MatchResult {
        // 1. 信号抽出
        let annotations = match self.extractor.extract(image).await {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!(extractor = self.extractor.name(), "extraction failed: {}", e);
                return MatchResult::unmatched(
                    Outcome::ExtractionFailed,
                    format!(
                        "Image analysis failed: {}. Please try again or use a different photo.",
                        e
                    ),
                    Diagnostics {
                        error: Some(e.to_string()),
                        ..Default::default()
                    },
                );
            }
        };

        // 2. 照合に使える信号がなければカタログは読まない
        if annotations.is_empty() {
            tracing::info!("no visual signals extracted");
            return MatchResult::unmatched(
                Outcome::NoLandmark,
                "No landmark detected in the image. Try a different angle or a more famous landmark."
                    .into(),
                Diagnostics {
                    annotations: Some(annotations),
                    ..Default::default()
                },
            );
        }

        // 3. カタログ読み出し
        let catalog = match self.catalog.list_sites(Some(self.catalog_limit)) {
            Ok(sites) => sites,
            Err(e) => {
                tracing::warn!("catalog read failed: {}", e);
                return MatchResult::unmatched(
                    Outcome::CatalogUnavailable,
                    "The cultural site catalog is currently unavailable. Please try again later."
                        .into(),
                    Diagnostics {
                        annotations: Some(annotations),
                        error: Some(e.to_string()),
                        ..Default::default()
                    },
                );
            }
        };

        // 4. 照合
        let report = match_site(&annotations, &catalog);
        for candidate in &report.candidates {
            tracing::debug!(site = %candidate.site_name, score = candidate.score, "candidate score");
        }

        let diagnostics = Diagnostics {
            annotations: Some(annotations.clone()),
            strategy: Some(report.strategy),
            candidates: report.candidates,
            patterns: report.patterns,
            ..Default::default()
        };

        let Some(best) = report.best else {
            let (outcome, message) = unmatched_message(&annotations);
            tracing::info!(?outcome, catalog_size = catalog.len(), "no catalog match");
            return MatchResult::unmatched(outcome, message, diagnostics);
        };

        // 5. 総合信頼度 = (ランドマーク信頼度 + 一致強度) / 2
        let landmark_confidence = best
            .landmark_confidence
            .unwrap_or(DEFAULT_LANDMARK_CONFIDENCE);
        let confidence = ((landmark_confidence + best.strength) / 2.0).clamp(0.0, 1.0);

        let location = best.site.location();
        let message = if location.is_empty() {
            format!(
                "Recognized {} with {}% confidence.",
                best.site.name,
                percent(confidence)
            )
        } else {
            format!(
                "Recognized {} in {} with {}% confidence.",
                best.site.name,
                location,
                percent(confidence)
            )
        };

        tracing::info!(
            site = %best.site.name,
            score = best.score,
            confidence,
            "landmark recognized"
        );

        MatchResult::matched(
            best.site,
            confidence,
            message,
            Diagnostics {
                effective: best.effective,
                match_score: Some(best.score),
                ..diagnostics
            },
        )
    }
}

fn percent(confidence: f64) -> u32 {
    (confidence * 100.0).round() as u32
}

/// 一致なしのメッセージ
///
/// ランドマークが検出されずラベルだけある場合は、最上位ラベルとその信頼度を示す。
fn unmatched_message(annotations: &ImageAnnotations) -> (Outcome, String) {
    if annotations.landmarks.is_empty() && annotations.features.is_none() {
        if let Some(label) = annotations.top_label() {
            let detail = match label.score {
                Some(score) => format!("'{}' ({}% confidence)", label.keyword, percent(score)),
                None => format!("'{}'", label.keyword),
            };
            return (
                Outcome::NoLandmark,
                format!(
                    "No landmark detected. The image appears to show {}, which does not match any cultural site in our catalog.",
                    detail
                ),
            );
        }
    }
    (Outcome::NoCatalogMatch, NO_MATCH_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use landmark_guide_common::{Label, Landmark};

    #[test]
    fn test_unmatched_message_shows_top_label() {
        let annotations = ImageAnnotations {
            labels: vec![
                Label {
                    keyword: "Sky".into(),
                    score: Some(0.5),
                },
                Label {
                    keyword: "Tower".into(),
                    score: Some(0.874),
                },
            ],
            ..Default::default()
        };
        let (outcome, message) = unmatched_message(&annotations);
        assert_eq!(outcome, Outcome::NoLandmark);
        assert!(message.contains("'Tower' (87% confidence)"));
    }

    #[test]
    fn test_unmatched_message_with_landmark() {
        let annotations = ImageAnnotations {
            landmarks: vec![Landmark {
                name: "Unknown Fort".into(),
                confidence: Some(0.4),
            }],
            ..Default::default()
        };
        let (outcome, message) = unmatched_message(&annotations);
        assert_eq!(outcome, Outcome::NoCatalogMatch);
        assert_eq!(message, NO_MATCH_MESSAGE);
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(0.726), 73);
        assert_eq!(percent(0.0), 0);
        assert_eq!(percent(1.0), 100);
    }
}
