//! サイト照合ロジック（CLI/Web共通）
//!
//! 2つの照合方式:
//! - キーワード重複スコア: Vision APIのランドマーク名・ラベル・OCRテキストとカタログを照合
//! - 構造特徴フラグ: ヒューリスティックの特徴フラグを参照パターン表と比較し、
//!   最上位パターンをキーワード重複スコアでカタログに解決する
//!
//! 一致なしはエラーではなく `best: None` で返す。

use crate::features::{Feature, StructuralFeatures};
use crate::patterns::{ReferencePattern, REFERENCE_PATTERNS};
use crate::types::{
    CandidateScore, CulturalSite, ImageAnnotations, Label, Landmark, MatchStrategy, PatternScore,
};

/// サイト名一致の加点
pub const NAME_MATCH_POINTS: u32 = 10;
/// 所在地一致の加点
pub const LOCATION_MATCH_POINTS: u32 = 5;
/// 構造特徴照合の信頼度上限
pub const MAX_HEURISTIC_CONFIDENCE: f64 = 0.98;

/// 採用されたサイト
#[derive(Debug, Clone, PartialEq)]
pub struct SiteMatch {
    pub site: CulturalSite,
    /// キーワード重複スコア
    pub score: u32,
    /// 正規化した一致強度（0.0〜1.0）
    pub strength: f64,
    /// ランドマーク単位の信頼度（なければ呼び出し側で既定値）
    pub landmark_confidence: Option<f64>,
    /// 構造特徴照合でカタログ解決に使った信号
    pub effective: Option<ImageAnnotations>,
}

/// 照合レポート
#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    pub strategy: MatchStrategy,
    pub best: Option<SiteMatch>,
    pub candidates: Vec<CandidateScore>,
    pub patterns: Vec<PatternScore>,
}

fn related(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

/// 1サイトのキーワード重複スコアを計算
///
/// `keywords` は小文字化済みであること（`ImageAnnotations::keywords`）。
pub fn score_site(keywords: &[String], site: &CulturalSite) -> u32 {
    let name = site.name.to_lowercase();
    let city = site.location_city.to_lowercase();
    let country = site.location_country.to_lowercase();

    let mut score = 0;

    if keywords.iter().any(|k| related(k, &name)) {
        score += NAME_MATCH_POINTS;
    }

    if keywords
        .iter()
        .any(|k| related(k, &city) || related(k, &country))
    {
        score += LOCATION_MATCH_POINTS;
    }

    let site_keywords: Vec<String> = std::iter::once(name)
        .chain(site.image_keywords.iter().map(|k| k.trim().to_lowercase()))
        .chain([city, country])
        .filter(|k| !k.is_empty())
        .collect();

    for keyword in keywords {
        for site_keyword in &site_keywords {
            if related(keyword, site_keyword) {
                score += 1;
            }
        }
    }

    score
}

/// カタログ全件を採点し、最高点の位置と候補スコアを返す
///
/// 同点はカタログ順で先のものを採用。全件0点なら `None`。
pub fn rank_sites(
    keywords: &[String],
    catalog: &[CulturalSite],
) -> (Option<(usize, u32)>, Vec<CandidateScore>) {
    let candidates: Vec<CandidateScore> = catalog
        .iter()
        .map(|site| CandidateScore {
            site_id: site.id.clone(),
            site_name: site.name.clone(),
            score: if keywords.is_empty() {
                0
            } else {
                score_site(keywords, site)
            },
        })
        .collect();

    let mut best: Option<(usize, u32)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        if candidate.score == 0 {
            continue;
        }
        match best {
            Some((_, s)) if s >= candidate.score => {}
            _ => best = Some((idx, candidate.score)),
        }
    }

    (best, candidates)
}

/// 1パターンの構造特徴スコア
pub fn score_pattern(features: &StructuralFeatures, pattern: &ReferencePattern) -> PatternScore {
    let mut score = 0;
    let mut matched = 0;

    for &(feature, expected) in pattern.signature {
        if features.flag(feature) == expected {
            matched += 1;
            // 特徴ありの一致は特徴なしの一致の2倍
            score += if expected { 2 } else { 1 };
        }
    }

    let total = pattern.signature.len().max(1);
    let characteristic_match = matched as f64 / total as f64;

    if features.is_large && pattern.expects(Feature::Ancient) {
        score += 1;
    }

    PatternScore {
        name: pattern.name.to_string(),
        score,
        characteristic_match,
        final_confidence: (pattern.prior_confidence * characteristic_match)
            .min(MAX_HEURISTIC_CONFIDENCE),
    }
}

/// 全パターンをスコア降順に並べる（同点は表の順）
pub fn rank_patterns(
    features: &StructuralFeatures,
) -> Vec<(&'static ReferencePattern, PatternScore)> {
    let mut ranked: Vec<_> = REFERENCE_PATTERNS
        .iter()
        .map(|p| (p, score_pattern(features, p)))
        .collect();
    ranked.sort_by(|a, b| b.1.score.cmp(&a.1.score));
    ranked
}

/// パターンを照合用の信号に変換
pub fn pattern_annotations(pattern: &ReferencePattern, confidence: f64) -> ImageAnnotations {
    ImageAnnotations {
        landmarks: vec![Landmark {
            name: pattern.name.to_string(),
            confidence: Some(confidence),
        }],
        labels: pattern.keywords.iter().map(|k| Label::new(*k)).collect(),
        text_tokens: pattern.text_clues.iter().map(|t| t.to_string()).collect(),
        features: None,
    }
}

/// 信号とカタログから最良サイトを選ぶ
pub fn match_site(annotations: &ImageAnnotations, catalog: &[CulturalSite]) -> MatchReport {
    match &annotations.features {
        Some(features) => match_by_features(features, catalog),
        None => match_by_keywords(annotations, catalog),
    }
}

fn match_by_keywords(annotations: &ImageAnnotations, catalog: &[CulturalSite]) -> MatchReport {
    let keywords = annotations.keywords();
    let (best, candidates) = rank_sites(&keywords, catalog);

    let best = best.map(|(idx, score)| SiteMatch {
        site: catalog[idx].clone(),
        score,
        strength: (score as f64 / NAME_MATCH_POINTS as f64).min(1.0),
        landmark_confidence: annotations.top_landmark().and_then(|l| l.confidence),
        effective: None,
    });

    MatchReport {
        strategy: MatchStrategy::KeywordOverlap,
        best,
        candidates,
        patterns: Vec::new(),
    }
}

fn match_by_features(features: &StructuralFeatures, catalog: &[CulturalSite]) -> MatchReport {
    let ranked = rank_patterns(features);
    let patterns: Vec<PatternScore> = ranked.iter().map(|(_, s)| s.clone()).collect();

    let Some((pattern, top)) = ranked.first() else {
        return MatchReport {
            strategy: MatchStrategy::StructuralFlags,
            best: None,
            candidates: Vec::new(),
            patterns,
        };
    };

    let effective = pattern_annotations(pattern, top.final_confidence);
    let (best, candidates) = rank_sites(&effective.keywords(), catalog);

    let best = best.map(|(idx, score)| SiteMatch {
        site: catalog[idx].clone(),
        score,
        strength: top.final_confidence,
        landmark_confidence: Some(top.final_confidence),
        effective: Some(effective.clone()),
    });

    MatchReport {
        strategy: MatchStrategy::StructuralFlags,
        best,
        candidates,
        patterns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{analyze_bytes, AnalysisMethod};

    fn site(id: &str, name: &str, city: &str, country: &str, keywords: &[&str]) -> CulturalSite {
        CulturalSite {
            id: id.to_string(),
            name: name.to_string(),
            location_city: city.to_string(),
            location_country: country.to_string(),
            image_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    fn labels_only(keywords: &[&str]) -> ImageAnnotations {
        ImageAnnotations {
            labels: keywords.iter().map(|k| Label::new(*k)).collect(),
            ..Default::default()
        }
    }

    fn catalog() -> Vec<CulturalSite> {
        vec![
            site("1", "Colosseum", "Rome", "Italy", &["amphitheater", "arena"]),
            site("2", "Eiffel Tower", "Paris", "France", &["tower", "iron"]),
            site("3", "Big Ben", "London", "United Kingdom", &["clock tower"]),
        ]
    }

    // =============================================
    // キーワード重複スコア
    // =============================================

    #[test]
    fn test_exact_name_hit() {
        let catalog = vec![site("1", "Colosseum", "Rome", "Italy", &[])];
        let annotations = labels_only(&["colosseum", "amphitheater"]);

        let report = match_site(&annotations, &catalog);
        let best = report.best.expect("一致するはず");
        assert_eq!(best.site.name, "Colosseum");
        assert!(best.score >= NAME_MATCH_POINTS);
        assert_eq!(report.strategy, MatchStrategy::KeywordOverlap);
    }

    #[test]
    fn test_score_breakdown() {
        let s = site("1", "Colosseum", "Rome", "Italy", &["amphitheater"]);
        let keywords = vec!["colosseum".to_string(), "rome".to_string()];
        // 名前+10, 所在地+5, ペア: colosseum-colosseum, rome-rome
        assert_eq!(score_site(&keywords, &s), 17);
    }

    #[test]
    fn test_reverse_substring_counts() {
        let s = site("1", "Pisa", "", "", &[]);
        let keywords = vec!["leaning tower of pisa".to_string()];
        // キーワード側がサイト名を含む場合も名前一致
        assert_eq!(score_site(&keywords, &s), NAME_MATCH_POINTS + 1);
    }

    #[test]
    fn test_empty_catalog_no_match() {
        let report = match_site(&labels_only(&["colosseum"]), &[]);
        assert!(report.best.is_none());
        assert!(report.candidates.is_empty());
    }

    #[test]
    fn test_empty_keywords_no_match() {
        let report = match_site(&ImageAnnotations::default(), &catalog());
        assert!(report.best.is_none());
        assert!(report.candidates.iter().all(|c| c.score == 0));
    }

    #[test]
    fn test_disjoint_keywords_no_match() {
        let report = match_site(&labels_only(&["beach", "sunset", "xyz"]), &catalog());
        assert!(report.best.is_none());
    }

    #[test]
    fn test_label_only_match() {
        let catalog = vec![
            site("1", "Colosseum", "Rome", "Italy", &["amphitheater"]),
            site("2", "Campanile", "Venice", "Italy", &["tower"]),
        ];
        let report = match_site(&labels_only(&["tower"]), &catalog);
        let best = report.best.expect("一致するはず");
        assert_eq!(best.site.id, "2");
        assert_eq!(best.score, 1);
        assert!((best.strength - 0.1).abs() < 1e-9);
        assert!(best.landmark_confidence.is_none());
    }

    #[test]
    fn test_tie_prefers_catalog_order() {
        let catalog = vec![
            site("a", "North Gate", "", "", &["gate"]),
            site("b", "South Gate", "", "", &["gate"]),
        ];
        let report = match_site(&labels_only(&["gate"]), &catalog);
        assert_eq!(report.best.unwrap().site.id, "a");
    }

    #[test]
    fn test_ranking_is_stable() {
        let annotations = labels_only(&["tower", "paris", "iron"]);
        let first = match_site(&annotations, &catalog());
        let second = match_site(&annotations, &catalog());
        assert_eq!(first, second);
        assert_eq!(first.best.unwrap().site.name, "Eiffel Tower");
    }

    #[test]
    fn test_strength_capped_at_one() {
        let annotations = ImageAnnotations {
            landmarks: vec![Landmark {
                name: "Eiffel Tower".into(),
                confidence: Some(0.8),
            }],
            labels: vec![Label::new("tower"), Label::new("paris")],
            ..Default::default()
        };
        let best = match_site(&annotations, &catalog()).best.unwrap();
        assert!(best.score > NAME_MATCH_POINTS);
        assert_eq!(best.strength, 1.0);
        assert_eq!(best.landmark_confidence, Some(0.8));
    }

    // =============================================
    // 構造特徴フラグ
    // =============================================

    fn features(circular: bool, vertical: bool, gothic: bool, ancient: bool) -> StructuralFeatures {
        StructuralFeatures {
            circular,
            vertical,
            gothic,
            ancient,
            ..Default::default()
        }
    }

    #[test]
    fn test_pattern_full_match() {
        let ranked = rank_patterns(&features(true, false, false, true));
        let (pattern, top) = &ranked[0];
        assert_eq!(pattern.name, "Colosseum");
        assert_eq!(top.score, 6); // 2 + 2 + 1 + 1
        assert_eq!(top.characteristic_match, 1.0);
        assert!((top.final_confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_pattern_tie_prefers_table_order() {
        // 全フラグfalse → 特徴なし一致のみで2点が並ぶ
        let ranked = rank_patterns(&features(false, false, false, false));
        assert_eq!(ranked[0].0.name, "Colosseum");
        assert_eq!(ranked[0].1.score, 2);
        assert_eq!(ranked[0].1.characteristic_match, 0.5);
    }

    #[test]
    fn test_large_image_bonus_for_ancient_patterns() {
        let small = features(false, true, false, true);
        let large = StructuralFeatures {
            is_large: true,
            ..small.clone()
        };
        let colosseum = &REFERENCE_PATTERNS[0];
        let eiffel = &REFERENCE_PATTERNS[1];
        assert_eq!(
            score_pattern(&large, colosseum).score,
            score_pattern(&small, colosseum).score + 1
        );
        assert_eq!(
            score_pattern(&large, eiffel).score,
            score_pattern(&small, eiffel).score
        );
    }

    #[test]
    fn test_heuristic_confidence_cap() {
        for method in [
            AnalysisMethod::Primary,
            AnalysisMethod::Secondary,
            AnalysisMethod::Tertiary,
        ] {
            for len in [0usize, 17, 1000, 210_000, 420_000, 770_000] {
                let bytes: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
                let f = analyze_bytes(&bytes, method);
                for (_, score) in rank_patterns(&f) {
                    assert!(score.final_confidence <= MAX_HEURISTIC_CONFIDENCE);
                    assert!(score.final_confidence >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_structural_path_resolves_to_catalog() {
        let annotations = ImageAnnotations {
            features: Some(features(true, false, false, true)),
            ..Default::default()
        };
        let report = match_site(&annotations, &catalog());
        assert_eq!(report.strategy, MatchStrategy::StructuralFlags);
        assert_eq!(report.patterns.len(), REFERENCE_PATTERNS.len());

        let best = report.best.expect("Colosseumに解決されるはず");
        assert_eq!(best.site.id, "1");
        assert!((best.strength - 0.95).abs() < 1e-9);
        assert_eq!(best.landmark_confidence, Some(best.strength));
        let effective = best.effective.expect("パターン由来の信号");
        assert_eq!(effective.top_landmark().unwrap().name, "Colosseum");
    }

    #[test]
    fn test_structural_path_without_catalog_entry() {
        let annotations = ImageAnnotations {
            features: Some(features(true, false, false, true)),
            ..Default::default()
        };
        let catalog = vec![site("9", "Taj Mahal", "Agra", "India", &["mausoleum"])];
        let report = match_site(&annotations, &catalog);
        assert!(report.best.is_none());
        assert!(!report.patterns.is_empty());
    }
}
