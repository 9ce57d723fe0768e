//! 認識パイプラインの型定義
//!
//! - ImageAnnotations: 信号抽出の出力（リクエスト毎に生成）
//! - CulturalSite: 文化遺産カタログの1件（読み取り専用）
//! - MatchResult: 認識の最終出力

use crate::features::StructuralFeatures;
use serde::{Deserialize, Serialize};

/// ランドマーク検出（名前 + 信頼度）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Landmark {
    pub name: String,
    /// プロバイダがスコアを返さなかった場合は None
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// 汎用ラベル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub keyword: String,
    /// プロバイダのスコア（ヒューリスティック由来の場合はなし）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Label {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            score: None,
        }
    }
}

/// 画像から抽出した視覚信号
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageAnnotations {
    /// 信頼度の降順
    pub landmarks: Vec<Landmark>,
    pub labels: Vec<Label>,
    pub text_tokens: Vec<String>,
    /// ヒューリスティック抽出時のみ設定される
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<StructuralFeatures>,
}

impl ImageAnnotations {
    /// 照合用キーワード（小文字化、空文字除外）
    pub fn keywords(&self) -> Vec<String> {
        self.landmarks
            .iter()
            .map(|l| l.name.as_str())
            .chain(self.labels.iter().map(|l| l.keyword.as_str()))
            .chain(self.text_tokens.iter().map(|t| t.as_str()))
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }

    pub fn top_landmark(&self) -> Option<&Landmark> {
        self.landmarks.first()
    }

    /// スコア最大のラベル（スコアなしは0扱い、同点は先勝ち）
    pub fn top_label(&self) -> Option<&Label> {
        let mut best: Option<&Label> = None;
        for label in &self.labels {
            let score = label.score.unwrap_or(0.0);
            match best {
                Some(b) if b.score.unwrap_or(0.0) >= score => {}
                _ => best = Some(label),
            }
        }
        best
    }

    /// 照合に使える信号が何もない
    pub fn is_empty(&self) -> bool {
        self.features.is_none() && self.keywords().is_empty()
    }

    /// ランドマークを信頼度の降順に並べ替え（同点は元の順序、スコアなしは末尾）
    pub fn sort_landmarks(&mut self) {
        let key = |l: &Landmark| l.confidence.unwrap_or(f64::NEG_INFINITY);
        self.landmarks.sort_by(|a, b| key(b).total_cmp(&key(a)));
    }
}

/// 文化遺産サイト
///
/// DBからエクスポートした snake_case の行もそのまま読めるよう alias を付けている。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalSite {
    pub id: String,

    pub name: String,

    #[serde(default, alias = "location_city")]
    pub location_city: String,

    #[serde(default, alias = "location_country")]
    pub location_country: String,

    #[serde(default, alias = "site_type")]
    pub site_type: String,

    #[serde(default, alias = "image_keywords")]
    pub image_keywords: Vec<String>,

    // 以下はナレーション生成で使用
    #[serde(default)]
    pub description: String,

    #[serde(default, alias = "historical_context")]
    pub historical_context: String,

    #[serde(default, alias = "cultural_significance")]
    pub cultural_significance: String,

    #[serde(default, alias = "construction_date")]
    pub construction_date: String,

    #[serde(default, alias = "architect_artist")]
    pub architect_artist: String,

    #[serde(default, alias = "fun_facts")]
    pub fun_facts: Vec<String>,

    #[serde(default, alias = "visitor_tips")]
    pub visitor_tips: String,
}

impl CulturalSite {
    /// "都市, 国" 形式の所在地
    pub fn location(&self) -> String {
        match (self.location_city.is_empty(), self.location_country.is_empty()) {
            (false, false) => format!("{}, {}", self.location_city, self.location_country),
            (false, true) => self.location_city.clone(),
            (true, false) => self.location_country.clone(),
            (true, true) => String::new(),
        }
    }
}

/// 照合方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchStrategy {
    /// キーワード重複スコア（Vision API由来）
    KeywordOverlap,
    /// 構造特徴フラグ（ヒューリスティック由来）
    StructuralFlags,
}

/// 認識の結果区分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Matched,
    NoLandmark,
    #[default]
    NoCatalogMatch,
    ExtractionFailed,
    CatalogUnavailable,
}

impl Outcome {
    /// 呼び出し側の再試行で改善し得るエラーか
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::ExtractionFailed | Outcome::CatalogUnavailable)
    }
}

/// 候補サイトごとのスコア
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateScore {
    pub site_id: String,
    pub site_name: String,
    pub score: u32,
}

/// 参照パターンごとのスコア
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternScore {
    pub name: String,
    pub score: u32,
    pub characteristic_match: f64,
    pub final_confidence: f64,
}

/// 観測用の診断情報（正しさには不要）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Diagnostics {
    pub outcome: Outcome,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ImageAnnotations>,

    /// 構造特徴照合で採用したパターン由来の信号
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective: Option<ImageAnnotations>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<MatchStrategy>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<CandidateScore>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<PatternScore>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 認識結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub success: bool,

    #[serde(default)]
    pub site: Option<CulturalSite>,

    /// 0.0〜1.0
    pub confidence: f64,

    pub message: String,

    #[serde(default)]
    pub diagnostics: Diagnostics,
}

impl MatchResult {
    /// 照合成功
    pub fn matched(
        site: CulturalSite,
        confidence: f64,
        message: String,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            success: true,
            site: Some(site),
            confidence: confidence.clamp(0.0, 1.0),
            message,
            diagnostics: Diagnostics {
                outcome: Outcome::Matched,
                ..diagnostics
            },
        }
    }

    /// 照合失敗（信頼度は常に0）
    pub fn unmatched(outcome: Outcome, message: String, diagnostics: Diagnostics) -> Self {
        Self {
            success: false,
            site: None,
            confidence: 0.0,
            message,
            diagnostics: Diagnostics {
                outcome,
                ..diagnostics
            },
        }
    }

    /// 表示用パーセンテージ（四捨五入）
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}
