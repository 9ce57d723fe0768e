//! 構造特徴ヒューリスティック
//!
//! Vision APIが使えない場合の決定的な信号源。
//! 画像バイト列の統計（サイズ・先頭バイト和）だけから構造特徴フラグを導出する。
//! 同じバイト列からは常に同じ結果になる（テスト用の再現性）。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 先頭バイト和を取る範囲
pub const PREFIX_LEN: usize = 1000;

/// 「大きい画像」とみなすバイト数の閾値
pub const LARGE_IMAGE_BYTES: usize = 500_000;

/// 構造特徴フラグの語彙
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Circular,
    Vertical,
    Gothic,
    Ancient,
    Modern,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Circular,
        Feature::Vertical,
        Feature::Gothic,
        Feature::Ancient,
        Feature::Modern,
    ];
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Circular => "circular structure",
            Feature::Vertical => "vertical structure",
            Feature::Gothic => "gothic features",
            Feature::Ancient => "ancient features",
            Feature::Modern => "modern features",
        };
        write!(f, "{}", name)
    }
}

/// 解析方式（再試行時に切り替える）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    /// ファイルサイズ規則
    #[default]
    Primary,
    /// 先頭バイト和規則
    Secondary,
    /// 両方のOR
    Tertiary,
}

impl AnalysisMethod {
    /// 次の解析方式（primary → secondary → tertiary → primary）
    pub fn next(self) -> Self {
        match self {
            AnalysisMethod::Primary => AnalysisMethod::Secondary,
            AnalysisMethod::Secondary => AnalysisMethod::Tertiary,
            AnalysisMethod::Tertiary => AnalysisMethod::Primary,
        }
    }
}

impl FromStr for AnalysisMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" | "p" => Ok(AnalysisMethod::Primary),
            "secondary" | "s" => Ok(AnalysisMethod::Secondary),
            "tertiary" | "t" => Ok(AnalysisMethod::Tertiary),
            _ => Err(format!(
                "Unknown analysis method: {}. Use primary, secondary, or tertiary",
                s
            )),
        }
    }
}

impl fmt::Display for AnalysisMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMethod::Primary => write!(f, "primary"),
            AnalysisMethod::Secondary => write!(f, "secondary"),
            AnalysisMethod::Tertiary => write!(f, "tertiary"),
        }
    }
}

/// バイト列から導出した構造特徴
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralFeatures {
    pub circular: bool,
    pub vertical: bool,
    pub gothic: bool,
    pub ancient: bool,
    pub modern: bool,
    pub byte_len: usize,
    pub is_large: bool,
}

impl StructuralFeatures {
    /// フラグ値を取得
    pub fn flag(&self, feature: Feature) -> bool {
        match feature {
            Feature::Circular => self.circular,
            Feature::Vertical => self.vertical,
            Feature::Gothic => self.gothic,
            Feature::Ancient => self.ancient,
            Feature::Modern => self.modern,
        }
    }

    /// 立っているフラグ一覧
    pub fn present(&self) -> Vec<Feature> {
        Feature::ALL
            .iter()
            .copied()
            .filter(|f| self.flag(*f))
            .collect()
    }
}

/// 先頭 PREFIX_LEN バイトの和
pub fn prefix_sum(bytes: &[u8]) -> u64 {
    bytes.iter().take(PREFIX_LEN).map(|&b| b as u64).sum()
}

/// バイト列から構造特徴を導出（純粋関数）
pub fn analyze_bytes(bytes: &[u8], method: AnalysisMethod) -> StructuralFeatures {
    let len = bytes.len();
    let sum = prefix_sum(bytes);

    let by_size = [
        len > 300_000 && len % 7 == 0,
        len > 200_000 && len % 3 == 0,
        len > 400_000 && len % 11 == 0,
        len > 350_000 && len % 5 == 0,
        len < 400_000 && len % 2 == 0,
    ];
    let by_prefix = [
        sum % 13 == 0,
        sum % 7 == 0,
        sum % 17 == 0,
        sum % 9 == 0,
        sum % 4 == 0,
    ];

    let flags: [bool; 5] = match method {
        AnalysisMethod::Primary => by_size,
        AnalysisMethod::Secondary => by_prefix,
        AnalysisMethod::Tertiary => {
            let mut combined = [false; 5];
            for i in 0..5 {
                combined[i] = by_size[i] || by_prefix[i];
            }
            combined
        }
    };

    StructuralFeatures {
        circular: flags[0],
        vertical: flags[1],
        gothic: flags[2],
        ancient: flags[3],
        modern: flags[4],
        byte_len: len,
        is_large: len > LARGE_IMAGE_BYTES,
    }
}
