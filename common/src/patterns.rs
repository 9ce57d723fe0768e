//! 参照パターン表
//!
//! 既知ランドマークごとの構造特徴シグネチャと事前信頼度。
//! 一度だけ較正した定数で、学習はしない。

use crate::features::Feature;

/// ランドマーク参照パターン
#[derive(Debug, Clone, Copy)]
pub struct ReferencePattern {
    pub name: &'static str,
    pub city: &'static str,
    pub country: &'static str,
    /// 事前信頼度
    pub prior_confidence: f64,
    pub keywords: &'static [&'static str],
    /// 看板等に写りやすい文字列
    pub text_clues: &'static [&'static str],
    /// 期待するフラグ値
    pub signature: &'static [(Feature, bool)],
}

impl ReferencePattern {
    /// シグネチャが指定フラグを true として期待しているか
    pub fn expects(&self, feature: Feature) -> bool {
        self.signature
            .iter()
            .any(|&(f, expected)| f == feature && expected)
    }
}

pub static REFERENCE_PATTERNS: &[ReferencePattern] = &[
    ReferencePattern {
        name: "Colosseum",
        city: "Rome",
        country: "Italy",
        prior_confidence: 0.95,
        keywords: &["amphitheater", "ancient architecture", "roman", "arena"],
        text_clues: &["COLOSSEUM", "ROME", "AMPHITHEATRUM"],
        signature: &[
            (Feature::Circular, true),
            (Feature::Ancient, true),
            (Feature::Vertical, false),
            (Feature::Gothic, false),
        ],
    },
    ReferencePattern {
        name: "Eiffel Tower",
        city: "Paris",
        country: "France",
        prior_confidence: 0.92,
        keywords: &["tower", "iron structure", "lattice", "french"],
        text_clues: &["TOUR EIFFEL", "PARIS", "EIFFEL"],
        signature: &[
            (Feature::Vertical, true),
            (Feature::Modern, true),
            (Feature::Circular, false),
            (Feature::Gothic, false),
        ],
    },
    ReferencePattern {
        name: "Big Ben",
        city: "London",
        country: "United Kingdom",
        prior_confidence: 0.88,
        keywords: &["clock tower", "gothic architecture", "parliament", "westminster"],
        text_clues: &["BIG BEN", "WESTMINSTER", "PARLIAMENT"],
        signature: &[
            (Feature::Vertical, true),
            (Feature::Gothic, true),
            (Feature::Ancient, false),
            (Feature::Circular, false),
        ],
    },
    ReferencePattern {
        name: "Sagrada Familia",
        city: "Barcelona",
        country: "Spain",
        prior_confidence: 0.90,
        keywords: &["basilica", "gaudi", "spires", "modernist"],
        text_clues: &["SAGRADA FAMILIA", "BARCELONA", "GAUDI"],
        signature: &[
            (Feature::Vertical, true),
            (Feature::Modern, true),
            (Feature::Gothic, false),
            (Feature::Circular, false),
        ],
    },
    ReferencePattern {
        name: "Neuschwanstein Castle",
        city: "Bavaria",
        country: "Germany",
        prior_confidence: 0.87,
        keywords: &["castle", "fairy tale", "romantic", "bavarian"],
        text_clues: &["NEUSCHWANSTEIN", "BAVARIA", "SCHLOSS"],
        signature: &[
            (Feature::Vertical, true),
            (Feature::Gothic, true),
            (Feature::Ancient, true),
            (Feature::Circular, false),
        ],
    },
    ReferencePattern {
        name: "Notre-Dame Cathedral",
        city: "Paris",
        country: "France",
        prior_confidence: 0.89,
        keywords: &["cathedral", "gothic", "notre dame", "french"],
        text_clues: &["NOTRE DAME", "CATHEDRAL", "PARIS"],
        signature: &[
            (Feature::Vertical, true),
            (Feature::Gothic, true),
            (Feature::Ancient, true),
            (Feature::Circular, false),
        ],
    },
    ReferencePattern {
        name: "Leaning Tower of Pisa",
        city: "Pisa",
        country: "Italy",
        prior_confidence: 0.91,
        keywords: &["tower", "leaning", "pisa", "bell tower"],
        text_clues: &["PISA", "TOWER", "CAMPANILE"],
        signature: &[
            (Feature::Vertical, true),
            (Feature::Ancient, true),
            (Feature::Circular, true),
            (Feature::Gothic, false),
        ],
    },
];
