//! Landmark Guide Common Library
//!
//! CLIとWebフロントエンドで共有される型と照合ロジック（I/Oなし）

pub mod error;
pub mod features;
pub mod matcher;
pub mod narration;
pub mod parser;
pub mod patterns;
pub mod types;

pub use error::{Error, Result};
pub use features::{analyze_bytes, AnalysisMethod, Feature, StructuralFeatures};
pub use matcher::{match_site, MatchReport, SiteMatch};
pub use narration::{generate_script, Language, NarrationOptions};
pub use parser::parse_annotate_response;
pub use patterns::{ReferencePattern, REFERENCE_PATTERNS};
pub use types::{
    CandidateScore, CulturalSite, Diagnostics, ImageAnnotations, Label, Landmark, MatchResult,
    MatchStrategy, Outcome, PatternScore,
};
