//! 認識結果へのフィードバック
//!
//! 保存先は持たず、タイムスタンプつきでログに残すだけ。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CONFIRMED_MESSAGE: &str = "Thank you for confirming!";
pub const CORRECTION_MESSAGE: &str = "Thanks for the feedback, we'll improve our recognition!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub is_correct: bool,
    /// 利用者が正解として示したサイト
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub recognized_site_id: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// 記録済みフィードバック
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReceipt {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

pub fn record_feedback(feedback: &Feedback) -> FeedbackReceipt {
    let timestamp = Utc::now();
    tracing::info!(
        is_correct = feedback.is_correct,
        site_id = feedback.site_id.as_deref().unwrap_or(""),
        recognized_site_id = feedback.recognized_site_id.as_deref().unwrap_or(""),
        confidence = feedback.confidence.unwrap_or(0.0),
        timestamp = %timestamp.to_rfc3339(),
        "feedback received"
    );

    let message = if feedback.is_correct {
        CONFIRMED_MESSAGE
    } else {
        CORRECTION_MESSAGE
    };

    FeedbackReceipt {
        message: message.to_string(),
        timestamp,
    }
}
