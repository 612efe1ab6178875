// ---- Core Data Structures ----

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marker stored in `Day::reference_content` for days whose deep content has
/// not been generated yet.
pub const CONTENT_NOT_GENERATED: &str = "CONTENT_NOT_GENERATED";

/// Every assessment runs on the same 10-minute timer.
pub const ASSESSMENT_TIMER_SECS: u32 = 600;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Assessment {
    pub level: u8,
    pub timer_seconds: u32,
    pub questions: Vec<Question>,
}

/// One generated question. Levels 1-2 are multiple choice and carry
/// `options`/`correct_answer`; level 3 is open-ended and carries `type`
/// instead. Absent fields stay out of the serialized form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Question {
    #[serde(default)]
    pub id: u32,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProgressRecord {
    pub xp: u64,
    pub unlocked_level: u8,
    pub history: Vec<SubmissionEvent>,
    #[serde(default)]
    pub mistakes: Vec<MistakeEntry>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        ProgressRecord {
            xp: 0,
            unlocked_level: 1,
            history: Vec::new(),
            mistakes: Vec::new(),
        }
    }
}

/// Immutable once appended to a session's history.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmissionEvent {
    pub level: u8,
    pub score: u32,
    pub max_score: u32,
    pub passed: bool,
    pub xp_gained: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MistakeEntry {
    pub question: String,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub user_answer: Option<String>,
    pub level: u8,
    /// User-editable annotation; the only mutable field.
    #[serde(default)]
    pub comments: String,
    pub timestamp: DateTime<Utc>,
}

/// Mistake as reported by the client when submitting a result.
#[derive(Deserialize, Debug, Clone)]
pub struct ReportedMistake {
    pub question: String,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub user_answer: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct SubmissionSummary {
    pub passed: bool,
    pub xp_gained: u64,
    pub new_total_xp: u64,
    pub unlocked_level: u8,
    pub score: u32,
}

/// Mistake annotated with its originating session, for the cross-session
/// aggregate view.
#[derive(Serialize, Debug, Clone)]
pub struct TaggedMistake {
    pub session_id: String,
    #[serde(flatten)]
    pub mistake: MistakeEntry,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Roadmap {
    pub id: Uuid,
    pub session_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub total_days: u32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub days_completed: u32,
    pub progress_percentage: f64,
    #[serde(default)]
    pub completed_days: BTreeSet<u32>,
    #[serde(default)]
    pub weeks: Vec<Week>,
}

/// The shape the model returns before the service stamps id, session and
/// progress metadata onto it.
#[derive(Deserialize, Debug, Clone)]
pub struct RoadmapOutline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_total_days")]
    pub total_days: u32,
    #[serde(default)]
    pub weeks: Vec<Week>,
}

fn default_total_days() -> u32 {
    30
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Week {
    pub week_number: u32,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub days: Vec<Day>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Day {
    #[serde(default)]
    pub day_number: u32,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub youtube_video_title: String,
    #[serde(default)]
    pub youtube_video_url: String,
    #[serde(default)]
    pub reference_content: String,
    #[serde(default)]
    pub questions: Vec<DayQuestion>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DayQuestion {
    pub question: String,
    #[serde(rename = "type", default)]
    pub question_type: String,
    #[serde(default)]
    pub hint: String,
}

/// Projection returned when listing a session's roadmaps.
#[derive(Serialize, Debug, Clone)]
pub struct RoadmapSummary {
    pub id: Uuid,
    pub title: String,
    pub progress: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_choice_question_keeps_its_fields() {
        let q = Question {
            id: 1,
            question: "What is a cell?".to_string(),
            options: Some(vec!["A".into(), "B".into(), "C".into(), "D".into()]),
            correct_answer: Some("A".to_string()),
            explanation: Some("Definition.".to_string()),
            question_type: None,
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["options"].as_array().unwrap().len(), 4);
        assert!(json.get("type").is_none());
    }

    #[test]
    fn short_answer_question_omits_choice_fields() {
        let q = Question {
            id: 1,
            question: "Propose a method to...".to_string(),
            options: None,
            correct_answer: None,
            explanation: Some("Key elements.".to_string()),
            question_type: Some("short_answer".to_string()),
        };
        let json = serde_json::to_value(&q).unwrap();
        assert!(json.get("options").is_none());
        assert!(json.get("correct_answer").is_none());
        assert_eq!(json["type"], "short_answer");
    }

    #[test]
    fn outline_defaults_to_thirty_days() {
        let outline: RoadmapOutline =
            serde_json::from_str(r#"{"title": "Rust in a month"}"#).unwrap();
        assert_eq!(outline.total_days, 30);
        assert!(outline.weeks.is_empty());
    }

    #[test]
    fn fresh_progress_record_starts_at_level_one() {
        let record = ProgressRecord::default();
        assert_eq!(record.xp, 0);
        assert_eq!(record.unlocked_level, 1);
        assert!(record.history.is_empty());
        assert!(record.mistakes.is_empty());
    }
}
