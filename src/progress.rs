//! Per-session XP, level unlocks, submission history and the mistake log.

use chrono::Utc;
use rand::Rng;
use tracing::info;

use crate::errors::ServiceError;
use crate::models::{
    MistakeEntry, ProgressRecord, ReportedMistake, SubmissionEvent, SubmissionSummary,
    TaggedMistake,
};
use crate::store::JsonDirStore;

pub struct ProgressService {
    store: JsonDirStore,
}

impl ProgressService {
    pub fn new(store: JsonDirStore) -> Self {
        ProgressService { store }
    }

    /// Record a submitted assessment result.
    ///
    /// Fixed thresholds per level: level 1 passes at score >= 8 (XP 50-100,
    /// unlocks level 2), level 2 at score >= 7 (XP 100-150, unlocks level 3),
    /// level 3 at score > 0 (XP 150-200, nothing left to unlock). A failed
    /// submission gains no XP and changes no unlock, but is still appended
    /// to the history.
    pub fn submit_result(
        &self,
        session_id: &str,
        level: u8,
        score: u32,
        max_score: u32,
        mistakes: &[ReportedMistake],
    ) -> Result<SubmissionSummary, ServiceError> {
        let mut record = self
            .store
            .get::<ProgressRecord>(session_id)?
            .unwrap_or_default();

        let mut rng = rand::thread_rng();
        let (passed, xp_gained): (bool, u64) = match level {
            1 if score >= 8 => (true, rng.gen_range(50..=100)),
            2 if score >= 7 => (true, rng.gen_range(100..=150)),
            3 if score > 0 => (true, rng.gen_range(150..=200)),
            _ => (false, 0),
        };

        if passed {
            record.xp += xp_gained;
            let unlock = match level {
                1 => 2,
                2 => 3,
                _ => record.unlocked_level,
            };
            record.unlocked_level = record.unlocked_level.max(unlock);
        }

        let now = Utc::now();
        record.history.push(SubmissionEvent {
            level,
            score,
            max_score,
            passed,
            xp_gained,
            timestamp: now,
        });

        for reported in mistakes {
            // first occurrence wins; later duplicates are dropped
            if record
                .mistakes
                .iter()
                .any(|m| m.question == reported.question)
            {
                continue;
            }
            record.mistakes.push(MistakeEntry {
                question: reported.question.clone(),
                correct_answer: reported.correct_answer.clone(),
                explanation: reported.explanation.clone(),
                user_answer: reported.user_answer.clone(),
                level,
                comments: String::new(),
                timestamp: now,
            });
        }

        self.store.put(session_id, &record)?;
        info!(
            session = session_id,
            level, score, passed, xp_gained, "result recorded"
        );

        Ok(SubmissionSummary {
            passed,
            xp_gained,
            new_total_xp: record.xp,
            unlocked_level: record.unlocked_level,
            score,
        })
    }

    /// The session's progress record, or the defaults if it has none yet.
    pub fn get_progress(&self, session_id: &str) -> Result<ProgressRecord, ServiceError> {
        Ok(self.store.get(session_id)?.unwrap_or_default())
    }

    pub fn mistakes_for(&self, session_id: &str) -> Result<Vec<MistakeEntry>, ServiceError> {
        Ok(self
            .store
            .get::<ProgressRecord>(session_id)?
            .map(|r| r.mistakes)
            .unwrap_or_default())
    }

    /// Mistakes across every session, each tagged with its source session.
    pub fn all_mistakes(&self) -> Result<Vec<TaggedMistake>, ServiceError> {
        let mut all = Vec::new();
        for key in self.store.keys()? {
            if let Some(record) = self.store.get::<ProgressRecord>(&key)? {
                for mistake in record.mistakes {
                    all.push(TaggedMistake {
                        session_id: key.clone(),
                        mistake,
                    });
                }
            }
        }
        Ok(all)
    }

    /// Overwrite the comment on the mistake matching `question_text`
    /// exactly. Returns whether a match was found.
    pub fn update_mistake_comment(
        &self,
        session_id: &str,
        question_text: &str,
        comment: &str,
    ) -> Result<bool, ServiceError> {
        let Some(mut record) = self.store.get::<ProgressRecord>(session_id)? else {
            return Ok(false);
        };
        let Some(mistake) = record
            .mistakes
            .iter_mut()
            .find(|m| m.question == question_text)
        else {
            return Ok(false);
        };
        mistake.comments = comment.to_string();
        self.store.put(session_id, &record)?;
        Ok(true)
    }
}
