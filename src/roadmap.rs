//! Roadmap generation, lazy per-week content filling, and day completion.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::llm::TextGenerator;
use crate::models::{Day, Roadmap, RoadmapOutline, RoadmapSummary};
use crate::normalize;
use crate::prompts;
use crate::store::JsonDirStore;

pub struct RoadmapService {
    store: JsonDirStore,
    generator: Arc<dyn TextGenerator>,
}

impl RoadmapService {
    pub fn new(store: JsonDirStore, generator: Arc<dyn TextGenerator>) -> Self {
        RoadmapService { store, generator }
    }

    /// Generate a new roadmap from a user goal. The model is invoked with
    /// search grounding; week 1 comes back with deep content, later weeks
    /// as sentinel placeholders.
    pub async fn generate(&self, goal: &str, session_id: &str) -> Result<Roadmap, ServiceError> {
        info!(goal, "generating roadmap");
        let prompt = prompts::roadmap_prompt(goal);
        let raw = self.generator.generate(&prompt, true).await?;

        let value = normalize::parse_model_output(&raw).map_err(|failure| {
            error!(raw = %failure.raw, "roadmap output was not parseable JSON");
            ServiceError::MalformedOutput(failure.reason)
        })?;
        let outline: RoadmapOutline = serde_json::from_value(value)?;

        let roadmap = Roadmap {
            id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            title: outline.title,
            description: outline.description,
            total_days: outline.total_days,
            status: "active".to_string(),
            created_at: Utc::now(),
            days_completed: 0,
            progress_percentage: 0.0,
            completed_days: BTreeSet::new(),
            weeks: outline.weeks,
        };
        self.store.put(&roadmap.id.to_string(), &roadmap)?;
        info!(roadmap = %roadmap.id, title = %roadmap.title, "roadmap saved");
        Ok(roadmap)
    }

    pub fn get(&self, roadmap_id: &str) -> Result<Option<Roadmap>, ServiceError> {
        self.store.get(roadmap_id)
    }

    /// Summaries of the session's roadmaps.
    pub fn list(&self, session_id: &str) -> Result<Vec<RoadmapSummary>, ServiceError> {
        let mut summaries = Vec::new();
        for key in self.store.keys()? {
            let Some(roadmap) = self.store.get::<Roadmap>(&key)? else {
                continue;
            };
            if roadmap.session_id != session_id {
                continue;
            }
            summaries.push(RoadmapSummary {
                id: roadmap.id,
                title: roadmap.title,
                progress: roadmap.progress_percentage,
                status: roadmap.status,
                created_at: roadmap.created_at,
            });
        }
        Ok(summaries)
    }

    /// Fill in deep content for one week of an existing roadmap. This is
    /// the only mutation path for days beyond week 1.
    pub async fn generate_week_content(
        &self,
        roadmap_id: &str,
        week_number: u32,
    ) -> Result<Roadmap, ServiceError> {
        let mut roadmap = self
            .get(roadmap_id)?
            .ok_or_else(|| ServiceError::NotFound("Roadmap not found".to_string()))?;
        let week_idx = roadmap
            .weeks
            .iter()
            .position(|w| w.week_number == week_number)
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Week {week_number} not found in roadmap outline"
                ))
            })?;

        let outline = roadmap.weeks[week_idx]
            .days
            .iter()
            .map(|d| format!("Day {}: {}", d.day_number, d.topic))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = prompts::week_content_prompt(&roadmap.title, week_number, &outline);

        info!(roadmap = %roadmap.id, week = week_number, "generating deep content");
        let raw = self.generator.generate(&prompt, true).await?;
        let value = normalize::parse_model_output(&raw).map_err(|failure| {
            error!(raw = %failure.raw, "week content output was not parseable JSON");
            ServiceError::MalformedOutput(failure.reason)
        })?;
        let new_days: Vec<Day> = serde_json::from_value(value)?;

        merge_week_days(&mut roadmap.weeks[week_idx].days, &new_days);
        self.store.put(roadmap_id, &roadmap)?;
        Ok(roadmap)
    }

    /// Idempotently mark a day as completed and recompute the progress
    /// counters. Returns `None` when the roadmap does not exist.
    pub fn update_progress(
        &self,
        roadmap_id: &str,
        day_number: u32,
    ) -> Result<Option<Roadmap>, ServiceError> {
        let Some(mut roadmap) = self.get(roadmap_id)? else {
            return Ok(None);
        };
        if roadmap.completed_days.insert(day_number) {
            roadmap.days_completed = roadmap.completed_days.len() as u32;
            roadmap.progress_percentage = if roadmap.total_days == 0 {
                0.0
            } else {
                100.0 * f64::from(roadmap.days_completed) / f64::from(roadmap.total_days)
            };
            self.store.put(roadmap_id, &roadmap)?;
        }
        Ok(Some(roadmap))
    }
}

/// Merge generated day content into the stored week. Days are matched by
/// `day_number`; when the response lacks a matching number the same
/// position in the response is used instead (degraded match, not a
/// failure). A day with no counterpart at all is left untouched.
fn merge_week_days(days: &mut [Day], new_days: &[Day]) {
    for (idx, day) in days.iter_mut().enumerate() {
        let fresh = new_days
            .iter()
            .find(|d| d.day_number == day.day_number)
            .or_else(|| new_days.get(idx));
        let Some(fresh) = fresh else {
            continue;
        };
        day.learning_objectives = fresh.learning_objectives.clone();
        day.youtube_video_title = fresh.youtube_video_title.clone();
        day.youtube_video_url = fresh.youtube_video_url.clone();
        day.reference_content = fresh.reference_content.clone();
        day.questions = fresh.questions.clone();
    }
}
