//! Multi-level assessment generation with file-backed caching.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::errors::ServiceError;
use crate::extract;
use crate::llm::TextGenerator;
use crate::models::{Assessment, Question, ASSESSMENT_TIMER_SECS};
use crate::normalize;
use crate::prompts;
use crate::store::JsonDirStore;

pub struct AssessmentService {
    cache: JsonDirStore,
    generator: Arc<dyn TextGenerator>,
    upload_root: PathBuf,
    /// How long a cached assessment stays valid. `None` means forever.
    cache_ttl: Option<Duration>,
}

impl AssessmentService {
    pub fn new(
        cache: JsonDirStore,
        generator: Arc<dyn TextGenerator>,
        upload_root: PathBuf,
        cache_ttl: Option<Duration>,
    ) -> Self {
        AssessmentService {
            cache,
            generator,
            upload_root,
            cache_ttl,
        }
    }

    fn cache_key(session_id: &str, level: u8) -> String {
        format!("{session_id}_lvl{level}")
    }

    fn cache_fresh(&self, key: &str) -> bool {
        if !self.cache.contains(key) {
            return false;
        }
        match (self.cache_ttl, self.cache.age(key)) {
            (None, _) => true,
            (Some(ttl), Some(age)) => age < ttl,
            (Some(_), None) => false,
        }
    }

    /// Generate (or serve from cache) the assessment for a session and
    /// level. A cache hit never re-invokes the model; a failed generation
    /// caches nothing, so the next call retries.
    pub async fn generate(&self, session_id: &str, level: u8) -> Result<Assessment, ServiceError> {
        let key = Self::cache_key(session_id, level);
        if self.cache_fresh(&key) {
            if let Some(cached) = self.cache.get::<Assessment>(&key)? {
                return Ok(cached);
            }
        }

        let context = extract::session_text(&self.upload_root, session_id);
        if context.is_empty() {
            return Err(ServiceError::NoDocuments);
        }

        self.generate_from_context(session_id, level, &context).await
    }

    async fn generate_from_context(
        &self,
        session_id: &str,
        level: u8,
        context: &str,
    ) -> Result<Assessment, ServiceError> {
        let prompt = prompts::assessment_prompt(level, context);
        let raw = self.generator.generate(&prompt, false).await?;

        let value = normalize::parse_model_output(&raw).map_err(|failure| {
            error!(
                session = session_id,
                level,
                raw = %failure.raw,
                "assessment output was not parseable JSON"
            );
            ServiceError::MalformedOutput(failure.reason)
        })?;
        let questions: Vec<Question> = serde_json::from_value(value)?;

        let assessment = Assessment {
            level,
            timer_seconds: ASSESSMENT_TIMER_SECS,
            questions,
        };
        self.cache.put(&Self::cache_key(session_id, level), &assessment)?;
        info!(session = session_id, level, "assessment generated and cached");
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGenerator;
    use tempfile::TempDir;

    const QUESTIONS_JSON: &str = r#"[
        {
            "id": 1,
            "question": "What is mitosis?",
            "options": ["Cell division", "Cell death", "Osmosis", "Diffusion"],
            "correct_answer": "Cell division",
            "explanation": "Mitosis is how a cell divides."
        }
    ]"#;

    fn service_with(
        replies: Vec<&str>,
        ttl: Option<Duration>,
    ) -> (AssessmentService, Arc<ScriptedGenerator>, TempDir) {
        let tmp = TempDir::new().unwrap();
        let generator = Arc::new(ScriptedGenerator::new(replies));
        let service = AssessmentService::new(
            JsonDirStore::open(tmp.path().join("assessments")).unwrap(),
            Arc::clone(&generator) as Arc<dyn TextGenerator>,
            tmp.path().join("uploads"),
            ttl,
        );
        (service, generator, tmp)
    }

    #[tokio::test]
    async fn no_documents_short_circuits_without_a_model_call() {
        let (service, generator, _tmp) = service_with(vec![QUESTIONS_JSON], None);

        let err = service.generate("ghost", 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoDocuments));
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let (service, generator, _tmp) = service_with(vec![QUESTIONS_JSON], None);

        let first = service
            .generate_from_context("s1", 1, "cell biology notes")
            .await
            .unwrap();
        assert_eq!(generator.call_count(), 1);

        // no uploads exist, so this can only succeed via the cache
        let second = service.generate("s1", 1).await.unwrap();
        assert_eq!(generator.call_count(), 1);
        assert_eq!(first, second);
        assert_eq!(second.timer_seconds, 600);
    }

    #[tokio::test]
    async fn failed_generation_caches_nothing_and_retry_succeeds() {
        let (service, generator, _tmp) =
            service_with(vec!["the model refused to answer", QUESTIONS_JSON], None);

        let err = service
            .generate_from_context("s1", 1, "notes")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::MalformedOutput(_)));
        assert!(!service.cache.contains("s1_lvl1"));

        let retried = service
            .generate_from_context("s1", 1, "notes")
            .await
            .unwrap();
        assert_eq!(generator.call_count(), 2);
        assert_eq!(retried.questions.len(), 1);
        assert!(service.cache.contains("s1_lvl1"));
    }

    #[tokio::test]
    async fn wrong_shape_is_a_failure_and_is_not_cached() {
        let (service, _generator, _tmp) =
            service_with(vec![r#"{"not": "an array"}"#], None);

        let err = service
            .generate_from_context("s1", 2, "notes")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Serialization(_)));
        assert!(!service.cache.contains("s1_lvl2"));
    }

    #[tokio::test]
    async fn zero_ttl_expires_the_cache_immediately() {
        let (service, generator, _tmp) = service_with(
            vec![QUESTIONS_JSON, QUESTIONS_JSON],
            Some(Duration::ZERO),
        );

        service
            .generate_from_context("s1", 1, "notes")
            .await
            .unwrap();
        assert!(!service.cache_fresh("s1_lvl1"));

        // stale entry is ignored; the next generate would re-extract, so
        // drive the regeneration path directly
        service
            .generate_from_context("s1", 1, "notes")
            .await
            .unwrap();
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn fenced_output_is_normalized_before_parsing() {
        let fenced = format!("```json\n{QUESTIONS_JSON}\n```");
        let (service, _generator, _tmp) = service_with(vec![fenced.as_str()], None);

        let assessment = service
            .generate_from_context("s1", 1, "notes")
            .await
            .unwrap();
        assert_eq!(assessment.questions[0].question, "What is mitosis?");
    }
}
