//! Pluggable, trait-based LLM analysis of a job posting.
//!
//! `AppState` holds an `Arc<dyn JobEnricher>`; the default backend is
//! `LlmJobEnricher`. Tests swap in a canned enricher.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AppError;
use crate::ingest::models::{Enrichment, EnrichmentInput};
use crate::ingest::normalize::normalize_enrichment;
use crate::ingest::prompts::build_enrichment_prompt;
use crate::llm_client::prompts::JOB_ANALYST_SYSTEM;
use crate::llm_client::{LlmClient, AI_VERSION};
use crate::profile::CandidateProfile;

#[async_trait]
pub trait JobEnricher: Send + Sync {
    async fn enrich(&self, input: &EnrichmentInput) -> Result<Enrichment, AppError>;

    /// Recorded in `jobs.ai_version` for every row this backend enriches.
    fn version(&self) -> &str;
}

/// Enriches postings with the chat model, relative to the candidate profile.
pub struct LlmJobEnricher {
    llm: LlmClient,
    profile: Arc<CandidateProfile>,
}

impl LlmJobEnricher {
    pub fn new(llm: LlmClient, profile: Arc<CandidateProfile>) -> Self {
        Self { llm, profile }
    }
}

#[async_trait]
impl JobEnricher for LlmJobEnricher {
    async fn enrich(&self, input: &EnrichmentInput) -> Result<Enrichment, AppError> {
        let prompt = build_enrichment_prompt(input, &self.profile);
        let raw: Value = self
            .llm
            .call_json(&prompt, JOB_ANALYST_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Job enrichment failed: {e}")))?;
        Ok(normalize_enrichment(&raw))
    }

    fn version(&self) -> &str {
        AI_VERSION
    }
}
