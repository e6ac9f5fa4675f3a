use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/ingest-job`: one page captured by the extension.
/// Fields are optional here so missing ones surface as a 400 from the
/// handler rather than as an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct IngestJobRequest {
    pub html: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
}

/// One validated item of `POST /api/ingest-jobs-batch`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BatchJobInput {
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub job_post_url: String,
    pub company_url: Option<String>,
    pub company_linkedin_slug: Option<String>,
    pub job_description: String,
    pub salary: Option<String>,
    pub source: String,
}

impl BatchJobInput {
    /// Trims every text field, dropping optional ones that end up empty.
    pub fn trimmed(self) -> Self {
        fn opt(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        BatchJobInput {
            job_title: opt(self.job_title),
            company_name: opt(self.company_name),
            job_post_url: self.job_post_url.trim().to_string(),
            company_url: opt(self.company_url),
            company_linkedin_slug: opt(self.company_linkedin_slug),
            job_description: self.job_description.trim().to_string(),
            salary: opt(self.salary),
            source: self.source.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResumeTips {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub suggested_bullets: Vec<String>,
}

impl ResumeTips {
    pub fn is_empty(&self) -> bool {
        self.strengths.is_empty() && self.gaps.is_empty() && self.suggested_bullets.is_empty()
    }
}

/// Normalized LLM analysis of a posting. Every field is optional because
/// the model is free to omit anything; lists default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Enrichment {
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub salary: Option<String>,
    pub overview: Option<String>,
    pub hiring_manager: Option<String>,
    pub required_experience: Option<String>,
    pub skills_sought: Vec<String>,
    pub company_insights: Option<String>,
    pub ideal_candidate: Option<String>,
    pub company_industry: Option<String>,
    pub tech_stack: Vec<String>,
    pub ai_resume_tips: Option<ResumeTips>,
    pub ai_tailored_summary: Option<String>,
    pub ai_status_score: Option<i32>,
    pub red_flags: Vec<String>,
    pub strategy_notes: Option<String>,
}

/// What the enricher is asked to analyze.
#[derive(Debug, Clone)]
pub enum EnrichmentInput {
    /// A whole captured page; the model extracts company, title and the rest.
    Page { url: String, page_text: String },
    /// A posting whose identifying fields were already scraped.
    Scraped {
        job_title: Option<String>,
        company_name: Option<String>,
        salary: Option<String>,
        job_description: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchItemStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchItemResult {
    pub job_post_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub status: BatchItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub duplicate: bool,
}

impl BatchItemResult {
    pub fn success(job_post_url: String, company_name: Option<String>, job_id: Uuid) -> Self {
        Self {
            job_post_url,
            company_name,
            status: BatchItemStatus::Success,
            job_id: Some(job_id),
            error: None,
            duplicate: false,
        }
    }

    pub fn failure(job_post_url: String, company_name: Option<String>, error: String) -> Self {
        Self {
            job_post_url,
            company_name,
            status: BatchItemStatus::Error,
            job_id: None,
            error: Some(error),
            duplicate: false,
        }
    }

    pub fn duplicate(job_post_url: String, company_name: Option<String>) -> Self {
        Self {
            duplicate: true,
            ..Self::failure(
                job_post_url,
                company_name,
                "Duplicate job_post_url".to_string(),
            )
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchSummary {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<BatchItemResult>,
}

impl BatchSummary {
    pub fn from_results(processed: usize, results: Vec<BatchItemResult>) -> Self {
        let successful = results
            .iter()
            .filter(|r| r.status == BatchItemStatus::Success)
            .count();
        BatchSummary {
            processed,
            successful,
            failed: processed - successful,
            results,
        }
    }

    /// True when nothing was inserted and every failure was a duplicate.
    pub fn all_duplicates(&self) -> bool {
        self.successful == 0
            && self.failed > 0
            && self
                .results
                .iter()
                .all(|r| r.status == BatchItemStatus::Success || r.duplicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BatchJobInput {
        BatchJobInput {
            job_title: Some("  Sales Engineer ".to_string()),
            company_name: Some(" Acme ".to_string()),
            job_post_url: " https://jobs.acme.dev/1 ".to_string(),
            company_url: Some("   ".to_string()),
            company_linkedin_slug: None,
            job_description: "\nSell things\n".to_string(),
            salary: Some("$150k".to_string()),
            source: " linkedin ".to_string(),
        }
    }

    #[test]
    fn test_trimmed_drops_blank_optionals() {
        let t = input().trimmed();
        assert_eq!(t.job_title.as_deref(), Some("Sales Engineer"));
        assert_eq!(t.company_name.as_deref(), Some("Acme"));
        assert_eq!(t.job_post_url, "https://jobs.acme.dev/1");
        assert_eq!(t.company_url, None);
        assert_eq!(t.job_description, "Sell things");
        assert_eq!(t.source, "linkedin");
    }

    #[test]
    fn test_summary_counts_failures_against_processed() {
        let results = vec![
            BatchItemResult::success("a".into(), None, Uuid::new_v4()),
            BatchItemResult::duplicate("b".into(), None),
        ];
        let summary = BatchSummary::from_results(2, results);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_duplicates());
    }

    #[test]
    fn test_all_duplicates() {
        let results = vec![
            BatchItemResult::duplicate("a".into(), None),
            BatchItemResult::duplicate("b".into(), Some("Acme".into())),
        ];
        assert!(BatchSummary::from_results(2, results).all_duplicates());

        let mixed = vec![
            BatchItemResult::duplicate("a".into(), None),
            BatchItemResult::failure("b".into(), None, "insert failed".into()),
        ];
        assert!(!BatchSummary::from_results(2, mixed).all_duplicates());
    }

    #[test]
    fn test_result_serialization_omits_empty_fields() {
        let json = serde_json::to_value(BatchItemResult::duplicate("u".into(), None)).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "Duplicate job_post_url");
        assert!(json.get("company_name").is_none());
        assert!(json.get("duplicate").is_none());
    }
}
