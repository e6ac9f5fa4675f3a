use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::ingest::models::ResumeTips;
use crate::tracking::models::{ActivityEntry, Contact, InterviewStage};

/// One row of the `jobs` table: the scraped posting, its enrichment, and
/// everything tracked about the application afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub job_post_url: String,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub salary: Option<String>,
    pub company_url: Option<String>,
    pub company_linkedin_slug: Option<String>,
    pub job_description: Option<String>,
    #[serde(skip_serializing)]
    pub raw_html: Option<String>,
    pub source: String,

    pub overview: Option<String>,
    pub hiring_manager: Option<String>,
    pub required_experience: Option<String>,
    pub skills_sought: Vec<String>,
    pub company_insights: Option<String>,
    pub ideal_candidate: Option<String>,
    pub company_industry: Option<String>,
    pub tech_stack: Vec<String>,
    pub ai_resume_tips: Option<Json<ResumeTips>>,
    pub ai_tailored_summary: Option<String>,
    pub ai_status_score: Option<i32>,
    pub red_flags: Vec<String>,
    pub strategy_notes: Option<String>,
    pub ai_version: Option<String>,
    pub status: String,
    pub enrichment_attempts: i32,
    pub enrichment_error: Option<String>,
    pub enriched_at: Option<DateTime<Utc>>,

    pub application_status: Option<String>,
    pub date_applied: Option<DateTime<Utc>>,
    pub application_notes: Option<String>,
    pub next_steps: Option<String>,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub recruiter_name: Option<String>,
    pub recruiter_email: Option<String>,
    pub recruiter_interview_date: Option<DateTime<Utc>>,
    pub hiring_manager_name: Option<String>,
    pub hiring_manager_email: Option<String>,
    pub hiring_manager_interview_date: Option<DateTime<Utc>>,
    pub technical_interview_date: Option<DateTime<Utc>>,
    pub panel_interview_date: Option<DateTime<Utc>>,
    pub take_home_assignment_due_date: Option<DateTime<Utc>>,
    pub offer_received_date: Option<DateTime<Utc>>,
    pub offer_details: Option<Value>,
    pub offer_status: Option<String>,
    pub date_archived: Option<DateTime<Utc>>,
    pub current_interview_stage: Option<String>,
    pub interview_stages: Json<Vec<InterviewStage>>,
    pub contacts: Json<Vec<Contact>>,
    pub activity_log: Json<Vec<ActivityEntry>>,
    pub next_step_due_date: Option<DateTime<Utc>>,
    pub next_step_defined: Option<bool>,
    pub strategic_interview_angle: Option<String>,
    pub strategic_leverage: Option<String>,
}

#[cfg(test)]
impl JobRow {
    /// A freshly tracked row with every optional column empty.
    pub(crate) fn fixture(company: &str, title: &str) -> Self {
        let now = Utc::now();
        JobRow {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            job_post_url: format!(
                "https://jobs.example.com/{}",
                company.to_lowercase().replace(' ', "-")
            ),
            company_name: Some(company.to_string()),
            job_title: Some(title.to_string()),
            salary: None,
            company_url: None,
            company_linkedin_slug: None,
            job_description: None,
            raw_html: None,
            source: "test".to_string(),
            overview: None,
            hiring_manager: None,
            required_experience: None,
            skills_sought: vec![],
            company_insights: None,
            ideal_candidate: None,
            company_industry: None,
            tech_stack: vec![],
            ai_resume_tips: None,
            ai_tailored_summary: None,
            ai_status_score: None,
            red_flags: vec![],
            strategy_notes: None,
            ai_version: None,
            status: "tracked".to_string(),
            enrichment_attempts: 0,
            enrichment_error: None,
            enriched_at: None,
            application_status: None,
            date_applied: None,
            application_notes: None,
            next_steps: None,
            follow_up_date: None,
            recruiter_name: None,
            recruiter_email: None,
            recruiter_interview_date: None,
            hiring_manager_name: None,
            hiring_manager_email: None,
            hiring_manager_interview_date: None,
            technical_interview_date: None,
            panel_interview_date: None,
            take_home_assignment_due_date: None,
            offer_received_date: None,
            offer_details: None,
            offer_status: None,
            date_archived: None,
            current_interview_stage: None,
            interview_stages: Json(vec![]),
            contacts: Json(vec![]),
            activity_log: Json(vec![]),
            next_step_due_date: None,
            next_step_defined: None,
            strategic_interview_angle: None,
            strategic_leverage: None,
        }
    }
}
