use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tracking::dates::deserialize_optional_datetime;

/// Lifecycle of a row in the `jobs` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    PendingEnrichment,
    EnrichmentFailed,
    Tracked,
    Applied,
    Archived,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::PendingEnrichment => "pending_enrichment",
            JobStatus::EnrichmentFailed => "enrichment_failed",
            JobStatus::Tracked => "tracked",
            JobStatus::Applied => "applied",
            JobStatus::Archived => "archived",
        }
    }
}

/// Where an application stands in the hiring process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStage {
    Applied,
    Screening,
    RecruiterCall,
    TechnicalInterview,
    HiringManager,
    PanelInterview,
    FinalRound,
    Offer,
    Negotiation,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStage {
    pub const ALL: [ApplicationStage; 12] = [
        ApplicationStage::Applied,
        ApplicationStage::Screening,
        ApplicationStage::RecruiterCall,
        ApplicationStage::TechnicalInterview,
        ApplicationStage::HiringManager,
        ApplicationStage::PanelInterview,
        ApplicationStage::FinalRound,
        ApplicationStage::Offer,
        ApplicationStage::Negotiation,
        ApplicationStage::Accepted,
        ApplicationStage::Rejected,
        ApplicationStage::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStage::Applied => "applied",
            ApplicationStage::Screening => "screening",
            ApplicationStage::RecruiterCall => "recruiter_call",
            ApplicationStage::TechnicalInterview => "technical_interview",
            ApplicationStage::HiringManager => "hiring_manager",
            ApplicationStage::PanelInterview => "panel_interview",
            ApplicationStage::FinalRound => "final_round",
            ApplicationStage::Offer => "offer",
            ApplicationStage::Negotiation => "negotiation",
            ApplicationStage::Accepted => "accepted",
            ApplicationStage::Rejected => "rejected",
            ApplicationStage::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == s)
    }
}

/// One logged interview round, stored in `jobs.interview_stages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewStage {
    pub stage_type: String,
    #[serde(default)]
    pub interviewer: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub email: String,
    pub date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_stage_status")]
    pub status: String,
    #[serde(default)]
    pub follow_up: String,
    #[serde(default)]
    pub gpt_output: Option<Value>,
}

pub fn default_stage_status() -> String {
    "Pending".to_string()
}

/// A person met during the process, derived from interview stages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub name: String,
    pub title: String,
    pub email: String,
}

/// Free-form log line, stored newest first in `jobs.activity_log`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub notes: String,
    pub date_created: DateTime<Utc>,
}

/// Body of `PATCH /api/jobs/:id/tracking`. Absent fields leave the column as is.
#[derive(Debug, Default, Deserialize)]
pub struct TrackingUpdate {
    pub next_steps: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub follow_up_date: Option<DateTime<Utc>>,
    pub recruiter_name: Option<String>,
    pub recruiter_email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub recruiter_interview_date: Option<DateTime<Utc>>,
    pub hiring_manager_name: Option<String>,
    pub hiring_manager_email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub hiring_manager_interview_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub technical_interview_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub panel_interview_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub take_home_assignment_due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub offer_received_date: Option<DateTime<Utc>>,
    pub offer_details: Option<Value>,
    pub offer_status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub next_step_due_date: Option<DateTime<Utc>>,
    pub next_step_defined: Option<bool>,
    pub strategic_interview_angle: Option<String>,
    pub strategic_leverage: Option<String>,
}

impl TrackingUpdate {
    /// Trims text fields, turning blanks into "not provided", and checks emails.
    pub fn cleaned(mut self) -> Result<Self, String> {
        for field in [
            &mut self.next_steps,
            &mut self.recruiter_name,
            &mut self.recruiter_email,
            &mut self.hiring_manager_name,
            &mut self.hiring_manager_email,
            &mut self.offer_status,
            &mut self.strategic_interview_angle,
            &mut self.strategic_leverage,
        ] {
            *field = field
                .take()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
        }
        for (name, email) in [
            ("recruiter_email", &self.recruiter_email),
            ("hiring_manager_email", &self.hiring_manager_email),
        ] {
            if let Some(email) = email {
                if !email.contains('@') {
                    return Err(format!("{name} must be a valid email address"));
                }
            }
        }
        Ok(self)
    }
}
