//! Interview tracking: logged stages, derived contacts, and the date timeline.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::JobRow;
use crate::tracking::dates::is_valid_iso_date;
use crate::tracking::models::{default_stage_status, Contact, InterviewStage};

/// Body of `POST /api/jobs/:id/interview-stages`.
#[derive(Debug, Deserialize)]
pub struct NewInterviewStage {
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
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub follow_up: String,
}

impl NewInterviewStage {
    pub fn into_stage(self) -> Result<InterviewStage, String> {
        let stage_type = self.stage_type.trim().to_string();
        if stage_type.is_empty() {
            return Err("stage_type is required".to_string());
        }
        let date = self.date.trim().to_string();
        if !is_valid_iso_date(&date) {
            return Err("Date must be in YYYY-MM-DD or YYYY-MM-DDTHH:MM format".to_string());
        }
        Ok(InterviewStage {
            stage_type,
            interviewer: self.interviewer.trim().to_string(),
            title: self.title.trim().to_string(),
            email: self.email.trim().to_string(),
            date,
            notes: self.notes,
            status: self
                .status
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(default_stage_status),
            follow_up: self.follow_up,
            gpt_output: None,
        })
    }
}

/// One contact per distinct email, or per distinct name and title when the
/// stage has no email. Stages without any contact detail are skipped.
pub fn extract_contacts(stages: &[InterviewStage]) -> Vec<Contact> {
    let mut seen = HashSet::new();
    let mut contacts = Vec::new();
    for stage in stages {
        if stage.interviewer.is_empty() && stage.title.is_empty() && stage.email.is_empty() {
            continue;
        }
        let key = if stage.email.is_empty() {
            format!("{}|{}", stage.interviewer, stage.title)
        } else {
            stage.email.clone()
        };
        if seen.insert(key) {
            contacts.push(Contact {
                name: stage.interviewer.clone(),
                title: stage.title.clone(),
                email: stage.email.clone(),
            });
        }
    }
    contacts
}

/// Case-insensitive substring match on company name or job title.
pub fn matches_filter(job: &JobRow, filter: &str) -> bool {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [&job.company_name, &job.job_title]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineEvent {
    pub label: &'static str,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
    pub next_upcoming: Option<TimelineEvent>,
    /// Most recent past event, or `"Applied"` when nothing has happened yet.
    pub last_activity: &'static str,
}

pub fn build_timeline(job: &JobRow, now: DateTime<Utc>) -> Timeline {
    let mut events: Vec<TimelineEvent> = [
        ("Recruiter Call", job.recruiter_interview_date),
        ("Manager Interview", job.hiring_manager_interview_date),
        ("Technical Interview", job.technical_interview_date),
        ("Panel Interview", job.panel_interview_date),
        ("Take-home Due", job.take_home_assignment_due_date),
        ("Offer Received", job.offer_received_date),
        ("Follow-up", job.follow_up_date),
    ]
    .into_iter()
    .filter_map(|(label, date)| date.map(|date| TimelineEvent { label, date }))
    .collect();
    events.sort_by_key(|e| e.date);

    let next_upcoming = events.iter().find(|e| e.date >= now).cloned();
    let last_activity = events
        .iter()
        .rev()
        .find(|e| e.date < now)
        .map(|e| e.label)
        .unwrap_or("Applied");

    Timeline {
        events,
        next_upcoming,
        last_activity,
    }
}
