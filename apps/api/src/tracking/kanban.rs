use serde::Serialize;

use crate::models::job::JobRow;
use crate::tracking::models::ApplicationStage;

/// Board columns in display order, each backed by one application stage.
pub const KANBAN_COLUMNS: [(&str, ApplicationStage); 4] = [
    ("Applied", ApplicationStage::Applied),
    ("Recruiter Screen", ApplicationStage::RecruiterCall),
    ("Hiring Manager", ApplicationStage::HiringManager),
    ("Awaiting Offer", ApplicationStage::Offer),
];

#[derive(Debug, Serialize)]
pub struct KanbanColumn {
    pub title: &'static str,
    pub stage: ApplicationStage,
    pub jobs: Vec<JobRow>,
}

pub fn column_to_stage(column: &str) -> Option<ApplicationStage> {
    KANBAN_COLUMNS
        .iter()
        .find(|(title, _)| *title == column)
        .map(|(_, stage)| *stage)
}

/// Groups jobs into the board columns; jobs in other stages are left out.
pub fn group_by_column(jobs: Vec<JobRow>) -> Vec<KanbanColumn> {
    let mut columns: Vec<KanbanColumn> = KANBAN_COLUMNS
        .iter()
        .map(|&(title, stage)| KanbanColumn {
            title,
            stage,
            jobs: Vec::new(),
        })
        .collect();

    for job in jobs {
        let Some(status) = job.application_status.as_deref() else {
            continue;
        };
        if let Some(column) = columns.iter_mut().find(|c| c.stage.as_str() == status) {
            column.jobs.push(job);
        }
    }
    columns
}
