use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One past role, summarized for the enrichment prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceSummary {
    pub title: String,
    pub summary: String,
}

/// The candidate's résumé data. Loaded once at startup and fed into every
/// enrichment prompt so fit scores are relative to this person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceSummary>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub preferred_industries: Vec<String>,
    #[serde(default)]
    pub undesired_industries: Vec<String>,
    #[serde(default)]
    pub work_environment_preferences: Vec<String>,
}

impl CandidateProfile {
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read candidate profile at '{path}'"))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Candidate profile at '{path}' is not valid JSON"))
    }

    /// Renders the profile as the plain-text block embedded in prompts.
    pub fn to_prompt_block(&self) -> String {
        let experience = self
            .experience
            .iter()
            .map(|e| format!("• {}: {}", e.title, e.summary))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Summary: {}\nSkills: {}\nExperience:\n{}\nValues: {}\nPreferred Industries: {}\nUndesired Industries: {}\nWork Preferences: {}",
            self.summary,
            self.skills.join(", "),
            experience,
            self.values.join(", "),
            self.preferred_industries.join(", "),
            self.undesired_industries.join(", "),
            self.work_environment_preferences.join(", "),
        )
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> CandidateProfile {
    CandidateProfile {
        name: "Jordan Reyes".to_string(),
        summary: "Sales engineer with a decade of API platform experience.".to_string(),
        skills: vec!["Solution design".to_string(), "Python".to_string()],
        experience: vec![ExperienceSummary {
            title: "Senior Sales Engineer".to_string(),
            summary: "Ran technical discovery for enterprise deals.".to_string(),
        }],
        values: vec!["Ownership".to_string()],
        preferred_industries: vec!["Developer tools".to_string()],
        undesired_industries: vec!["Gambling".to_string()],
        work_environment_preferences: vec!["Remote".to_string()],
    }
}
