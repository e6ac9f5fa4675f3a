// Enrichment prompt templates.
// `{profile}` is replaced with `CandidateProfile::to_prompt_block()`.

use crate::ingest::models::EnrichmentInput;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::profile::CandidateProfile;

/// Used when only a captured page is available: the model extracts the
/// identifying fields as well as the analysis.
pub const PAGE_EXTRACTION_PROMPT: &str = r#"You are an AI job analyst. Given the job post text and the candidate's resume, extract key fields and provide resume tailoring insights.

Job Post URL: {url}

Job Post Text:
{page_text}

--- Candidate Info ---
{profile}

Return JSON:
{
  "company_name": string,
  "job_title": string,
  "salary": string | null,
  "overview": string,
  "hiring_manager": string | null,
  "required_experience": string,
  "skills_sought": string[],
  "company_insights": string,
  "company_industry": string,
  "ideal_candidate": string,
  "tech_stack": string[],
  "ai_resume_tips": { "strengths": string[], "gaps": string[], "suggested_bullets": string[] },
  "ai_tailored_summary": string,
  "ai_status_score": number (0-100),
  "red_flags": string[],
  "strategy_notes": string
}

{json_only}"#;

/// Used for postings whose identifying fields were scraped by the extension.
pub const SCRAPED_ANALYSIS_PROMPT: &str = r#"You are a helpful AI assistant analyzing job descriptions for {candidate_name}.

The following fields have already been scraped and should NOT be returned:
job_title, company_name, job_post_url, company_url, company_linkedin_slug

Job Title: {job_title}
Company: {company_name}
Scraped Salary: {salary}

Instead, analyze the job post text and return the following fields ONLY:

- salary
- overview
- required_experience
- skills_sought
- ideal_candidate
- company_industry
- tech_stack
- ai_resume_tips (object with: strengths, gaps, suggested_bullets)
- ai_tailored_summary (2-4 sentence pitch of candidate fit)
- ai_status_score (0-100)
- red_flags (list)
- strategy_notes

Return valid JSON with no extra keys. {json_only}

--- Candidate Info ---
{profile}

--- Job Posting ---
{job_description}"#;

/// Builds the user prompt for an enrichment call.
pub fn build_enrichment_prompt(input: &EnrichmentInput, profile: &CandidateProfile) -> String {
    let profile_block = profile.to_prompt_block();
    match input {
        EnrichmentInput::Page { url, page_text } => fill_placeholders(
            PAGE_EXTRACTION_PROMPT,
            &[
                ("{url}", url.as_str()),
                ("{page_text}", page_text.as_str()),
                ("{profile}", profile_block.as_str()),
                ("{json_only}", JSON_ONLY_INSTRUCTION),
            ],
        ),
        EnrichmentInput::Scraped {
            job_title,
            company_name,
            salary,
            job_description,
        } => fill_placeholders(
            SCRAPED_ANALYSIS_PROMPT,
            &[
                ("{candidate_name}", profile.name.as_str()),
                ("{job_title}", job_title.as_deref().unwrap_or("unknown")),
                ("{company_name}", company_name.as_deref().unwrap_or("unknown")),
                ("{salary}", salary.as_deref().unwrap_or("not listed")),
                ("{profile}", profile_block.as_str()),
                ("{json_only}", JSON_ONLY_INSTRUCTION),
                ("{job_description}", job_description.as_str()),
            ],
        ),
    }
}

/// Replaces each `{key}` marker of `template` in one left-to-right scan.
/// Substituted values are never rescanned, so scraped text cannot expand markers.
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::sample_profile;

    #[test]
    fn test_page_prompt_fills_every_placeholder() {
        let input = EnrichmentInput::Page {
            url: "https://jobs.acme.dev/7".to_string(),
            page_text: "Sales Engineer at Acme".to_string(),
        };
        let prompt = build_enrichment_prompt(&input, &sample_profile());
        assert!(prompt.contains("Job Post URL: https://jobs.acme.dev/7"));
        assert!(prompt.contains("Sales Engineer at Acme"));
        assert!(prompt.contains("Skills: Solution design, Python"));
        assert!(!prompt.contains("{profile}"));
        assert!(!prompt.contains("{json_only}"));
    }

    #[test]
    fn test_page_text_placeholders_are_not_expanded() {
        let input = EnrichmentInput::Page {
            url: "u".to_string(),
            page_text: "literal {profile} in page".to_string(),
        };
        let prompt = build_enrichment_prompt(&input, &sample_profile());
        assert!(prompt.contains("literal {profile} in page"));
    }

    #[test]
    fn test_scraped_fields_are_not_expanded() {
        let input = EnrichmentInput::Scraped {
            job_title: Some("Engineer {job_description}".to_string()),
            company_name: Some("{profile} Labs".to_string()),
            salary: None,
            job_description: "Help customers adopt our API.".to_string(),
        };
        let prompt = build_enrichment_prompt(&input, &sample_profile());
        assert_eq!(prompt.matches("Help customers adopt our API.").count(), 1);
        assert!(prompt.contains("Job Title: Engineer {job_description}"));
        assert!(prompt.contains("Company: {profile} Labs"));
        assert_eq!(prompt.matches("Skills: Solution design, Python").count(), 1);
    }

    #[test]
    fn test_page_url_is_not_expanded() {
        let input = EnrichmentInput::Page {
            url: "https://jobs.acme.dev/{page_text}".to_string(),
            page_text: "Sales Engineer at Acme".to_string(),
        };
        let prompt = build_enrichment_prompt(&input, &sample_profile());
        assert!(prompt.contains("Job Post URL: https://jobs.acme.dev/{page_text}"));
        assert_eq!(prompt.matches("Sales Engineer at Acme").count(), 1);
    }

    #[test]
    fn test_json_braces_in_template_are_kept() {
        let filled = fill_placeholders("{\n  \"a\": {x}\n}", &[("{x}", "1")]);
        assert_eq!(filled, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_scraped_prompt_names_candidate_and_defaults() {
        let input = EnrichmentInput::Scraped {
            job_title: Some("Solutions Engineer".to_string()),
            company_name: None,
            salary: None,
            job_description: "Help customers adopt our API.".to_string(),
        };
        let prompt = build_enrichment_prompt(&input, &sample_profile());
        assert!(prompt.contains("analyzing job descriptions for Jordan Reyes"));
        assert!(prompt.contains("Job Title: Solutions Engineer"));
        assert!(prompt.contains("Company: unknown"));
        assert!(prompt.contains("Scraped Salary: not listed"));
        assert!(prompt.ends_with("Help customers adopt our API."));
    }
}
