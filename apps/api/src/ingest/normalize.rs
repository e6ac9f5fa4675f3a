//! Normalization of raw LLM output into an `Enrichment`.
//!
//! The model is asked for a fixed schema but routinely returns lists as
//! comma-separated strings, scores as `"85/100"`, resume tips as a bare
//! array, and placeholders like `"N/A"`. Everything here is total: bad
//! shapes degrade to "absent", never to an error.

use serde_json::{Map, Value};

use crate::ingest::models::{Enrichment, ResumeTips};

const NULL_PLACEHOLDERS: &[&str] = &["null", "n/a", "none"];
const LIST_ITEM_KEYS: &[&str] = &["name", "skill", "text"];

/// Normalizes a model response. Non-object input yields an empty enrichment.
pub fn normalize_enrichment(raw: &Value) -> Enrichment {
    let Some(obj) = raw.as_object() else {
        return Enrichment::default();
    };

    Enrichment {
        company_name: text_field(obj, "company_name"),
        job_title: text_field(obj, "job_title"),
        salary: text_field(obj, "salary"),
        overview: text_field(obj, "overview"),
        hiring_manager: text_field(obj, "hiring_manager"),
        required_experience: text_field(obj, "required_experience"),
        skills_sought: list_field(obj, "skills_sought"),
        company_insights: text_field(obj, "company_insights"),
        ideal_candidate: text_field(obj, "ideal_candidate"),
        company_industry: text_field(obj, "company_industry"),
        tech_stack: list_field(obj, "tech_stack"),
        ai_resume_tips: obj.get("ai_resume_tips").and_then(normalize_resume_tips),
        ai_tailored_summary: text_field(obj, "ai_tailored_summary"),
        ai_status_score: obj.get("ai_status_score").and_then(normalize_score),
        red_flags: list_field(obj, "red_flags"),
        strategy_notes: text_field(obj, "strategy_notes"),
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(normalize_text)
}

fn list_field(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key).map(normalize_list).unwrap_or_default()
}

/// Coerces a scalar or list into a single trimmed string.
pub fn normalize_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(normalize_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Null | Value::Object(_) => return None,
    };

    if text.is_empty() || is_placeholder(&text) {
        None
    } else {
        Some(text)
    }
}

/// Coerces an array or delimited string into a deduplicated list.
pub fn normalize_list(value: &Value) -> Vec<String> {
    let candidates: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(list_item).collect(),
        Value::String(s) => s
            .split(['\n', ',', ';'])
            .map(str::to_string)
            .collect(),
        _ => vec![],
    };

    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .map(|s| strip_bullet(&s).to_string())
        .filter(|s| !s.is_empty() && !is_placeholder(s))
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

fn list_item(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => LIST_ITEM_KEYS
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

fn strip_bullet(s: &str) -> &str {
    s.trim()
        .trim_start_matches(['-', '*', '•'])
        .trim()
}

fn is_placeholder(s: &str) -> bool {
    NULL_PLACEHOLDERS.contains(&s.to_lowercase().as_str())
}

/// Accepts the documented object shape (snake or camel keys), a bare list
/// of bullets, or a single string of bullets.
pub fn normalize_resume_tips(value: &Value) -> Option<ResumeTips> {
    let tips = match value {
        Value::Object(obj) => {
            let pick = |snake: &str, camel: &str| {
                obj.get(snake)
                    .or_else(|| obj.get(camel))
                    .map(normalize_list)
                    .unwrap_or_default()
            };
            ResumeTips {
                strengths: pick("strengths", "strengths"),
                gaps: pick("gaps", "gaps"),
                suggested_bullets: pick("suggested_bullets", "suggestedBullets"),
            }
        }
        Value::Array(_) => ResumeTips {
            suggested_bullets: normalize_list(value),
            ..ResumeTips::default()
        },
        // Bullets are sentences, so a bare string is split on lines only.
        Value::String(s) => ResumeTips {
            suggested_bullets: normalize_list(&Value::Array(
                s.lines().map(|l| Value::String(l.to_string())).collect(),
            )),
            ..ResumeTips::default()
        },
        _ => return None,
    };

    if tips.is_empty() {
        None
    } else {
        Some(tips)
    }
}

/// Reads a 0–100 fit score from a number or a numeric-prefixed string.
pub fn normalize_score(value: &Value) -> Option<i32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => leading_number(s.trim())?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as i32)
}

fn leading_number(s: &str) -> Option<f64> {
    let end = s
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse::<f64>().ok()
}

/// Canonical form of a posting URL used for duplicate detection:
/// trimmed, without `#fragment`, without trailing `/`.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = url.split_once('#').map(|(head, _)| head).unwrap_or(url);
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_object_normalizes() {
        let raw = json!({
            "company_name": " Acme ",
            "job_title": "Sales Engineer",
            "hiring_manager": "N/A",
            "skills_sought": ["Python", "python", " SQL "],
            "tech_stack": "Rust, Postgres; Kafka",
            "ai_resume_tips": {
                "strengths": ["APIs"],
                "gaps": "No Kafka",
                "suggestedBullets": ["- Built demo env"]
            },
            "ai_status_score": "85/100",
            "red_flags": null,
            "strategy_notes": ""
        });

        let e = normalize_enrichment(&raw);
        assert_eq!(e.company_name.as_deref(), Some("Acme"));
        assert_eq!(e.hiring_manager, None);
        assert_eq!(e.skills_sought, vec!["Python", "SQL"]);
        assert_eq!(e.tech_stack, vec!["Rust", "Postgres", "Kafka"]);
        let tips = e.ai_resume_tips.unwrap();
        assert_eq!(tips.strengths, vec!["APIs"]);
        assert_eq!(tips.gaps, vec!["No Kafka"]);
        assert_eq!(tips.suggested_bullets, vec!["Built demo env"]);
        assert_eq!(e.ai_status_score, Some(85));
        assert!(e.red_flags.is_empty());
        assert_eq!(e.strategy_notes, None);
    }

    #[test]
    fn test_only_null_markers_are_dropped() {
        let raw = json!({
            "company_name": "Unknown",
            "job_title": "NA",
            "salary": "None",
            "hiring_manager": "null"
        });
        let e = normalize_enrichment(&raw);
        assert_eq!(e.company_name.as_deref(), Some("Unknown"));
        assert_eq!(e.job_title.as_deref(), Some("NA"));
        assert_eq!(e.salary, None);
        assert_eq!(e.hiring_manager, None);
    }

    #[test]
    fn test_non_object_is_empty() {
        assert_eq!(normalize_enrichment(&json!([1, 2])), Enrichment::default());
    }

    #[test]
    fn test_score_shapes() {
        assert_eq!(normalize_score(&json!(72.6)), Some(73));
        assert_eq!(normalize_score(&json!(140)), Some(100));
        assert_eq!(normalize_score(&json!(-5)), Some(0));
        assert_eq!(normalize_score(&json!("64%")), Some(64));
        assert_eq!(normalize_score(&json!("high")), None);
        assert_eq!(normalize_score(&json!(null)), None);
    }

    #[test]
    fn test_list_from_objects() {
        let list = normalize_list(&json!([
            {"name": "Go"},
            {"skill": "Terraform"},
            {"value": "Helm"}
        ]));
        assert_eq!(list, vec!["Go", "Terraform"]);
    }

    #[test]
    fn test_list_strips_bullets_and_newlines() {
        let list = normalize_list(&json!("• Remote only\n* Unpaid trial\n\n- N/A"));
        assert_eq!(list, vec!["Remote only", "Unpaid trial"]);
    }

    #[test]
    fn test_text_joins_arrays() {
        assert_eq!(
            normalize_text(&json!(["5+ years", "SaaS sales"])).as_deref(),
            Some("5+ years\nSaaS sales")
        );
        assert_eq!(normalize_text(&json!(7)).as_deref(), Some("7"));
        assert_eq!(normalize_text(&json!({"a": 1})), None);
    }

    #[test]
    fn test_resume_tips_from_array_and_string() {
        let from_array = normalize_resume_tips(&json!(["Lead with demos"])).unwrap();
        assert_eq!(from_array.suggested_bullets, vec!["Lead with demos"]);
        assert!(from_array.strengths.is_empty());

        let from_string = normalize_resume_tips(&json!("Quantify wins\nMention APIs")).unwrap();
        assert_eq!(from_string.suggested_bullets.len(), 2);

        assert_eq!(normalize_resume_tips(&json!({})), None);
        assert_eq!(normalize_resume_tips(&json!(3)), None);
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("  https://boards.example.com/jobs/12/#apply "),
            "https://boards.example.com/jobs/12"
        );
        assert_eq!(
            normalize_url("https://example.com/job?id=4"),
            "https://example.com/job?id=4"
        );
    }
}
