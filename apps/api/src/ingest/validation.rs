//! Payload validation for the batch ingestion route.
//!
//! Works on the raw `serde_json::Value` so every problem in the batch is
//! reported at once, each with a `[index, field]` path.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ingest::models::BatchJobInput;
use crate::ingest::normalize::normalize_url;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Field(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationIssue {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl ValidationIssue {
    fn at(index: usize, field: Option<&str>, message: impl Into<String>) -> Self {
        let mut path = vec![PathSegment::Index(index)];
        if let Some(field) = field {
            path.push(PathSegment::Field(field.to_string()));
        }
        ValidationIssue {
            path,
            message: message.into(),
        }
    }
}

/// How a field is checked.
#[derive(Clone, Copy)]
enum Rule {
    /// Must be present and a non-empty string.
    Required,
    /// May be absent; if present must be a non-empty string.
    OptionalNonEmpty,
    /// May be absent; if present must be a string.
    Optional,
}

const FIELD_RULES: &[(&str, Rule)] = &[
    ("job_title", Rule::Optional),
    ("company_name", Rule::Optional),
    ("job_post_url", Rule::Required),
    ("company_url", Rule::OptionalNonEmpty),
    ("company_linkedin_slug", Rule::OptionalNonEmpty),
    ("job_description", Rule::Required),
    ("salary", Rule::OptionalNonEmpty),
    ("source", Rule::Required),
];

/// Validates a batch body. Returns the typed jobs, or every issue found.
/// The caller has already checked that `items` came from a JSON array.
pub fn validate_batch(items: &[Value]) -> Result<Vec<BatchJobInput>, Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let mut jobs = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            issues.push(ValidationIssue::at(index, None, "Expected object"));
            continue;
        };

        let item_issues = validate_item(index, object);
        if !item_issues.is_empty() {
            issues.extend(item_issues);
            continue;
        }

        match serde_json::from_value::<BatchJobInput>(item.clone()) {
            Ok(job) => jobs.push(job),
            Err(e) => issues.push(ValidationIssue::at(index, None, e.to_string())),
        }
    }

    if issues.is_empty() {
        Ok(jobs)
    } else {
        Err(issues)
    }
}

fn validate_item(index: usize, object: &Map<String, Value>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for &(field, rule) in FIELD_RULES {
        match (object.get(field), rule) {
            (None | Some(Value::Null), Rule::Required) => {
                issues.push(ValidationIssue::at(
                    index,
                    Some(field),
                    format!("{field} is required"),
                ));
            }
            (None | Some(Value::Null), _) => {}
            // A URL that is only a fragment or slashes normalizes to nothing.
            (Some(Value::String(s)), Rule::Required)
                if s.is_empty() || (field == "job_post_url" && normalize_url(s).is_empty()) =>
            {
                issues.push(ValidationIssue::at(
                    index,
                    Some(field),
                    format!("{field} is required"),
                ));
            }
            (Some(Value::String(s)), Rule::OptionalNonEmpty) if s.is_empty() => {
                issues.push(ValidationIssue::at(
                    index,
                    Some(field),
                    format!("{field} must not be empty"),
                ));
            }
            (Some(Value::String(_)), _) => {}
            (Some(_), _) => {
                issues.push(ValidationIssue::at(index, Some(field), "Expected string"));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_item() -> Value {
        json!({
            "job_title": "Sales Engineer",
            "company_name": "Acme",
            "job_post_url": "https://jobs.acme.dev/42",
            "job_description": "Own the technical sale.",
            "source": "linkedin"
        })
    }

    #[test]
    fn test_valid_batch_parses() {
        let jobs = validate_batch(&[valid_item()]).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_post_url, "https://jobs.acme.dev/42");
        assert_eq!(jobs[0].salary, None);
    }

    #[test]
    fn test_empty_batch_is_valid() {
        assert!(validate_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_required_fields_reported_with_paths() {
        let mut item = valid_item();
        item.as_object_mut().unwrap().remove("source");
        item["job_description"] = json!("");

        let issues = validate_batch(&[valid_item(), item]).unwrap_err();
        assert_eq!(issues.len(), 2);
        assert_eq!(
            issues[0].path,
            vec![
                PathSegment::Index(1),
                PathSegment::Field("job_description".into())
            ]
        );
        assert_eq!(issues[0].message, "job_description is required");
        assert_eq!(issues[1].message, "source is required");
    }

    #[test]
    fn test_null_required_field_is_missing() {
        let mut item = valid_item();
        item["job_post_url"] = Value::Null;
        let issues = validate_batch(&[item]).unwrap_err();
        assert_eq!(issues[0].message, "job_post_url is required");
    }

    #[test]
    fn test_url_that_normalizes_to_nothing_is_missing() {
        for url in ["#x", "/", "  //#top "] {
            let mut item = valid_item();
            item["job_post_url"] = json!(url);
            let issues = validate_batch(&[item]).unwrap_err();
            assert_eq!(issues.len(), 1);
            assert_eq!(issues[0].message, "job_post_url is required");
        }
    }

    #[test]
    fn test_optional_present_but_empty_is_rejected() {
        let mut item = valid_item();
        item["salary"] = json!("");
        let issues = validate_batch(&[item]).unwrap_err();
        assert_eq!(issues[0].message, "salary must not be empty");
    }

    #[test]
    fn test_optional_title_may_be_empty() {
        let mut item = valid_item();
        item["job_title"] = json!("");
        assert!(validate_batch(&[item]).is_ok());
    }

    #[test]
    fn test_wrong_type_is_reported() {
        let mut item = valid_item();
        item["company_name"] = json!(42);
        let issues = validate_batch(&[item]).unwrap_err();
        assert_eq!(issues[0].message, "Expected string");
    }

    #[test]
    fn test_non_object_item() {
        let issues = validate_batch(&[json!("nope")]).unwrap_err();
        assert_eq!(issues[0].path, vec![PathSegment::Index(0)]);
        assert_eq!(issues[0].message, "Expected object");
    }

    #[test]
    fn test_issue_path_serializes_like_array() {
        let issue = ValidationIssue::at(3, Some("source"), "source is required");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["path"], json!([3, "source"]));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut item = valid_item();
        item["extra"] = json!({"anything": true});
        assert!(validate_batch(&[item]).is_ok());
    }
}
