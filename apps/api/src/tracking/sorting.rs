use std::cmp::Ordering;

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::job::JobRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Columns a dashboard table may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    CompanyName,
    JobTitle,
    AiStatusScore,
    /// Free text in the database; sorted in memory by its numeric value.
    Salary,
    DateApplied,
    ApplicationStatus,
    RecruiterInterviewDate,
    HiringManagerInterviewDate,
}

pub const TRACKED_SORT_KEYS: &[SortKey] = &[
    SortKey::CreatedAt,
    SortKey::CompanyName,
    SortKey::JobTitle,
    SortKey::AiStatusScore,
    SortKey::Salary,
];

pub const APPLICATION_SORT_KEYS: &[SortKey] = &[
    SortKey::DateApplied,
    SortKey::CompanyName,
    SortKey::JobTitle,
    SortKey::ApplicationStatus,
    SortKey::RecruiterInterviewDate,
    SortKey::HiringManagerInterviewDate,
    SortKey::AiStatusScore,
];

impl SortKey {
    /// Column name for `ORDER BY`, or `None` when sorting happens in memory.
    fn column(&self) -> Option<&'static str> {
        match self {
            SortKey::CreatedAt => Some("created_at"),
            SortKey::CompanyName => Some("company_name"),
            SortKey::JobTitle => Some("job_title"),
            SortKey::AiStatusScore => Some("ai_status_score"),
            SortKey::Salary => None,
            SortKey::DateApplied => Some("date_applied"),
            SortKey::ApplicationStatus => Some("application_status"),
            SortKey::RecruiterInterviewDate => Some("recruiter_interview_date"),
            SortKey::HiringManagerInterviewDate => Some("hiring_manager_interview_date"),
        }
    }
}

/// A validated sort request for one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Falls back to `default_key` when no key was requested; rejects keys
    /// the listing does not offer.
    pub fn resolve(
        requested: Option<SortKey>,
        direction: Option<SortDirection>,
        allowed: &[SortKey],
        default_key: SortKey,
    ) -> Result<Self, AppError> {
        let key = requested.unwrap_or(default_key);
        if !allowed.contains(&key) {
            return Err(AppError::Validation(format!(
                "Cannot sort this listing by {key:?}"
            )));
        }
        Ok(SortSpec {
            key,
            direction: direction.unwrap_or_default(),
        })
    }

    /// `ORDER BY` body. Always safe to interpolate: built from the whitelist only.
    pub fn order_by(&self) -> String {
        match self.key.column() {
            Some(col) => format!("{col} {} NULLS LAST, created_at DESC", self.direction.sql()),
            None => "created_at DESC".to_string(),
        }
    }

    /// Applies the in-memory part of the sort, if any.
    pub fn apply_in_memory(&self, jobs: &mut [JobRow]) {
        if self.key == SortKey::Salary {
            jobs.sort_by(|a, b| {
                let ord = salary_value(a.salary.as_deref())
                    .partial_cmp(&salary_value(b.salary.as_deref()))
                    .unwrap_or(Ordering::Equal);
                match self.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
    }
}

/// Numeric value of a salary string: non-numeric characters are dropped and
/// the leading number is read, so `"$120,000 - $150,000"` is 120000.
/// Missing or unreadable salaries count as 0.
pub fn salary_value(salary: Option<&str>) -> f64 {
    let Some(salary) = salary else {
        return 0.0;
    };
    let digits: String = salary
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let end = digits
        .char_indices()
        .find(|(i, c)| *c == '-' && *i > 0)
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_value() {
        assert_eq!(salary_value(Some("$120,000 - $150,000")), 120000.0);
        assert_eq!(salary_value(Some("$150k")), 150.0);
        assert_eq!(salary_value(Some("Competitive")), 0.0);
        assert_eq!(salary_value(None), 0.0);
    }

    #[test]
    fn test_resolve_defaults_and_whitelist() {
        let sort = SortSpec::resolve(None, None, TRACKED_SORT_KEYS, SortKey::CreatedAt).unwrap();
        assert_eq!(sort.key, SortKey::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);

        let err = SortSpec::resolve(
            Some(SortKey::DateApplied),
            None,
            TRACKED_SORT_KEYS,
            SortKey::CreatedAt,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_order_by() {
        let sort = SortSpec {
            key: SortKey::AiStatusScore,
            direction: SortDirection::Asc,
        };
        assert_eq!(sort.order_by(), "ai_status_score ASC NULLS LAST, created_at DESC");

        let salary = SortSpec {
            key: SortKey::Salary,
            direction: SortDirection::Asc,
        };
        assert_eq!(salary.order_by(), "created_at DESC");
    }

    #[test]
    fn test_salary_sorted_in_memory() {
        let mut jobs = vec![
            JobRow::fixture("A", "x"),
            JobRow::fixture("B", "x"),
            JobRow::fixture("C", "x"),
        ];
        jobs[0].salary = Some("$90,000".into());
        jobs[1].salary = None;
        jobs[2].salary = Some("$140,000 - $160,000".into());

        let sort = SortSpec {
            key: SortKey::Salary,
            direction: SortDirection::Desc,
        };
        sort.apply_in_memory(&mut jobs);
        let order: Vec<_> = jobs.iter().map(|j| j.company_name.clone().unwrap()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }
}
