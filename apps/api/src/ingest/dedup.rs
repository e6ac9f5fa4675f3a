use std::collections::HashSet;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::ingest::models::{BatchItemResult, BatchJobInput};
use crate::ingest::normalize::normalize_url;

/// Splits a trimmed batch into rows to insert and duplicate results.
/// A job is a duplicate if its normalized URL is already stored or appeared
/// earlier in the same batch. The returned inputs carry normalized URLs.
pub fn partition_batch(
    jobs: Vec<BatchJobInput>,
    existing_urls: &HashSet<String>,
) -> (Vec<BatchJobInput>, Vec<BatchItemResult>) {
    let mut seen_in_batch = HashSet::new();
    let mut fresh = Vec::new();
    let mut duplicates = Vec::new();

    for mut job in jobs {
        let url = normalize_url(&job.job_post_url);
        if existing_urls.contains(&url) || !seen_in_batch.insert(url.clone()) {
            info!(job_post_url = %url, "Duplicate job_post_url, skipping");
            duplicates.push(BatchItemResult::duplicate(url, job.company_name));
            continue;
        }
        job.job_post_url = url;
        fresh.push(job);
    }

    (fresh, duplicates)
}

/// Case-insensitive comparison of two (company, title) pairs.
/// Both companies must be known; a missing title only matches a missing title.
pub fn same_posting(
    company_a: Option<&str>,
    title_a: Option<&str>,
    company_b: Option<&str>,
    title_b: Option<&str>,
) -> bool {
    let eq = |a: &str, b: &str| a.trim().eq_ignore_ascii_case(b.trim());
    match (company_a, company_b) {
        (Some(ca), Some(cb)) if eq(ca, cb) => match (title_a, title_b) {
            (Some(ta), Some(tb)) => eq(ta, tb),
            (None, None) => true,
            _ => false,
        },
        _ => false,
    }
}

/// Returns which of `urls` are already stored.
pub async fn find_existing_urls(pool: &PgPool, urls: &[String]) -> Result<HashSet<String>, sqlx::Error> {
    if urls.is_empty() {
        return Ok(HashSet::new());
    }
    let rows: Vec<String> =
        sqlx::query_scalar("SELECT job_post_url FROM jobs WHERE job_post_url = ANY($1)")
            .bind(urls)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().collect())
}

pub async fn find_id_by_url(pool: &PgPool, url: &str) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM jobs WHERE job_post_url = $1")
        .bind(url)
        .fetch_optional(pool)
        .await
}

/// Looks for a stored posting from the same company with the same title.
pub async fn find_id_by_company_and_title(
    pool: &PgPool,
    company_name: &str,
    job_title: Option<&str>,
) -> Result<Option<Uuid>, sqlx::Error> {
    let candidates: Vec<(Uuid, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT id, company_name, job_title FROM jobs WHERE lower(company_name) = lower($1)",
    )
    .bind(company_name.trim())
    .fetch_all(pool)
    .await?;

    Ok(candidates
        .into_iter()
        .find(|(_, company, title)| {
            same_posting(
                Some(company_name),
                job_title,
                company.as_deref(),
                title.as_deref(),
            )
        })
        .map(|(id, _, _)| id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(url: &str) -> BatchJobInput {
        BatchJobInput {
            job_title: None,
            company_name: Some("Acme".to_string()),
            job_post_url: url.to_string(),
            company_url: None,
            company_linkedin_slug: None,
            job_description: "desc".to_string(),
            salary: None,
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_existing_urls_are_duplicates() {
        let existing: HashSet<String> = ["https://a.dev/1".to_string()].into();
        let (fresh, dups) = partition_batch(vec![job("https://a.dev/1/"), job("https://a.dev/2")], &existing);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].job_post_url, "https://a.dev/2");
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].job_post_url, "https://a.dev/1");
        assert!(dups[0].duplicate);
    }

    #[test]
    fn test_repeats_within_batch_are_duplicates() {
        let (fresh, dups) = partition_batch(
            vec![job("https://a.dev/1"), job("https://a.dev/1#top"), job("https://a.dev/3")],
            &HashSet::new(),
        );
        assert_eq!(fresh.len(), 2);
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].company_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_same_posting() {
        assert!(same_posting(Some("Acme "), Some("SE"), Some("acme"), Some("se")));
        assert!(!same_posting(Some("Acme"), Some("SE"), Some("Acme"), Some("AE")));
        assert!(!same_posting(Some("Acme"), Some("SE"), Some("Acme"), None));
        assert!(same_posting(Some("Acme"), None, Some("ACME"), None));
        assert!(!same_posting(None, None, None, None));
    }
}
