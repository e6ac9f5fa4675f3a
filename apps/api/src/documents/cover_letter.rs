use chrono::{DateTime, Utc};

pub const COVER_LETTER_TEMPLATE: &str = include_str!("../../templates/cover_letter.html");

pub struct CoverLetterFields<'a> {
    pub candidate_name: &'a str,
    pub company_name: Option<&'a str>,
    pub job_title: Option<&'a str>,
    pub date: DateTime<Utc>,
}

/// `October 19, 2026`
pub fn letter_date(date: DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Fills every placeholder in `template`. Missing job fields become empty.
pub fn fill_template(template: &str, fields: &CoverLetterFields<'_>) -> String {
    let replacements = [
        ("{{candidateName}}", escape_html(fields.candidate_name)),
        (
            "{{companyName}}",
            escape_html(fields.company_name.unwrap_or_default()),
        ),
        ("{{jobTitle}}", escape_html(fields.job_title.unwrap_or_default())),
        ("{{date}}", letter_date(fields.date)),
    ];
    replacements
        .iter()
        .fold(template.to_string(), |html, (key, value)| {
            html.replace(key, value)
        })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fields<'a>(company: Option<&'a str>, title: Option<&'a str>) -> CoverLetterFields<'a> {
        CoverLetterFields {
            candidate_name: "Jordan Reyes",
            company_name: company,
            job_title: title,
            date: Utc.with_ymd_and_hms(2026, 10, 9, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_letter_date() {
        let date = Utc.with_ymd_and_hms(2026, 10, 9, 0, 0, 0).unwrap();
        assert_eq!(letter_date(date), "October 9, 2026");
    }

    #[test]
    fn test_fill_template_replaces_every_occurrence_and_escapes() {
        let html = fill_template(
            "<p>{{companyName}} / {{jobTitle}} / {{companyName}} / {{date}} / {{candidateName}}</p>",
            &fields(Some("Smith & Wesson"), Some("<Lead> SE")),
        );
        assert_eq!(
            html,
            "<p>Smith &amp; Wesson / &lt;Lead&gt; SE / Smith &amp; Wesson / October 9, 2026 / Jordan Reyes</p>"
        );
    }

    #[test]
    fn test_bundled_template_has_no_leftover_placeholders() {
        let html = fill_template(COVER_LETTER_TEMPLATE, &fields(None, None));
        assert!(!html.contains("{{"));
        assert!(html.contains("October 9, 2026"));
    }
}
