const UNKNOWN_COMPANY: &str = "Company";

/// Keeps ASCII word characters, whitespace and `-`, then joins whitespace
/// runs with `_`.
pub fn safe_company(company: Option<&str>) -> String {
    let kept: String = company
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    let joined = kept.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        UNKNOWN_COMPANY.to_string()
    } else {
        joined
    }
}

/// Strips characters that would break a quoted `Content-Disposition` value.
fn header_safe(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn resume_filename(candidate: &str, company: Option<&str>) -> String {
    format!(
        "Resume of {} - {}.pdf",
        header_safe(candidate),
        safe_company(company)
    )
}

pub fn cover_letter_filename(candidate: &str, company: Option<&str>) -> String {
    format!(
        "Cover Letter of {} - {}.pdf",
        header_safe(candidate),
        safe_company(company)
    )
}
