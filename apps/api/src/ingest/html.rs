use scraper::{Html, Selector};

/// Upper bound on page text sent to the model.
pub const MAX_PAGE_TEXT_CHARS: usize = 60_000;

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "svg", "template"];

/// Reduces a captured page to its visible text: one line per text node,
/// whitespace collapsed, `<script>`/`<style>` and similar dropped, and the
/// result capped at `max_chars` characters.
pub fn visible_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let root = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut lines: Vec<String> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let inside_skipped = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if inside_skipped {
            continue;
        }
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !collapsed.is_empty() {
            lines.push(collapsed);
        }
    }

    truncate_chars(&lines.join("\n"), max_chars)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_scripts_and_styles() {
        let html = r#"<html><head><style>.x{color:red}</style></head>
            <body><h1>Sales Engineer</h1><script>var tracking = 1;</script>
            <p>Acme   is   hiring</p></body></html>"#;
        let text = visible_text(html, MAX_PAGE_TEXT_CHARS);
        assert_eq!(text, "Sales Engineer\nAcme is hiring");
    }

    #[test]
    fn test_fragment_without_body() {
        let text = visible_text("<div>Remote <b>OK</b></div>", MAX_PAGE_TEXT_CHARS);
        assert_eq!(text, "Remote\nOK");
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let text = visible_text("<p>ééééé</p>", 3);
        assert_eq!(text, "ééé");
    }
}
