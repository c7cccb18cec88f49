use scraper::Html;

/// Elements whose text never counts as article content.
const STRIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header"];

/// Extracts the visible text of an HTML document.
///
/// Text nodes under any of [`STRIPPED_ELEMENTS`] are skipped; everything else
/// is concatenated in document order without added separators, so the line
/// structure of the source markup survives for the normalizer.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();

    for node in document.tree.root().descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let stripped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| STRIPPED_ELEMENTS.contains(&el.name()))
        });
        if !stripped {
            text.push_str(fragment);
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::normalize::normalize_text;

    const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Why Startups Fail</title>
  <style>body { color: red; }</style>
  <script>window.tracking = "nope";</script>
</head>
<body>
  <header><a href="/">Logo</a> Sign in</header>
  <nav><ul><li>Home</li><li>Archive</li></ul></nav>
  <article>
    <h1>Founders ignore customers</h1>
    <p>Most startups die because they build what nobody wants.</p>
    <p>Talk to users  every week.</p>
  </article>
  <footer>Copyright 2024</footer>
  <script>console.log("late script")</script>
</body>
</html>"#;

    #[test]
    fn test_strips_non_content_elements() {
        let text = extract_visible_text(ARTICLE);
        assert!(text.contains("Founders ignore customers"));
        assert!(text.contains("build what nobody wants"));
        let noise_samples = [
            "color: red",
            "tracking",
            "Logo",
            "Sign in",
            "Archive",
            "Copyright",
            "late script",
        ];
        for noise in noise_samples {
            assert!(!text.contains(noise), "leaked {noise:?}");
        }
    }

    #[test]
    fn test_keeps_document_title() {
        // <head> is not stripped, only <header>.
        assert!(extract_visible_text(ARTICLE).contains("Why Startups Fail"));
    }

    #[test]
    fn test_extracted_text_normalizes_cleanly() {
        let normalized = normalize_text(&extract_visible_text(ARTICLE));
        let lines: Vec<&str> = normalized.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Why Startups Fail",
                "Founders ignore customers",
                "Most startups die because they build what nobody wants.",
                "Talk to users",
                "every week.",
            ]
        );
    }

    #[test]
    fn test_fragment_without_structure() {
        assert_eq!(extract_visible_text("just text"), "just text");
        assert_eq!(extract_visible_text(""), "");
    }
}
