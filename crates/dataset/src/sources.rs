//! Best-effort extraction of a trailing sources section from an answer.
//!
//! The completion service is asked to end its answer with a `Sources:`
//! heading but is free to ignore that. Extraction never fails; when no
//! marker is found there are simply no sources.

/// Headings that introduce the sources section.
pub const SOURCE_MARKERS: [&str; 2] = ["Sources:", "References:"];

/// Return the text after the last `Sources:` or `References:` marker.
///
/// The result is trimmed of whitespace. A markdown bold close (`**`)
/// directly after the marker, as in `**Sources:**`, is dropped; list
/// bullets in the section are kept. `None` when no marker is
/// present or nothing follows it.
///
/// ```
/// use qagen_dataset::extract_sources;
///
/// let answer = "Magma is molten rock.\nSources:\nref1\nref2";
/// assert_eq!(extract_sources(answer).as_deref(), Some("ref1\nref2"));
/// assert_eq!(extract_sources("No citations here."), None);
/// ```
pub fn extract_sources(answer: &str) -> Option<String> {
    let start = SOURCE_MARKERS
        .iter()
        .filter_map(|marker| answer.rfind(marker).map(|idx| idx + marker.len()))
        .max()?;

    let rest = &answer[start..];
    let sources = rest.strip_prefix("**").unwrap_or(rest).trim();

    if sources.is_empty() {
        None
    } else {
        Some(sources.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_section() {
        let answer = "Volcanoes erupt when pressure builds.\nSources:\nref1\nref2";
        assert_eq!(extract_sources(answer).as_deref(), Some("ref1\nref2"));
    }

    #[test]
    fn test_references_marker() {
        let answer = "Body text.\n\nReferences:\n1. https://usgs.gov\n";
        assert_eq!(extract_sources(answer).as_deref(), Some("1. https://usgs.gov"));
    }

    #[test]
    fn test_no_marker() {
        assert_eq!(extract_sources("Just an answer."), None);
        assert_eq!(extract_sources(""), None);
    }

    #[test]
    fn test_marker_with_nothing_after() {
        assert_eq!(extract_sources("Answer.\nSources:   \n"), None);
    }

    #[test]
    fn test_last_marker_wins() {
        let answer = "See Sources: below.\nReferences:\nfinal ref";
        assert_eq!(extract_sources(answer).as_deref(), Some("final ref"));
    }

    #[test]
    fn test_markdown_bold_heading() {
        let answer = "Answer body.\n\n**Sources:**\n- https://example.org/a\n- https://example.org/b";
        assert_eq!(
            extract_sources(answer).as_deref(),
            Some("- https://example.org/a\n- https://example.org/b")
        );
    }

    #[test]
    fn test_bulleted_sources_keep_markers() {
        let answer = "Body.\nSources:\n* https://usgs.gov\n* https://nasa.gov";
        assert_eq!(
            extract_sources(answer).as_deref(),
            Some("* https://usgs.gov\n* https://nasa.gov")
        );
    }

    #[test]
    fn test_bold_heading_with_bulleted_sources() {
        let answer = "Body.\n**Sources:**\n* a\n* b";
        assert_eq!(extract_sources(answer).as_deref(), Some("* a\n* b"));
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        assert_eq!(extract_sources("sources: lowercase is ignored"), None);
    }
}
