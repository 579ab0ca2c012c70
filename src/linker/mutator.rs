//! Appends a "Related Notes" section with wiki links to a note body.

pub const RELATED_NOTES_HEADING: &str = "### Related Notes";

/// Wiki link for a note title, e.g. `[[Apple]]`.
pub fn wiki_link(title: &str) -> String {
    format!("[[{title}]]")
}

/// New note content produced by [`plan_links`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinkUpdate {
    pub content: String,
    /// Titles that were linked, in candidate order
    pub added: Vec<String>,
}

/// Decide which candidate links are new and build the updated content.
///
/// A candidate is skipped if its wiki link already occurs anywhere in
/// `content`. Returns `None` when nothing needs to be written.
///
/// Each run that finds new links appends its own heading; an existing
/// "Related Notes" section is not merged into.
pub fn plan_links<S: AsRef<str>>(content: &str, candidates: &[(S, f32)]) -> Option<LinkUpdate> {
    let mut added: Vec<String> = Vec::new();
    let mut links: Vec<String> = Vec::new();

    for (title, score) in candidates {
        let title: &str = title.as_ref();
        let link = wiki_link(title);

        if content.contains(&link) || links.contains(&link) {
            continue;
        }

        log::info!("  - {title} (Similarity: {score:.2})");
        links.push(link);
        added.push(title.to_string());
    }

    if links.is_empty() {
        return None;
    }

    let mut updated = content.trim_end().to_string();
    updated.push_str("\n\n");
    updated.push_str(RELATED_NOTES_HEADING);
    updated.push('\n');
    updated.push_str(&links.join("\n"));

    Some(LinkUpdate {
        content: updated,
        added,
    })
}
