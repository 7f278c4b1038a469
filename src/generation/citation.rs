//! Citation extraction and linking

use once_cell::sync::Lazy;
use regex::Regex;

use crate::retrieval::RetrievedChunk;
use crate::types::DocumentChunk;

/// Matches inline markers of the form `[Source: document title]`
static CITATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[Source:\s*([^\]]+)\]").expect("Invalid citation regex"));

/// Link `[Source: ...]` markers in the generated answer back to retrieved
/// chunks and return the cited source ids
///
/// Only sources present in the retrieved set can ever be cited; markers that
/// name anything else are dropped. Ids are deduplicated and kept in order of
/// first use in the answer. When the model cited nothing explicitly, the
/// top-ranked sources are credited instead so a grounded answer is never
/// returned without attribution.
pub fn link_citations(answer: &str, retrieved: &[RetrievedChunk]) -> Vec<String> {
    let mut citations: Vec<String> = Vec::new();

    for cap in CITATION_PATTERN.captures_iter(answer) {
        let name = cap[1].trim();
        if let Some(chunk) = find_source(retrieved, name) {
            if !citations.contains(&chunk.source_id) {
                citations.push(chunk.source_id.clone());
            }
        }
    }

    if citations.is_empty() {
        for result in retrieved.iter().take(3) {
            if !citations.contains(&result.chunk.source_id) {
                citations.push(result.chunk.source_id.clone());
            }
        }
    }

    citations
}

/// Find a retrieved chunk matching the cited name
fn find_source<'a>(retrieved: &'a [RetrievedChunk], name: &str) -> Option<&'a DocumentChunk> {
    let needle = name.to_lowercase();

    // Exact title or source id match first
    if let Some(result) = retrieved.iter().find(|r| {
        r.chunk.title.to_lowercase() == needle || r.chunk.source_id.to_lowercase() == needle
    }) {
        return Some(&result.chunk);
    }

    // Fuzzy match on the title
    retrieved
        .iter()
        .find(|r| {
            let title = r.chunk.title.to_lowercase();
            title.contains(&needle) || needle.contains(&title)
        })
        .map(|r| &r.chunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn retrieved(source_id: &str, title: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk: DocumentChunk {
                chunk_id: format!("{}-1", source_id),
                source_id: source_id.to_string(),
                title: title.to_string(),
                category: "general".to_string(),
                text: "content".to_string(),
                updated_at: Utc::now(),
            },
            score: 0.8,
        }
    }

    #[test]
    fn links_in_first_use_order_and_dedupes() {
        let chunks = vec![
            retrieved("opd.md", "OPD Guide"),
            retrieved("visits.md", "Visiting Hours"),
        ];
        let answer = "Visitors come 4-7pm [Source: Visiting Hours]. OPD opens at 9am \
                      [Source: OPD Guide]. Again, 4-7pm [Source: Visiting Hours].";
        let citations = link_citations(answer, &chunks);
        assert_eq!(citations, vec!["visits.md".to_string(), "opd.md".to_string()]);
    }

    #[test]
    fn never_cites_outside_the_retrieved_set() {
        let chunks = vec![retrieved("opd.md", "OPD Guide")];
        let answer = "See [Source: Some Other Document] and [Source: OPD Guide].";
        let citations = link_citations(answer, &chunks);
        assert_eq!(citations, vec!["opd.md".to_string()]);
    }

    #[test]
    fn falls_back_to_top_sources_when_no_markers() {
        let chunks = vec![
            retrieved("a.md", "Doc A"),
            retrieved("b.md", "Doc B"),
            retrieved("a.md", "Doc A"),
            retrieved("c.md", "Doc C"),
        ];
        let citations = link_citations("An answer without markers.", &chunks);
        assert_eq!(citations, vec!["a.md".to_string(), "b.md".to_string()]);
    }

    #[test]
    fn no_retrieval_means_no_citations() {
        assert!(link_citations("Anything [Source: Ghost]", &[]).is_empty());
    }

    #[test]
    fn matches_titles_case_insensitively() {
        let chunks = vec![retrieved("opd.md", "OPD Guide")];
        let citations = link_citations("Open 9am [Source: opd guide]", &chunks);
        assert_eq!(citations, vec!["opd.md".to_string()]);
    }
}
