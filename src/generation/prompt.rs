//! Prompt templates for grounded and conversational generation

use crate::retrieval::RetrievedChunk;

/// Prompt builder for chat queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build numbered context from retrieved chunks
    pub fn build_context(results: &[RetrievedChunk]) -> String {
        let mut context = String::new();

        for (i, result) in results.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {}\n\nContent:\n{}\n\n---\n\n",
                i + 1,
                result.chunk.title,
                result.chunk.text
            ));
        }

        context
    }

    /// Build the grounded answer prompt
    ///
    /// The answer must come strictly from the supplied context; the model is
    /// told to cite sources inline so citations can be linked afterwards.
    pub fn build_grounded_prompt(question: &str, context: &str, results: &[RetrievedChunk]) -> String {
        format!(
            r#"You are a hospital information assistant. Answer questions about hospital services using ONLY the context below.

RULES:
1. Use only information explicitly stated in the context
2. If the context does not contain the answer, say "I couldn't find that information in the hospital's documents"
3. Cite the source of each fact inline using the format [Source: document title]
4. Keep the answer short, clear, and practical
5. Never invent timings, phone numbers, or policies

CONTEXT:
{context}

AVAILABLE SOURCES:
{sources}

QUESTION: {question}

Answer with inline citations:"#,
            context = context,
            sources = Self::format_sources_list(results),
            question = question
        )
    }

    /// Build the unconstrained conversational prompt used when nothing
    /// relevant was retrieved
    pub fn build_conversational_prompt(question: &str) -> String {
        format!(
            r#"You are a friendly hospital information assistant. The hospital's documents do not cover the user's message, so reply conversationally and briefly. Do not invent hospital-specific facts such as timings, phone numbers, or policies; suggest contacting the hospital front desk for anything you cannot know.

USER MESSAGE: {question}

Reply:"#,
            question = question
        )
    }

    fn format_sources_list(results: &[RetrievedChunk]) -> String {
        results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("[{}] {}", i + 1, r.chunk.title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentChunk;
    use chrono::Utc;

    fn retrieved(title: &str, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk: DocumentChunk {
                chunk_id: "c1".to_string(),
                source_id: "doc.md".to_string(),
                title: title.to_string(),
                category: "timings".to_string(),
                text: text.to_string(),
                updated_at: Utc::now(),
            },
            score: 0.9,
        }
    }

    #[test]
    fn context_numbers_each_chunk() {
        let results = vec![
            retrieved("OPD Guide", "OPD opens at 9am."),
            retrieved("Visiting Hours", "Visitors allowed 4pm to 7pm."),
        ];
        let context = PromptBuilder::build_context(&results);
        assert!(context.contains("[1] OPD Guide"));
        assert!(context.contains("[2] Visiting Hours"));
        assert!(context.contains("OPD opens at 9am."));
    }

    #[test]
    fn grounded_prompt_carries_question_and_sources() {
        let results = vec![retrieved("OPD Guide", "OPD opens at 9am.")];
        let context = PromptBuilder::build_context(&results);
        let prompt =
            PromptBuilder::build_grounded_prompt("When does OPD open?", &context, &results);
        assert!(prompt.contains("QUESTION: When does OPD open?"));
        assert!(prompt.contains("[1] OPD Guide"));
        assert!(prompt.contains("[Source: document title]"));
    }
}
