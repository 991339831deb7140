//! Context assembly and prompt construction for grounded generation.

use heron_store::RetrievedMatch;

/// Canned reply when retrieval returns nothing; the generation model is
/// never consulted in that case.
pub const INSUFFICIENT_CONTEXT_ANSWER: &str =
    "I don't have enough information in my knowledge base to answer that question.";

/// Render ranked matches as labeled context blocks, best match first.
/// Callers pass matches already sorted descending by score; rank labels
/// start at 1 and unpaged sources render as page 0.
pub fn format_context(matches: &[RetrievedMatch]) -> String {
    let mut formatted = String::new();
    for (i, hit) in matches.iter().enumerate() {
        formatted.push_str(&format!(
            "\n\nCONTEXT CHUNK {} [Source: {}, Page: {}]:\n{}",
            i + 1,
            hit.source,
            hit.page_number.unwrap_or(0),
            hit.text,
        ));
    }
    formatted
}

/// Build the grounded prompt: answer only from the supplied context, admit
/// insufficiency instead of fabricating, cite source and page.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "You are an AI assistant that answers questions based on the provided context.\n\
         \n\
         CONTEXT:\n\
         {context}\n\
         \n\
         USER QUERY: {query}\n\
         \n\
         Please answer the query based only on the provided context. If the context doesn't \
         contain relevant information to answer the query, state that you don't have enough \
         information to provide a complete answer. Do not make up information.\n\
         Cite the sources (document name and page number) when providing information from the \
         context.\n\
         \n\
         ANSWER:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(source: &str, page: Option<u32>, text: &str, score: f32) -> RetrievedMatch {
        RetrievedMatch {
            chunk_id: "id".into(),
            text: text.into(),
            source: source.into(),
            page_number: page,
            score,
        }
    }

    #[test]
    fn context_blocks_are_ranked_from_one() {
        let matches = vec![
            hit("a.pdf", Some(2), "best match", 0.9),
            hit("b.txt", None, "second match", 0.5),
        ];
        let context = format_context(&matches);

        assert!(context.contains("CONTEXT CHUNK 1 [Source: a.pdf, Page: 2]:\nbest match"));
        assert!(context.contains("CONTEXT CHUNK 2 [Source: b.txt, Page: 0]:\nsecond match"));
        let first = context.find("CONTEXT CHUNK 1").unwrap();
        let second = context.find("CONTEXT CHUNK 2").unwrap();
        assert!(first < second);
    }

    #[test]
    fn empty_matches_render_empty_context() {
        assert!(format_context(&[]).is_empty());
    }

    #[test]
    fn prompt_embeds_query_and_context() {
        let prompt = build_prompt("What is X?", "\n\nCONTEXT CHUNK 1 ...");
        assert!(prompt.contains("USER QUERY: What is X?"));
        assert!(prompt.contains("CONTEXT CHUNK 1"));
        assert!(prompt.contains("based only on the provided context"));
        assert!(prompt.contains("Do not make up information."));
        assert!(prompt.ends_with("ANSWER:"));
    }
}
