//! # Prompt de Classificação
//!
//! Instrução fixa que enumera as intenções com exemplos (few-shot).
//! O LLM deve responder com exatamente um rótulo.

use crate::llm::LlmPrompt;
use crate::types::{Intent, Query};

/// Exemplos few-shot: (query, rótulo esperado)
pub const FEW_SHOT_EXAMPLES: &[(&str, Intent)] = &[
    ("What's trending in tech today?", Intent::Trending),
    ("Show me the top headlines", Intent::Trending),
    ("Any news about the elections?", Intent::Trending),
    ("Is it true that Apple acquired OpenAI?", Intent::Verify),
    ("Fact check: the Eiffel Tower was sold in 2023", Intent::Verify),
    ("Did NASA find water on Mars?", Intent::Verify),
    ("Summarize this article: The central bank kept rates...", Intent::Summarize),
    ("Give me a summary of the climate summit", Intent::Summarize),
    ("Tell me a joke", Intent::Unknown),
    ("What's the weather like?", Intent::Unknown),
];

// ============================================================================
// PROMPT DE SISTEMA
// ============================================================================

fn system_prompt() -> String {
    let examples = FEW_SHOT_EXAMPLES
        .iter()
        .map(|(query, intent)| format!("Query: {}\nIntent: {}", query, intent))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are the intent classifier of a news assistant.
Classify the user's query into exactly one of these intents:

- TRENDING: the user wants current, popular or breaking news, optionally about a topic.
- VERIFY: the user states or asks about a claim and wants to know whether it is true.
- SUMMARIZE: the user wants a summary of an article they provide or of a news topic.
- UNKNOWN: anything else, or the request is ambiguous.

<examples>
{}
</examples>

Answer with the intent label only: TRENDING, VERIFY, SUMMARIZE or UNKNOWN.
Do not explain your answer."#,
        examples
    )
}

// ============================================================================
// PROMPT DO USUÁRIO
// ============================================================================

/// Maior trecho da query enviado ao classificador.
/// Artigos colados inteiros não mudam a intenção.
const MAX_QUERY_CHARS: usize = 1_500;

/// Monta o prompt de classificação para uma query
pub fn classification_prompt(query: &Query) -> LlmPrompt {
    let text = crate::utils::truncate_to_tokens(&query.text, MAX_QUERY_CHARS / 4);

    let mut user = String::new();
    if !query.context.is_empty() {
        user.push_str("<previous_turns>\n");
        for turn in &query.context {
            user.push_str(turn);
            user.push('\n');
        }
        user.push_str("</previous_turns>\n\n");
    }
    user.push_str(&format!("Query: {}\nIntent:", text));

    LlmPrompt::new(system_prompt(), user)
}
