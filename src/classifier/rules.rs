// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLASSIFICADOR POR REGRAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Classifica a query por palavras-chave, sem chamar provedor.
// Ordem de precedência:
//   1. pedido de resumo
//   2. pedido explícito de verificação ("fact check", "is it true")
//   3. notícias em alta
//   4. pergunta fechada ("Is ...?", "Did ...?") → verificação
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;

use super::QueryClassifier;
use crate::error::{NewsSenseError, Result};
use crate::types::{Intent, Query};

const SUMMARIZE_KEYWORDS: &[&str] = &[
    "summarize", "summarise", "summary", "summaries", "tl;dr", "tldr", "sum up", "recap",
    "key points", "main points", "digest of",
];

const VERIFY_KEYWORDS: &[&str] = &[
    "fact check", "fact-check", "factcheck", "is it true", "is this true", "is that true",
    "true that", "verify", "check if", "check whether", "confirm that", "debunk", "hoax",
    "is it real", "is it fake", "fake news",
];

const TRENDING_KEYWORDS: &[&str] = &[
    "trending", "headlines", "headline", "latest", "breaking", "top stories", "top news",
    "what's new", "whats new", "what is new", "what's happening", "whats happening",
    "going on", "news", "popular", "hot topics", "updates",
];

/// Início de pergunta fechada (sim/não)
const CLOSED_QUESTION_STARTS: &[&str] = &[
    "is", "are", "was", "were", "did", "does", "do", "has", "have", "had", "can", "will",
    "could",
];

/// Classificador determinístico por palavras-chave
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classificação síncrona (pura)
    pub fn classify_text(&self, text: &str) -> Intent {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return Intent::Unknown;
        }

        if contains_any(&lower, SUMMARIZE_KEYWORDS) {
            return Intent::Summarize;
        }
        if contains_any(&lower, VERIFY_KEYWORDS) {
            return Intent::Verify;
        }
        if contains_any(&lower, TRENDING_KEYWORDS) {
            return Intent::Trending;
        }
        if is_closed_question(&lower) {
            return Intent::Verify;
        }

        Intent::Unknown
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn is_closed_question(text: &str) -> bool {
    let first_word = text
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphanumeric());

    CLOSED_QUESTION_STARTS.contains(&first_word)
        && text.ends_with('?')
        && crate::utils::word_count(text) >= 3
}

#[async_trait]
impl QueryClassifier for RuleClassifier {
    async fn classify(&self, query: &Query) -> Result<Intent> {
        if query.is_blank() {
            return Err(NewsSenseError::InvalidInput("query text is empty".into()));
        }
        Ok(self.classify_text(&query.text))
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
