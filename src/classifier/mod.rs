// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLASSIFICAÇÃO DE INTENÇÃO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Atribui uma das quatro intenções a cada query:
// - LlmClassifier: few-shot via LLM em modo determinístico
// - RuleClassifier: palavras-chave, sem provedor
//
// Saídas fora do conjunto fechado viram UNKNOWN.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod extract;
mod prompts;
mod rules;

pub use extract::*;
pub use prompts::{classification_prompt, FEW_SHOT_EXAMPLES};
pub use rules::RuleClassifier;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{NewsSenseError, Result};
use crate::llm::{generate_with_timeout, GenerationMode, LlmClient};
use crate::types::{Intent, Query};

/// Trait para classificadores de intenção.
///
/// Uma chamada por query, sem estado entre chamadas.
#[async_trait]
pub trait QueryClassifier: Send + Sync {
    /// Classifica a query em exatamente uma intenção
    async fn classify(&self, query: &Query) -> Result<Intent>;

    /// Nome para logs
    fn name(&self) -> &'static str;
}

/// Classificador baseado em LLM
pub struct LlmClassifier {
    llm: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl LlmClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }
}

#[async_trait]
impl QueryClassifier for LlmClassifier {
    async fn classify(&self, query: &Query) -> Result<Intent> {
        if query.is_blank() {
            return Err(NewsSenseError::InvalidInput("query text is empty".into()));
        }

        let prompt = classification_prompt(query);
        let response = generate_with_timeout(
            self.llm.as_ref(),
            &prompt,
            GenerationMode::Deterministic,
            self.timeout,
        )
        .await
        .map_err(|e| {
            log::warn!("⚠️  [{}] Falha na classificação: {}", query.id, e);
            NewsSenseError::from_llm(e)
        })?;

        let intent = parse_intent_label(&response.text);
        log::debug!(
            "🏷️  [{}] Rótulo bruto {:?} → {}",
            query.id,
            response.text,
            intent
        );
        Ok(intent)
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// Normaliza a resposta do LLM para uma intenção.
///
/// Aceita "TRENDING", "Intent: verify", "**SUMMARIZE**." etc.
/// Qualquer outra coisa é `Unknown`.
pub fn parse_intent_label(raw: &str) -> Intent {
    let text = raw.trim();
    let text = match text.get(..7) {
        Some(head) if head.eq_ignore_ascii_case("intent:") => &text[7..],
        _ => text,
    };

    text.split_whitespace()
        .next()
        .map(|token| token.trim_matches(|c: char| !c.is_ascii_alphabetic()))
        .and_then(Intent::from_label)
        .unwrap_or(Intent::Unknown)
}
