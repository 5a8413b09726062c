// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// VERIFICADOR DE AFIRMAÇÕES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Busca evidências na web e pede ao LLM um veredito sobre a afirmação.
//
// Regras:
// - Sem resultados → UNCERTAIN, sem chamada ao LLM
// - Falha na busca → UNCERTAIN, sem fontes (nunca inventadas)
// - Falha no LLM → UNCERTAIN, com as fontes reais encontradas
// - Resposta fora do formato → UNCERTAIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::sync::Arc;
use std::time::Duration;

use crate::config::CoreConfig;
use crate::error::{NewsSenseError, Result};
use crate::llm::{generate_with_timeout, GenerationMode, LlmClient, LlmPrompt};
use crate::search::{extract_hostname, search_with_timeout, WebSearchClient};
use crate::types::{FactCheckResult, Reference, SerpQuery, Verdict, WebSearchHit};
use crate::utils::{clean_text, ActionTimer};

/// Máximo de referências retornadas
pub const MAX_REFERENCES: usize = 3;

/// Justificativas usadas quando não há veredito do LLM
const NO_RESULTS_RATIONALE: &str = "No search results were found for this claim.";
const SEARCH_FAILED_RATIONALE: &str = "Web search is unavailable, so the claim could not be checked.";
const LLM_FAILED_RATIONALE: &str = "Sources were found but a verdict could not be derived from them.";
const UNPARSEABLE_RATIONALE: &str = "The evidence could not be interpreted.";

/// Verificador de afirmações
pub struct ClaimVerifier {
    search: Arc<dyn WebSearchClient>,
    llm: Arc<dyn LlmClient>,
    max_results: usize,
    max_references: usize,
    timeout: Duration,
}

impl ClaimVerifier {
    pub fn new(search: Arc<dyn WebSearchClient>, llm: Arc<dyn LlmClient>, config: &CoreConfig) -> Self {
        Self {
            search,
            llm,
            max_results: config.web_max_results,
            max_references: config.max_references.clamp(1, MAX_REFERENCES),
            timeout: config.provider_timeout,
        }
    }

    /// Verifica a afirmação.
    ///
    /// Só retorna erro para afirmação vazia; falhas de provedor
    /// degradam para `Uncertain`.
    pub async fn verify(&self, claim: &str) -> Result<FactCheckResult> {
        let claim = claim.trim();
        if claim.is_empty() {
            return Err(NewsSenseError::InvalidInput("claim is empty".into()));
        }

        let timer = ActionTimer::start("Verificação");
        log::info!("🔎 Verificando afirmação: {}", claim);

        let query = SerpQuery::new(claim, self.max_results);
        let hits = match search_with_timeout(self.search.as_ref(), &query, self.timeout).await {
            Ok(hits) => hits,
            Err(e) => {
                log::warn!("⚠️  Busca web falhou: {}", e);
                return Ok(FactCheckResult::uncertain(claim, SEARCH_FAILED_RATIONALE));
            }
        };

        let references: Vec<Reference> = hits
            .into_iter()
            .take(self.max_references)
            .map(to_reference)
            .collect();

        if references.is_empty() {
            log::info!("📭 Nenhum resultado para a afirmação");
            return Ok(FactCheckResult::uncertain(claim, NO_RESULTS_RATIONALE));
        }

        let prompt = verdict_prompt(claim, &references);
        let (verdict, rationale) = match generate_with_timeout(
            self.llm.as_ref(),
            &prompt,
            GenerationMode::Deterministic,
            self.timeout,
        )
        .await
        {
            Ok(response) => parse_verdict(&response.text),
            Err(e) => {
                log::warn!("⚠️  LLM falhou ao gerar veredito: {}", e);
                (Verdict::Uncertain, LLM_FAILED_RATIONALE.to_string())
            }
        };

        log::info!(
            "✅ Veredito {} com {} fontes ({}ms)",
            verdict,
            references.len(),
            timer.stop()
        );

        Ok(FactCheckResult {
            claim: claim.to_string(),
            verdict,
            references,
            rationale,
        })
    }
}

fn to_reference(hit: WebSearchHit) -> Reference {
    Reference {
        hostname: extract_hostname(&hit.url).unwrap_or_default(),
        title: clean_text(&hit.title),
        snippet: clean_text(&hit.snippet),
        url: hit.url,
    }
}

/// Prompt de veredito com a afirmação e os trechos das fontes
pub fn verdict_prompt(claim: &str, references: &[Reference]) -> LlmPrompt {
    let system = r#"You are a careful fact-checker.
Decide whether the search results support or refute the claim.
Use only the evidence given. If the results disagree with each other, or do not address the claim directly, answer UNCERTAIN.

Answer in exactly this format:
VERDICT: SUPPORTED | REFUTED | UNCERTAIN
RATIONALE: <one sentence>"#;

    let evidence = references
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[{}] {} ({})\n{}", i + 1, r.title, r.hostname, r.snippet))
        .collect::<Vec<_>>()
        .join("\n\n");

    LlmPrompt::new(
        system,
        format!("Claim: {}\n\nSearch results:\n{}", claim, evidence),
    )
}

/// Lê `VERDICT:` e `RATIONALE:` da resposta.
///
/// Sem rótulo válido → `Uncertain`.
pub fn parse_verdict(text: &str) -> (Verdict, String) {
    let mut verdict = None;
    let mut rationale = None;

    for line in text.lines() {
        let line = line.trim().trim_start_matches(['*', '#', '-', ' ']);
        if let Some(rest) = strip_label(line, "verdict:") {
            let label = rest
                .trim_start_matches(|c: char| !c.is_ascii_alphabetic())
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .trim_matches(|c: char| !c.is_ascii_alphabetic());
            verdict = Verdict::from_label(label);
        } else if let Some(rest) = strip_label(line, "rationale:") {
            let rest = rest.trim().trim_matches('*').trim();
            if !rest.is_empty() {
                rationale = Some(rest.to_string());
            }
        }
    }

    match verdict {
        Some(verdict) => (
            verdict,
            rationale.unwrap_or_else(|| "No rationale given.".to_string()),
        ),
        None => (Verdict::Uncertain, UNPARSEABLE_RATIONALE.to_string()),
    }
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        line.get(label.len()..)
    } else {
        None
    }
}
