// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SUMARIZADOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Resume um artigo (ou as notícias de um tópico) em 3 a 5 bullets.
//
// Fluxo:
// 1. Pedido ao LLM em modo criativo (TITLE + bullets)
// 2. Resposta inválida (contagem fora de [3,5] ou cópia literal) → 1 retry
// 3. Finalização: trunca em 5; menos de 3 → degraded
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::sync::Arc;
use std::time::Duration;

use crate::config::CoreConfig;
use crate::error::{NewsSenseError, Provider, Result};
use crate::llm::{generate_with_timeout, GenerationMode, LlmClient, LlmPrompt};
use crate::news::{fetch_with_timeout, NewsQuery, NewsSearchClient};
use crate::trending::{aggregate_articles, GroupingThresholds};
use crate::types::{NewsSummary, GENERAL_TOPIC};
use crate::utils::{clean_text, first_sentence, is_verbatim_copy, truncate_to_tokens, ActionTimer};

/// Limites de bullets
pub const MIN_BULLETS: usize = 3;
pub const MAX_BULLETS: usize = 5;

/// Bullets com mais palavras que isso não podem ser cópia literal da fonte
pub const MAX_VERBATIM_WORDS: usize = 12;

/// Orçamento de tokens do texto enviado ao LLM
const MAX_SOURCE_TOKENS: usize = 3_000;

/// Histórias usadas no digest de um tópico
const MAX_DIGEST_STORIES: usize = 10;

const DEFAULT_TITLE: &str = "Article summary";

/// Resposta do LLM já interpretada
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSummary {
    /// Linha `TITLE:` (se houver)
    pub title: Option<String>,
    /// Bullets, já reduzidos à primeira frase
    pub bullets: Vec<String>,
}

impl ParsedSummary {
    /// Problema que justifica um retry (None = aceitável)
    fn problem(&self, source: &str) -> Option<String> {
        let count = self.bullets.len();
        if !(MIN_BULLETS..=MAX_BULLETS).contains(&count) {
            return Some(format!(
                "You returned {} bullet points; return between {} and {}.",
                count, MIN_BULLETS, MAX_BULLETS
            ));
        }
        if self
            .bullets
            .iter()
            .any(|b| is_verbatim_copy(b, source, MAX_VERBATIM_WORDS))
        {
            return Some(
                "Some bullet points copy the article word for word; rewrite them in your own words."
                    .to_string(),
            );
        }
        None
    }
}

/// Sumarizador de artigos e tópicos
pub struct Summarizer {
    llm: Arc<dyn LlmClient>,
    news: Arc<dyn NewsSearchClient>,
    page_size: usize,
    timeout: Duration,
    thresholds: GroupingThresholds,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LlmClient>, news: Arc<dyn NewsSearchClient>, config: &CoreConfig) -> Self {
        Self {
            llm,
            news,
            page_size: config.news_page_size,
            timeout: config.provider_timeout,
            thresholds: GroupingThresholds::from(config),
        }
    }

    /// Resume o texto de um artigo.
    ///
    /// Texto vazio → `InvalidInput` sem chamar o provedor.
    pub async fn summarize(&self, text: &str, topic_hint: Option<&str>) -> Result<NewsSummary> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NewsSenseError::InvalidInput("article text is empty".into()));
        }

        let source = clean_text(truncate_to_tokens(text, MAX_SOURCE_TOKENS));
        if source.is_empty() {
            return Err(NewsSenseError::InvalidInput(
                "article text has no readable content".into(),
            ));
        }

        let timer = ActionTimer::start("Resumo");
        let hint = topic_hint.map(str::trim).filter(|h| !h.is_empty());

        log::info!("📝 Resumindo {} palavras", crate::utils::word_count(&source));

        let first = self
            .generate(&summary_prompt(&source, hint, None))
            .await
            .map_err(NewsSenseError::from_llm)?;
        let mut parsed = parse_summary(&first);

        if let Some(problem) = parsed.problem(&source) {
            log::warn!("🔁 Resumo inválido, pedindo novamente: {}", problem);
            match self.generate(&summary_prompt(&source, hint, Some(&problem))).await {
                Ok(retry) => {
                    let retried = parse_summary(&retry);
                    if retried.problem(&source).is_none() || retried.bullets.len() >= parsed.bullets.len() {
                        parsed = retried;
                    }
                }
                Err(e) => log::warn!("⚠️  Retry do resumo falhou, usando a primeira resposta: {}", e),
            }
        }

        let summary = finalize(parsed, hint);
        log::info!(
            "✅ Resumo com {} bullets{} ({}ms)",
            summary.bullets.len(),
            if summary.degraded { " (degradado)" } else { "" },
            timer.stop()
        );
        Ok(summary)
    }

    /// Resume as notícias de um tópico.
    ///
    /// Busca artigos, agrupa histórias e resume o digest.
    /// Sem artigos → resumo degradado vazio, sem chamar o LLM.
    pub async fn summarize_topic(&self, topic: &str) -> Result<NewsSummary> {
        let query = NewsQuery::new(topic, self.page_size);
        let label = if query.topic.is_empty() {
            GENERAL_TOPIC.to_string()
        } else {
            query.topic.clone()
        };

        let articles = fetch_with_timeout(self.news.as_ref(), &query, self.timeout)
            .await
            .map_err(|e| NewsSenseError::from_search(Provider::NewsSearch, e))?;

        if articles.is_empty() {
            log::info!("📭 Nenhum artigo para '{}'", label);
            return Ok(NewsSummary {
                topic: label,
                bullets: Vec::new(),
                degraded: true,
            });
        }

        let stories = aggregate_articles(articles, &label, &self.thresholds);
        let digest = stories
            .iter()
            .take(MAX_DIGEST_STORIES)
            .map(|story| {
                if story.description.is_empty() {
                    format!("- {} ({})", story.headline, story.sources.join(", "))
                } else {
                    format!(
                        "- {} ({}): {}",
                        story.headline,
                        story.sources.join(", "),
                        story.description
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut summary = self.summarize(&digest, Some(&label)).await?;
        summary.topic = label;
        Ok(summary)
    }

    async fn generate(&self, prompt: &LlmPrompt) -> std::result::Result<String, crate::llm::LlmError> {
        generate_with_timeout(self.llm.as_ref(), prompt, GenerationMode::Creative, self.timeout)
            .await
            .map(|r| r.text)
    }
}

/// Trunca em 5 bullets e marca como degradado abaixo de 3
fn finalize(parsed: ParsedSummary, hint: Option<&str>) -> NewsSummary {
    let mut bullets = parsed.bullets;
    bullets.truncate(MAX_BULLETS);

    NewsSummary {
        topic: parsed
            .title
            .or_else(|| hint.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        degraded: bullets.len() < MIN_BULLETS,
        bullets,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROMPT E PARSER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Prompt de resumo; `correction` descreve o problema da resposta anterior
pub fn summary_prompt(source: &str, topic_hint: Option<&str>, correction: Option<&str>) -> LlmPrompt {
    let system = format!(
        r#"You are a news editor. Summarize the text for a busy reader.

Rules:
- Write between {min} and {max} bullet points, each starting with "- ".
- Each bullet is one self-contained sentence.
- Use your own words; never copy more than {words} consecutive words from the text.
- Only state facts present in the text.

Answer in exactly this format:
TITLE: <short title>
- <bullet>
- <bullet>
- <bullet>"#,
        min = MIN_BULLETS,
        max = MAX_BULLETS,
        words = MAX_VERBATIM_WORDS
    );

    let mut user = String::new();
    if let Some(hint) = topic_hint {
        user.push_str(&format!("Topic: {}\n\n", hint));
    }
    user.push_str(&format!("<text>\n{}\n</text>", source));
    if let Some(correction) = correction {
        user.push_str(&format!(
            "\n\nYour previous answer was not accepted. {}",
            correction
        ));
    }

    LlmPrompt::new(system, user)
}

/// Lê a linha `TITLE:` e os bullets (`-`, `*`, `•` ou numerados)
pub fn parse_summary(text: &str) -> ParsedSummary {
    let mut parsed = ParsedSummary::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(head) = line.get(..6) {
            if head.eq_ignore_ascii_case("title:") {
                let title = line[6..].trim().trim_matches('*').trim();
                if !title.is_empty() && parsed.title.is_none() {
                    parsed.title = Some(title.to_string());
                }
                continue;
            }
        }

        if let Some(content) = bullet_content(line) {
            let content = content.trim().trim_matches('*').trim();
            let sentence = first_sentence(content).trim();
            if !sentence.is_empty() {
                parsed.bullets.push(sentence.to_string());
            }
        }
    }

    parsed
}

fn bullet_content(line: &str) -> Option<&str> {
    for marker in ['-', '*', '•', '–'] {
        if let Some(rest) = line.strip_prefix(marker) {
            if rest.starts_with(char::is_whitespace) {
                return Some(rest);
            }
        }
    }

    // "1. texto" ou "1) texto"
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
        if rest.starts_with(char::is_whitespace) {
            return Some(rest);
        }
    }
    None
}
