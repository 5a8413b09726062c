// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EXTRAÇÃO DE PARÂMETROS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Extrai o parâmetro do especialista a partir do texto da query.
// Funções puras, baseadas em regras; nenhuma chamada externa.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Intent, Parameter, Query, GENERAL_TOPIC};

/// Tópicos reconhecidos diretamente no texto ("tech news", "sports headlines")
const KNOWN_TOPICS: &[&str] = &[
    "tech", "technology", "business", "politics", "sports", "science", "health",
    "entertainment", "world", "finance", "economy", "crypto", "ai", "climate", "gaming",
    "markets", "music", "movies", "travel", "education",
];

/// "trending in tech", "news about climate change", "headlines on the election"
static TOPIC_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:trending|news|headlines|stories|happening|new|updates|latest)\s+(?:in|on|about|for|from|regarding)\s+(?:the\s+)?([\w][\w &'.-]*?)\s*(?:\b(?:today|now|right now|this week|lately|recently)\b)?\s*[?.!]*\s*$",
    )
    .ok()
});

const VERIFY_PREFIXES: &[&str] = &[
    "fact check",
    "fact-check",
    "factcheck",
    "verify that",
    "verify",
    "check if",
    "check whether",
    "confirm that",
    "confirm",
    "is it true that",
    "is it true",
    "is this true",
];

/// Cortesias removidas só quando seguidas de uma frase de verificação
const POLITE_LEADS: &[&str] = &["please", "can you", "could you", "would you"];

/// Palavras que não fazem parte do tópico de um resumo
const SUMMARIZE_FILLER: &[&str] = &[
    "summarize", "summarise", "summary", "give", "me", "a", "an", "the", "of", "this", "that",
    "article", "text", "story", "please", "for", "about", "on", "news", "latest", "can", "you",
    "could", "quick", "short", "brief", "tl;dr", "tldr", "recap", "sum", "up", "key", "main",
    "points",
];

/// Extrai o parâmetro usando `general` como tópico final de fallback
pub fn extract_parameter(query: &Query, intent: Intent) -> Parameter {
    extract_parameter_or(query, intent, GENERAL_TOPIC)
}

/// Extrai o parâmetro para a intenção classificada.
///
/// Tópico: texto da query → preferência do usuário → `fallback_topic`.
pub fn extract_parameter_or(query: &Query, intent: Intent, fallback_topic: &str) -> Parameter {
    match intent {
        Intent::Trending => Parameter::Topic(
            extract_topic(&query.text)
                .or_else(|| preferred_topic(query))
                .unwrap_or_else(|| fallback_topic.to_string()),
        ),
        Intent::Verify => Parameter::Claim(extract_claim(&query.text)),
        Intent::Summarize => match split_article_body(&query.text) {
            Some((prefix, body)) => Parameter::ArticleText {
                text: body.to_string(),
                topic_hint: summarize_topic_words(prefix),
            },
            None => Parameter::Topic(
                summarize_topic_words(&query.text)
                    .or_else(|| preferred_topic(query))
                    .unwrap_or_else(|| fallback_topic.to_string()),
            ),
        },
        Intent::Unknown => Parameter::None,
    }
}

fn preferred_topic(query: &Query) -> Option<String> {
    query
        .topic_filter
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Tópico mencionado no texto de uma query de notícias
pub fn extract_topic(text: &str) -> Option<String> {
    if let Some(pattern) = TOPIC_PATTERN.as_ref() {
        if let Some(caps) = pattern.captures(text.trim()) {
            let topic = caps
                .get(1)
                .map(|m| m.as_str().trim().trim_end_matches(['.', '\'']).to_lowercase())
                .unwrap_or_default();
            if !topic.is_empty() && topic != "general" {
                return Some(topic);
            }
        }
    }

    crate::utils::normalize_headline(text)
        .split_whitespace()
        .find(|word| KNOWN_TOPICS.contains(word))
        .map(str::to_string)
}

/// Remove frases de verificação do início e `?` do fim
pub fn extract_claim(text: &str) -> String {
    let mut claim = text.trim();

    loop {
        let lower = claim.to_lowercase();
        let stripped = verify_prefix_rest(&lower)
            .or_else(|| {
                POLITE_LEADS.iter().find_map(|lead| {
                    let rest = strip_word_prefix(&lower, lead)?;
                    leads_to_verification(rest).then_some(rest)
                })
            })
            .map(|rest| claim.len() - rest.len());

        match stripped.and_then(|cut| claim.get(cut..)) {
            Some(rest) => {
                claim = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == ',');
            }
            None => break,
        }
    }

    claim.trim_end_matches(|c: char| c == '?' || c.is_whitespace()).to_string()
}

/// Resto do texto após uma frase de verificação no início
fn verify_prefix_rest(lower: &str) -> Option<&str> {
    VERIFY_PREFIXES
        .iter()
        .find_map(|prefix| strip_word_prefix(lower, prefix))
}

/// Se, pulando outras cortesias, o texto começa com uma frase de verificação
fn leads_to_verification(text: &str) -> bool {
    let mut next = text;
    loop {
        next = next.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if verify_prefix_rest(next).is_some() {
            return true;
        }
        match POLITE_LEADS.iter().find_map(|lead| strip_word_prefix(next, lead)) {
            Some(rest) => next = rest,
            None => return false,
        }
    }
}

/// Remove `prefix` apenas quando ele termina numa fronteira de palavra
fn strip_word_prefix<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.strip_prefix(prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with(|c: char| !c.is_alphanumeric()))
}

/// Divide "Summarize this article: <texto>" em (prefixo, corpo)
fn split_article_body(text: &str) -> Option<(&str, &str)> {
    let (prefix, body) = text.split_once(':')?;
    let body = body.trim();
    if body.is_empty() {
        None
    } else {
        Some((prefix, body))
    }
}

fn summarize_topic_words(text: &str) -> Option<String> {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '$'))
        .filter(|w| !w.is_empty())
        .filter(|w| !SUMMARIZE_FILLER.contains(&w.to_lowercase().as_str()))
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
