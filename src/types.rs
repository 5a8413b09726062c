// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tipo de URL (alias para String)
pub type Url = String;

/// Tópico usado quando nem a query nem o usuário indicam um
pub const GENERAL_TOPIC: &str = "general";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// QUERY E CONTEXTO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Turno anterior da conversa, fornecido pela camada de UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Texto enviado pelo usuário
    pub query: String,
    /// Intenção classificada naquele turno (se conhecida)
    pub intent: Option<Intent>,
    /// Resumo curto da resposta dada
    pub summary: String,
}

/// Contexto do usuário. Pertence à UI; o core apenas lê.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserContext {
    /// Identificador do usuário
    pub user_id: String,
    /// Tópicos preferidos, em ordem de prioridade
    pub preferred_topics: Vec<String>,
    /// Histórico da sessão (mais antigo primeiro)
    pub history: Vec<ConversationTurn>,
}

impl UserContext {
    /// Cria contexto sem histórico
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    /// Define os tópicos preferidos
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_topics = topics.into_iter().map(Into::into).collect();
        self
    }

    /// Primeiro tópico preferido não vazio
    pub fn preferred_topic(&self) -> Option<&str> {
        self.preferred_topics
            .iter()
            .map(|t| t.trim())
            .find(|t| !t.is_empty())
    }
}

/// Query imutável de um turno do usuário
#[derive(Debug, Clone)]
pub struct Query {
    /// ID para correlacionar os logs de um turno
    pub id: Uuid,
    /// Texto bruto (já sem espaços nas bordas)
    pub text: String,
    /// Filtro de tópico vindo da preferência do usuário
    pub topic_filter: Option<String>,
    /// Turnos anteriores, já formatados, passados explicitamente pelo caller
    pub context: Vec<String>,
}

impl Query {
    /// Quantos turnos anteriores entram no contexto da query
    pub const MAX_CONTEXT_TURNS: usize = 3;

    /// Cria uma query sem contexto
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into().trim().to_string(),
            topic_filter: None,
            context: Vec::new(),
        }
    }

    /// Cria uma query lendo (sem modificar) o contexto do usuário
    pub fn from_context(text: impl Into<String>, context: Option<&UserContext>) -> Self {
        let mut query = Self::new(text);
        if let Some(ctx) = context {
            query.topic_filter = ctx.preferred_topic().map(str::to_string);
            let skip = ctx.history.len().saturating_sub(Self::MAX_CONTEXT_TURNS);
            query.context = ctx
                .history
                .iter()
                .skip(skip)
                .map(|turn| match turn.intent {
                    Some(intent) => format!("[{}] {} -> {}", intent, turn.query, turn.summary),
                    None => format!("{} -> {}", turn.query, turn.summary),
                })
                .collect();
        }
        query
    }

    /// Se a query não tem conteúdo útil
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// INTENÇÃO E PARÂMETRO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Intenções possíveis - enum fechado, o dispatch é exaustivo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Notícias em alta sobre um tópico
    Trending,
    /// Verificação de uma afirmação
    Verify,
    /// Resumo de artigo ou tópico
    Summarize,
    /// Não foi possível classificar
    Unknown,
}

impl Intent {
    /// Todas as intenções, na ordem do prompt de classificação
    pub const ALL: [Intent; 4] = [
        Intent::Trending,
        Intent::Verify,
        Intent::Summarize,
        Intent::Unknown,
    ];

    /// Rótulo canônico
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trending => "TRENDING",
            Self::Verify => "VERIFY",
            Self::Summarize => "SUMMARIZE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Converte um rótulo exato (case-insensitive) em intenção
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str().eq_ignore_ascii_case(label))
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parâmetro extraído da query para o especialista
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    /// Tópico de notícias
    Topic(String),
    /// Afirmação a verificar
    Claim(String),
    /// Texto de artigo fornecido pelo usuário
    ArticleText {
        /// Corpo do artigo
        text: String,
        /// Dica de título/tópico
        topic_hint: Option<String>,
    },
    /// Nenhum parâmetro (intenção UNKNOWN)
    None,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DADOS DOS PROVEDORES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Artigo bruto retornado pelo provedor de notícias.
/// Campos ausentes viram string vazia.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    /// Manchete
    #[serde(default)]
    pub headline: String,
    /// Nome da fonte
    #[serde(default)]
    pub source: String,
    /// Descrição / snippet
    #[serde(default)]
    pub description: String,
    /// Data de publicação
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// URL do artigo
    #[serde(default)]
    pub url: Url,
}

/// Query de busca SERP
#[derive(Debug, Clone, Default)]
pub struct SerpQuery {
    /// Texto da query
    pub q: String,
    /// Máximo de resultados pedidos ao provedor
    pub max_results: usize,
}

impl SerpQuery {
    /// Cria query com limite de resultados
    pub fn new(q: impl Into<String>, max_results: usize) -> Self {
        Self {
            q: q.into(),
            max_results,
        }
    }
}

/// Resultado bruto de busca web
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSearchHit {
    /// URL do resultado
    pub url: Url,
    /// Título da página
    pub title: String,
    /// Snippet do resultado
    pub snippet: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RESULTADOS NORMALIZADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Uma história em alta, agrupando artigos que relatam o mesmo fato.
///
/// `frequency == sources.len()` e `frequency >= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingNewsItem {
    /// Manchete representativa (a mais detalhada do grupo)
    pub headline: String,
    /// Fontes que publicaram a história (sem duplicatas)
    pub sources: Vec<String>,
    /// Número de fontes distintas
    pub frequency: usize,
    /// Descrição representativa
    pub description: String,
    /// Tópico pesquisado
    pub category: String,
    /// Posição no ranking (1 = mais relevante)
    pub rank: usize,
    /// Publicação mais recente do grupo
    pub published_at: Option<DateTime<Utc>>,
    /// URLs dos artigos do grupo
    pub urls: Vec<Url>,
}

/// Veredito sobre uma afirmação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Evidências corroboram
    Supported,
    /// Evidências contradizem
    Refuted,
    /// Inconclusivo, misto ou sem evidências
    Uncertain,
}

impl Verdict {
    /// Rótulo canônico
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supported => "SUPPORTED",
            Self::Refuted => "REFUTED",
            Self::Uncertain => "UNCERTAIN",
        }
    }

    /// Converte rótulo exato (case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::Supported, Self::Refuted, Self::Uncertain]
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Referência a uma fonte
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// URL da fonte
    pub url: Url,
    /// Título da página
    pub title: String,
    /// Trecho usado como evidência
    pub snippet: String,
    /// Hostname da URL (vazio se inválida)
    pub hostname: String,
}

/// Resultado da verificação de uma afirmação.
///
/// No máximo 3 referências; `Uncertain` sempre que não houver referências.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckResult {
    /// Afirmação verificada (eco do input)
    pub claim: String,
    /// Veredito
    pub verdict: Verdict,
    /// Fontes consultadas, na ordem do provedor
    pub references: Vec<Reference>,
    /// Justificativa de uma linha
    pub rationale: String,
}

impl FactCheckResult {
    /// Resultado inconclusivo sem fontes
    pub fn uncertain(claim: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            verdict: Verdict::Uncertain,
            references: Vec::new(),
            rationale: rationale.into(),
        }
    }
}

/// Resumo em tópicos de um artigo ou assunto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSummary {
    /// Título / tópico do resumo
    pub topic: String,
    /// De 3 a 5 frases (menos apenas se `degraded`)
    pub bullets: Vec<String>,
    /// O provedor não entregou bullets suficientes
    pub degraded: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RESPOSTA PARA O CALLER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Pedido de esclarecimento quando a intenção é UNKNOWN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationRequest {
    /// Pergunta exibida ao usuário
    pub message: String,
    /// Exemplos de queries válidas
    pub suggestions: Vec<String>,
}

impl Default for ClarificationRequest {
    fn default() -> Self {
        Self {
            message: "I can show trending news, fact-check a claim, or summarize an article. \
                      Which one would you like?"
                .to_string(),
            suggestions: vec![
                "What's trending in tech today?".to_string(),
                "Is it true that Apple acquired OpenAI?".to_string(),
                "Summarize this article: <paste the text>".to_string(),
            ],
        }
    }
}

/// Resultado de um especialista (ou esclarecimento)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Lista ordenada de histórias
    Trending(Vec<TrendingNewsItem>),
    /// Verificação de afirmação
    FactCheck(FactCheckResult),
    /// Resumo em tópicos
    Summary(NewsSummary),
    /// Intenção não reconhecida
    Clarification(ClarificationRequest),
}

/// Envelope retornado por `handle_query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// ID da query
    pub query_id: Uuid,
    /// Intenção classificada
    pub intent: Intent,
    /// Resultado
    pub outcome: QueryOutcome,
    /// Tempo total em ms
    pub elapsed_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_from_label() {
        assert_eq!(Intent::from_label("trending"), Some(Intent::Trending));
        assert_eq!(Intent::from_label(" VERIFY "), Some(Intent::Verify));
        assert_eq!(Intent::from_label("Summarize"), Some(Intent::Summarize));
        assert_eq!(Intent::from_label("weather"), None);
    }

    #[test]
    fn test_verdict_from_label() {
        assert_eq!(Verdict::from_label("supported"), Some(Verdict::Supported));
        assert_eq!(Verdict::from_label("REFUTED"), Some(Verdict::Refuted));
        assert_eq!(Verdict::from_label("maybe"), None);
    }

    #[test]
    fn test_query_trims_text() {
        let query = Query::new("   What's new?  ");
        assert_eq!(query.text, "What's new?");
        assert!(!query.is_blank());
        assert!(Query::new(" \n\t ").is_blank());
    }

    #[test]
    fn test_query_from_context_reads_preferences() {
        let mut ctx = UserContext::new("news_user_001").with_topics(["", "tech", "politics"]);
        for i in 0..5 {
            ctx.history.push(ConversationTurn {
                query: format!("q{}", i),
                intent: Some(Intent::Trending),
                summary: format!("a{}", i),
            });
        }

        let query = Query::from_context("What's new?", Some(&ctx));
        assert_eq!(query.topic_filter.as_deref(), Some("tech"));
        assert_eq!(query.context.len(), Query::MAX_CONTEXT_TURNS);
        assert!(query.context[0].contains("q2"));
        // O contexto do usuário não é alterado
        assert_eq!(ctx.history.len(), 5);
    }

    #[test]
    fn test_raw_article_tolerates_missing_fields() {
        let article: RawArticle = serde_json::from_str(r#"{"headline": "Only a title"}"#).unwrap();
        assert_eq!(article.headline, "Only a title");
        assert!(article.source.is_empty());
        assert!(article.published_at.is_none());
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let outcome = QueryOutcome::FactCheck(FactCheckResult::uncertain("x", "no evidence"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "fact_check");
        assert_eq!(json["data"]["verdict"], "UNCERTAIN");
    }
}
