// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE DE BUSCA WEB
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait e implementações para busca web (usada pelo verificador).
// Provedor padrão: Google Custom Search.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::types::{SerpQuery, WebSearchHit};

/// Limites aceitos para o número de resultados pedidos
pub const MIN_WEB_RESULTS: usize = 3;
/// Limite superior (Google Custom Search aceita até 10)
pub const MAX_WEB_RESULTS: usize = 10;

/// Erros dos clientes de busca (web e notícias)
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("Search API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    ParseError(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::ParseError(e.to_string())
        } else {
            Self::NetworkError(e.to_string())
        }
    }
}

/// Mapeia status HTTP de erro para [`SearchError`]
pub(crate) fn status_error(status: reqwest::StatusCode, body: String) -> SearchError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        SearchError::RateLimitError
    } else {
        SearchError::ApiError(format!("HTTP {}: {}", status, body))
    }
}

/// Trait para clientes de busca web
///
/// Os resultados vêm na ordem de relevância do provedor.
#[async_trait]
pub trait WebSearchClient: Send + Sync {
    /// Executa uma busca
    async fn search(&self, query: &SerpQuery) -> Result<Vec<WebSearchHit>, SearchError>;
}

/// Executa `search` com espera limitada
pub async fn search_with_timeout(
    client: &dyn WebSearchClient,
    query: &SerpQuery,
    timeout: Duration,
) -> Result<Vec<WebSearchHit>, SearchError> {
    match tokio::time::timeout(timeout, client.search(query)).await {
        Ok(result) => result,
        Err(_) => Err(SearchError::Timeout),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cliente mock para testes
#[derive(Debug, Default)]
pub struct MockWebSearchClient {
    pub mock_results: Vec<WebSearchHit>,
    pub error: Option<SearchError>,
    queries: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockWebSearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(results: Vec<WebSearchHit>) -> Self {
        Self {
            mock_results: results,
            ..Default::default()
        }
    }

    pub fn failing(error: SearchError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    /// Número de buscas recebidas
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Textos das queries recebidas
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WebSearchClient for MockWebSearchClient {
    async fn search(&self, query: &SerpQuery) -> Result<Vec<WebSearchHit>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.q.clone());
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(self
            .mock_results
            .iter()
            .take(query.max_results.max(1))
            .cloned()
            .collect())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO GOOGLE CUSTOM SEARCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Deserialize)]
struct GoogleItem {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Cliente para a Google Custom Search JSON API
pub struct GoogleSearchClient {
    api_key: String,
    engine_id: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleSearchClient {
    pub fn new(api_key: String, engine_id: String) -> Self {
        Self {
            api_key,
            engine_id,
            endpoint: "https://www.googleapis.com/customsearch/v1".into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }
}

#[async_trait]
impl WebSearchClient for GoogleSearchClient {
    async fn search(&self, query: &SerpQuery) -> Result<Vec<WebSearchHit>, SearchError> {
        let num = query.max_results.clamp(1, MAX_WEB_RESULTS).to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.q.as_str()),
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let body: GoogleResponse = response.json().await?;
        log::debug!("🔎 Google: {} resultados para '{}'", body.items.len(), query.q);

        Ok(body
            .items
            .into_iter()
            .filter(|item| !item.link.is_empty())
            .map(|item| WebSearchHit {
                url: item.link,
                title: item.title,
                snippet: item.snippet,
            })
            .collect())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// UTILITÁRIOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Extrai hostname de uma URL (sem o prefixo `www.`)
pub fn extract_hostname(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
}
