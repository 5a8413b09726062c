// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE DE NOTÍCIAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait e implementações para busca de notícias por tópico.
// Provedor padrão: GNews.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::search::{status_error, SearchError};
use crate::types::{RawArticle, GENERAL_TOPIC};

/// Tamanho máximo de página aceito
pub const MAX_NEWS_PAGE_SIZE: usize = 50;

/// Pedido de notícias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    /// Tópico (vazio = feed geral)
    pub topic: String,
    /// Tamanho da página, sempre em [1, MAX_NEWS_PAGE_SIZE]
    pub page_size: usize,
}

impl NewsQuery {
    pub fn new(topic: impl Into<String>, page_size: usize) -> Self {
        Self {
            topic: topic.into().trim().to_string(),
            page_size: page_size.clamp(1, MAX_NEWS_PAGE_SIZE),
        }
    }

    /// Se deve usar o feed geral em vez de uma busca
    pub fn is_general(&self) -> bool {
        self.topic.is_empty() || self.topic.eq_ignore_ascii_case(GENERAL_TOPIC)
    }
}

/// Trait para provedores de notícias
#[async_trait]
pub trait NewsSearchClient: Send + Sync {
    /// Busca artigos sobre um tópico
    async fn fetch_articles(&self, query: &NewsQuery) -> Result<Vec<RawArticle>, SearchError>;
}

/// Executa `fetch_articles` com espera limitada
pub async fn fetch_with_timeout(
    client: &dyn NewsSearchClient,
    query: &NewsQuery,
    timeout: Duration,
) -> Result<Vec<RawArticle>, SearchError> {
    match tokio::time::timeout(timeout, client.fetch_articles(query)).await {
        Ok(result) => result,
        Err(_) => Err(SearchError::Timeout),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cliente mock: devolve sempre os mesmos artigos (até o tamanho da página)
#[derive(Debug, Default)]
pub struct MockNewsClient {
    pub articles: Vec<RawArticle>,
    pub error: Option<SearchError>,
    queries: Mutex<Vec<NewsQuery>>,
    calls: AtomicUsize,
}

impl MockNewsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<RawArticle>) -> Self {
        Self {
            articles,
            ..Default::default()
        }
    }

    pub fn failing(error: SearchError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries recebidas, em ordem
    pub fn queries(&self) -> Vec<NewsQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NewsSearchClient for MockNewsClient {
    async fn fetch_articles(&self, query: &NewsQuery) -> Result<Vec<RawArticle>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(self.articles.iter().take(query.page_size).cloned().collect())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO GNEWS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Deserialize)]
struct GNewsResponse {
    #[serde(default)]
    articles: Vec<serde_json::Value>,
}

/// Campo textual do artigo; ausente ou de tipo errado vira `""`
fn text_field<'a>(value: &'a serde_json::Value, key: &str) -> &'a str {
    value.get(key).and_then(serde_json::Value::as_str).unwrap_or_default()
}

/// Converte um artigo GNews campo a campo, sem rejeitar o lote
fn raw_article_from_value(value: &serde_json::Value) -> RawArticle {
    RawArticle {
        headline: text_field(value, "title").to_string(),
        source: value
            .get("source")
            .map(|source| text_field(source, "name"))
            .unwrap_or_default()
            .to_string(),
        description: text_field(value, "description").to_string(),
        published_at: parse_timestamp(text_field(value, "publishedAt")),
        url: text_field(value, "url").to_string(),
    }
}

/// Converte timestamp RFC 3339; inválido vira `None`
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Cliente para a API GNews (v4)
pub struct GNewsClient {
    api_key: String,
    base_url: String,
    language: String,
    client: reqwest::Client,
}

impl GNewsClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://gnews.io/api/v4".into(),
            language: "en".into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.into();
        self
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
impl NewsSearchClient for GNewsClient {
    async fn fetch_articles(&self, query: &NewsQuery) -> Result<Vec<RawArticle>, SearchError> {
        let max = query.page_size.to_string();
        let mut params = vec![
            ("lang", self.language.as_str()),
            ("max", max.as_str()),
            ("apikey", self.api_key.as_str()),
        ];

        let url = if query.is_general() {
            params.push(("category", GENERAL_TOPIC));
            format!("{}/top-headlines", self.base_url)
        } else {
            params.push(("q", query.topic.as_str()));
            format!("{}/search", self.base_url)
        };

        let response = self.client.get(url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let body: GNewsResponse = response.json().await?;
        log::debug!(
            "📰 GNews: {} artigos para '{}'",
            body.articles.len(),
            query.topic
        );

        Ok(body.articles.iter().map(raw_article_from_value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_query_bounds_page_size() {
        assert_eq!(NewsQuery::new("tech", 0).page_size, 1);
        assert_eq!(NewsQuery::new("tech", 500).page_size, MAX_NEWS_PAGE_SIZE);
        assert_eq!(NewsQuery::new("tech", 10).page_size, 10);
    }

    #[test]
    fn test_news_query_general_feed() {
        assert!(NewsQuery::new("", 10).is_general());
        assert!(NewsQuery::new("  General ", 10).is_general());
        assert!(!NewsQuery::new("tech", 10).is_general());
    }

    #[test]
    fn test_gnews_article_with_missing_fields() {
        let json = r#"{"articles": [
            {"title": "Chip shortage eases", "source": {"name": "Reuters"},
             "publishedAt": "2025-03-01T10:00:00Z", "url": "https://reuters.com/a"},
            {"description": "no title here", "publishedAt": "not a date"},
            {}
        ]}"#;
        let body: GNewsResponse = serde_json::from_str(json).unwrap();
        let articles: Vec<RawArticle> = body.articles.iter().map(raw_article_from_value).collect();

        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].source, "Reuters");
        assert!(articles[0].published_at.is_some());
        assert!(articles[1].headline.is_empty());
        assert!(articles[1].published_at.is_none());
        assert_eq!(articles[2], RawArticle::default());
    }

    #[test]
    fn test_gnews_article_with_wrong_field_types_keeps_batch() {
        let json = r#"{"articles": [
            {"title": "Good story", "source": {"name": "AP"}, "url": "https://apnews.com/x"},
            {"title": 42, "description": ["not", "text"], "source": "BBC", "publishedAt": 1700000000}
        ]}"#;
        let body: GNewsResponse = serde_json::from_str(json).unwrap();
        let articles: Vec<RawArticle> = body.articles.iter().map(raw_article_from_value).collect();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].headline, "Good story");
        assert_eq!(articles[0].source, "AP");
        assert_eq!(articles[1], RawArticle::default());
    }

    #[tokio::test]
    async fn test_mock_news_client_truncates_to_page() {
        let articles = (0..10)
            .map(|i| RawArticle {
                headline: format!("Story {}", i),
                ..Default::default()
            })
            .collect();
        let client = MockNewsClient::with_articles(articles);
        let result = client.fetch_articles(&NewsQuery::new("tech", 4)).await.unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(client.queries()[0].topic, "tech");
    }

    #[tokio::test]
    async fn test_fetch_with_timeout_passes_errors() {
        let client = MockNewsClient::failing(SearchError::Timeout);
        let result =
            fetch_with_timeout(&client, &NewsQuery::new("tech", 5), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(SearchError::Timeout)));
    }
}
