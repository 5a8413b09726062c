// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AGREGADOR DE NOTÍCIAS EM ALTA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Busca artigos de um tópico, agrupa os que relatam a mesma história e
// ordena os grupos por número de fontes distintas.
//
// Fluxo:
// 1. NewsSearch(topic) com tamanho de página configurado
// 2. Ordenação canônica (independe da ordem do provedor)
// 3. Agrupamento single-linkage por similaridade de manchete/descrição
// 4. Ordenação final: frequência ↓, recência ↓, manchete ↑
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CoreConfig;
use crate::error::{NewsSenseError, Provider, Result};
use crate::news::{fetch_with_timeout, NewsQuery, NewsSearchClient};
use crate::search::extract_hostname;
use crate::types::{RawArticle, TrendingNewsItem, GENERAL_TOPIC};
use crate::utils::{
    content_tokens, first_sentence, jaccard, normalize_headline, overlap_coefficient, ActionTimer,
};

/// Limiares para considerar dois artigos a mesma história
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupingThresholds {
    /// Jaccard mínimo entre tokens de manchete
    pub headline_similarity: f32,
    /// Coeficiente de sobreposição mínimo entre tokens de descrição
    pub description_similarity: f32,
    /// Descrições menores que isso não são comparadas
    pub min_description_tokens: usize,
}

impl Default for GroupingThresholds {
    fn default() -> Self {
        Self {
            headline_similarity: 0.5,
            description_similarity: 0.6,
            min_description_tokens: 6,
        }
    }
}

impl From<&CoreConfig> for GroupingThresholds {
    fn from(config: &CoreConfig) -> Self {
        Self {
            headline_similarity: config.headline_similarity,
            description_similarity: config.description_similarity,
            ..Default::default()
        }
    }
}

/// Agregador de notícias em alta
pub struct TrendingAggregator {
    news: Arc<dyn NewsSearchClient>,
    page_size: usize,
    timeout: Duration,
    thresholds: GroupingThresholds,
}

impl TrendingAggregator {
    pub fn new(news: Arc<dyn NewsSearchClient>, config: &CoreConfig) -> Self {
        Self {
            news,
            page_size: config.news_page_size,
            timeout: config.provider_timeout,
            thresholds: GroupingThresholds::from(config),
        }
    }

    /// Histórias em alta sobre o tópico, já ranqueadas.
    ///
    /// Nenhum artigo → lista vazia (não é erro).
    pub async fn get_trending(&self, topic: &str) -> Result<Vec<TrendingNewsItem>> {
        let timer = ActionTimer::start("Trending");
        let query = NewsQuery::new(topic, self.page_size);
        let category = if query.topic.is_empty() {
            GENERAL_TOPIC.to_string()
        } else {
            query.topic.to_lowercase()
        };

        log::info!("📰 Buscando notícias: tópico='{}', página={}", category, query.page_size);

        let articles = fetch_with_timeout(self.news.as_ref(), &query, self.timeout)
            .await
            .map_err(|e| {
                log::warn!("⚠️  Busca de notícias falhou: {}", e);
                NewsSenseError::from_search(Provider::NewsSearch, e)
            })?;

        let raw_count = articles.len();
        let items = aggregate_articles(articles, &category, &self.thresholds);

        log::info!("📊 {} artigos → {} histórias", raw_count, items.len());
        timer.stop_and_log();
        Ok(items)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AGRUPAMENTO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Artigo com chaves de comparação pré-calculadas
struct PreparedArticle {
    article: RawArticle,
    normalized: String,
    headline_tokens: BTreeSet<String>,
    description_tokens: BTreeSet<String>,
}

impl PreparedArticle {
    fn new(article: RawArticle) -> Self {
        Self {
            normalized: normalize_headline(&article.headline),
            headline_tokens: content_tokens(&article.headline),
            description_tokens: content_tokens(&article.description),
            article,
        }
    }

    /// Nome da fonte; sem nome, usa o hostname da URL
    fn source_name(&self) -> String {
        let source = self.article.source.trim();
        if !source.is_empty() {
            return source.to_string();
        }
        extract_hostname(&self.article.url).unwrap_or_else(|| "unknown".to_string())
    }
}

/// Ordem canônica: mais recente primeiro (sem data por último),
/// depois manchete normalizada, fonte e URL.
fn canonical_order(a: &PreparedArticle, b: &PreparedArticle) -> Ordering {
    recency_desc(&a.article, &b.article)
        .then_with(|| a.normalized.cmp(&b.normalized))
        .then_with(|| a.article.source.cmp(&b.article.source))
        .then_with(|| a.article.url.cmp(&b.article.url))
        .then_with(|| a.article.headline.cmp(&b.article.headline))
        .then_with(|| a.article.description.cmp(&b.article.description))
}

fn recency_desc(a: &RawArticle, b: &RawArticle) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn same_story(a: &PreparedArticle, b: &PreparedArticle, thresholds: &GroupingThresholds) -> bool {
    if !a.normalized.is_empty() && a.normalized == b.normalized {
        return true;
    }
    if jaccard(&a.headline_tokens, &b.headline_tokens) >= thresholds.headline_similarity {
        return true;
    }
    a.description_tokens.len() >= thresholds.min_description_tokens
        && b.description_tokens.len() >= thresholds.min_description_tokens
        && overlap_coefficient(&a.description_tokens, &b.description_tokens)
            >= thresholds.description_similarity
}

/// Union-find mínimo para o single-linkage
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    /// A menor raiz vence, mantendo os grupos na ordem canônica
    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high] = low;
        }
    }
}

/// Agrupa e ranqueia artigos brutos. Puro e determinístico.
pub fn aggregate_articles(
    articles: Vec<RawArticle>,
    category: &str,
    thresholds: &GroupingThresholds,
) -> Vec<TrendingNewsItem> {
    if articles.is_empty() {
        return Vec::new();
    }

    let mut prepared: Vec<PreparedArticle> = articles.into_iter().map(PreparedArticle::new).collect();
    prepared.sort_by(canonical_order);

    let mut groups = DisjointSet::new(prepared.len());
    for i in 0..prepared.len() {
        for j in (i + 1)..prepared.len() {
            if same_story(&prepared[i], &prepared[j], thresholds) {
                groups.union(i, j);
            }
        }
    }

    // Membros por raiz, preservando a ordem canônica
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); prepared.len()];
    for i in 0..prepared.len() {
        let root = groups.find(i);
        members[root].push(i);
    }

    let mut items: Vec<TrendingNewsItem> = members
        .into_iter()
        .filter(|group| !group.is_empty())
        .map(|group| build_item(&prepared, &group, category))
        .collect();

    items.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then_with(|| match (a.published_at, b.published_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| a.headline.cmp(&b.headline))
    });

    for (index, item) in items.iter_mut().enumerate() {
        item.rank = index + 1;
    }

    items
}

fn build_item(prepared: &[PreparedArticle], group: &[usize], category: &str) -> TrendingNewsItem {
    let articles: Vec<&PreparedArticle> = group.iter().map(|&i| &prepared[i]).collect();

    let mut sources: Vec<String> = Vec::new();
    for article in &articles {
        let name = article.source_name();
        if !sources.contains(&name) {
            sources.push(name);
        }
    }

    // Manchete mais longa; empate → lexicalmente menor
    let representative = articles
        .iter()
        .copied()
        .min_by(|a, b| {
            b.article
                .headline
                .chars()
                .count()
                .cmp(&a.article.headline.chars().count())
                .then_with(|| a.article.headline.cmp(&b.article.headline))
        })
        .map(|a| &a.article);

    let description = representative
        .map(|a| a.description.trim().to_string())
        .filter(|d| !d.is_empty())
        .or_else(|| {
            articles
                .iter()
                .map(|a| a.article.description.trim())
                .filter(|d| !d.is_empty())
                .min_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)))
                .map(str::to_string)
        })
        .unwrap_or_default();

    let headline = representative
        .map(|a| a.headline.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| first_sentence(&description).to_string());

    let mut urls: Vec<String> = Vec::new();
    for article in &articles {
        let url = article.article.url.trim();
        if !url.is_empty() && !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }

    TrendingNewsItem {
        headline,
        frequency: sources.len(),
        sources,
        description,
        category: category.to_string(),
        rank: 0,
        published_at: articles.iter().filter_map(|a| a.article.published_at).max(),
        urls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::MockNewsClient;
    use crate::search::SearchError;
    use chrono::{TimeZone, Utc};

    fn article(headline: &str, source: &str, hour: Option<u32>) -> RawArticle {
        RawArticle {
            headline: headline.to_string(),
            source: source.to_string(),
            description: String::new(),
            published_at: hour.map(|h| Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()),
            url: format!(
                "https://{}.example.com/{}",
                source.to_lowercase().replace(' ', "-"),
                normalize_headline(headline).replace(' ', "-")
            ),
        }
    }

    fn sample_articles() -> Vec<RawArticle> {
        vec![
            article("Apple unveils new AI chip for iPhone", "Reuters", Some(9)),
            article("Apple unveils AI chip for the next iPhone", "The Verge", Some(10)),
            article("Apple unveils new AI chip", "Bloomberg", Some(8)),
            article("Fed keeps interest rates unchanged", "CNBC", Some(11)),
            article("Fed keeps rates unchanged again", "WSJ", Some(7)),
            article("Local team wins championship", "ESPN", Some(12)),
        ]
    }

    #[test]
    fn test_groups_same_story_and_ranks_by_frequency() {
        let items = aggregate_articles(sample_articles(), "tech", &GroupingThresholds::default());

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].frequency, 3);
        assert_eq!(items[0].headline, "Apple unveils AI chip for the next iPhone");
        assert_eq!(items[1].frequency, 2);
        assert_eq!(items[2].frequency, 1);
        assert_eq!(items[2].headline, "Local team wins championship");

        for (i, item) in items.iter().enumerate() {
            assert_eq!(item.rank, i + 1);
            assert_eq!(item.frequency, item.sources.len());
            assert_eq!(item.category, "tech");
        }
    }

    #[test]
    fn test_order_does_not_depend_on_provider_order() {
        let thresholds = GroupingThresholds::default();
        let forward = aggregate_articles(sample_articles(), "tech", &thresholds);
        let mut reversed_input = sample_articles();
        reversed_input.reverse();
        let reversed = aggregate_articles(reversed_input, "tech", &thresholds);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_sum_of_frequencies_never_exceeds_articles() {
        let mut articles = sample_articles();
        // Mesma fonte repetida não aumenta a frequência
        articles.push(article("Apple unveils new AI chip for iPhone", "Reuters", Some(6)));
        let count = articles.len();

        let items = aggregate_articles(articles, "tech", &GroupingThresholds::default());
        let total: usize = items.iter().map(|i| i.frequency).sum();
        assert!(total <= count);
        assert_eq!(items[0].frequency, 3);
        assert_eq!(items[0].urls.len(), 3);
    }

    #[test]
    fn test_distinct_articles_fall_back_to_recency_then_headline() {
        let articles = vec![
            article("Mars rover finds ancient lake", "NASA", Some(8)),
            article("Stock markets close higher", "CNBC", Some(12)),
            article("Zebra population grows", "BBC", None),
            article("Actors strike ends", "Variety", None),
        ];
        let items = aggregate_articles(articles, "general", &GroupingThresholds::default());

        let headlines: Vec<&str> = items.iter().map(|i| i.headline.as_str()).collect();
        assert_eq!(
            headlines,
            vec![
                "Stock markets close higher",
                "Mars rover finds ancient lake",
                "Actors strike ends",
                "Zebra population grows",
            ]
        );
        assert!(items.iter().all(|i| i.frequency == 1));
    }

    #[test]
    fn test_description_overlap_links_different_headlines() {
        let description = "The European Central Bank raised its main refinancing rate by a quarter point on Thursday";
        let mut a = article("ECB lifts borrowing costs", "Reuters", Some(9));
        let mut b = article("Eurozone rates climb after Thursday decision", "FT", Some(8));
        a.description = description.to_string();
        b.description = format!("{} amid sticky inflation", description);

        let items = aggregate_articles(vec![a, b], "business", &GroupingThresholds::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].sources, vec!["Reuters".to_string(), "FT".to_string()]);
        assert!(items[0].description.contains("amid sticky inflation"));
    }

    #[test]
    fn test_missing_fields_are_tolerated() {
        let articles = vec![
            RawArticle {
                headline: String::new(),
                source: String::new(),
                description: "Only a description. With two sentences.".into(),
                published_at: None,
                url: "https://www.example.org/x".into(),
            },
            RawArticle::default(),
        ];
        let items = aggregate_articles(articles, "general", &GroupingThresholds::default());

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.frequency >= 1));
        assert!(items.iter().any(|i| i.sources == vec!["example.org".to_string()]));
        assert!(items.iter().any(|i| i.headline == "Only a description."));
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_articles(Vec::new(), "tech", &GroupingThresholds::default()).is_empty());
    }

    #[tokio::test]
    async fn test_get_trending_uses_page_size_and_topic() {
        let news = Arc::new(MockNewsClient::with_articles(sample_articles()));
        let aggregator = TrendingAggregator::new(news.clone(), &CoreConfig::default());

        let items = aggregator.get_trending("Tech").await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].category, "tech");

        let queries = news.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].topic, "Tech");
        assert_eq!(queries[0].page_size, 20);
    }

    #[tokio::test]
    async fn test_get_trending_with_no_articles() {
        let aggregator =
            TrendingAggregator::new(Arc::new(MockNewsClient::new()), &CoreConfig::default());
        assert!(aggregator.get_trending("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_recoverable() {
        let news = Arc::new(MockNewsClient::failing(SearchError::RateLimitError));
        let aggregator = TrendingAggregator::new(news, &CoreConfig::default());

        let error = aggregator.get_trending("tech").await.unwrap_err();
        assert!(error.is_recoverable());
        assert!(matches!(
            error,
            NewsSenseError::ProviderUnavailable {
                provider: Provider::NewsSearch,
                ..
            }
        ));
    }
}
