//! # Testes de Integração
//!
//! Valida o fluxo completo query → classificação → especialista → resposta
//! usando os clientes mock (sem rede):
//! - Cenário A: notícias em alta sobre um tópico
//! - Cenário B: afirmação sem resultados de busca
//! - Cenário C: resumo de artigo colado na query
//! - Propriedades: ordenação, determinismo, limites e isolamento de falhas

use chrono::{TimeZone, Utc};
use news_sense::llm::{LlmError, MockLlmClient};
use news_sense::news::MockNewsClient;
use news_sense::prelude::*;
use news_sense::search::{MockWebSearchClient, SearchError};
use std::sync::Arc;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HELPERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn article(headline: &str, source: &str, hour: u32) -> RawArticle {
    RawArticle {
        headline: headline.to_string(),
        source: source.to_string(),
        description: String::new(),
        published_at: Some(Utc.with_ymd_and_hms(2024, 6, 3, hour, 0, 0).unwrap()),
        url: format!("https://{}.example/{}", source.to_lowercase(), hour),
    }
}

fn tech_articles() -> Vec<RawArticle> {
    vec![
        article("Nvidia stock hits record high on AI demand", "Reuters", 9),
        article("Nvidia stock hits record high", "CNBC", 10),
        article("Nvidia shares hit record high on strong AI demand", "Bloomberg", 8),
        article("Microsoft releases Windows update", "TheVerge", 11),
        article("Microsoft releases new Windows update for PCs", "Engadget", 7),
        article("Startup raises funding for quantum chips", "TechCrunch", 12),
    ]
}

/// Artigo longo (~500 palavras) para o cenário C
fn long_article() -> String {
    let paragraph = "The regional transit authority unveiled an ambitious plan on Tuesday to expand \
        light rail service across the metropolitan area over the next decade. Officials said the \
        project would add forty kilometers of track and twenty new stations, connecting suburbs \
        that currently depend on congested highways. Funding will come from a mix of federal \
        grants, a voter approved sales tax and private partnerships with developers near the \
        planned stations. Critics questioned whether ridership projections were realistic given \
        the rise of remote work, while business groups praised the potential for new jobs. ";
    paragraph.repeat(6)
}

const SUMMARY_RESPONSE: &str = "TITLE: Transit expansion plan\n\
    - The transit authority wants to grow light rail over ten years.\n\
    - Forty kilometers of track and twenty stations are planned.\n\
    - Grants, a sales tax and developers will pay for it.\n\
    - Skeptics doubt the ridership numbers.";

fn rules_config() -> CoreConfig {
    CoreConfig {
        classifier: ClassifierPreference::Rules,
        ..Default::default()
    }
}

struct Harness {
    llm: Arc<MockLlmClient>,
    news: Arc<MockNewsClient>,
    web: Arc<MockWebSearchClient>,
    controller: NewsSenseController,
}

fn harness(
    llm: MockLlmClient,
    news: MockNewsClient,
    web: MockWebSearchClient,
    config: CoreConfig,
) -> Harness {
    let llm = Arc::new(llm);
    let news = Arc::new(news);
    let web = Arc::new(web);
    let controller =
        NewsSenseController::from_providers(llm.clone(), news.clone(), web.clone(), config);
    Harness {
        llm,
        news,
        web,
        controller,
    }
}

// ============================================================================
// CENÁRIO A: "What's trending in tech today?"
// ============================================================================

#[tokio::test]
async fn test_scenario_a_trending_in_tech() {
    let h = harness(
        MockLlmClient::with_response("TRENDING"),
        MockNewsClient::with_articles(tech_articles()),
        MockWebSearchClient::new(),
        CoreConfig::default(),
    );

    let response = h
        .controller
        .handle_query("What's trending in tech today?", None)
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::Trending);
    assert_eq!(h.news.queries()[0].topic, "tech");
    assert_eq!(h.web.calls(), 0);

    let items = match response.outcome {
        QueryOutcome::Trending(items) => items,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert!(!items.is_empty());
    assert_eq!(items[0].frequency, 3);
    assert!(items[0].headline.starts_with("Nvidia"));
    assert!(items
        .windows(2)
        .all(|pair| pair[0].frequency >= pair[1].frequency));

    let total: usize = items.iter().map(|i| i.frequency).sum();
    assert!(total <= tech_articles().len());
}

// ============================================================================
// CENÁRIO B: "Is Bitcoin at $100K?" sem resultados
// ============================================================================

#[tokio::test]
async fn test_scenario_b_claim_without_results() {
    let h = harness(
        MockLlmClient::with_script(vec![Ok("VERIFY".to_string())]),
        MockNewsClient::new(),
        MockWebSearchClient::new(),
        CoreConfig::default(),
    );

    let response = h
        .controller
        .handle_query("Is Bitcoin at $100K?", None)
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::Verify);
    match response.outcome {
        QueryOutcome::FactCheck(result) => {
            assert_eq!(result.verdict, Verdict::Uncertain);
            assert!(result.references.is_empty());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    // Apenas a classificação chamou o LLM
    assert_eq!(h.llm.calls(), 1);
    assert_eq!(h.web.calls(), 1);
}

// ============================================================================
// CENÁRIO C: "Summarize this article: <texto>"
// ============================================================================

#[tokio::test]
async fn test_scenario_c_summarize_article() {
    let h = harness(
        MockLlmClient::with_script(vec![
            Ok("SUMMARIZE".to_string()),
            Ok(SUMMARY_RESPONSE.to_string()),
        ]),
        MockNewsClient::new(),
        MockWebSearchClient::new(),
        CoreConfig::default(),
    );
    let text = long_article();
    assert!(text.split_whitespace().count() >= 450);

    let response = h
        .controller
        .handle_query(&format!("Summarize this article: {}", text), None)
        .await
        .unwrap();

    assert_eq!(response.intent, Intent::Summarize);
    match response.outcome {
        QueryOutcome::Summary(summary) => {
            assert!((3..=5).contains(&summary.bullets.len()));
            assert!(!summary.degraded);
            assert_eq!(summary.topic, "Transit expansion plan");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(h.news.calls(), 0);
    assert_eq!(h.llm.calls(), 2);
}

// ============================================================================
// PROPRIEDADES
// ============================================================================

#[tokio::test]
async fn test_trending_order_is_stable_across_runs() {
    let h = harness(
        MockLlmClient::new(),
        MockNewsClient::with_articles(tech_articles()),
        MockWebSearchClient::new(),
        rules_config(),
    );

    let first = h.controller.handle_query("tech news", None).await.unwrap();
    let second = h.controller.handle_query("tech news", None).await.unwrap();
    assert_eq!(first.outcome, second.outcome);
    assert_ne!(first.query_id, second.query_id);
}

#[tokio::test]
async fn test_references_never_exceed_three() {
    let hits = (0..10)
        .map(|i| WebSearchHit {
            url: format!("https://news{}.example/story", i),
            title: format!("Story {}", i),
            snippet: "Apple did not acquire OpenAI.".into(),
        })
        .collect();
    let h = harness(
        MockLlmClient::with_response("VERDICT: REFUTED\nRATIONALE: Multiple outlets deny it."),
        MockNewsClient::new(),
        MockWebSearchClient::with_results(hits),
        rules_config(),
    );

    let response = h
        .controller
        .handle_query("Did Apple acquire OpenAI?", None)
        .await
        .unwrap();

    match response.outcome {
        QueryOutcome::FactCheck(result) => {
            assert_eq!(result.verdict, Verdict::Refuted);
            assert_eq!(result.references.len(), 3);
            assert_eq!(result.claim, "Did Apple acquire OpenAI");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_rule_classifier_is_idempotent() {
    let classifier = RuleClassifier::new();
    for text in [
        "What's trending in tech today?",
        "Is Bitcoin at $100K?",
        "Summarize this article: Markets rallied.",
        "Tell me a joke",
    ] {
        let query = Query::new(text);
        let first = classifier.classify(&query).await.unwrap();
        let second = classifier.classify(&query).await.unwrap();
        assert_eq!(first, second, "classification changed for {:?}", text);
    }
}

#[tokio::test]
async fn test_unknown_intent_asks_for_clarification() {
    let h = harness(
        MockLlmClient::with_response("I am not sure"),
        MockNewsClient::new(),
        MockWebSearchClient::new(),
        CoreConfig::default(),
    );

    let response = h.controller.handle_query("hmm", None).await.unwrap();
    assert_eq!(response.intent, Intent::Unknown);
    match response.outcome {
        QueryOutcome::Clarification(request) => assert!(!request.suggestions.is_empty()),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(h.news.calls() + h.web.calls(), 0);
}

#[tokio::test]
async fn test_failed_query_does_not_affect_the_next_one() {
    let h = harness(
        MockLlmClient::with_script(vec![
            Err(LlmError::RateLimitError),
            Ok("TRENDING".to_string()),
        ]),
        MockNewsClient::with_articles(tech_articles()),
        MockWebSearchClient::new(),
        CoreConfig::default(),
    );

    let error = h
        .controller
        .handle_query("What's trending in tech today?", None)
        .await
        .unwrap_err();
    assert!(error.is_recoverable());
    assert!(error.user_message().contains("try again"));

    let response = h
        .controller
        .handle_query("What's trending in tech today?", None)
        .await
        .unwrap();
    assert_eq!(response.intent, Intent::Trending);
}

#[tokio::test]
async fn test_news_provider_outage_is_recoverable() {
    let h = harness(
        MockLlmClient::new(),
        MockNewsClient::failing(SearchError::Timeout),
        MockWebSearchClient::new(),
        rules_config(),
    );

    let error = h
        .controller
        .handle_query("latest headlines", None)
        .await
        .unwrap_err();
    assert_eq!(
        error,
        NewsSenseError::ProviderUnavailable {
            provider: Provider::NewsSearch,
            failure: ProviderFailure::Timeout,
        }
    );
}

#[tokio::test]
async fn test_response_serializes_to_json() {
    let h = harness(
        MockLlmClient::new(),
        MockNewsClient::with_articles(tech_articles()),
        MockWebSearchClient::new(),
        rules_config(),
    );
    let context = UserContext::new("news_user_001").with_topics(["tech", "politics"]);

    let response = h
        .controller
        .handle_query("What's trending?", Some(&context))
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["intent"], "TRENDING");
    assert_eq!(json["outcome"]["kind"], "trending");
    assert_eq!(json["outcome"]["data"][0]["rank"], 1);
    assert_eq!(json["outcome"]["data"][0]["category"], "tech");
}
