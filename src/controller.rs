// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONTROLLER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Ponto de entrada do core:
//   query → classificação → parâmetro → um especialista → resposta
//
// Exatamente um especialista por query. UNKNOWN não chama nenhum
// especialista e devolve um pedido de esclarecimento.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::sync::Arc;

use crate::classifier::{extract_parameter_or, LlmClassifier, QueryClassifier, RuleClassifier};
use crate::config::{ClassifierPreference, CoreConfig};
use crate::error::{NewsSenseError, Result};
use crate::llm::LlmClient;
use crate::news::NewsSearchClient;
use crate::search::WebSearchClient;
use crate::summarizer::Summarizer;
use crate::trending::TrendingAggregator;
use crate::types::{
    ClarificationRequest, Intent, Parameter, Query, QueryOutcome, QueryResponse, UserContext,
};
use crate::utils::ActionTimer;
use crate::verifier::ClaimVerifier;

/// Orquestrador das queries
pub struct NewsSenseController {
    classifier: Arc<dyn QueryClassifier>,
    trending: TrendingAggregator,
    verifier: ClaimVerifier,
    summarizer: Summarizer,
    config: CoreConfig,
}

impl NewsSenseController {
    /// Monta o controller com componentes já construídos
    pub fn new(
        classifier: Arc<dyn QueryClassifier>,
        trending: TrendingAggregator,
        verifier: ClaimVerifier,
        summarizer: Summarizer,
        config: CoreConfig,
    ) -> Self {
        Self {
            classifier,
            trending,
            verifier,
            summarizer,
            config,
        }
    }

    /// Monta o controller a partir dos provedores.
    ///
    /// O classificador segue `config.classifier`.
    pub fn from_providers(
        llm: Arc<dyn LlmClient>,
        news: Arc<dyn NewsSearchClient>,
        web: Arc<dyn WebSearchClient>,
        config: CoreConfig,
    ) -> Self {
        let classifier: Arc<dyn QueryClassifier> = match config.classifier {
            ClassifierPreference::Llm => {
                Arc::new(LlmClassifier::new(llm.clone(), config.provider_timeout))
            }
            ClassifierPreference::Rules => Arc::new(RuleClassifier::new()),
        };

        log::info!("🧭 Classificador: {}", config.classifier);

        Self::new(
            classifier,
            TrendingAggregator::new(news.clone(), &config),
            ClaimVerifier::new(web, llm.clone(), &config),
            Summarizer::new(llm, news, &config),
            config,
        )
    }

    /// Nome do classificador em uso
    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Processa uma query do usuário.
    ///
    /// O contexto é apenas lido. Texto vazio falha antes de qualquer
    /// chamada externa; falha na classificação não vira palpite.
    pub async fn handle_query(
        &self,
        text: &str,
        context: Option<&UserContext>,
    ) -> Result<QueryResponse> {
        let query = Query::from_context(text, context);
        if query.is_blank() {
            return Err(NewsSenseError::InvalidInput("query text is empty".into()));
        }

        let timer = ActionTimer::start("Query");
        log::info!("📥 [{}] Query: {}", query.id, query.text);

        let intent = self.classifier.classify(&query).await?;
        let parameter = extract_parameter_or(&query, intent, &self.config.default_topic);
        log::info!("🏷️  [{}] Intenção {} → {:?}", query.id, intent, parameter);

        let outcome = self.dispatch(intent, parameter).await.map_err(|e| {
            log::warn!("❌ [{}] {}", query.id, e);
            e
        })?;

        let elapsed_ms = timer.stop();
        log::info!("⏱️  [{}] Query {} completada em {}ms", query.id, intent, elapsed_ms);

        Ok(QueryResponse {
            query_id: query.id,
            intent,
            outcome,
            elapsed_ms,
        })
    }

    async fn dispatch(&self, intent: Intent, parameter: Parameter) -> Result<QueryOutcome> {
        match intent {
            Intent::Trending => {
                let topic = match parameter {
                    Parameter::Topic(topic) => topic,
                    _ => self.config.default_topic.clone(),
                };
                let items = self.trending.get_trending(&topic).await?;
                Ok(QueryOutcome::Trending(items))
            }
            Intent::Verify => {
                let claim = match parameter {
                    Parameter::Claim(claim) => claim,
                    _ => String::new(),
                };
                let result = self.verifier.verify(&claim).await?;
                Ok(QueryOutcome::FactCheck(result))
            }
            Intent::Summarize => {
                let summary = match parameter {
                    Parameter::ArticleText { text, topic_hint } => {
                        self.summarizer.summarize(&text, topic_hint.as_deref()).await?
                    }
                    Parameter::Topic(topic) => self.summarizer.summarize_topic(&topic).await?,
                    Parameter::Claim(_) | Parameter::None => {
                        self.summarizer
                            .summarize_topic(&self.config.default_topic)
                            .await?
                    }
                };
                Ok(QueryOutcome::Summary(summary))
            }
            Intent::Unknown => Ok(QueryOutcome::Clarification(ClarificationRequest::default())),
        }
    }
}
