//! # NewsSense - Núcleo de Orquestração
//!
//! Este crate implementa o núcleo do **NewsSense**, um agente de notícias que
//! recebe uma pergunta em linguagem natural, descobre o que o usuário quer e
//! encaminha para um de três especialistas.
//!
//! ## O que o NewsSense faz?
//!
//! 1. Recebe uma query ("What's trending in tech today?")
//! 2. Classifica a intenção: TRENDING, VERIFY, SUMMARIZE ou UNKNOWN
//! 3. Extrai o parâmetro (tópico, afirmação ou texto do artigo)
//! 4. Chama exatamente um especialista
//! 5. Devolve um resultado estruturado (serializável em JSON)
//!
//! ## Componentes
//!
//! ### 1. Classificação (`classifier`)
//! - `LlmClassifier`: few-shot via LLM em modo determinístico
//! - `RuleClassifier`: palavras-chave, sem provedor
//!
//! ### 2. Notícias em alta (`trending`)
//! Agrupa artigos que relatam a mesma história e ranqueia por número
//! de fontes distintas.
//!
//! ### 3. Verificação (`verifier`)
//! Busca evidências na web e deriva um veredito
//! (SUPPORTED / REFUTED / UNCERTAIN) com até 3 referências.
//!
//! ### 4. Resumo (`summarizer`)
//! 3 a 5 bullets abstrativos de um artigo ou das notícias de um tópico.
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use news_sense::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = NewsSenseController::from_providers(llm, news, web, CoreConfig::default());
//!     let response = controller.handle_query("What's trending in tech today?", None).await?;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Tipos compartilhados por todo o sistema.
///
/// - [`Query`] e [`UserContext`]: entrada de um turno
/// - [`Intent`] e [`Parameter`]: saída da classificação
/// - [`TrendingNewsItem`], [`FactCheckResult`], [`NewsSummary`]: resultados
/// - [`QueryResponse`]: envelope devolvido ao caller
pub mod types;

/// Erros do core ([`NewsSenseError`]).
pub mod error;

/// Clientes para Large Language Models (LLMs).
///
/// Define a trait `LlmClient` e implementações para:
/// - APIs compatíveis com OpenAI
/// - Mock para testes
pub mod llm;

/// Clientes de busca web.
///
/// Define a trait `WebSearchClient` e implementações para:
/// - Google Custom Search
/// - Mock para testes
pub mod search;

/// Clientes de busca de notícias.
///
/// Define a trait `NewsSearchClient` e implementações para:
/// - GNews
/// - Mock para testes
pub mod news;

/// Classificação de intenção e extração de parâmetros.
pub mod classifier;

/// Agregação e ranking de notícias em alta.
pub mod trending;

/// Verificação de afirmações com evidências da web.
pub mod verifier;

/// Resumo de artigos e tópicos.
pub mod summarizer;

/// Controller: classifica e despacha cada query.
pub mod controller;

/// Configuração do runtime, do core e dos provedores.
///
/// **Runtime Tokio:**
/// - `NEWS_SENSE_THREADS`: Número fixo de threads (padrão: dinâmico)
/// - `NEWS_SENSE_MAX_THREADS`: Máximo de threads (padrão: 4)
///
/// **Core:**
/// - `CLASSIFIER`: "llm" ou "rules" (padrão: "llm")
/// - `PROVIDER_TIMEOUT_SECS`: Timeout por chamada externa (padrão: 20)
/// - `NEWS_PAGE_SIZE`: Artigos por busca (padrão: 20)
/// - `WEB_MAX_RESULTS`: Resultados de busca web (padrão: 5)
/// - `DEFAULT_TOPIC`: Tópico padrão (padrão: "general")
///
/// **Provedores:**
/// - `API_KEY`, `BASE_URL`, `MODEL_NAME`
/// - `GNEWS_API_KEY`, `GOOGLE_API_KEY`, `SEARCH_ENGINE_ID`
pub mod config;

/// Utilitários diversos (texto e timing).
pub mod utils;

// Re-exports principais
pub use config::{
    create_tokio_runtime, install_panic_hook, load_core_config, load_provider_config,
    load_runtime_config, ClassifierPreference, ConfigError, CoreConfig, ProviderConfig,
    RuntimeConfig,
};
pub use controller::NewsSenseController;
pub use error::{NewsSenseError, Provider, ProviderFailure};
pub use types::*;

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude com imports comuns para uso rápido.
///
/// ```rust,ignore
/// use news_sense::prelude::*;
/// ```
pub mod prelude {
    pub use crate::classifier::{
        extract_parameter, LlmClassifier, QueryClassifier, RuleClassifier,
    };
    pub use crate::config::{ClassifierPreference, CoreConfig};
    pub use crate::controller::NewsSenseController;
    pub use crate::error::{NewsSenseError, Provider, ProviderFailure};
    pub use crate::llm::{GenerationMode, LlmClient};
    pub use crate::news::NewsSearchClient;
    pub use crate::search::WebSearchClient;
    pub use crate::summarizer::Summarizer;
    pub use crate::trending::TrendingAggregator;
    pub use crate::types::*;
    pub use crate::verifier::ClaimVerifier;
}
