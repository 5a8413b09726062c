// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO RUNTIME, DO CORE E DOS PROVEDORES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Configurações lidas uma vez na inicialização e somente leitura depois.
// Todas as configurações podem ser definidas via .env
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;
use std::time::Duration;

use crate::news::MAX_NEWS_PAGE_SIZE;
use crate::search::{MAX_WEB_RESULTS, MIN_WEB_RESULTS};
use crate::types::GENERAL_TOPIC;

/// Erros de configuração
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(&'static str),
}

/// Qual classificador de intenção usar.
///
/// - `Llm`: classificador zero/few-shot via LLM (padrão)
/// - `Rules`: palavras-chave, sem chamada ao provedor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierPreference {
    /// Classificação pelo LLM em modo determinístico
    #[default]
    Llm,

    /// Classificação por regras locais.
    /// Útil sem chave de LLM e em testes determinísticos.
    Rules,
}

impl ClassifierPreference {
    /// Converte string do .env para ClassifierPreference.
    ///
    /// Case-insensitive:
    /// - "rules" ou "rule" → Rules
    /// - qualquer outro valor → Llm
    pub fn from_env(value: &str) -> Self {
        match value.to_lowercase().trim() {
            "rules" | "rule" => Self::Rules,
            _ => Self::Llm,
        }
    }

    /// Retorna nome legível para logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Llm => "LLM",
            Self::Rules => "Rules",
        }
    }
}

impl fmt::Display for ClassifierPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO CORE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuração dos componentes de orquestração
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Classificador de intenção
    pub classifier: ClassifierPreference,

    /// Espera máxima de cada chamada externa.
    /// Timeout é tratado como falha do provedor.
    pub provider_timeout: Duration,

    /// Artigos pedidos ao provedor de notícias (1..=50)
    pub news_page_size: usize,

    /// Resultados pedidos à busca web (3..=10)
    pub web_max_results: usize,

    /// Referências mantidas no fact-check
    pub max_references: usize,

    /// Tópico padrão quando a query e o usuário não indicam um
    pub default_topic: String,

    /// Jaccard mínimo entre manchetes da mesma história
    pub headline_similarity: f32,

    /// Sobreposição mínima entre descrições da mesma história
    pub description_similarity: f32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierPreference::default(),
            provider_timeout: Duration::from_secs(20),
            news_page_size: 20,
            web_max_results: 5,
            max_references: 3,
            default_topic: GENERAL_TOPIC.to_string(),
            headline_similarity: 0.5,
            description_similarity: 0.6,
        }
    }
}

/// Carrega configuração do core a partir das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `CLASSIFIER`: "llm" (padrão) ou "rules"
/// - `PROVIDER_TIMEOUT_SECS`: timeout por chamada externa (padrão: 20)
/// - `NEWS_PAGE_SIZE`: artigos por busca (padrão: 20, máx: 50)
/// - `WEB_MAX_RESULTS`: resultados de busca web (padrão: 5, entre 3 e 10)
/// - `DEFAULT_TOPIC`: tópico padrão (padrão: "general")
pub fn load_core_config() -> CoreConfig {
    let mut config = CoreConfig::default();

    if let Ok(value) = std::env::var("CLASSIFIER") {
        config.classifier = ClassifierPreference::from_env(&value);
        log::info!("📦 CLASSIFIER={}", config.classifier);
    }

    if let Ok(secs_str) = std::env::var("PROVIDER_TIMEOUT_SECS") {
        if let Ok(secs) = secs_str.parse::<u64>() {
            if secs > 0 {
                config.provider_timeout = Duration::from_secs(secs);
                log::info!("📦 PROVIDER_TIMEOUT_SECS={}", secs);
            }
        }
    }

    if let Ok(size_str) = std::env::var("NEWS_PAGE_SIZE") {
        if let Ok(size) = size_str.parse::<usize>() {
            config.news_page_size = size.clamp(1, MAX_NEWS_PAGE_SIZE);
            log::info!("📦 NEWS_PAGE_SIZE={}", config.news_page_size);
        }
    }

    if let Ok(max_str) = std::env::var("WEB_MAX_RESULTS") {
        if let Ok(max) = max_str.parse::<usize>() {
            config.web_max_results = max.clamp(MIN_WEB_RESULTS, MAX_WEB_RESULTS);
            log::info!("📦 WEB_MAX_RESULTS={}", config.web_max_results);
        }
    }

    if let Ok(topic) = std::env::var("DEFAULT_TOPIC") {
        let topic = topic.trim();
        if !topic.is_empty() {
            config.default_topic = topic.to_string();
            log::info!("📦 DEFAULT_TOPIC={}", topic);
        }
    }

    config
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CREDENCIAIS DOS PROVEDORES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Credenciais e endpoints dos provedores.
///
/// Lidas apenas pelos adaptadores; o core nunca as vê.
#[derive(Clone)]
pub struct ProviderConfig {
    /// URL base da API compatível com OpenAI
    pub llm_base_url: String,
    /// Chave da API do LLM
    pub llm_api_key: String,
    /// Modelo
    pub llm_model: String,
    /// Chave GNews
    pub gnews_api_key: String,
    /// Chave Google Custom Search
    pub google_api_key: String,
    /// ID do mecanismo de busca (cx)
    pub search_engine_id: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("search_engine_id", &self.search_engine_id)
            .finish_non_exhaustive()
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

/// Carrega credenciais dos provedores.
///
/// Variáveis:
/// - `API_KEY` (obrigatória), `BASE_URL`, `MODEL_NAME`
/// - `GNEWS_API_KEY` (obrigatória)
/// - `GOOGLE_API_KEY` e `SEARCH_ENGINE_ID` (obrigatórias)
pub fn load_provider_config() -> Result<ProviderConfig, ConfigError> {
    let config = ProviderConfig {
        llm_base_url: std::env::var("BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
        llm_api_key: required_var("API_KEY")?,
        llm_model: std::env::var("MODEL_NAME").unwrap_or_else(|_| "gpt-4.1-mini".to_string()),
        gnews_api_key: required_var("GNEWS_API_KEY")?,
        google_api_key: required_var("GOOGLE_API_KEY")?,
        search_engine_id: required_var("SEARCH_ENGINE_ID")?,
    };

    log::info!(
        "🔑 Provedores: LLM {} ({}), GNews, Google CSE",
        config.llm_base_url,
        config.llm_model
    );

    Ok(config)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// RUNTIME TOKIO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuração do runtime Tokio.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Número de worker threads do Tokio.
    /// Se None, usa cálculo dinâmico: min(cpu_cores, max_threads).
    pub worker_threads: Option<usize>,

    /// Número máximo de threads (limite superior para cálculo dinâmico).
    /// Padrão: 4 (cada query é sequencial; poucas threads bastam)
    pub max_threads: usize,

    /// Nome da thread principal.
    pub thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            max_threads: 4,
            thread_name: "news-sense".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Calcula número efetivo de worker threads.
    pub fn effective_worker_threads(&self) -> usize {
        if let Some(threads) = self.worker_threads {
            threads
        } else {
            std::cmp::min(num_cpus::get(), self.max_threads)
        }
    }
}

/// Carrega configuração do runtime.
///
/// - `NEWS_SENSE_THREADS`: número fixo de threads (opcional)
/// - `NEWS_SENSE_MAX_THREADS`: máximo para cálculo dinâmico (padrão: 4)
pub fn load_runtime_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();

    if let Ok(threads_str) = std::env::var("NEWS_SENSE_THREADS") {
        if let Ok(threads) = threads_str.parse::<usize>() {
            if threads > 0 {
                config.worker_threads = Some(threads);
                log::info!("📦 NEWS_SENSE_THREADS={} (fixo)", threads);
            }
        }
    }

    if let Ok(max_str) = std::env::var("NEWS_SENSE_MAX_THREADS") {
        if let Ok(max) = max_str.parse::<usize>() {
            if max > 0 {
                config.max_threads = max;
                log::info!("📦 NEWS_SENSE_MAX_THREADS={}", max);
            }
        }
    }

    config
}

/// Instala panic hook que loga o panic com thread e localização.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("unnamed");

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };

        log::error!("[PANIC] Thread {} at {}: {}", thread_name, location, message);
    }));
}

/// Cria o runtime Tokio com configuração customizada.
pub fn create_tokio_runtime(config: &RuntimeConfig) -> std::io::Result<tokio::runtime::Runtime> {
    let worker_threads = config.effective_worker_threads();

    log::info!("🚀 Criando runtime Tokio: {} workers", worker_threads);

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .thread_name(&config.thread_name)
        .enable_all()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_preference_from_env() {
        assert_eq!(ClassifierPreference::from_env("rules"), ClassifierPreference::Rules);
        assert_eq!(ClassifierPreference::from_env(" RULE "), ClassifierPreference::Rules);
        assert_eq!(ClassifierPreference::from_env("llm"), ClassifierPreference::Llm);
        assert_eq!(ClassifierPreference::from_env("anything"), ClassifierPreference::Llm);
        assert_eq!(ClassifierPreference::from_env(""), ClassifierPreference::Llm);
    }

    #[test]
    fn test_core_config_default() {
        let config = CoreConfig::default();
        assert_eq!(config.classifier, ClassifierPreference::Llm);
        assert_eq!(config.max_references, 3);
        assert!((MIN_WEB_RESULTS..=MAX_WEB_RESULTS).contains(&config.web_max_results));
        assert!(config.news_page_size <= MAX_NEWS_PAGE_SIZE);
        assert_eq!(config.default_topic, "general");
    }

    #[test]
    fn test_effective_worker_threads() {
        let mut config = RuntimeConfig::default();
        assert_eq!(
            config.effective_worker_threads(),
            std::cmp::min(num_cpus::get(), 4)
        );
        config.worker_threads = Some(2);
        assert_eq!(config.effective_worker_threads(), 2);
    }

    #[test]
    fn test_provider_config_debug_hides_keys() {
        let config = ProviderConfig {
            llm_base_url: "https://api.openai.com/v1".into(),
            llm_api_key: "sk-secret".into(),
            llm_model: "gpt-4.1-mini".into(),
            gnews_api_key: "gnews-secret".into(),
            google_api_key: "google-secret".into(),
            search_engine_id: "cx".into(),
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("gpt-4.1-mini"));
    }

    #[test]
    fn test_classifier_display() {
        assert_eq!(ClassifierPreference::Llm.display_name(), "LLM");
        assert_eq!(ClassifierPreference::Rules.to_string(), "Rules");
    }
}
