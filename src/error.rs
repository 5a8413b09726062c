// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ERROS DO CORE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Erros que chegam ao caller de `handle_query`.
// Nenhum é fatal: cada query é independente.
// Intenção ambígua NÃO é erro (vira pedido de esclarecimento).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::llm::LlmError;
use crate::search::SearchError;

/// Result com o erro do core
pub type Result<T> = std::result::Result<T, NewsSenseError>;

/// Provedor externo envolvido na falha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Busca de notícias
    NewsSearch,
    /// Busca web
    WebSearch,
    /// Geração de texto (LLM)
    TextGeneration,
}

impl Provider {
    /// Nome legível para logs e mensagens
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NewsSearch => "news search",
            Self::WebSearch => "web search",
            Self::TextGeneration => "language model",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Causa da indisponibilidade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    Timeout,
    RateLimited,
    Network(String),
    Api(String),
    /// Resposta fora do schema sem default seguro
    Malformed(String),
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::Api(msg) => write!(f, "API error: {}", msg),
            Self::Malformed(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

impl From<LlmError> for ProviderFailure {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => Self::Timeout,
            LlmError::RateLimitError => Self::RateLimited,
            LlmError::NetworkError(msg) => Self::Network(msg),
            LlmError::ApiError(msg) => Self::Api(msg),
            LlmError::ParseError(msg) => Self::Malformed(msg),
        }
    }
}

impl From<SearchError> for ProviderFailure {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Timeout => Self::Timeout,
            SearchError::RateLimitError => Self::RateLimited,
            SearchError::NetworkError(msg) => Self::Network(msg),
            SearchError::ApiError(msg) => Self::Api(msg),
            SearchError::ParseError(msg) => Self::Malformed(msg),
        }
    }
}

/// Erros retornados ao caller
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NewsSenseError {
    /// Parâmetro vazio ou inválido. Não deve ser repetido.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provedor indisponível. O caller pode repetir a mesma query.
    #[error("{provider} unavailable: {failure}")]
    ProviderUnavailable {
        provider: Provider,
        failure: ProviderFailure,
    },
}

impl NewsSenseError {
    /// Cria erro de provedor a partir de falha do LLM
    pub fn from_llm(error: LlmError) -> Self {
        Self::ProviderUnavailable {
            provider: Provider::TextGeneration,
            failure: error.into(),
        }
    }

    /// Cria erro de provedor a partir de falha de busca
    pub fn from_search(provider: Provider, error: SearchError) -> Self {
        Self::ProviderUnavailable {
            provider,
            failure: error.into(),
        }
    }

    /// Se repetir a mesma query pode funcionar
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable { .. })
    }

    /// Mensagem curta para o usuário final
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(reason) => format!("Sorry, I can't work with that: {}.", reason),
            Self::ProviderUnavailable {
                provider,
                failure: ProviderFailure::RateLimited,
            } => format!(
                "The {} service is busy right now. Please try again in a moment.",
                provider
            ),
            Self::ProviderUnavailable {
                provider,
                failure: ProviderFailure::Timeout,
            } => format!("The {} service took too long to answer. Please try again.", provider),
            Self::ProviderUnavailable { provider, .. } => {
                format!("The {} service is unavailable. Please try again.", provider)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_errors_map_to_provider_unavailable() {
        let error = NewsSenseError::from_llm(LlmError::ParseError("bad json".into()));
        assert!(error.is_recoverable());
        assert_eq!(
            error,
            NewsSenseError::ProviderUnavailable {
                provider: Provider::TextGeneration,
                failure: ProviderFailure::Malformed("bad json".into()),
            }
        );
    }

    #[test]
    fn test_search_errors_keep_provider() {
        let error = NewsSenseError::from_search(Provider::NewsSearch, SearchError::RateLimitError);
        match error {
            NewsSenseError::ProviderUnavailable { provider, failure } => {
                assert_eq!(provider, Provider::NewsSearch);
                assert_eq!(failure, ProviderFailure::RateLimited);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_input_is_not_recoverable() {
        let error = NewsSenseError::InvalidInput("empty text".into());
        assert!(!error.is_recoverable());
        assert!(error.user_message().contains("empty text"));
    }

    #[test]
    fn test_user_messages_are_specific() {
        let busy = NewsSenseError::from_search(Provider::WebSearch, SearchError::RateLimitError);
        assert!(busy.user_message().contains("web search"));
        assert!(busy.user_message().contains("try again"));

        let slow = NewsSenseError::from_llm(LlmError::Timeout);
        assert!(slow.user_message().contains("too long"));
    }
}
