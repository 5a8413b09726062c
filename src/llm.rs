// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE LLM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait e implementações para geração de texto.
// Usado para classificação de intenção, veredito e resumo.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Erros do cliente LLM
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("Invalid response format: {0}")]
    ParseError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
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

/// Modo de geração.
///
/// Classificação e veredito precisam ser estáveis entre execuções;
/// resumos podem variar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Temperatura zero
    Deterministic,
    /// Temperatura moderada
    Creative,
}

impl GenerationMode {
    /// Temperatura enviada ao provedor
    pub fn temperature(&self) -> f32 {
        match self {
            Self::Deterministic => 0.0,
            Self::Creative => 0.7,
        }
    }

    /// Limite de tokens de saída
    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::Deterministic => 200,
            Self::Creative => 800,
        }
    }
}

/// Par de prompts (sistema + usuário)
#[derive(Debug, Clone, PartialEq)]
pub struct LlmPrompt {
    pub system: String,
    pub user: String,
}

impl LlmPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Resposta gerada pelo LLM
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub tokens_used: u64,
}

/// Trait principal para clientes LLM
///
/// Esta trait define a interface que qualquer provedor de geração de texto
/// deve implementar. Testes substituem por [`MockLlmClient`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Gera texto a partir do prompt
    async fn generate(&self, prompt: &LlmPrompt, mode: GenerationMode)
        -> Result<LlmResponse, LlmError>;
}

/// Executa `generate` com espera limitada; timeout vira [`LlmError::Timeout`]
pub async fn generate_with_timeout(
    client: &dyn LlmClient,
    prompt: &LlmPrompt,
    mode: GenerationMode,
    timeout: Duration,
) -> Result<LlmResponse, LlmError> {
    match tokio::time::timeout(timeout, client.generate(prompt, mode)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Cliente mock para testes.
///
/// Responde com a fila de respostas roteirizadas e, quando ela acaba,
/// com a resposta padrão. Registra os prompts recebidos.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    scripted: Mutex<VecDeque<Result<String, LlmError>>>,
    default_response: Option<String>,
    prompts: Mutex<Vec<LlmPrompt>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sempre responde o mesmo texto
    pub fn with_response(text: impl Into<String>) -> Self {
        Self {
            default_response: Some(text.into()),
            ..Default::default()
        }
    }

    /// Responde em sequência; depois da fila, usa a resposta padrão (se houver)
    pub fn with_script<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<String, LlmError>>,
    {
        Self {
            scripted: Mutex::new(responses.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Sempre falha com o erro dado
    pub fn failing(error: LlmError) -> Self {
        Self::with_script(std::iter::repeat(Err(error)).take(16))
    }

    /// Atrasa cada resposta (para testar timeouts)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Número de chamadas recebidas
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts recebidos, em ordem
    pub fn prompts(&self) -> Vec<LlmPrompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(
        &self,
        prompt: &LlmPrompt,
        _mode: GenerationMode,
    ) -> Result<LlmResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.scripted.lock().ok().and_then(|mut q| q.pop_front());
        let text = match scripted {
            Some(result) => result?,
            None => self
                .default_response
                .clone()
                .ok_or_else(|| LlmError::ApiError("No scripted response".into()))?,
        };

        Ok(LlmResponse {
            tokens_used: crate::utils::estimate_tokens(&text) as u64,
            text,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO OPENAI (API COMPATÍVEL)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: u64,
}

/// Cliente para APIs compatíveis com OpenAI (`/chat/completions`)
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4.1-mini".into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').into();
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
impl LlmClient for OpenAiClient {
    async fn generate(
        &self,
        prompt: &LlmPrompt,
        mode: GenerationMode,
    ) -> Result<LlmResponse, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: mode.temperature(),
            max_tokens: mode.max_tokens(),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitError);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, error_text)));
        }

        let chat: ChatResponse = response.json().await?;
        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or_else(|| LlmError::ParseError("response has no choices".into()))?;

        Ok(LlmResponse {
            tokens_used: chat.usage.map(|u| u.total_tokens).unwrap_or(0),
            text,
        })
    }
}
