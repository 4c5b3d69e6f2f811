//! # Chat completion client
//!
//! Thin wrapper around [async-openai] for the session message generator.
//! Submits a fixed two-message exchange (system + user) at a configured model
//! and temperature, retries rate limits with exponential backoff, and logs
//! token usage plus an estimated cost from the static price table.
//!
//! API keys never appear in logs unmasked; see [`mask_token`].

pub mod pricing;
pub mod retry;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use thiserror::Error;
use tracing::{debug, info};

use retry::{RetryError, RetryPolicy};

/// Masks an API key/token for safe logging: shows first 7 chars + "***" +
/// last 4 chars. If length <= 11, returns "***" to avoid leaking any part of
/// the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 {
        "***".to_string()
    } else {
        let head = &token[..7];
        let tail = &token[len - 4..];
        format!("{}***{}", head, tail)
    }
}

#[derive(Error, Debug)]
pub enum ChatError {
    /// Every attempt hit the remote rate limit; carries the attempt count.
    #[error("rate limited after {attempts} attempts: {source}")]
    RateLimited {
        attempts: u32,
        #[source]
        source: OpenAIError,
    },

    /// Any other remote failure (timeout, malformed request, API error);
    /// surfaced immediately without retry.
    #[error("chat completion failed: {0}")]
    Api(#[from] OpenAIError),

    #[error("chat completion returned no choices")]
    EmptyCompletion,

    #[error("invalid chat configuration: {0}")]
    Config(String),
}

/// Chat client configuration; passed into [`ChatClient::new`] instead of
/// living in process-wide state.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: String,
    /// Custom API base URL (proxies, compatible endpoints); `None` for the
    /// default.
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub retry: RetryPolicy,
}

impl ChatConfig {
    pub const DEFAULT_MODEL: &'static str = "gpt-4-turbo-preview";
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Loads from environment variables: `OPENAI_API_KEY` (required),
    /// `OPENAI_BASE_URL`, `MODEL`, `TEMPERATURE`.
    pub fn from_env() -> Result<Self, ChatError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ChatError::Config("OPENAI_API_KEY not set".to_string()))?;
        let base_url = std::env::var("OPENAI_BASE_URL").ok();
        let model =
            std::env::var("MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());
        let temperature = match std::env::var("TEMPERATURE") {
            Ok(raw) => raw.parse().map_err(|_| {
                ChatError::Config(format!("TEMPERATURE is not a number: {raw}"))
            })?,
            Err(_) => Self::DEFAULT_TEMPERATURE,
        };

        Ok(Self {
            api_key,
            base_url,
            model,
            temperature,
            retry: RetryPolicy::default(),
        })
    }
}

/// Chat completion client: one completion per call, rate-limit aware.
#[derive(Clone)]
pub struct ChatClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    retry: RetryPolicy,
    /// Stored only for masked logging.
    api_key_for_logging: String,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key.clone());
        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url.clone());
        }

        Self {
            client: Client::with_config(openai_config),
            model: config.model,
            temperature: config.temperature,
            retry: config.retry,
            api_key_for_logging: config.api_key,
        }
    }

    /// Sends one system+user exchange and returns the assistant reply.
    ///
    /// Rate limits are retried per the configured policy; any other remote
    /// error fails immediately. Token usage and estimated cost are logged,
    /// never returned.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ChatError> {
        info!(
            model = %self.model,
            temperature = self.temperature,
            api_key = %mask_token(&self.api_key_for_logging),
            "chat completion request"
        );

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt.to_string())
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt.to_string())
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .temperature(self.temperature)
            .messages(messages)
            .build()?;

        let response = retry::run(&self.retry, is_rate_limit, |attempt| {
            let client = self.client.clone();
            let request = request.clone();
            async move {
                if attempt > 0 {
                    info!(attempt, "retrying chat completion after rate limit");
                }
                client.chat().create(request).await
            }
        })
        .await
        .map_err(|err| match err {
            RetryError::RateLimited { attempts, source } => {
                ChatError::RateLimited { attempts, source }
            }
            RetryError::Fatal(source) => ChatError::Api(source),
        })?;

        let choice = response.choices.first().ok_or(ChatError::EmptyCompletion)?;
        let content = choice.message.content.clone().unwrap_or_default();

        // Token accounting for observability: the API's own counts when
        // present, the chars/4 estimate otherwise.
        let (prompt_tokens, completion_tokens) = match &response.usage {
            Some(usage) => (
                u64::from(usage.prompt_tokens),
                u64::from(usage.completion_tokens),
            ),
            None => (
                pricing::estimate_tokens(system_prompt) + pricing::estimate_tokens(user_prompt),
                pricing::estimate_tokens(&content),
            ),
        };
        info!(prompt_tokens, completion_tokens, "chat completion usage");

        match pricing::estimate_cost_micro_usd(&self.model, prompt_tokens, completion_tokens) {
            Some(cost_micro_usd) => {
                info!(model = %self.model, cost_micro_usd, "estimated completion cost");
            }
            None => debug!(model = %self.model, "model not in price table; skipping cost estimate"),
        }

        Ok(content)
    }
}

/// Whether a remote error is a rate-limit signal (and therefore retryable).
fn is_rate_limit(err: &OpenAIError) -> bool {
    match err {
        OpenAIError::ApiError(api) => {
            api.code.as_deref() == Some("rate_limit_exceeded")
                || api.r#type.as_deref() == Some("rate_limit_error")
                || api.message.to_ascii_lowercase().contains("rate limit")
        }
        _ => false,
    }
}

/// Generates session messages against a fixed system prompt.
///
/// The system prompt is loaded once at construction; `generate_message` takes
/// only the per-session user prompt.
pub struct MessageGenerator {
    client: ChatClient,
    system_prompt: String,
}

impl MessageGenerator {
    pub fn new(client: ChatClient, system_prompt: impl Into<String>) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
        }
    }

    /// Returns the model's reply for `user_prompt`.
    pub async fn generate_message(&self, user_prompt: &str) -> Result<String, ChatError> {
        self.client.complete(&self.system_prompt, user_prompt).await
    }
}
