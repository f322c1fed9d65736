//! OpenAI-compatible HTTP client.
//!
//! Posts a streaming chat completion and exposes the response body as a
//! [`TokenStream`]. Only the initial request is retried; once the body is
//! being read, any failure ends the stream with an error item.

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::inference::openai::mapping::{
    CompletionChunk, DONE_MARKER, StreamingChatRequest, build_request,
};
use crate::inference::openai::streaming::{RetryConfig, SseDecoder};
use crate::inference::{EditRequest, InferenceError, TokenSource, TokenStream};
use crate::infrastructure::config::InferenceSettings;

/// Configuration for the OpenAI token source
pub struct OpenAiConfig {
    /// The API key sent as a bearer token
    pub api_key: SecretString,
    /// The base URL of the API, ending in `/`
    pub base_url: Url,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Retry policy for starting a stream
    pub retry: RetryConfig,
}

impl OpenAiConfig {
    /// Creates a new config with default model, temperature and retries
    #[must_use]
    pub fn new(api_key: SecretString, base_url: Url) -> Self {
        Self {
            api_key,
            base_url,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            retry: RetryConfig::new(),
        }
    }

    /// Builds a config from settings.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::ConfigError` if the API key is missing or the
    /// base URL does not parse.
    pub fn from_settings(settings: &InferenceSettings) -> Result<Self, InferenceError> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| InferenceError::ConfigError("No API key configured".to_string()))?;
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            InferenceError::ConfigError(format!("Invalid base URL '{}': {e}", settings.base_url))
        })?;

        Ok(Self::new(api_key, base_url)
            .with_model(settings.model.clone())
            .with_temperature(settings.temperature)
            .with_max_retries(settings.max_retries)
            .with_base_delay_ms(settings.base_delay_ms))
    }

    /// Sets the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum number of retries
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry = self.retry.with_max_retries(max_retries);
        self
    }

    /// Sets the base delay for exponential backoff
    #[must_use]
    pub fn with_base_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry = self.retry.with_base_delay_ms(delay_ms);
        self
    }
}

/// Token source backed by an OpenAI-compatible chat completions API.
pub struct OpenAiTokenSource {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiTokenSource {
    /// Creates a new token source with the given configuration.
    #[must_use]
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Makes a single request attempt
    async fn make_request(
        &self,
        body: &StreamingChatRequest,
    ) -> Result<reqwest::Response, (InferenceError, bool)> {
        let request = self.build_api_request(body).map_err(|e| (e, false))?;

        let res = request.send().await.map_err(|e| {
            (
                InferenceError::NetworkError(e.to_string()),
                true, // Retry network errors
            )
        })?;

        Self::check_status(res).await
    }

    fn build_api_request(
        &self,
        body: &StreamingChatRequest,
    ) -> Result<reqwest::RequestBuilder, InferenceError> {
        let url = self
            .config
            .base_url
            .join("chat/completions")
            .map_err(|e| InferenceError::ConfigError(format!("Invalid URL join: {e}")))?;

        Ok(self
            .client
            .post(url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Accept", "text/event-stream")
            .json(body))
    }

    async fn check_status(
        res: reqwest::Response,
    ) -> Result<reqwest::Response, (InferenceError, bool)> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let text = res.text().await.unwrap_or_default();
        match status {
            StatusCode::TOO_MANY_REQUESTS => Err((InferenceError::RateLimit, true)),
            StatusCode::BAD_REQUEST if text.contains("context_length_exceeded") => {
                Err((InferenceError::ContextLengthExceeded, false))
            }
            StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => Err((
                InferenceError::ProviderError(format!("HTTP {status}: {text}")),
                true,
            )),
            _ => Err((
                InferenceError::ProviderError(format!("HTTP {status}: {text}")),
                false,
            )),
        }
    }
}

#[async_trait]
impl TokenSource for OpenAiTokenSource {
    async fn stream_edit(&self, request: EditRequest) -> Result<TokenStream, InferenceError> {
        let body = build_request(&self.config.model, self.config.temperature, &request);
        let retry = self.config.retry;

        let mut last_error = InferenceError::NetworkError("No attempts made".to_string());

        for attempt in 0..=retry.max_retries {
            match self.make_request(&body).await {
                Ok(response) => {
                    debug!(attempt = attempt + 1, model = %self.config.model, "Token stream started");
                    return Ok(sse_token_stream(response.bytes_stream().boxed()));
                }
                Err((error, should_retry)) => {
                    last_error = error;

                    if !should_retry || attempt >= retry.max_retries {
                        break;
                    }

                    let delay = retry.calculate_backoff_delay(attempt);
                    let delay_ms: u64 = delay.as_millis().try_into().unwrap_or(u64::MAX);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = retry.max_retries,
                        delay_ms = delay_ms,
                        error = %last_error,
                        "Stream request failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        debug!(error = %last_error, "Giving up on stream request");
        Err(last_error)
    }
}

struct SseState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, InferenceError>>,
    finished: bool,
}

impl SseState {
    /// Queues the chunks carried by decoded payloads. Stops at `[DONE]` or
    /// an in-band error.
    fn absorb(&mut self, payloads: impl IntoIterator<Item = String>) {
        for payload in payloads {
            if self.finished {
                return;
            }
            if payload.trim() == DONE_MARKER {
                self.finished = true;
                return;
            }
            match serde_json::from_str::<CompletionChunk>(&payload) {
                Ok(chunk) => {
                    if let Some(error) = &chunk.error {
                        self.pending
                            .push_back(Err(InferenceError::ProviderError(error.message.clone())));
                        self.finished = true;
                        return;
                    }
                    if let Some(content) = chunk.into_content() {
                        self.pending.push_back(Ok(content));
                    }
                }
                Err(e) => {
                    warn!(error = %e, payload_len = payload.len(), "Skipping unparseable stream event");
                }
            }
        }
    }
}

/// Turns an SSE response body into a token stream.
fn sse_token_stream(body: BoxStream<'static, reqwest::Result<Bytes>>) -> TokenStream {
    let state = SseState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(bytes)) => {
                    let payloads = state.decoder.push(&bytes);
                    state.absorb(payloads);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(InferenceError::NetworkError(e.to_string())), state));
                }
                None => {
                    let rest = state.decoder.finish();
                    state.absorb(rest);
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}
