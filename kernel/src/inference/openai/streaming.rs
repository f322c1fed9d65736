//! Streaming support for OpenAI-compatible APIs.
//!
//! Provides the retry policy for starting a stream and the decoder that
//! splits a Server-Sent Events body into `data:` payloads.

use std::borrow::Cow;
use std::time::Duration;

use tracing::warn;

/// Default maximum number of retries for transient errors
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay for exponential backoff (in milliseconds)
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
/// Maximum delay cap (in milliseconds)
pub const MAX_DELAY_MS: u64 = 30000;

/// Retry configuration for starting a stream
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of retry attempts for failed requests
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfig {
    /// Creates a new retry config with default values
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }

    /// Sets the maximum number of retries
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the base delay for exponential backoff
    #[must_use]
    pub const fn with_base_delay_ms(mut self, delay_ms: u64) -> Self {
        self.base_delay_ms = delay_ms;
        self
    }

    /// Calculates the delay for a given retry attempt with jitter
    #[must_use]
    pub fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        // Exponential backoff: base_delay * 2^attempt
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX));
        let capped_delay = delay_ms.min(MAX_DELAY_MS);

        // Add jitter (0-25% of the delay)
        let jitter = capped_delay
            .saturating_mul(rand_jitter_factor())
            .saturating_div(4000);
        Duration::from_millis(capped_delay.saturating_add(jitter))
    }
}

/// Pseudo-random jitter factor in `0..1000`
#[must_use]
pub fn rand_jitter_factor() -> u64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    u64::from(nanos % 1000)
}

/// Incremental Server-Sent Events decoder.
///
/// Bytes are buffered until a blank line closes an event, so multi-byte
/// characters split across network reads are reassembled before decoding.
/// Only `data:` fields are kept; several `data:` lines in one event are
/// joined with `\n`. Carriage returns are dropped, which turns CRLF framing
/// into LF framing.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds bytes and returns the payloads of every event they complete.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));

        let mut payloads = Vec::new();
        while let Some(end) = find_event_end(&self.buffer) {
            let event: Vec<u8> = self.buffer.drain(..end + 2).collect();
            payloads.extend(parse_event(&event[..end]));
        }
        payloads
    }

    /// Flushes an event left unterminated at the end of the body.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let event = std::mem::take(&mut self.buffer);
        parse_event(&event)
    }
}

fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn parse_event(event: &[u8]) -> Option<String> {
    let text = match std::str::from_utf8(event) {
        Ok(text) => Cow::Borrowed(text),
        Err(e) => {
            warn!(
                valid_up_to = e.valid_up_to(),
                "SSE event is not valid UTF-8; substituting replacement characters"
            );
            String::from_utf8_lossy(event)
        }
    };
    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();
    if data.is_empty() {
        None
    } else {
        Some(data.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.base_delay_ms, DEFAULT_BASE_DELAY_MS);
    }

    #[test]
    fn test_backoff_delay_calculation() {
        let config = RetryConfig::new().with_base_delay_ms(1000);

        let delay0 = config.calculate_backoff_delay(0);
        assert!(delay0.as_millis() >= 1000);
        assert!(delay0.as_millis() <= 1250);

        let delay1 = config.calculate_backoff_delay(1);
        assert!(delay1.as_millis() >= 2000);
        assert!(delay1.as_millis() <= 2500);
    }

    #[test]
    fn test_backoff_delay_caps_at_max() {
        let config = RetryConfig::new().with_base_delay_ms(10000);
        let delay = config.calculate_backoff_delay(70);
        let max_with_jitter = (u128::from(MAX_DELAY_MS) * 125) / 100;
        assert!(delay.as_millis() <= max_with_jitter);
    }

    #[test]
    fn decodes_complete_events() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b"data: one\n\ndata: two\n\n");
        assert_eq!(payloads, ["one", "two"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn buffers_partial_events() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: par").is_empty());
        assert_eq!(decoder.push(b"tial\n\ndata: next"), ["partial"]);
        assert_eq!(decoder.finish().as_deref(), Some("next"));
    }

    #[test]
    fn reassembles_split_utf8() {
        let bytes = "data: héllo\n\n".as_bytes();
        // Split inside the two-byte 'é'.
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        assert_eq!(decoder.push(&bytes[split..]), ["héllo"]);
    }

    #[test]
    fn replaces_invalid_utf8_and_keeps_going() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b"data: bad \xff byte\n\ndata: fine\n\n");
        assert_eq!(payloads, ["bad \u{FFFD} byte", "fine"]);
    }

    #[test]
    fn handles_crlf_comments_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(b": keep-alive\r\n\r\nevent: x\r\ndata: a\r\ndata: b\r\n\r\n");
        assert_eq!(payloads, ["a\nb"]);
    }
}
