//! # Fetcher Module
//!
//! Downloads and decodes one image per call, with bounded retry.
//!
//! ## Retry policy
//! Up to `max_attempts` attempts per URL. A failed HTTP exchange or a body
//! that does not decode as an image both count as a failed attempt; the
//! fetcher sleeps the fixed backoff between attempts (never after the
//! last). Exhausting the budget yields a [`FetchFailed`] carrying the last
//! error - recoverable, never fatal to the run.
//!
//! ## Test substitution
//! The HTTP exchange itself sits behind the [`Transport`] trait, so tests
//! drive the retry loop with scripted fake transports instead of a live
//! server. Production uses [`UreqTransport`], a `ureq` agent with a
//! client-wide timeout built once and shared by all workers.

use crate::error::{FetchError, FetchFailed};
use crate::events::{null_sender, Event, EventSender, FetchEvent};
use image::DynamicImage;
use std::io::Read;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Retrieves one decoded image per URL.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<DynamicImage, FetchFailed>;
}

/// One HTTP exchange: GET the URL, return the body bytes.
///
/// No retry or decode here - that is [`HttpFetcher`]'s job.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Error from a single HTTP exchange, before retry policy applies.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

/// Production transport: a blocking `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Build an agent with one client-wide timeout covering the whole
    /// exchange.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self.agent.get(url).call().map_err(|error| {
            let message = match &error {
                ureq::Error::Status(code, _) => format!("server returned status {code}"),
                ureq::Error::Transport(transport) => transport.to_string(),
            };
            TransportError { message }
        })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|error| TransportError {
                message: format!("failed reading response body: {error}"),
            })?;
        Ok(bytes)
    }
}

/// Fetcher configuration. Defaults mirror the production batch job; tests
/// shrink the backoff to zero.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Client-wide timeout per HTTP exchange
    pub timeout: Duration,
    /// Attempt budget per URL
    pub max_attempts: u32,
    /// Fixed sleep between attempts
    pub backoff: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(180),
            max_attempts: 3,
            backoff: Duration::from_secs(120),
        }
    }
}

/// HTTP image fetcher with bounded retry.
pub struct HttpFetcher<T: Transport = UreqTransport> {
    transport: T,
    config: FetchConfig,
    events: EventSender,
}

impl HttpFetcher<UreqTransport> {
    /// Build a fetcher backed by a live HTTP agent.
    pub fn new(config: FetchConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> HttpFetcher<T> {
    /// Build a fetcher over an explicit transport (fake transports in
    /// tests).
    pub fn with_transport(transport: T, config: FetchConfig) -> Self {
        Self {
            transport,
            config,
            events: null_sender(),
        }
    }

    /// Attach an event sender for retry/failure progress reporting.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    /// One attempt: exchange plus decode. The body bytes and the decoded
    /// image are both dropped by the caller as soon as hashing finishes;
    /// nothing is retained between attempts.
    fn attempt(&self, url: &str) -> Result<DynamicImage, FetchError> {
        let bytes = self
            .transport
            .get(url)
            .map_err(|error| FetchError::Transport {
                url: url.to_string(),
                message: error.message,
            })?;

        image::load_from_memory(&bytes).map_err(|error| FetchError::Decode {
            url: url.to_string(),
            reason: error.to_string(),
        })
    }
}

impl<T: Transport> ImageFetcher for HttpFetcher<T> {
    fn fetch(&self, url: &str) -> Result<DynamicImage, FetchFailed> {
        let mut last_error = None;

        for attempt in 1..=self.config.max_attempts {
            match self.attempt(url) {
                Ok(image) => {
                    debug!(url, attempt, "image downloaded and decoded");
                    return Ok(image);
                }
                Err(error) => {
                    warn!(url, attempt, %error, "download attempt failed");
                    if attempt < self.config.max_attempts {
                        self.events.send(Event::Fetch(FetchEvent::Retrying {
                            url: url.to_string(),
                            attempt,
                            message: error.to_string(),
                        }));
                        thread::sleep(self.config.backoff);
                    }
                    last_error = Some(error);
                }
            }
        }

        self.events.send(Event::Fetch(FetchEvent::Failed {
            url: url.to_string(),
            attempts: self.config.max_attempts,
        }));

        Err(FetchFailed {
            url: url.to_string(),
            attempts: self.config.max_attempts,
            last_error: last_error.unwrap_or_else(|| FetchError::Transport {
                url: url.to_string(),
                message: "no attempts were made".to_string(),
            }),
        })
    }
}
