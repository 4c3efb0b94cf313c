//! Chat Gateway
//!
//! Hides an ordered list of providers behind one `complete` call. Providers are
//! attempted strictly by ascending priority; any failure (error, timeout, empty
//! body) is logged and the same, unmodified message slice is handed to the next
//! provider. When every provider has failed the gateway answers with
//! [`DEGRADED_RESPONSE`] instead of an error.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, GenerationOptions, LlmProvider, ProviderProfile};

/// Fixed user-safe text returned when no provider could answer.
///
/// Contains no brackets or braces, so it never extracts as a structured document.
pub const DEGRADED_RESPONSE: &str =
    "Sorry, the planning service could not generate a response right now. Please try again later.";

/// Gateway settings
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Deadline for a single provider attempt
    pub attempt_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(60),
        }
    }
}

/// A successful gateway answer and where it came from
#[derive(Clone, Debug)]
pub struct GatewayReply {
    pub content: String,
    pub provider: String,
    pub model: String,
    /// Number of providers tried, including the one that answered
    pub attempts: usize,
}

struct ProviderSlot {
    profile: ProviderProfile,
    options: GenerationOptions,
    provider: Arc<dyn LlmProvider>,
}

/// Fallback chat-completion gateway
pub struct ChatGateway {
    slots: Vec<ProviderSlot>,
    config: GatewayConfig,
}

impl Default for ChatGateway {
    fn default() -> Self {
        Self::new(GatewayConfig::default())
    }
}

impl ChatGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            slots: Vec::new(),
            config,
        }
    }

    /// Add a provider; slots stay ordered by priority (ties keep insertion order)
    pub fn add_provider(&mut self, profile: ProviderProfile, provider: Arc<dyn LlmProvider>) {
        let options = profile.generation_options();
        self.slots.push(ProviderSlot {
            profile,
            options,
            provider,
        });
        self.slots.sort_by_key(|slot| slot.profile.priority);
    }

    pub fn with_provider(mut self, profile: ProviderProfile, provider: Arc<dyn LlmProvider>) -> Self {
        self.add_provider(profile, provider);
        self
    }

    /// Profiles in fallback order
    pub fn profiles(&self) -> impl Iterator<Item = &ProviderProfile> {
        self.slots.iter().map(|slot| &slot.profile)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Complete the conversation, degrading to [`DEGRADED_RESPONSE`] when every
    /// provider fails. Never returns an error.
    pub async fn complete(&self, messages: &[Message]) -> String {
        match self.try_complete(messages).await {
            Ok(reply) => reply.content,
            Err(e) => {
                tracing::error!(error = %e, "Chat gateway exhausted, returning degraded response");
                DEGRADED_RESPONSE.to_string()
            }
        }
    }

    /// Complete the conversation, reporting which provider answered.
    ///
    /// Fails with [`AgentError::ProvidersExhausted`] only after every provider
    /// has been tried.
    pub async fn try_complete(&self, messages: &[Message]) -> Result<GatewayReply> {
        for (index, slot) in self.slots.iter().enumerate() {
            match self.attempt(slot, messages).await {
                Ok(completion) => {
                    if index > 0 {
                        tracing::info!(
                            provider = %slot.profile.name,
                            attempts = index + 1,
                            "Fallback provider answered"
                        );
                    }
                    return Ok(GatewayReply {
                        content: completion.content,
                        provider: slot.profile.name.clone(),
                        model: completion.model,
                        attempts: index + 1,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        provider = %slot.profile.name,
                        model = %slot.profile.model,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Provider attempt failed, advancing to next provider"
                    );
                }
            }
        }

        Err(AgentError::ProvidersExhausted(self.slots.len()))
    }

    async fn attempt(&self, slot: &ProviderSlot, messages: &[Message]) -> Result<Completion> {
        let timeout = self.config.attempt_timeout;
        let completion = tokio::time::timeout(timeout, slot.provider.complete(messages, &slot.options))
            .await
            .map_err(|_| AgentError::Timeout(timeout))??;

        if completion.content.trim().is_empty() {
            return Err(AgentError::Provider(format!(
                "{} returned an empty response",
                slot.provider.name()
            )));
        }

        Ok(completion)
    }
}
