//! # agent-runtime
//!
//! Concrete chat providers and gateway assembly.
//!
//! ## Providers
//!
//! - **OpenAI-compatible**: DeepSeek, DashScope (Qwen) compatible mode, OpenAI
//! - **Ollama** (feature `ollama`, default): local inference
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{build_gateway, config};
//!
//! let gateway = build_gateway(config::profiles_from_env(), config::gateway_config_from_env());
//! let agent = AgentBuilder::new()
//!     .gateway(Arc::new(gateway))
//!     .build()?;
//! ```

pub mod config;
pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::OllamaProvider;
pub use openai::OpenAiCompatibleProvider;

use std::sync::Arc;

use agent_core::{AgentError, ChatGateway, GatewayConfig, LlmProvider, ProviderKind, ProviderProfile, Result};

/// Instantiate the provider described by a profile
pub fn build_provider(profile: &ProviderProfile) -> Result<Arc<dyn LlmProvider>> {
    match profile.kind {
        ProviderKind::OpenAiCompatible => Ok(Arc::new(OpenAiCompatibleProvider::from_profile(profile)?)),
        #[cfg(feature = "ollama")]
        ProviderKind::Ollama => Ok(Arc::new(OllamaProvider::from_profile(profile)?)),
        #[cfg(not(feature = "ollama"))]
        ProviderKind::Ollama => Err(AgentError::Config(format!(
            "Profile '{}' needs the `ollama` feature",
            profile.name
        ))),
    }
}

/// Build a fallback gateway from profiles.
///
/// Profiles that cannot be instantiated are skipped with a warning; the
/// gateway degrades gracefully even when it ends up empty.
pub fn build_gateway(profiles: Vec<ProviderProfile>, config: GatewayConfig) -> ChatGateway {
    let mut gateway = ChatGateway::new(config);

    for profile in profiles {
        match build_provider(&profile) {
            Ok(provider) => {
                tracing::info!(
                    provider = %profile.name,
                    model = %profile.model,
                    priority = profile.priority,
                    "Registered chat provider"
                );
                gateway.add_provider(profile, provider);
            }
            Err(e) => {
                tracing::warn!(provider = %profile.name, error = %e, "Skipping provider");
            }
        }
    }

    if gateway.is_empty() {
        tracing::warn!("No chat providers configured; every request will get the degraded response");
    }

    gateway
}

/// Fail fast when a deployment requires at least one provider
pub fn require_providers(gateway: &ChatGateway) -> Result<()> {
    if gateway.is_empty() {
        return Err(AgentError::Config(
            "No chat provider configured (set DEEPSEEK_API_KEY, DASHSCOPE_API_KEY, OPENAI_API_KEY or OLLAMA_MODEL)".into(),
        ));
    }
    Ok(())
}

// Re-export core types for convenience
pub use agent_core::{Agent, Message, Role, Tool, ToolRegistry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_gateway_orders_profiles() {
        let profiles = vec![
            ProviderProfile::new("dashscope", ProviderKind::OpenAiCompatible, "http://b", "qwen-turbo", 1),
            ProviderProfile::new("deepseek", ProviderKind::OpenAiCompatible, "http://a", "deepseek-r1", 0),
        ];

        let gateway = build_gateway(profiles, GatewayConfig::default());
        let names: Vec<_> = gateway.profiles().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["deepseek", "dashscope"]);
        assert!(require_providers(&gateway).is_ok());
    }

    #[test]
    fn test_empty_gateway_is_reported() {
        let gateway = build_gateway(Vec::new(), GatewayConfig::default());
        assert!(matches!(require_providers(&gateway), Err(AgentError::Config(_))));
    }
}
