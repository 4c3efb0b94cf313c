//! Provider Configuration
//!
//! Reads provider profiles from environment variables. Every profile whose
//! credential (or, for Ollama, model) is present is added; priority follows
//! the fixed order DeepSeek → DashScope → OpenAI → Ollama.

use std::time::Duration;

use agent_core::{GatewayConfig, ProviderKind, ProviderProfile};

/// DashScope compatible-mode endpoint, which also serves DeepSeek models
pub const DASHSCOPE_COMPATIBLE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Load provider profiles from the process environment
pub fn profiles_from_env() -> Vec<ProviderProfile> {
    profiles_from_lookup(|key| std::env::var(key).ok())
}

/// Load provider profiles through an arbitrary variable lookup
pub fn profiles_from_lookup<F>(lookup: F) -> Vec<ProviderProfile>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut profiles = Vec::new();

    if let Some(key) = var("DEEPSEEK_API_KEY") {
        profiles.push(
            ProviderProfile::new(
                "deepseek",
                ProviderKind::OpenAiCompatible,
                var("DEEPSEEK_BASE_URL").unwrap_or_else(|| DASHSCOPE_COMPATIBLE_URL.into()),
                var("DEEPSEEK_MODEL").unwrap_or_else(|| "deepseek-r1".into()),
                0,
            )
            .with_credential(key)
            .with_max_tokens(8000),
        );
    }

    if let Some(key) = var("DASHSCOPE_API_KEY") {
        profiles.push(
            ProviderProfile::new(
                "dashscope",
                ProviderKind::OpenAiCompatible,
                var("DASHSCOPE_BASE_URL").unwrap_or_else(|| DASHSCOPE_COMPATIBLE_URL.into()),
                var("DASHSCOPE_MODEL").unwrap_or_else(|| "qwen-turbo".into()),
                1,
            )
            .with_credential(key)
            .with_max_tokens(4000),
        );
    }

    if let Some(key) = var("OPENAI_API_KEY") {
        profiles.push(
            ProviderProfile::new(
                "openai",
                ProviderKind::OpenAiCompatible,
                var("OPENAI_BASE_URL").unwrap_or_else(|| OPENAI_URL.into()),
                var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".into()),
                2,
            )
            .with_credential(key),
        );
    }

    if let Some(model) = var("OLLAMA_MODEL") {
        let host = var("OLLAMA_HOST").unwrap_or_else(|| "http://localhost".into());
        let port = var("OLLAMA_PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(11434);
        profiles.push(ProviderProfile::new(
            "ollama",
            ProviderKind::Ollama,
            format!("{}:{}", host.trim_end_matches('/'), port),
            model,
            3,
        ));
    }

    profiles
}

/// Gateway settings from the process environment
pub fn gateway_config_from_env() -> GatewayConfig {
    gateway_config_from_lookup(|key| std::env::var(key).ok())
}

/// Gateway settings through an arbitrary variable lookup
pub fn gateway_config_from_lookup<F>(lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = GatewayConfig::default();
    GatewayConfig {
        attempt_timeout: lookup("PROVIDER_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(defaults.attempt_timeout, Duration::from_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_no_credentials_no_profiles() {
        assert!(profiles_from_lookup(lookup(&[])).is_empty());
    }

    #[test]
    fn test_primary_and_secondary_order() {
        let profiles = profiles_from_lookup(lookup(&[
            ("DASHSCOPE_API_KEY", "ds-key"),
            ("DEEPSEEK_API_KEY", "dk-key"),
        ]));

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "deepseek");
        assert_eq!(profiles[0].priority, 0);
        assert_eq!(profiles[0].model, "deepseek-r1");
        assert_eq!(profiles[0].endpoint, DASHSCOPE_COMPATIBLE_URL);
        assert_eq!(profiles[1].name, "dashscope");
        assert_eq!(profiles[1].model, "qwen-turbo");
        assert_eq!(profiles[1].credential.as_deref(), Some("ds-key"));
    }

    #[test]
    fn test_blank_values_ignored_and_overrides_applied() {
        let profiles = profiles_from_lookup(lookup(&[
            ("DEEPSEEK_API_KEY", "   "),
            ("OPENAI_API_KEY", "sk"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OLLAMA_MODEL", "llama3.2"),
            ("OLLAMA_HOST", "http://gpu-box/"),
        ]));

        let names: Vec<_> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["openai", "ollama"]);
        assert_eq!(profiles[0].model, "gpt-4o");
        assert_eq!(profiles[1].endpoint, "http://gpu-box:11434");
        assert_eq!(profiles[1].kind, ProviderKind::Ollama);
    }

    #[test]
    fn test_gateway_timeout_from_lookup() {
        let config = gateway_config_from_lookup(lookup(&[("PROVIDER_TIMEOUT_SECS", "15")]));
        assert_eq!(config.attempt_timeout, Duration::from_secs(15));

        let config = gateway_config_from_lookup(lookup(&[("PROVIDER_TIMEOUT_SECS", "zero")]));
        assert_eq!(config.attempt_timeout, GatewayConfig::default().attempt_timeout);
    }
}
