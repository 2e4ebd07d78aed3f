use std::time::Duration;

/// Default chat/completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for the image description stage.
pub const DEFAULT_VISION_MODEL: &str = "nvidia/nemotron-nano-12b-v2-vl:free";

/// Default model for every text reasoning stage.
pub const DEFAULT_REASONING_MODEL: &str = "deepseek/deepseek-r1-0528:free";

/// Single fixed timeout for every model request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which hosted model serves which pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub vision: String,
    pub reasoning: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            vision: DEFAULT_VISION_MODEL.to_string(),
            reasoning: DEFAULT_REASONING_MODEL.to_string(),
        }
    }
}

/// Gateway configuration loaded from environment variables.
///
/// A missing or blank API key is not an error: the gateway then answers
/// every call with [`crate::NOT_CONFIGURED`].
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub models: ModelSelection,
    pub timeout: Duration,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("models", &self.models)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            models: ModelSelection::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                                          |
    /// |----------------------|--------------------------------------------------|
    /// | `OPENROUTER_API_KEY` | unset                                            |
    /// | `OPENROUTER_URL`     | `https://openrouter.ai/api/v1/chat/completions` |
    /// | `VISION_MODEL`       | `nvidia/nemotron-nano-12b-v2-vl:free`            |
    /// | `REASONING_MODEL`    | `deepseek/deepseek-r1-0528:free`                 |
    /// | `MODEL_TIMEOUT_SECS` | `120`                                            |
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let endpoint =
            std::env::var("OPENROUTER_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());

        let models = ModelSelection {
            vision: std::env::var("VISION_MODEL").unwrap_or_else(|_| DEFAULT_VISION_MODEL.into()),
            reasoning: std::env::var("REASONING_MODEL")
                .unwrap_or_else(|_| DEFAULT_REASONING_MODEL.into()),
        };

        let timeout_secs = match std::env::var("MODEL_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid MODEL_TIMEOUT_SECS, using default");
                DEFAULT_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        if api_key.is_none() {
            tracing::warn!("OPENROUTER_API_KEY not set; model calls will return a notice");
        }

        Self {
            api_key,
            endpoint,
            models,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Builder used by tests and embedders that do not read the environment.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = GatewayConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = GatewayConfig::default().with_api_key("sk-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
