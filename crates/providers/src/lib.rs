//! Chat completion providers for Laozihao.
//!
//! All providers implement the `laozihao_core::Provider` trait. The service
//! ships a single OpenAI-compatible backend, pointed at DeepSeek by default.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use laozihao_config::AppConfig;
use laozihao_core::Provider;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured provider.
///
/// A missing credential still yields a provider; it refuses every request
/// with `ProviderError::NotConfigured` before touching the network, so the
/// catalog endpoints keep working without a key.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Provider> {
    if !config.has_api_key() {
        tracing::warn!("DEEPSEEK_API_KEY is not set; /api/chat will return a configuration error");
    }

    let provider = OpenAiCompatProvider::new(
        "deepseek",
        &config.api_url,
        config.api_key.clone().unwrap_or_default(),
    )
    .with_timeout(Duration::from_secs(config.request_timeout_secs));

    Arc::new(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use laozihao_core::{Message, ProviderError, ProviderRequest};

    #[tokio::test]
    async fn unconfigured_provider_fails_fast() {
        let config = AppConfig::default();
        let provider = build_from_config(&config);
        assert_eq!(provider.name(), "deepseek");

        let err = provider
            .complete(ProviderRequest {
                model: config.model.clone(),
                messages: vec![Message::user("你好")],
                temperature: config.temperature,
                max_tokens: Some(config.max_tokens),
                stream: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
