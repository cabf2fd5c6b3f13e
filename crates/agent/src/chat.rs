//! Chat service: turns a user message plus session history into one upstream
//! completion call.
//!
//! Message assembly order:
//! 1. the knowledge-base system prompt, only when the history is empty
//! 2. the most recent `history_limit` history turns, oldest first
//! 3. the new user message
//!
//! The service never retries and never touches session state; the caller
//! records the exchange only after a successful answer.

use crate::prompt::build_system_prompt;
use laozihao_config::AppConfig;
use laozihao_core::error::ProviderError;
use laozihao_core::message::Message;
use laozihao_core::provider::{Provider, ProviderRequest};
use laozihao_store::RecordStore;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ChatService {
    provider: Arc<dyn Provider>,
    records: Arc<RecordStore>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    history_limit: usize,
}

impl ChatService {
    /// Create a service with the default request parameters.
    pub fn new(provider: Arc<dyn Provider>, records: Arc<RecordStore>) -> Self {
        Self::from_config(provider, records, &AppConfig::default())
    }

    /// Create a service using the model parameters and history limit from
    /// `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        records: Arc<RecordStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            provider,
            records,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            history_limit: config.sessions.history_limit.max(1),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// The system prompt for the catalog as it is on disk right now.
    pub fn system_prompt(&self) -> String {
        build_system_prompt(&self.records.list_brands())
    }

    /// Build the upstream message list for one call.
    pub fn assemble_messages(&self, user_message: &str, history: &[Message]) -> Vec<Message> {
        let start = history.len().saturating_sub(self.history_limit);
        let history = &history[start..];

        let mut messages = Vec::with_capacity(history.len() + 2);
        if history.is_empty() {
            messages.push(Message::system(self.system_prompt()));
        }
        messages.extend_from_slice(history);
        messages.push(Message::user(user_message));
        messages
    }

    /// Ask the provider for an answer to `user_message` in the context of
    /// `history`. Returns the trimmed answer text.
    pub async fn chat(&self, user_message: &str, history: &[Message]) -> Result<String, ProviderError> {
        let messages = self.assemble_messages(user_message, history);

        info!(
            provider = self.provider.name(),
            history = history.len().min(self.history_limit),
            with_system_prompt = history.is_empty(),
            "Chat request"
        );

        let response = self
            .provider
            .complete(ProviderRequest {
                model: self.model.clone(),
                messages,
                temperature: self.temperature,
                max_tokens: Some(self.max_tokens),
                stream: false,
            })
            .await?;

        if let Some(usage) = response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat response received"
            );
        }

        Ok(response.content.trim().to_string())
    }
}
