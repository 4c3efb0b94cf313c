//! Mock Provider
//!
//! Scripted [`LlmProvider`] for tests and offline demos. Replies are served in
//! the order they were added; once the script is drained the optional
//! `always` reply is repeated.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, GenerationOptions, LlmProvider};

/// One scripted provider behavior
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Answer with this text
    Text(String),
    /// Fail with a provider error
    Fail(String),
    /// Never answer (until the caller's timeout fires)
    Hang,
}

/// Scripted provider
pub struct MockProvider {
    name: String,
    script: Mutex<VecDeque<MockReply>>,
    always: Option<MockReply>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<String>>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(VecDeque::new()),
            always: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn push(mut self, reply: MockReply) -> Self {
        self.script.get_mut().push_back(reply);
        self
    }

    /// Queue a text reply
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(MockReply::Text(text.into()))
    }

    /// Queue a provider failure
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(MockReply::Fail(message.into()))
    }

    /// Queue a reply that never arrives
    pub fn timeout(self) -> Self {
        self.push(MockReply::Hang)
    }

    /// Behavior once the script is drained
    pub fn always(mut self, reply: MockReply) -> Self {
        self.always = Some(reply);
        self
    }

    /// Number of `complete` calls received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Message contents received on each call
    pub async fn seen_messages(&self) -> Vec<Vec<String>> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .await
            .push(messages.iter().map(|m| m.content.clone()).collect());

        let next = self.script.lock().await.pop_front().or_else(|| self.always.clone());

        match next {
            Some(MockReply::Text(text)) => Ok(Completion::text(text, options.model.clone())),
            Some(MockReply::Fail(message)) => Err(AgentError::Provider(message)),
            Some(MockReply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AgentError::ProviderUnavailable(format!("{} never answered", self.name)))
            }
            None => Err(AgentError::Provider(format!("{} script exhausted", self.name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_order_then_always() {
        let provider = MockProvider::new("mock")
            .reply("one")
            .fail("two")
            .always(MockReply::Text("again".into()));
        let opts = GenerationOptions::default();

        assert_eq!(provider.complete(&[], &opts).await.unwrap().content, "one");
        assert!(provider.complete(&[], &opts).await.is_err());
        assert_eq!(provider.complete(&[], &opts).await.unwrap().content, "again");
        assert_eq!(provider.complete(&[], &opts).await.unwrap().content, "again");
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn test_drained_script_errors() {
        let provider = MockProvider::new("mock");
        let err = provider.complete(&[], &GenerationOptions::default()).await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
    }
}
