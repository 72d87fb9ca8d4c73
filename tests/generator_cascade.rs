// tests/generator_cascade.rs
//
// Cascade behavior of the response generator: provider order, skipping,
// timeouts, the non-empty contract, and fingerprint caching.

use async_trait::async_trait;
use kindred::agents::Emotion;
use kindred::error::ProviderError;
use kindred::llm::{
    ChatMessage, GenerationContext, InMemoryResponseCache, Provider, ResponseGenerator,
    RuleBasedResponder,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct FailingProvider {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn available(&self) -> bool {
        true
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn attempt(
        &self,
        _messages: &[ChatMessage],
        _system_prompt: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Unavailable)
    }
}

struct UnavailableProvider {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Provider for UnavailableProvider {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn available(&self) -> bool {
        false
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn attempt(
        &self,
        _messages: &[ChatMessage],
        _system_prompt: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some("should never be produced".into()))
    }
}

struct HangingProvider;

#[async_trait]
impl Provider for HangingProvider {
    fn name(&self) -> &'static str {
        "hanging"
    }

    fn available(&self) -> bool {
        true
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(50)
    }

    async fn attempt(
        &self,
        _messages: &[ChatMessage],
        _system_prompt: &str,
    ) -> Result<Option<String>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Some("too late".into()))
    }
}

struct FixedProvider {
    reply: &'static str,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Provider for FixedProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn available(&self) -> bool {
        true
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }

    async fn attempt(
        &self,
        _messages: &[ChatMessage],
        _system_prompt: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(self.reply.to_string()))
    }
}

fn generator(providers: Vec<Arc<dyn Provider>>) -> ResponseGenerator {
    ResponseGenerator::with_providers(
        providers,
        Arc::new(InMemoryResponseCache::new()),
        Duration::from_secs(60),
    )
}

fn context(user_id: &str) -> GenerationContext {
    GenerationContext {
        user_id: user_id.to_string(),
        emotion: Emotion::Neutral,
        ..Default::default()
    }
}

#[tokio::test]
async fn falls_through_to_rules_when_everything_fails() {
    let failing_calls = Arc::new(AtomicUsize::new(0));
    let generator = generator(vec![
        Arc::new(FailingProvider {
            calls: failing_calls.clone(),
        }),
        Arc::new(HangingProvider),
        Arc::new(RuleBasedResponder::new()),
    ]);

    let reply = generator
        .generate(&[ChatMessage::user("hello there")], &context("u1"))
        .await;

    assert!(!reply.is_empty());
    assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unavailable_providers_are_never_attempted() {
    let unavailable_calls = Arc::new(AtomicUsize::new(0));
    let fixed_calls = Arc::new(AtomicUsize::new(0));
    let generator = generator(vec![
        Arc::new(UnavailableProvider {
            calls: unavailable_calls.clone(),
        }),
        Arc::new(FixedProvider {
            reply: "from the second rung",
            calls: fixed_calls.clone(),
        }),
    ]);

    let reply = generator
        .generate(&[ChatMessage::user("tell me something")], &context("u1"))
        .await;

    assert_eq!(reply, "from the second rung");
    assert_eq!(unavailable_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fixed_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeated_message_is_served_from_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let generator = generator(vec![Arc::new(FixedProvider {
        reply: "cached answer",
        calls: calls.clone(),
    })]);

    let messages = [ChatMessage::user("what's the weather like?")];
    let first = generator.generate(&messages, &context("u1")).await;
    let second = generator.generate(&messages, &context("u1")).await;

    assert_eq!(first, "cached answer");
    assert_eq!(second, "cached answer");
    assert_eq!(calls.load(Ordering::SeqCst), 1, "second call must hit the cache");
}

#[tokio::test]
async fn cache_does_not_leak_across_users() {
    let calls = Arc::new(AtomicUsize::new(0));
    let generator = generator(vec![Arc::new(FixedProvider {
        reply: "per-user answer",
        calls: calls.clone(),
    })]);

    let messages = [ChatMessage::user("same text")];
    generator.generate(&messages, &context("alice")).await;
    generator.generate(&messages, &context("bob")).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_cascade_still_returns_a_reply() {
    let generator = generator(vec![]);
    let reply = generator
        .generate(&[ChatMessage::user("anyone home?")], &context("u1"))
        .await;
    assert!(!reply.is_empty());
}
