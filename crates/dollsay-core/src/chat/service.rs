//! Chat service orchestrating one companion turn.
//!
//! For guest turns the quota is reserved before the provider is called, so a
//! turn that ends with the fallback reply still consumes quota. Non-guest
//! turns skip the store entirely.

use chrono::Utc;
use dollsay_types::chat::{ChatTurn, TurnRequest};
use dollsay_types::error::{ChatError, RepositoryError};
use dollsay_types::session::Admission;
use tracing::{info, warn};
use uuid::Uuid;

use crate::emotion::EmotionClassifier;
use crate::llm::companion::CompanionReplier;
use crate::repository::session::SessionStore;

/// Runs chat turns: admission, reply, classification, assembly.
///
/// Generic over `SessionStore` to maintain clean architecture
/// (dollsay-core never depends on dollsay-infra).
pub struct ChatService<S: SessionStore> {
    store: S,
    replier: CompanionReplier,
    classifier: EmotionClassifier,
    quota_limit: u32,
}

impl<S: SessionStore> ChatService<S> {
    /// Create a chat service.
    ///
    /// - `store`: guest quota persistence
    /// - `replier`: provider client that never fails
    /// - `classifier`: emotion keyword table
    /// - `quota_limit`: maximum guest turns per session id
    pub fn new(
        store: S,
        replier: CompanionReplier,
        classifier: EmotionClassifier,
        quota_limit: u32,
    ) -> Self {
        Self {
            store,
            replier,
            classifier,
            quota_limit,
        }
    }

    /// Access the session store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn quota_limit(&self) -> u32 {
        self.quota_limit
    }

    /// Process one validated turn.
    ///
    /// # Errors
    ///
    /// - `ChatError::QuotaExceeded` if a guest session is already at its limit.
    ///   No provider call is made and the count is left unchanged.
    /// - `ChatError::StorageUnavailable` if the session store fails.
    pub async fn process_turn(&self, request: &TurnRequest) -> Result<ChatTurn, ChatError> {
        if request.is_guest {
            self.admit_guest(&request.session_id).await?;
        }

        let outcome = self.replier.generate_reply(&request.message).await;
        let fallback = outcome.is_fallback();
        let reply = outcome.into_text();
        let emotion = self.classifier.classify(&reply);

        let remaining_messages = if request.is_guest {
            let session = self
                .store
                .get(&request.session_id)
                .await?
                .ok_or(RepositoryError::NotFound)?;
            Some(session.remaining(self.quota_limit))
        } else {
            None
        };

        info!(
            session_id = %request.session_id,
            guest = request.is_guest,
            emotion = %emotion,
            fallback,
            remaining = ?remaining_messages,
            "Chat turn completed"
        );

        Ok(ChatTurn {
            id: Uuid::now_v7(),
            reply,
            emotion,
            remaining_messages,
            timestamp: Utc::now(),
        })
    }

    /// Reserve one guest turn, or refuse if the session is at its limit.
    async fn admit_guest(&self, session_id: &str) -> Result<(), ChatError> {
        self.store.get_or_create(session_id).await?;

        match self.store.try_admit(session_id, self.quota_limit).await? {
            Admission::Admitted(session) => {
                tracing::debug!(
                    session_id = %session_id,
                    messages_count = session.messages_count,
                    "Guest turn admitted"
                );
                Ok(())
            }
            Admission::Refused(session) => {
                warn!(
                    session_id = %session_id,
                    messages_count = session.messages_count,
                    limit = self.quota_limit,
                    "Guest message limit reached"
                );
                Err(ChatError::QuotaExceeded {
                    limit: self.quota_limit,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::box_provider::BoxLlmProvider;
    use crate::llm::companion::FALLBACK_REPLY;
    use crate::llm::provider::LlmProvider;
    use dollsay_types::chat::Emotion;
    use dollsay_types::llm::{CompletionRequest, CompletionResponse, LlmError};
    use dollsay_types::session::GuestSession;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // --- Mocks ---

    #[derive(Default)]
    struct MockStore {
        records: Mutex<HashMap<String, GuestSession>>,
        fail: bool,
    }

    impl MockStore {
        fn failing() -> Self {
            Self {
                records: Mutex::new(HashMap::new()),
                fail: true,
            }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.fail {
                Err(RepositoryError::Connection)
            } else {
                Ok(())
            }
        }
    }

    impl SessionStore for MockStore {
        async fn get(&self, session_id: &str) -> Result<Option<GuestSession>, RepositoryError> {
            self.check()?;
            Ok(self.records.lock().unwrap().get(session_id).cloned())
        }

        async fn get_or_create(&self, session_id: &str) -> Result<GuestSession, RepositoryError> {
            self.check()?;
            let mut records = self.records.lock().unwrap();
            Ok(records
                .entry(session_id.to_string())
                .or_insert_with(|| GuestSession::new(session_id))
                .clone())
        }

        async fn increment(&self, session_id: &str) -> Result<GuestSession, RepositoryError> {
            self.check()?;
            let mut records = self.records.lock().unwrap();
            let record = records.get_mut(session_id).ok_or(RepositoryError::NotFound)?;
            record.messages_count += 1;
            record.updated_at = Utc::now();
            Ok(record.clone())
        }

        async fn try_admit(&self, session_id: &str, limit: u32) -> Result<Admission, RepositoryError> {
            self.check()?;
            let mut records = self.records.lock().unwrap();
            let record = records.get_mut(session_id).ok_or(RepositoryError::NotFound)?;
            if record.messages_count >= limit {
                return Ok(Admission::Refused(record.clone()));
            }
            record.messages_count += 1;
            record.updated_at = Utc::now();
            Ok(Admission::Admitted(record.clone()))
        }
    }

    struct CountingProvider {
        reply: Option<String>,
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl LlmProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Some(text) => Ok(CompletionResponse {
                    id: None,
                    content: text.clone(),
                    model: None,
                    finish_reason: None,
                }),
                None => Err(LlmError::Provider {
                    message: "service unavailable".to_string(),
                }),
            }
        }
    }

    fn service_with(
        store: MockStore,
        reply: Option<&str>,
        delay: Duration,
        timeout: Duration,
        limit: u32,
    ) -> (ChatService<MockStore>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CountingProvider {
            reply: reply.map(str::to_string),
            calls: calls.clone(),
            delay,
        };
        let replier = CompanionReplier::new(BoxLlmProvider::new(provider), timeout);
        (
            ChatService::new(store, replier, EmotionClassifier::default(), limit),
            calls,
        )
    }

    fn service(reply: Option<&str>, limit: u32) -> (ChatService<MockStore>, Arc<AtomicUsize>) {
        service_with(
            MockStore::default(),
            reply,
            Duration::ZERO,
            Duration::from_secs(5),
            limit,
        )
    }

    fn guest_turn(session_id: &str, message: &str) -> TurnRequest {
        TurnRequest {
            message: message.to_string(),
            session_id: session_id.to_string(),
            is_guest: true,
        }
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_guest_quota_counts_down_then_refuses() {
        let (service, calls) = service(Some("我懂你的感受"), 2);

        let first = service.process_turn(&guest_turn("s1", "hi")).await.unwrap();
        assert_eq!(first.remaining_messages, Some(1));

        let second = service.process_turn(&guest_turn("s1", "hi")).await.unwrap();
        assert_eq!(second.remaining_messages, Some(0));

        let third = service.process_turn(&guest_turn("s1", "hi")).await;
        assert!(matches!(third, Err(ChatError::QuotaExceeded { limit: 2 })));

        // The refused turn made no provider call and did not touch the count.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let record = service.store().get("s1").await.unwrap().unwrap();
        assert_eq!(record.messages_count, 2);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let (service, _) = service(Some("嗯嗯"), 1);
        service.process_turn(&guest_turn("a", "hi")).await.unwrap();
        let other = service.process_turn(&guest_turn("b", "hi")).await.unwrap();
        assert_eq!(other.remaining_messages, Some(0));
        assert!(service.process_turn(&guest_turn("a", "hi")).await.is_err());
    }

    #[tokio::test]
    async fn test_non_guest_turn_skips_store() {
        let (service, calls) = service(Some("太好了!"), 1);
        let request = TurnRequest {
            message: "我升职了".to_string(),
            session_id: "member-1".to_string(),
            is_guest: false,
        };

        for _ in 0..3 {
            let turn = service.process_turn(&request).await.unwrap();
            assert_eq!(turn.remaining_messages, None);
            assert_eq!(turn.emotion, Emotion::Happy);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(service.store().get("member-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reply_and_emotion_flow_through() {
        let (service, _) = service(Some("可能是因为太累了,也许休息一下会好些"), 5);
        let turn = service.process_turn(&guest_turn("s", "好累")).await.unwrap();
        assert_eq!(turn.reply, "可能是因为太累了,也许休息一下会好些");
        assert_eq!(turn.emotion, Emotion::Thinking);
        assert_eq!(turn.remaining_messages, Some(4));
    }

    #[tokio::test]
    async fn test_provider_failure_still_consumes_quota() {
        let (service, _) = service(None, 3);
        let turn = service.process_turn(&guest_turn("s", "hi")).await.unwrap();
        assert_eq!(turn.reply, FALLBACK_REPLY);
        assert_eq!(turn.emotion, Emotion::Sad);
        assert_eq!(turn.remaining_messages, Some(2));
    }

    #[tokio::test]
    async fn test_provider_timeout_yields_fallback() {
        let (service, _) = service_with(
            MockStore::default(),
            Some("too late"),
            Duration::from_secs(10),
            Duration::from_millis(50),
            3,
        );
        let turn = service.process_turn(&guest_turn("s", "hi")).await.unwrap();
        assert_eq!(turn.reply, FALLBACK_REPLY);
        assert_eq!(turn.remaining_messages, Some(2));
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let (service, calls) = service_with(
            MockStore::failing(),
            Some("hi"),
            Duration::ZERO,
            Duration::from_secs(5),
            3,
        );
        let result = service.process_turn(&guest_turn("s", "hi")).await;
        assert!(matches!(result, Err(ChatError::StorageUnavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_turn_ids_are_unique() {
        let (service, _) = service(Some("ok"), 10);
        let a = service.process_turn(&guest_turn("s", "1")).await.unwrap();
        let b = service.process_turn(&guest_turn("s", "2")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_concurrent_turns_never_exceed_quota() {
        let (service, calls) = service_with(
            MockStore::default(),
            Some("嗯"),
            Duration::from_millis(10),
            Duration::from_secs(5),
            3,
        );
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for i in 0..20 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .process_turn(&guest_turn("shared", &format!("msg {i}")))
                    .await
            }));
        }

        let mut admitted = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(ChatError::QuotaExceeded { .. }) => refused += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(admitted, 3);
        assert_eq!(refused, 17);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let record = service.store().get("shared").await.unwrap().unwrap();
        assert_eq!(record.messages_count, 3);
    }
}
