//! Query orchestrator: question/answer exchanges against a ready document.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use docchat_core::Turn;
use docchat_client::{normalize, DocumentService};

use crate::error::{ChatError, Result};
use crate::notify::Notifier;
use crate::session::SessionContext;

/// Shown as the assistant text when the service omitted an answer.
pub const NO_ANSWER_PLACEHOLDER: &str = "(no answer returned)";

/// Prefix marking failed asks in the transcript.
pub const FAILURE_MARKER: &str = "\u{274c}";

/// Generic fallback when an ask failure carries no message at all.
const ASK_FALLBACK: &str = "Ask failed";

/// How an `ask` call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOutcome {
    /// Assistant turn appended from a successful answer.
    Answered,
    /// Assistant turn appended recording a normalized failure.
    Failed,
    /// A prior ask is still in flight; the question was dropped without a
    /// trace. The presentation layer disables its trigger while
    /// [`SessionContext::is_asking`] holds, so this is not an error.
    Busy,
    /// The question was empty after trimming; nothing happened.
    Ignored,
}

/// Sequences one question/answer exchange, appending to the transcript.
///
/// The user turn is appended optimistically before the network call; the
/// assistant turn follows when the call resolves, on both the success and
/// failure path, so the transcript keeps a record of failed attempts.
pub struct QueryOrchestrator {
    service: Arc<dyn DocumentService>,
    notifier: Arc<dyn Notifier>,
}

impl QueryOrchestrator {
    pub fn new(service: Arc<dyn DocumentService>, notifier: Arc<dyn Notifier>) -> Self {
        Self { service, notifier }
    }

    /// Ask a question against the session's document.
    ///
    /// Preconditions, in order: no ask in flight (otherwise `Busy`), session
    /// ready (otherwise [`ChatError::DocumentNotReady`] with no further
    /// action), trimmed question non-empty (otherwise `Ignored`).
    pub async fn ask(&self, ctx: &SessionContext, question: &str) -> Result<AskOutcome> {
        // Exclusivity: no second ask until the first resolves. The guard
        // releases the flag on every exit path below, early returns included.
        let Some(_guard) = AskingGuard::acquire(ctx.asking_flag()) else {
            tracing::debug!("Ask dropped: a prior ask is still in flight");
            return Ok(AskOutcome::Busy);
        };

        let doc_id = {
            let document = ctx.document()?;
            match document.identifier() {
                Some(id) => id.to_string(),
                None => return Err(ChatError::DocumentNotReady),
            }
        };

        let question = question.trim();
        if question.is_empty() {
            return Ok(AskOutcome::Ignored);
        }

        // Optimistic append: the user turn lands before the call resolves.
        ctx.transcript_mut()?.append(Turn::user(question));
        tracing::debug!(doc_id = %doc_id, question = %question, "Asking");

        match self.service.ask(&doc_id, question).await {
            Ok(answer) => {
                let text = answer
                    .text
                    .unwrap_or_else(|| NO_ANSWER_PLACEHOLDER.to_string());
                ctx.transcript_mut()?
                    .append(Turn::assistant(text, answer.citations));
                Ok(AskOutcome::Answered)
            }
            Err(failure) => {
                let message = normalize(&failure, ASK_FALLBACK);
                tracing::warn!(error = %failure, "Ask failed");
                // The failure stays visible in the history for diagnosis.
                ctx.transcript_mut()?.append(Turn::assistant(
                    format!("{} {}", FAILURE_MARKER, message),
                    Vec::new(),
                ));
                self.notifier.notify(&message);
                Ok(AskOutcome::Failed)
            }
        }
    }
}

/// Scoped ownership of the ask exclusivity flag.
///
/// Acquisition and the in-flight check are one atomic operation; dropping
/// the guard releases the flag, so release is guaranteed on success,
/// failure, and panic alike.
struct AskingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> AskingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for AskingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use docchat_core::{Citation, Role};
    use docchat_client::{Answer, ServiceError, UploadReceipt};
    use tokio::sync::Notify;

    /// Fake service returning scripted ask results, optionally holding each
    /// call until released.
    struct FakeService {
        results: Mutex<VecDeque<std::result::Result<Answer, ServiceError>>>,
        calls: AtomicUsize,
        last_question: Mutex<Option<(String, String)>>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeService {
        fn with_results(
            results: Vec<std::result::Result<Answer, ServiceError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
                last_question: Mutex::new(None),
                gate: None,
            })
        }

        fn gated(
            results: Vec<std::result::Result<Answer, ServiceError>>,
            gate: Arc<Notify>,
        ) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                calls: AtomicUsize::new(0),
                last_question: Mutex::new(None),
                gate: Some(gate),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_question(&self) -> Option<(String, String)> {
            self.last_question.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentService for FakeService {
        async fn upload(
            &self,
            _file: &Path,
        ) -> std::result::Result<UploadReceipt, ServiceError> {
            unreachable!("ask tests never upload through the service");
        }

        async fn ask(
            &self,
            doc_id: &str,
            question: &str,
        ) -> std::result::Result<Answer, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_question.lock().unwrap() =
                Some((doc_id.to_string(), question.to_string()));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.results.lock().unwrap().pop_front().unwrap()
        }
    }

    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                messages: Mutex::new(Vec::new()),
            })
        }

        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    /// Context whose document is already ready with the given id.
    fn ready_context(doc_id: &str) -> SessionContext {
        let ctx = SessionContext::new();
        {
            let mut document = ctx.document().unwrap();
            document.begin_upload().unwrap();
            document.complete_upload(doc_id.to_string()).unwrap();
        }
        ctx
    }

    fn answer(text: &str, citations: Vec<Citation>) -> Answer {
        Answer {
            text: Some(text.to_string()),
            citations,
        }
    }

    #[tokio::test]
    async fn test_ask_before_ready_is_precondition_error() {
        let service = FakeService::with_results(vec![]);
        let notifier = RecordingNotifier::new();
        let orch = QueryOrchestrator::new(service.clone(), notifier);
        let ctx = SessionContext::new();

        let err = orch.ask(&ctx, "anything").await.unwrap_err();
        assert!(matches!(err, ChatError::DocumentNotReady));
        assert!(ctx.transcript_is_empty());
        assert_eq!(service.calls(), 0);
        assert!(!ctx.is_asking());
    }

    #[tokio::test]
    async fn test_empty_question_is_silent_no_op() {
        let service = FakeService::with_results(vec![]);
        let notifier = RecordingNotifier::new();
        let orch = QueryOrchestrator::new(service.clone(), notifier.clone());
        let ctx = ready_context("d1");

        for question in ["", "   ", "\t\n "] {
            let outcome = orch.ask(&ctx, question).await.unwrap();
            assert_eq!(outcome, AskOutcome::Ignored);
        }
        assert!(ctx.transcript_is_empty());
        assert!(!ctx.is_asking());
        assert_eq!(service.calls(), 0);
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_successful_ask_appends_both_turns() {
        let citations = vec![Citation {
            page: 1,
            snippet: "Chapter one opens with...".to_string(),
        }];
        let service =
            FakeService::with_results(vec![Ok(answer("It begins on page 1.", citations.clone()))]);
        let notifier = RecordingNotifier::new();
        let orch = QueryOrchestrator::new(service.clone(), notifier.clone());
        let ctx = ready_context("d1");

        let outcome = orch.ask(&ctx, "Summarize page 1").await.unwrap();
        assert_eq!(outcome, AskOutcome::Answered);

        let transcript = ctx.transcript();
        assert_eq!(transcript.len(), 2);
        let turns = transcript.turns();
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].text, "Summarize page 1");
        assert!(turns[0].citations.is_empty());
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].text, "It begins on page 1.");
        assert_eq!(turns[1].citations, citations);

        assert_eq!(
            service.last_question(),
            Some(("d1".to_string(), "Summarize page 1".to_string()))
        );
        assert!(!ctx.is_asking());
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_question_is_trimmed_before_use() {
        let service = FakeService::with_results(vec![Ok(answer("yes", vec![]))]);
        let notifier = RecordingNotifier::new();
        let orch = QueryOrchestrator::new(service.clone(), notifier);
        let ctx = ready_context("d1");

        orch.ask(&ctx, "  does it?  \n").await.unwrap();
        assert_eq!(ctx.transcript().turns()[0].text, "does it?");
        assert_eq!(
            service.last_question().unwrap().1,
            "does it?".to_string()
        );
    }

    #[tokio::test]
    async fn test_missing_answer_uses_placeholder() {
        let service = FakeService::with_results(vec![Ok(Answer {
            text: None,
            citations: vec![],
        })]);
        let notifier = RecordingNotifier::new();
        let orch = QueryOrchestrator::new(service, notifier);
        let ctx = ready_context("d1");

        orch.ask(&ctx, "hello?").await.unwrap();
        let transcript = ctx.transcript();
        assert_eq!(transcript.last().unwrap().text, NO_ANSWER_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_failed_ask_appends_marked_turn_and_notifies() {
        let service = FakeService::with_results(vec![Err(ServiceError::Server {
            status: 429,
            error: Some("rate limited".to_string()),
            detail: None,
        })]);
        let notifier = RecordingNotifier::new();
        let orch = QueryOrchestrator::new(service, notifier.clone());
        let ctx = ready_context("d1");

        let outcome = orch.ask(&ctx, "again?").await.unwrap();
        assert_eq!(outcome, AskOutcome::Failed);

        let transcript = ctx.transcript();
        assert_eq!(transcript.len(), 2);
        let last = transcript.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.text.starts_with(FAILURE_MARKER));
        assert!(last.text.contains("rate limited"));
        assert!(last.citations.is_empty());

        assert_eq!(notifier.messages(), vec!["rate limited".to_string()]);
        assert!(!ctx.is_asking());
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_user_turn_visible() {
        let service = FakeService::with_results(vec![Err(ServiceError::Transport(
            "connection refused".to_string(),
        ))]);
        let notifier = RecordingNotifier::new();
        let orch = QueryOrchestrator::new(service, notifier);
        let ctx = ready_context("d1");

        orch.ask(&ctx, "still there?").await.unwrap();
        let transcript = ctx.transcript();
        // The optimistic user turn survives the failure.
        assert_eq!(transcript.turns()[0].text, "still there?");
        assert!(transcript.last().unwrap().text.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_sequential_asks_accumulate_in_order() {
        let service = FakeService::with_results(vec![
            Ok(answer("first answer", vec![])),
            Ok(answer("second answer", vec![])),
        ]);
        let notifier = RecordingNotifier::new();
        let orch = QueryOrchestrator::new(service, notifier);
        let ctx = ready_context("d1");

        orch.ask(&ctx, "first").await.unwrap();
        orch.ask(&ctx, "second").await.unwrap();

        let transcript = ctx.transcript();
        assert_eq!(transcript.len(), 4);
        let texts: Vec<&str> = transcript.turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "first answer", "second", "second answer"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_second_ask_while_first_in_flight_is_busy() {
        let gate = Arc::new(Notify::new());
        let service = FakeService::gated(vec![Ok(answer("done", vec![]))], gate.clone());
        let notifier = RecordingNotifier::new();
        let orch = Arc::new(QueryOrchestrator::new(service.clone(), notifier));
        let ctx = Arc::new(ready_context("d1"));

        let first = {
            let orch = Arc::clone(&orch);
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { orch.ask(&ctx, "q1").await })
        };

        // Wait until the first ask has appended its user turn and issued
        // the call.
        while service.calls() == 0 {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        assert!(ctx.is_asking());

        let outcome = orch.ask(&ctx, "q2").await.unwrap();
        assert_eq!(outcome, AskOutcome::Busy);
        // No second user turn, no second call.
        assert_eq!(ctx.transcript().len(), 1);
        assert_eq!(service.calls(), 1);

        gate.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), AskOutcome::Answered);
        assert!(!ctx.is_asking());
        assert_eq!(ctx.transcript().len(), 2);

        // The flag is released, so a new ask would pass the exclusivity
        // check again.
        assert_eq!(ctx.transcript().turns()[0].text, "q1");
    }

    #[test]
    fn test_asking_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let guard = AskingGuard::acquire(&flag).unwrap();
            assert!(flag.load(Ordering::Acquire));
            // A second acquisition fails while the guard lives.
            assert!(AskingGuard::acquire(&flag).is_none());
            drop(guard);
        }
        assert!(!flag.load(Ordering::Acquire));
        assert!(AskingGuard::acquire(&flag).is_some());
    }
}
