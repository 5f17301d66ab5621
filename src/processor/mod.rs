//! Request dispatch over the document operations.
//!
//! [`DocumentProcessor::process`] validates the document text and operation
//! name, calls the registered handler and always answers with a
//! [`ProcessResponse`]. Handler errors and panics are turned into error
//! responses; nothing escapes as a failure.

mod handler;
mod operation;
mod response;

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, error};

pub use handler::{DocumentHandler, HandlerRegistry};
pub use operation::{Operation, UnknownOperation};
pub use response::ProcessResponse;

/// Why a request produced an error response.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Document cannot be empty")]
    EmptyDocument,

    #[error("Invalid request type. Must be one of: {}", Operation::valid_names())]
    InvalidOperation { requested: String },

    #[error("Error processing {operation} request: {message}")]
    Handler { operation: Operation, message: String },

    #[error("{0}")]
    Internal(String),
}

/// Dispatches document text to operation handlers.
///
/// Holds no per-request state; one instance can serve concurrent requests.
#[derive(Clone)]
pub struct DocumentProcessor {
    handlers: HandlerRegistry,
}

impl DocumentProcessor {
    pub fn new(handlers: HandlerRegistry) -> Self {
        Self { handlers }
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Run `operation` (an identifier such as `"summary"`) on `text`.
    ///
    /// `question` is only forwarded for chat, where it defaults to `""`.
    pub async fn process(
        &self,
        text: &str,
        operation: &str,
        question: Option<&str>,
    ) -> ProcessResponse {
        let dispatch = async {
            let operation = self.validate(text, operation)?;
            self.invoke(text, operation, question).await
        };
        Self::respond(dispatch).await
    }

    /// Like [`process`](Self::process) for callers that already hold an [`Operation`].
    pub async fn process_operation(
        &self,
        text: &str,
        operation: Operation,
        question: Option<&str>,
    ) -> ProcessResponse {
        let dispatch = async {
            if text.trim().is_empty() {
                return Err(DispatchError::EmptyDocument);
            }
            self.invoke(text, operation, question).await
        };
        Self::respond(dispatch).await
    }

    fn validate(&self, text: &str, operation: &str) -> Result<Operation, DispatchError> {
        if text.trim().is_empty() {
            return Err(DispatchError::EmptyDocument);
        }

        operation
            .parse::<Operation>()
            .map_err(|_| DispatchError::InvalidOperation {
                requested: operation.to_string(),
            })
    }

    async fn invoke(
        &self,
        text: &str,
        operation: Operation,
        question: Option<&str>,
    ) -> Result<String, DispatchError> {
        let handler = self.handlers.get(operation);
        let question = if operation.takes_question() {
            Some(question.unwrap_or(""))
        } else {
            None
        };

        debug!("Dispatching {} request ({} chars)", operation, text.len());

        match AssertUnwindSafe(handler.handle(text, question))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(DispatchError::Handler {
                operation,
                message: format!("{:#}", e),
            }),
            Err(panic) => Err(DispatchError::Handler {
                operation,
                message: panic_message(panic.as_ref()),
            }),
        }
    }

    /// Outer boundary: every outcome becomes a response.
    async fn respond<F>(dispatch: F) -> ProcessResponse
    where
        F: std::future::Future<Output = Result<String, DispatchError>>,
    {
        let outcome = AssertUnwindSafe(dispatch)
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(DispatchError::Internal(panic_message(panic.as_ref()))));

        match outcome {
            Ok(result) => ProcessResponse::Result(result),
            Err(e) => {
                match &e {
                    DispatchError::InvalidOperation { requested } => error!(
                        "Invalid request type: {}. Valid types: {}",
                        requested,
                        Operation::valid_names()
                    ),
                    other => error!("Processing error: {}", other),
                }
                ProcessResponse::Error(e.to_string())
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Records every call and answers with a fixed reply.
    #[derive(Default)]
    struct Spy {
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl Spy {
        fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentHandler for Spy {
        async fn handle(&self, text: &str, question: Option<&str>) -> anyhow::Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), question.map(str::to_string)));
            Ok(format!("handled {} chars", text.len()))
        }
    }

    struct Failing;

    #[async_trait]
    impl DocumentHandler for Failing {
        async fn handle(&self, _text: &str, _question: Option<&str>) -> anyhow::Result<String> {
            anyhow::bail!("boom")
        }
    }

    struct Panicking;

    #[async_trait]
    impl DocumentHandler for Panicking {
        async fn handle(&self, _text: &str, _question: Option<&str>) -> anyhow::Result<String> {
            panic!("model exploded")
        }
    }

    fn processor_with(spy: Arc<Spy>) -> DocumentProcessor {
        DocumentProcessor::new(HandlerRegistry::uniform(spy))
    }

    #[tokio::test]
    async fn test_empty_document_rejected_without_handler_call() {
        let spy = Arc::new(Spy::default());
        let processor = processor_with(spy.clone());

        for text in ["", "   \n\t"] {
            let response = processor.process(text, "summary", None).await;
            assert_eq!(
                response,
                ProcessResponse::Error("Document cannot be empty".to_string())
            );
        }
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_document_checked_before_operation() {
        let spy = Arc::new(Spy::default());
        let response = processor_with(spy).process("", "nonsense", None).await;
        assert_eq!(response.error(), Some("Document cannot be empty"));
    }

    #[tokio::test]
    async fn test_invalid_operation_lists_all_operations() {
        let spy = Arc::new(Spy::default());
        let processor = processor_with(spy.clone());

        for requested in ["translate", "SUMMARY", "", "chat "] {
            let response = processor.process("Ugovor", requested, None).await;
            assert_eq!(
                response,
                ProcessResponse::Error(
                    "Invalid request type. Must be one of: summary, appeal, review, lawsuit, \
                     lawsuit_response, contract_analysis, chat"
                        .to_string()
                )
            );
        }
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_chat_receives_question() {
        let spy = Arc::new(Spy::default());
        let processor = processor_with(spy.clone());

        let response = processor
            .process("Rok zakupa je pet godina.", "chat", Some("What is the term?"))
            .await;

        assert!(!response.is_error());
        assert_eq!(
            spy.calls(),
            vec![(
                "Rok zakupa je pet godina.".to_string(),
                Some("What is the term?".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn test_chat_question_defaults_to_empty() {
        let spy = Arc::new(Spy::default());
        processor_with(spy.clone())
            .process("Tekst", "chat", None)
            .await;
        assert_eq!(spy.calls(), vec![("Tekst".to_string(), Some(String::new()))]);
    }

    #[tokio::test]
    async fn test_non_chat_operations_never_get_question() {
        let spy = Arc::new(Spy::default());
        let processor = processor_with(spy.clone());

        for op in Operation::ALL.into_iter().filter(|op| !op.takes_question()) {
            let response = processor
                .process("Tekst", op.as_str(), Some("ignored?"))
                .await;
            assert!(!response.is_error(), "{} failed", op);
        }

        let calls = spy.calls();
        assert_eq!(calls.len(), 6);
        assert!(calls.iter().all(|(_, question)| question.is_none()));
    }

    #[tokio::test]
    async fn test_only_requested_handler_runs() {
        let summary = Arc::new(Spy::default());
        let appeal = Arc::new(Spy::default());
        let processor = DocumentProcessor::new(
            HandlerRegistry::uniform(Arc::new(Failing))
                .with(Operation::Summary, summary.clone())
                .with(Operation::Appeal, appeal.clone()),
        );

        let response = processor.process("Presuda", "summary", None).await;
        assert_eq!(response.result(), Some("handled 7 chars"));
        assert_eq!(summary.calls().len(), 1);
        assert!(appeal.calls().is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_is_wrapped() {
        let processor = DocumentProcessor::new(HandlerRegistry::uniform(Arc::new(Failing)));

        let response = processor.process("Tekst", "review", None).await;
        assert_eq!(
            response,
            ProcessResponse::Error("Error processing review request: boom".to_string())
        );

        let response = processor
            .process("Tekst", "lawsuit_response", None)
            .await;
        assert_eq!(
            response.error(),
            Some("Error processing lawsuit_response request: boom")
        );
    }

    #[tokio::test]
    async fn test_handler_error_context_is_kept() {
        struct WithContext;

        #[async_trait]
        impl DocumentHandler for WithContext {
            async fn handle(&self, _: &str, _: Option<&str>) -> anyhow::Result<String> {
                Err(anyhow::anyhow!("connection refused").context("LLM request"))
            }
        }

        let processor = DocumentProcessor::new(HandlerRegistry::uniform(Arc::new(WithContext)));
        let response = processor.process("Tekst", "appeal", None).await;
        assert_eq!(
            response.error(),
            Some("Error processing appeal request: LLM request: connection refused")
        );
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let processor = DocumentProcessor::new(HandlerRegistry::uniform(Arc::new(Panicking)));
        let response = processor.process("Tekst", "lawsuit", None).await;
        assert_eq!(
            response.error(),
            Some("Error processing lawsuit request: model exploded")
        );
    }

    #[tokio::test]
    async fn test_process_operation_skips_name_validation() {
        let spy = Arc::new(Spy::default());
        let processor = processor_with(spy.clone());

        let response = processor
            .process_operation("Ugovor", Operation::ContractAnalysis, Some("x"))
            .await;
        assert!(!response.is_error());
        assert_eq!(spy.calls(), vec![("Ugovor".to_string(), None)]);

        let response = processor
            .process_operation(" ", Operation::Chat, Some("x"))
            .await;
        assert_eq!(response.error(), Some("Document cannot be empty"));
    }

    async fn broken_dispatch() -> Result<String, DispatchError> {
        panic!("dispatch bug")
    }

    #[tokio::test]
    async fn test_outer_boundary_converts_panics() {
        let response = DocumentProcessor::respond(broken_dispatch()).await;
        assert_eq!(response, ProcessResponse::Error("dispatch bug".to_string()));
    }

    #[test]
    fn test_panic_message_fallback() {
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "handler panicked");
    }
}
