//! Handler capability and the per-operation registry.

use std::sync::Arc;

use async_trait::async_trait;

use super::operation::Operation;

/// Turns document text into the output of one operation.
///
/// `question` is `Some` only for [`Operation::Chat`].
#[async_trait]
pub trait DocumentHandler: Send + Sync {
    async fn handle(&self, text: &str, question: Option<&str>) -> anyhow::Result<String>;
}

/// One handler per [`Operation`].
///
/// Lookups are an exhaustive match, so adding an operation without a handler
/// does not compile.
#[derive(Clone)]
pub struct HandlerRegistry {
    summary: Arc<dyn DocumentHandler>,
    appeal: Arc<dyn DocumentHandler>,
    review: Arc<dyn DocumentHandler>,
    lawsuit: Arc<dyn DocumentHandler>,
    lawsuit_response: Arc<dyn DocumentHandler>,
    contract_analysis: Arc<dyn DocumentHandler>,
    chat: Arc<dyn DocumentHandler>,
}

impl HandlerRegistry {
    /// Build a registry by asking `make` for each operation's handler.
    pub fn from_fn<F>(mut make: F) -> Self
    where
        F: FnMut(Operation) -> Arc<dyn DocumentHandler>,
    {
        Self {
            summary: make(Operation::Summary),
            appeal: make(Operation::Appeal),
            review: make(Operation::Review),
            lawsuit: make(Operation::Lawsuit),
            lawsuit_response: make(Operation::LawsuitResponse),
            contract_analysis: make(Operation::ContractAnalysis),
            chat: make(Operation::Chat),
        }
    }

    /// Use the same handler for every operation.
    pub fn uniform(handler: Arc<dyn DocumentHandler>) -> Self {
        Self::from_fn(|_| handler.clone())
    }

    /// Replace the handler for one operation.
    pub fn with(mut self, operation: Operation, handler: Arc<dyn DocumentHandler>) -> Self {
        *self.slot_mut(operation) = handler;
        self
    }

    pub fn get(&self, operation: Operation) -> &Arc<dyn DocumentHandler> {
        match operation {
            Operation::Summary => &self.summary,
            Operation::Appeal => &self.appeal,
            Operation::Review => &self.review,
            Operation::Lawsuit => &self.lawsuit,
            Operation::LawsuitResponse => &self.lawsuit_response,
            Operation::ContractAnalysis => &self.contract_analysis,
            Operation::Chat => &self.chat,
        }
    }

    fn slot_mut(&mut self, operation: Operation) -> &mut Arc<dyn DocumentHandler> {
        match operation {
            Operation::Summary => &mut self.summary,
            Operation::Appeal => &mut self.appeal,
            Operation::Review => &mut self.review,
            Operation::Lawsuit => &mut self.lawsuit,
            Operation::LawsuitResponse => &mut self.lawsuit_response,
            Operation::ContractAnalysis => &mut self.contract_analysis,
            Operation::Chat => &mut self.chat,
        }
    }
}
