use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::step::StepHost;

/// In-process workflow host: keeps the identifiers of the steps it holds and
/// records what those steps report back.
#[derive(Debug, Default)]
pub struct WorkflowHost {
    identifiers: Mutex<Vec<String>>,
    configured: Mutex<BTreeMap<String, bool>>,
    completed: Mutex<Vec<String>>,
}

impl WorkflowHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, identifier: &str) {
        self.identifiers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(identifier.to_owned());
    }

    /// Removes one registration of `identifier`.
    pub fn unregister(&self, identifier: &str) {
        let mut identifiers = self.identifiers.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = identifiers.iter().position(|id| id == identifier) {
            identifiers.remove(index);
        }
    }

    pub fn rename(&self, from: &str, to: &str) {
        if from == to {
            return;
        }
        self.unregister(from);
        self.register(to);
    }

    pub fn is_configured(&self, identifier: &str) -> Option<bool> {
        self.configured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .copied()
    }

    /// Identifiers of executions reported done, oldest first.
    pub fn completed(&self) -> Vec<String> {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StepHost for WorkflowHost {
    fn identifier_occurs_count(&self, identifier: &str) -> usize {
        self.identifiers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|id| *id == identifier)
            .count()
    }

    fn configured_changed(&self, identifier: &str, configured: bool) {
        self.configured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.to_owned(), configured);
    }

    fn execution_done(&self, identifier: &str) {
        info!(identifier, "step finished");
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(identifier.to_owned());
    }
}
