//! Test doubles for code built on the Nexus transport.
//!
//! Available when running tests or with the `test-support` feature enabled.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::dispatcher::{OperationDispatcher, OperationOutcome, Payload};
use crate::errors::{DispatchError, DispatchResult};

/// One recorded call to [`ScriptedDispatcher::start`].
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchCall {
    pub endpoint: String,
    pub service: String,
    pub operation: String,
    pub input: Payload,
}

/// A dispatcher that replays queued outcomes and records what it was asked.
///
/// When the queue runs dry the dispatcher answers with a routing error so a
/// missing expectation shows up in the test.
#[derive(Clone, Default)]
pub struct ScriptedDispatcher {
    outcomes: Arc<Mutex<VecDeque<DispatchResult<OperationOutcome>>>>,
    calls: Arc<Mutex<Vec<DispatchCall>>>,
}

impl ScriptedDispatcher {
    #[must_use]
    pub fn with_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = DispatchResult<OperationOutcome>>,
    {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Dispatcher whose next start finishes with `result`.
    #[must_use]
    pub fn immediate(result: Payload) -> Self {
        Self::with_outcomes([Ok(OperationOutcome::Immediate(result))])
    }

    /// Dispatcher whose next start is still running under `token`.
    #[must_use]
    pub fn pending(token: impl Into<String>) -> Self {
        Self::with_outcomes([Ok(OperationOutcome::Pending(token.into()))])
    }

    pub fn push_outcome(&self, outcome: DispatchResult<OperationOutcome>) {
        self.outcomes
            .lock()
            .expect("scripted dispatcher outcomes mutex poisoned")
            .push_back(outcome);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<DispatchCall> {
        self.calls
            .lock()
            .expect("scripted dispatcher calls mutex poisoned")
            .clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .expect("scripted dispatcher calls mutex poisoned")
            .len()
    }
}

#[async_trait::async_trait]
impl OperationDispatcher for ScriptedDispatcher {
    async fn start(
        &self,
        endpoint: &str,
        service: &str,
        operation: &str,
        input: Payload,
    ) -> DispatchResult<OperationOutcome> {
        self.calls
            .lock()
            .expect("scripted dispatcher calls mutex poisoned")
            .push(DispatchCall {
                endpoint: endpoint.to_string(),
                service: service.to_string(),
                operation: operation.to_string(),
                input,
            });

        self.outcomes
            .lock()
            .expect("scripted dispatcher outcomes mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(DispatchError::routing(format!(
                    "no scripted outcome left for {service}/{operation}"
                )))
            })
    }
}
