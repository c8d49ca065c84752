//! In-process substrate that runs Nexus operations on the tokio runtime.
//!
//! Services are registered per endpoint. Each operation is either
//! *sync*, finishing inside the start call, or *workflow-run*, which starts a
//! background task and hands back a token straight away. Results of
//! workflow-run operations can be awaited by token any number of times until
//! the run record is evicted, which happens once the retention period after
//! completion has passed.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use a2a_types::TaskState;
use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::watch;

use crate::dispatcher::{HandleDispatcher, OperationHandle, OperationStarter, Payload};
use crate::errors::{DispatchError, DispatchResult};

/// Outcome of an operation handler. The error is the reason the input or
/// the work was rejected.
pub type HandlerResult = Result<Payload, String>;

type SyncHandler = Arc<dyn Fn(Payload) -> BoxFuture<'static, HandlerResult> + Send + Sync>;
type WorkflowStarter =
    Arc<dyn Fn(Payload) -> Result<BoxFuture<'static, HandlerResult>, String> + Send + Sync>;

#[derive(Clone)]
enum OperationKind {
    Sync(SyncHandler),
    WorkflowRun(WorkflowStarter),
}

/// A named service and its operations.
#[derive(Clone)]
pub struct ServiceDefinition {
    name: String,
    operations: HashMap<String, OperationKind>,
}

impl ServiceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an operation whose result is produced during the start call.
    pub fn sync_operation<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler: SyncHandler = Arc::new(move |input| -> BoxFuture<'static, HandlerResult> {
            Box::pin(handler(input))
        });
        self.operations
            .insert(name.into(), OperationKind::Sync(handler));
        self
    }

    /// Add an operation that runs in the background under a token.
    ///
    /// `start` checks the input and returns the work to run; an `Err` rejects
    /// the start and no token is issued.
    pub fn workflow_run_operation<F, Fut>(mut self, name: impl Into<String>, start: F) -> Self
    where
        F: Fn(Payload) -> Result<Fut, String> + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let starter: WorkflowStarter = Arc::new(
            move |input| -> Result<BoxFuture<'static, HandlerResult>, String> {
                let work = start(input)?;
                Ok(Box::pin(work))
            },
        );
        self.operations
            .insert(name.into(), OperationKind::WorkflowRun(starter));
        self
    }
}

impl std::fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("name", &self.name)
            .field("operations", &self.operations.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone)]
enum RunState {
    Running,
    Completed(Payload),
    Failed(String),
}

struct RunRecord {
    service: String,
    operation: String,
    state: watch::Receiver<RunState>,
}

/// How long a finished run stays queryable by token.
pub const DEFAULT_RUN_RETENTION: Duration = Duration::from_secs(300);

/// Runs registered services in-process.
///
/// Finished runs are dropped after the retention period. After that `wait`,
/// `state` and `describe` no longer know the token; an [`OperationHandle`]
/// obtained at start still resolves.
pub struct InMemorySubstrate {
    endpoints: DashMap<String, HashMap<String, ServiceDefinition>>,
    runs: Arc<DashMap<String, RunRecord>>,
    retention: Duration,
}

impl Default for InMemorySubstrate {
    fn default() -> Self {
        Self {
            endpoints: DashMap::new(),
            runs: Arc::new(DashMap::new()),
            retention: DEFAULT_RUN_RETENTION,
        }
    }
}

impl InMemorySubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep finished runs for `retention` before evicting them.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Register `service` on `endpoint`, replacing a service of the same name.
    pub fn register(&self, endpoint: impl Into<String>, service: ServiceDefinition) {
        let endpoint = endpoint.into();
        tracing::debug!(
            %endpoint,
            service = %service.name,
            operations = service.operations.len(),
            "registering nexus service"
        );
        self.endpoints
            .entry(endpoint)
            .or_default()
            .insert(service.name.clone(), service);
    }

    pub fn with_service(self, endpoint: impl Into<String>, service: ServiceDefinition) -> Self {
        self.register(endpoint, service);
        self
    }

    /// Dispatcher over this substrate.
    pub fn dispatcher(self: &Arc<Self>) -> HandleDispatcher<Arc<Self>> {
        HandleDispatcher::new(Arc::clone(self))
    }

    /// Wait for the final result of the operation running under `token`.
    pub async fn wait(&self, token: &str) -> DispatchResult<Payload> {
        let receiver = self
            .runs
            .get(token)
            .map(|record| record.state.clone())
            .ok_or_else(|| DispatchError::routing(format!("unknown operation token: {token}")))?;
        wait_for_result(receiver, token.to_string()).await
    }

    /// Lifecycle state of the operation running under `token`.
    pub fn state(&self, token: &str) -> DispatchResult<TaskState> {
        let record = self
            .runs
            .get(token)
            .ok_or_else(|| DispatchError::routing(format!("unknown operation token: {token}")))?;

        let state = match &*record.state.borrow() {
            RunState::Completed(_) => TaskState::Completed,
            RunState::Failed(_) => TaskState::Failed,
            RunState::Running if record.state.has_changed().is_err() => TaskState::Failed,
            RunState::Running => TaskState::Working,
        };
        Ok(state)
    }

    /// Service and operation a token was issued for.
    pub fn describe(&self, token: &str) -> Option<(String, String)> {
        self.runs
            .get(token)
            .map(|record| (record.service.clone(), record.operation.clone()))
    }

    /// Drop the record for `token` now. Returns whether it was known.
    pub fn forget(&self, token: &str) -> bool {
        self.runs.remove(token).is_some()
    }

    /// Number of runs still held, running or within retention.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    fn resolve(
        &self,
        endpoint: &str,
        service: &str,
        operation: &str,
    ) -> DispatchResult<OperationKind> {
        let services = self
            .endpoints
            .get(endpoint)
            .ok_or_else(|| DispatchError::routing(format!("unknown endpoint: {endpoint}")))?;
        let definition = services.get(service).ok_or_else(|| {
            DispatchError::routing(format!("service '{service}' not found on {endpoint}"))
        })?;
        definition.operations.get(operation).cloned().ok_or_else(|| {
            DispatchError::routing(format!("operation '{operation}' not found on {service}"))
        })
    }

    fn spawn_run(
        &self,
        service: &str,
        operation: &str,
        work: BoxFuture<'static, HandlerResult>,
    ) -> OperationHandle {
        let token = uuid::Uuid::new_v4().to_string();
        let (sender, receiver) = watch::channel(RunState::Running);

        self.runs.insert(
            token.clone(),
            RunRecord {
                service: service.to_string(),
                operation: operation.to_string(),
                state: receiver.clone(),
            },
        );

        let run_token = token.clone();
        let runs = Arc::clone(&self.runs);
        let retention = self.retention;
        tokio::spawn(async move {
            let state = match work.await {
                Ok(payload) => {
                    tracing::debug!(token = %run_token, "operation completed");
                    RunState::Completed(payload)
                }
                Err(reason) => {
                    tracing::warn!(token = %run_token, %reason, "operation failed");
                    RunState::Failed(reason)
                }
            };
            sender.send_replace(state);
            drop(sender);

            tokio::time::sleep(retention).await;
            if runs.remove(&run_token).is_some() {
                tracing::trace!(token = %run_token, "run record evicted");
            }
        });

        OperationHandle::running(
            token.clone(),
            Box::pin(wait_for_result(receiver, token)),
        )
    }
}

impl std::fmt::Debug for InMemorySubstrate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySubstrate")
            .field("endpoints", &self.endpoints.len())
            .field("runs", &self.runs.len())
            .finish()
    }
}

async fn wait_for_result(
    mut receiver: watch::Receiver<RunState>,
    token: String,
) -> DispatchResult<Payload> {
    let state = receiver
        .wait_for(|state| !matches!(state, RunState::Running))
        .await
        .map(|state| (*state).clone())
        .map_err(|_| DispatchError::OperationFailed {
            token: token.clone(),
            reason: "operation stopped before reporting a result".to_string(),
        })?;

    match state {
        RunState::Completed(payload) => Ok(payload),
        RunState::Failed(reason) => Err(DispatchError::OperationFailed { token, reason }),
        RunState::Running => Err(DispatchError::OperationFailed {
            token,
            reason: "operation is still running".to_string(),
        }),
    }
}

#[async_trait::async_trait]
impl OperationStarter for InMemorySubstrate {
    async fn start_operation(
        &self,
        endpoint: &str,
        service: &str,
        operation: &str,
        input: Payload,
    ) -> DispatchResult<OperationHandle> {
        match self.resolve(endpoint, service, operation)? {
            OperationKind::Sync(handler) => {
                let result = handler(input)
                    .await
                    .map_err(|reason| DispatchError::invocation(service, operation, reason))?;
                Ok(OperationHandle::completed(Ok(result)))
            }
            OperationKind::WorkflowRun(start) => {
                let work = start(input)
                    .map_err(|reason| DispatchError::invocation(service, operation, reason))?;
                let handle = self.spawn_run(service, operation, work);
                tracing::debug!(
                    endpoint,
                    service,
                    operation,
                    token = handle.token().unwrap_or_default(),
                    "workflow run started"
                );
                Ok(handle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_service() -> ServiceDefinition {
        ServiceDefinition::new("echo")
            .sync_operation("now", |input| async move { Ok::<_, String>(input) })
            .workflow_run_operation("later", |input| {
                Ok(async move { Ok::<_, String>(input) })
            })
            .workflow_run_operation("broken", |_| {
                Ok(async { Err::<Payload, _>("boom".to_string()) })
            })
            .workflow_run_operation("picky", |input: Payload| {
                if input.as_data().is_some() {
                    Ok(async move { Ok::<_, String>(input) })
                } else {
                    Err("expected data".to_string())
                }
            })
    }

    fn substrate() -> InMemorySubstrate {
        InMemorySubstrate::new().with_service("ep", echo_service())
    }

    #[tokio::test]
    async fn sync_operations_complete_without_token() {
        let handle = substrate()
            .start_operation("ep", "echo", "now", Payload::data(json!(1)))
            .await
            .unwrap();

        assert_eq!(handle.token(), None);
        assert_eq!(handle.wait().await.unwrap(), Payload::data(json!(1)));
    }

    #[tokio::test]
    async fn workflow_runs_return_a_token_that_can_be_awaited() {
        let substrate = substrate();
        let handle = substrate
            .start_operation("ep", "echo", "later", Payload::data(json!("x")))
            .await
            .unwrap();
        let token = handle.token().unwrap().to_string();

        assert_eq!(substrate.wait(&token).await.unwrap(), Payload::data(json!("x")));
        assert_eq!(substrate.state(&token).unwrap(), TaskState::Completed);
        assert_eq!(
            substrate.describe(&token),
            Some(("echo".to_string(), "later".to_string()))
        );
        // the handle's own future sees the same result
        assert_eq!(handle.wait().await.unwrap(), Payload::data(json!("x")));
    }

    #[tokio::test]
    async fn failed_runs_report_failure() {
        let substrate = substrate();
        let handle = substrate
            .start_operation("ep", "echo", "broken", Payload::data(json!(null)))
            .await
            .unwrap();
        let token = handle.token().unwrap().to_string();

        let err = substrate.wait(&token).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::OperationFailed { ref reason, .. } if reason == "boom"
        ));
        assert_eq!(substrate.state(&token).unwrap(), TaskState::Failed);
    }

    #[tokio::test]
    async fn rejected_input_is_an_invocation_error_and_issues_no_token() {
        let substrate = substrate();
        let err = substrate
            .start_operation(
                "ep",
                "echo",
                "picky",
                Payload::message(a2a_types::Message::user_text("hi")),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Invocation { .. }));
        assert_eq!(substrate.run_count(), 0);
    }

    #[tokio::test]
    async fn unknown_targets_are_routing_errors() {
        let substrate = substrate();
        for (endpoint, service, operation) in [
            ("nowhere", "echo", "now"),
            ("ep", "missing", "now"),
            ("ep", "echo", "missing"),
        ] {
            let err = substrate
                .start_operation(endpoint, service, operation, Payload::data(json!(null)))
                .await
                .unwrap_err();
            assert!(
                matches!(err, DispatchError::Routing { .. }),
                "{endpoint}/{service}/{operation}"
            );
        }

        assert!(matches!(
            substrate.state("no-such-token"),
            Err(DispatchError::Routing { .. })
        ));
        assert!(matches!(
            substrate.wait("no-such-token").await,
            Err(DispatchError::Routing { .. })
        ));
    }

    #[tokio::test]
    async fn every_start_gets_its_own_token() {
        let substrate = substrate();
        let first = substrate
            .start_operation("ep", "echo", "later", Payload::data(json!(1)))
            .await
            .unwrap();
        let second = substrate
            .start_operation("ep", "echo", "later", Payload::data(json!(1)))
            .await
            .unwrap();

        assert_ne!(first.token(), second.token());
    }

    #[tokio::test]
    async fn finished_runs_are_evicted_after_retention() {
        let substrate = substrate().with_retention(Duration::from_millis(10));
        let handles = futures::future::try_join_all((0..3).map(|i| {
            substrate.start_operation("ep", "echo", "later", Payload::data(json!(i)))
        }))
        .await
        .unwrap();
        let token = handles[0].token().unwrap().to_string();
        assert_eq!(substrate.run_count(), 3);

        tokio::time::timeout(Duration::from_secs(5), async {
            while substrate.run_count() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("finished runs should be evicted");

        assert!(matches!(
            substrate.wait(&token).await,
            Err(DispatchError::Routing { .. })
        ));
        assert_eq!(substrate.describe(&token), None);
        // handles keep their own view of the result
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.wait().await.unwrap(), Payload::data(json!(i)));
        }
    }

    #[tokio::test]
    async fn forget_drops_a_record_immediately() {
        let substrate = substrate();
        let handle = substrate
            .start_operation("ep", "echo", "later", Payload::data(json!("x")))
            .await
            .unwrap();
        let token = handle.token().unwrap().to_string();
        substrate.wait(&token).await.unwrap();

        assert!(substrate.forget(&token));
        assert!(!substrate.forget(&token));
        assert_eq!(substrate.run_count(), 0);
        assert!(matches!(
            substrate.state(&token),
            Err(DispatchError::Routing { .. })
        ));
    }
}
