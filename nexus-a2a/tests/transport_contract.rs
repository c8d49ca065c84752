//! Contract tests for WorkflowNexusTransport against a scripted dispatcher.

mod common;

use std::sync::Arc;

use a2a_client::{A2AError, ClientTransport};
use a2a_types::{
    GetTaskPushNotificationConfigParams, Message, MessageRole, MessageSendParams, Part,
    PushNotificationConfig, SendMessageResult, TaskIdParams, TaskPushNotificationConfig,
    TaskQueryParams, TaskState,
};
use common::{routed, ENDPOINT, SERVICE};
use nexus_a2a::test_support::ScriptedDispatcher;
use nexus_a2a::{
    ContextIdPolicy, DispatchError, OperationOutcome, Payload, PayloadMode, TransportConfig,
    WorkflowNexusTransport, TASK_ENDPOINT_KEY, TASK_OPERATION_KEY, TASK_SERVICE_KEY,
};
use serde_json::json;

fn transport_with(
    dispatcher: &ScriptedDispatcher,
    config: TransportConfig,
) -> WorkflowNexusTransport {
    WorkflowNexusTransport::new(config, Arc::new(dispatcher.clone())).unwrap()
}

fn transport(dispatcher: &ScriptedDispatcher) -> WorkflowNexusTransport {
    transport_with(dispatcher, TransportConfig::new(ENDPOINT))
}

fn greet_request() -> MessageSendParams {
    routed(Message::user_data(json!({"name": "World"})), "greet")
}

// ============================================================================
// Immediate and pending outcomes
// ============================================================================

#[tokio::test]
async fn immediate_result_comes_back_as_agent_message() {
    let dispatcher =
        ScriptedDispatcher::immediate(Payload::data(json!({"message": "Hello, World"})));

    let result = transport(&dispatcher)
        .send_message(greet_request())
        .await
        .unwrap();

    let reply = result.as_message().expect("expected a message");
    assert_eq!(reply.role, MessageRole::Agent);
    assert_eq!(reply.parts, vec![Part::data(json!({"message": "Hello, World"}))]);

    let calls = dispatcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].endpoint, ENDPOINT);
    assert_eq!(calls[0].service, SERVICE);
    assert_eq!(calls[0].operation, "greet");
    assert_eq!(calls[0].input, Payload::data(json!({"name": "World"})));
}

#[tokio::test]
async fn pending_result_comes_back_as_working_task() {
    let dispatcher = ScriptedDispatcher::pending("tok-123");

    let result = transport(&dispatcher)
        .send_message(greet_request())
        .await
        .unwrap();

    let task = result.as_task().expect("expected a task");
    assert_eq!(task.id, "tok-123");
    assert_eq!(task.status.state, TaskState::Working);
    assert_eq!(task.context_id, "pending");

    let metadata = task.metadata.as_ref().unwrap();
    assert_eq!(metadata[TASK_ENDPOINT_KEY], json!(ENDPOINT));
    assert_eq!(metadata[TASK_SERVICE_KEY], json!(SERVICE));
    assert_eq!(metadata[TASK_OPERATION_KEY], json!("greet"));
}

#[tokio::test]
async fn message_results_are_returned_unchanged() {
    let answer = Message::agent_text("Bonjour");
    let dispatcher = ScriptedDispatcher::immediate(Payload::message(answer.clone()));

    let result = transport(&dispatcher)
        .send_message(greet_request())
        .await
        .unwrap();

    assert_eq!(result, SendMessageResult::Message(answer));
}

#[tokio::test]
async fn identical_requests_may_get_different_tokens() {
    let dispatcher = ScriptedDispatcher::with_outcomes([
        Ok(OperationOutcome::Pending("tok-1".to_string())),
        Ok(OperationOutcome::Pending("tok-2".to_string())),
    ]);
    let transport = transport(&dispatcher);

    let first = transport.send_message(greet_request()).await.unwrap();
    let second = transport.send_message(greet_request()).await.unwrap();

    assert_eq!(first.as_task().unwrap().id, "tok-1");
    assert_eq!(second.as_task().unwrap().id, "tok-2");
    assert_eq!(dispatcher.call_count(), 2);
}

#[tokio::test]
async fn pending_without_a_token_is_an_invocation_error() {
    let dispatcher = ScriptedDispatcher::pending("");

    let err = transport(&dispatcher)
        .send_message(greet_request())
        .await
        .unwrap_err();

    assert!(matches!(err, A2AError::Invocation { .. }));
    assert_eq!(dispatcher.call_count(), 1);
}

// ============================================================================
// Malformed requests never reach the dispatcher
// ============================================================================

#[tokio::test]
async fn request_without_metadata_is_malformed() {
    let dispatcher = ScriptedDispatcher::pending("unused");

    let err = transport(&dispatcher)
        .send_message(MessageSendParams::new(Message::user_data(
            json!({"name": "World"}),
        )))
        .await
        .unwrap_err();

    assert!(matches!(err, A2AError::MalformedRequest { .. }));
    assert_eq!(dispatcher.call_count(), 0);
}

#[tokio::test]
async fn request_without_operation_is_malformed() {
    let dispatcher = ScriptedDispatcher::pending("unused");
    let message = Message::user_data(json!({})).with_metadata_entry("service", SERVICE);

    let err = transport(&dispatcher)
        .send_message(MessageSendParams::new(message))
        .await
        .unwrap_err();

    assert!(matches!(err, A2AError::MalformedRequest { .. }));
    assert_eq!(dispatcher.call_count(), 0);
}

#[tokio::test]
async fn multi_part_message_is_malformed_in_data_mode() {
    let dispatcher = ScriptedDispatcher::pending("unused");
    let message = Message::new(
        MessageRole::User,
        vec![Part::text("one"), Part::data(json!(2))],
    );

    let err = transport(&dispatcher)
        .send_message(routed(message, "greet"))
        .await
        .unwrap_err();

    assert!(matches!(err, A2AError::MalformedRequest { .. }));
    assert_eq!(dispatcher.call_count(), 0);
}

// ============================================================================
// Dispatcher failures keep their kind
// ============================================================================

#[tokio::test]
async fn routing_and_invocation_failures_are_tagged_once() {
    let dispatcher = ScriptedDispatcher::with_outcomes([
        Err(DispatchError::routing("service 'test-service' not found")),
        Err(DispatchError::invocation(SERVICE, "greet", "missing field `name`")),
    ]);
    let transport = transport(&dispatcher);

    let routing = transport.send_message(greet_request()).await.unwrap_err();
    let invocation = transport.send_message(greet_request()).await.unwrap_err();

    assert!(matches!(routing, A2AError::Routing { .. }));
    assert!(matches!(invocation, A2AError::Invocation { .. }));
    assert_eq!(
        routing.to_string(),
        "Routing error: service 'test-service' not found"
    );
    assert_eq!(
        invocation.to_string(),
        "Invocation error: test-service/greet: missing field `name`"
    );
    assert_eq!(dispatcher.call_count(), 2);
}

// ============================================================================
// Configuration points
// ============================================================================

#[tokio::test]
async fn message_mode_forwards_the_whole_request() {
    let dispatcher = ScriptedDispatcher::pending("tok-9");
    let request = routed(Message::user_text("Hello!"), "translate");
    let config = TransportConfig::new(ENDPOINT).with_payload_mode(PayloadMode::Message);

    transport_with(&dispatcher, config)
        .send_message(request.clone())
        .await
        .unwrap();

    assert_eq!(dispatcher.calls()[0].input, Payload::message(request.message));
}

#[tokio::test]
async fn submitted_initial_state_is_honoured() {
    let dispatcher = ScriptedDispatcher::pending("tok-5");
    let config = TransportConfig::new(ENDPOINT).with_initial_task_state(TaskState::Submitted);

    let result = transport_with(&dispatcher, config)
        .send_message(greet_request())
        .await
        .unwrap();

    assert_eq!(result.as_task().unwrap().status.state, TaskState::Submitted);
}

#[tokio::test]
async fn context_id_follows_the_configured_policy() {
    let request = {
        let mut params = greet_request();
        params.message.context_id = Some("ctx-42".to_string());
        params
    };

    let cases = [
        (ContextIdPolicy::FromRequest, "ctx-42"),
        (
            ContextIdPolicy::Fixed {
                value: "session-1".to_string(),
            },
            "session-1",
        ),
        (ContextIdPolicy::Placeholder, "pending"),
    ];

    for (policy, expected) in cases {
        let dispatcher = ScriptedDispatcher::pending("tok");
        let config = TransportConfig::new(ENDPOINT).with_context_id_policy(policy);

        let result = transport_with(&dispatcher, config)
            .send_message(request.clone())
            .await
            .unwrap();

        assert_eq!(result.as_task().unwrap().context_id, expected);
    }
}

// ============================================================================
// Unsupported surface
// ============================================================================

#[tokio::test]
async fn every_other_method_is_unsupported_and_has_no_side_effect() {
    let dispatcher = ScriptedDispatcher::pending("unused");
    let transport = transport(&dispatcher);
    let task_id = TaskIdParams {
        id: "tok-123".to_string(),
        metadata: None,
    };
    let callback = TaskPushNotificationConfig {
        task_id: "tok-123".to_string(),
        push_notification_config: PushNotificationConfig {
            url: "https://callbacks.example.com".to_string(),
            id: None,
            token: None,
        },
    };

    let failures = vec![
        (
            "send_message_streaming",
            transport.send_message_streaming(greet_request()).await.err(),
        ),
        (
            "get_task",
            transport
                .get_task(TaskQueryParams {
                    id: "tok-123".to_string(),
                    history_length: None,
                    metadata: None,
                })
                .await
                .err(),
        ),
        ("cancel_task", transport.cancel_task(task_id.clone()).await.err()),
        (
            "set_task_callback",
            transport.set_task_callback(callback).await.err(),
        ),
        (
            "get_task_callback",
            transport
                .get_task_callback(GetTaskPushNotificationConfigParams {
                    id: "tok-123".to_string(),
                    push_notification_config_id: None,
                    metadata: None,
                })
                .await
                .err(),
        ),
        ("resubscribe", transport.resubscribe(task_id).await.err()),
        ("get_card", transport.get_card().await.err()),
        ("close", transport.close().await.err()),
    ];

    for (method, error) in failures {
        match error {
            Some(A2AError::UnsupportedOperation { method: reported }) => {
                assert_eq!(reported, method)
            }
            other => panic!("{method}: expected UnsupportedOperation, got {other:?}"),
        }
    }
    assert_eq!(dispatcher.call_count(), 0);
}
