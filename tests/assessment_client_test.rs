//! Integration tests for the assessment client
//!
//! Tests HTTP client behavior using wiremock for request/response mocking.

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use bishforge::assessment::{AgentRequest, AssessmentClient, AssessmentService, Outcome};
use bishforge::config::{AgentConfig, RequestConfig, SecretString};
use bishforge::error::AssessmentError;
use bishforge::session::{SessionInput, TaskType};

const AGENT: &str = "698597247551cb7920ffe8ba";

/// Create a test client pointing to mock server
fn create_test_client(base_url: &str) -> AssessmentClient {
    let config = AgentConfig {
        api_key: Some(SecretString::new("sk-test-key")),
        base_url: base_url.to_string(),
        agent_id: AGENT.to_string(),
    };

    AssessmentClient::new(&config, RequestConfig { timeout_ms: 5000 })
        .expect("Failed to create client")
}

fn minimal_result() -> Value {
    json!({ "problem_understanding": "stub" })
}

fn success_envelope(result: Value) -> Value {
    json!({
        "success": true,
        "response": { "status": "success", "result": result }
    })
}

#[cfg(test)]
mod call_agent_tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/agent"))
            .and(header("Authorization", "Bearer sk-test-key"))
            .and(header("Content-Type", "application/json"))
            .and(body_partial_json(json!({ "agentId": AGENT, "message": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope(minimal_result())))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let result = client.call_agent(&AgentRequest::new("hello", AGENT)).await;

        assert_eq!(result.unwrap(), minimal_result());
    }

    #[tokio::test]
    async fn test_trailing_slash_base_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope(minimal_result())))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&format!("{}/", mock_server.uri()));
        assert!(client.call_agent(&AgentRequest::new("x", AGENT)).await.is_ok());
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/agent"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client
            .call_agent(&AgentRequest::new("x", AGENT))
            .await
            .unwrap_err();

        match err {
            AssessmentError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_envelope_uses_error_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "quota exceeded"
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client
            .call_agent(&AgentRequest::new("x", AGENT))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[tokio::test]
    async fn test_rejected_envelope_without_error_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client
            .call_agent(&AgentRequest::new("x", AGENT))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Analysis failed. Please try again.");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "response": { "status": "error", "message": "agent crashed" }
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client
            .call_agent(&AgentRequest::new("x", AGENT))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Agent returned status 'error': agent crashed");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let err = client
            .call_agent(&AgentRequest::new("x", AGENT))
            .await
            .unwrap_err();

        assert!(matches!(err, AssessmentError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/agent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_envelope(minimal_result()))
                    .set_delay(std::time::Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let config = AgentConfig {
            api_key: Some(SecretString::new("sk-test-key")),
            base_url: mock_server.uri(),
            agent_id: AGENT.to_string(),
        };
        let client = AssessmentClient::new(&config, RequestConfig { timeout_ms: 50 }).unwrap();
        let err = client
            .call_agent(&AgentRequest::new("x", AGENT))
            .await
            .unwrap_err();

        assert!(matches!(err, AssessmentError::Timeout { timeout_ms: 50 }));
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let config = AgentConfig {
            api_key: None,
            base_url: mock_server.uri(),
            agent_id: AGENT.to_string(),
        };
        let client = AssessmentClient::new(&config, RequestConfig::default()).unwrap();
        let err = client
            .call_agent(&AgentRequest::new("x", AGENT))
            .await
            .unwrap_err();

        assert!(matches!(err, AssessmentError::MissingApiKey));
    }
}

#[cfg(test)]
mod service_tests {
    use super::*;

    #[tokio::test]
    async fn test_request_assessment_sends_instruction() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/agent"))
            .and(body_partial_json(json!({ "agentId": AGENT })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_envelope(minimal_result())))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let input = SessionInput::new("Model predicts loan default", TaskType::Classification)
            .with_features("income, debt ratio");
        let outcome = client.request_assessment(&input, AGENT).await;

        assert_eq!(
            outcome,
            Outcome::Success {
                raw_result: minimal_result()
            }
        );

        let requests = mock_server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("Model predicts loan default"));
        assert!(message.contains("income, debt ratio"));
        assert!(message.contains("Classification"));
    }

    #[tokio::test]
    async fn test_request_assessment_failure_reason() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "timeout"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server.uri());
        let input = SessionInput::new("ctx", TaskType::Ranking);
        let outcome = client.request_assessment(&input, AGENT).await;

        assert_eq!(outcome, Outcome::failure("timeout"));
    }
}
