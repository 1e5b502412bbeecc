//! End-to-end session tests
//!
//! Runs the orchestrator against a real HTTP client talking to a wiremock
//! agent, with an in-memory history backend.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use bishforge::assessment::AssessmentClient;
use bishforge::config::{AgentConfig, RequestConfig, SecretString};
use bishforge::error::SessionError;
use bishforge::report::{validate, RiskClass};
use bishforge::session::{SessionInput, SessionOrchestrator, SessionState, TaskType};
use bishforge::storage::{HistoryFilter, HistoryStore, MemoryStorage};

const AGENT: &str = "698597247551cb7920ffe8ba";

fn loan_report(overall_risk: &str) -> Value {
    json!({
        "problem_understanding": "Binary prediction of loan default within a year.",
        "causality_assessment": {
            "summary": "Credit score drives most of the signal.",
            "risk_level": "medium",
            "critical_issues": ["Score may encode past bias"]
        },
        "common_sense_validation": {
            "summary": "Outputs are plausible.",
            "severity": "low",
            "critical_issues": []
        },
        "generalization_risks": {
            "summary": "Trained on pre-2020 data only.",
            "risk_severity": "high",
            "critical_issues": ["Temporal drift"]
        },
        "safety_review": {
            "summary": "Automated denials without appeal.",
            "risk_level": "high",
            "critical_issues": ["No human appeal path"]
        },
        "cross_cutting_concerns": ["Data freshness"],
        "overall_risk_assessment": overall_risk,
        "deployment_readiness": "Not ready for production",
        "executive_summary": "Retrain on recent data and add an appeal path.",
        "recommended_improvements": ["Retrain quarterly"],
        "required_guardrails": ["Manual review of denials"],
        "human_oversight_requirements": ["Weekly audit"]
    })
}

async fn mount_agent(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn orchestrator(
    server: &MockServer,
    storage: MemoryStorage,
) -> SessionOrchestrator<AssessmentClient, MemoryStorage> {
    let config = AgentConfig {
        api_key: Some(SecretString::new("sk-test-key")),
        base_url: server.uri(),
        agent_id: AGENT.to_string(),
    };
    let client = AssessmentClient::new(&config, RequestConfig { timeout_ms: 5000 }).unwrap();
    let history = HistoryStore::open(storage).await;
    SessionOrchestrator::new(client, history, AGENT)
}

#[tokio::test]
async fn test_loan_default_analysis_is_saved_and_exported() {
    let server = MockServer::start().await;
    mount_agent(
        &server,
        json!({
            "success": true,
            "response": { "status": "success", "result": loan_report("high") }
        }),
    )
    .await;

    let storage = MemoryStorage::new();
    let orch = orchestrator(&server, storage.clone()).await;
    let input = SessionInput::new("Model predicts loan default", TaskType::Classification);

    let report = orch.submit(input.clone()).await.unwrap();

    assert_eq!(report.overall_risk_assessment.class(), RiskClass::High);
    match orch.state() {
        SessionState::Succeeded { entry_id, .. } => assert!(entry_id.is_some()),
        other => panic!("Expected Succeeded, got {:?}", other),
    }

    {
        let history = orch.history().read().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history.list()[0].input, input);
        assert_eq!(history.list()[0].report, report);
    }

    // A fresh store over the same backend sees the entry.
    let reopened = HistoryStore::open(storage).await;
    assert_eq!(reopened.len(), 1);

    let at = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
    let bytes = orch.export_current(at).unwrap().unwrap();
    let doc: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doc["timestamp"], "2025-06-01T08:30:00.000Z");
    assert_eq!(doc["input"]["predictionContext"], "Model predicts loan default");
    assert_eq!(validate(&doc["analysis"]).unwrap(), report);
}

#[tokio::test]
async fn test_remote_failure_leaves_history_unchanged() {
    let server = MockServer::start().await;
    mount_agent(&server, json!({ "success": false, "error": "timeout" })).await;

    let orch = orchestrator(&server, MemoryStorage::new()).await;
    let input = SessionInput::new("Model predicts loan default", TaskType::Classification);

    let err = orch.submit(input).await.unwrap_err();

    assert_eq!(
        err,
        SessionError::RemoteFailure {
            reason: "timeout".to_string()
        }
    );
    match orch.state() {
        SessionState::Failed { reason, .. } => assert_eq!(reason, "timeout"),
        other => panic!("Expected Failed, got {:?}", other),
    }
    assert!(orch.history().read().await.is_empty());
    assert!(orch.export_current(Utc::now()).is_none());
}

#[tokio::test]
async fn test_report_without_safety_review_fails() {
    let server = MockServer::start().await;
    let mut result = loan_report("high");
    result.as_object_mut().unwrap().remove("safety_review");
    mount_agent(
        &server,
        json!({
            "success": true,
            "response": { "status": "success", "result": result }
        }),
    )
    .await;

    let orch = orchestrator(&server, MemoryStorage::new()).await;
    let err = orch
        .submit(SessionInput::new("ctx", TaskType::Ranking))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::InvalidReport(_)));
    assert!(err.to_string().contains("safety_review"));
    assert!(orch.history().read().await.is_empty());
}

#[tokio::test]
async fn test_stringified_report_is_accepted() {
    let server = MockServer::start().await;
    let fenced = format!("```json\n{}\n```", loan_report("low"));
    mount_agent(
        &server,
        json!({
            "success": true,
            "response": { "status": "success", "result": fenced }
        }),
    )
    .await;

    let orch = orchestrator(&server, MemoryStorage::new()).await;
    let report = orch
        .submit(SessionInput::new("ctx", TaskType::Ranking))
        .await
        .unwrap();

    assert_eq!(report.overall_risk_assessment.class(), RiskClass::Low);
}

#[tokio::test]
async fn test_history_filter_after_several_sessions() {
    let server = MockServer::start().await;
    let storage = MemoryStorage::new();

    let runs = [
        (TaskType::Regression, "high"),
        (TaskType::Regression, "low"),
        (TaskType::Classification, "high"),
        (TaskType::Regression, "High"),
    ];
    for (task_type, risk) in runs {
        server.reset().await;
        mount_agent(
            &server,
            json!({
                "success": true,
                "response": { "status": "success", "result": loan_report(risk) }
            }),
        )
        .await;
        let orch = orchestrator(&server, storage.clone()).await;
        orch.submit(SessionInput::new("ctx", task_type)).await.unwrap();
    }

    let history = HistoryStore::open(storage).await;
    assert_eq!(history.len(), 4);

    let filter = HistoryFilter::new()
        .with_risk("HIGH")
        .with_task_type(TaskType::Regression);
    let matched = history.list_filtered(&filter);
    assert_eq!(matched.len(), 2);
    assert!(matched
        .iter()
        .all(|e| e.input.task_type == TaskType::Regression));
}

#[tokio::test]
async fn test_resubmit_after_reset() {
    let server = MockServer::start().await;
    mount_agent(
        &server,
        json!({
            "success": true,
            "response": { "status": "success", "result": loan_report("medium") }
        }),
    )
    .await;

    let orch = orchestrator(&server, MemoryStorage::new()).await;
    orch.submit(SessionInput::new("first", TaskType::Ranking))
        .await
        .unwrap();
    orch.reset().unwrap();
    assert_eq!(orch.state(), SessionState::Idle);

    orch.submit(SessionInput::new("second", TaskType::Ranking))
        .await
        .unwrap();
    assert_eq!(orch.history().read().await.len(), 2);
}
