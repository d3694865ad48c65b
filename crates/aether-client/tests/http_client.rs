//! HTTP client against a mock analysis service

use aether_client::{
    AnalysisApi, CleaningOperation, ClientError, HttpAnalysisClient, NewProject, UploadRequest,
    UploadResponse, UploadWarning,
};
use aether_core::{
    ApiConfig, Audience, DatasetId, InventoryDraft, ProjectId, Sensitivity, StoryId, StoryType,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpAnalysisClient {
    let config = ApiConfig {
        base_url: server.uri(),
        request_timeout_ms: 5_000,
    };
    HttpAnalysisClient::new(&config).unwrap()
}

#[tokio::test]
async fn create_project_posts_body_and_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects"))
        .and(body_json(json!({
            "title": "Q4 churn",
            "objective": "reduce customer churn",
            "stakeholders": ["Data Engineer"],
            "ethical_constraints": []
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 7, "title": "Q4 churn"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let project = NewProject {
        title: "Q4 churn".into(),
        objective: "reduce customer churn".into(),
        stakeholders: vec!["Data Engineer".into()],
        ethical_constraints: vec![],
    };
    let id = client_for(&server).create_project(&project).await.unwrap();
    assert_eq!(id, ProjectId::new("7"));
}

#[tokio::test]
async fn inventory_returns_risk_lines() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/7/inventory"))
        .and(body_json(json!({
            "dataset_name": "crm",
            "source": "CRM Export",
            "sensitivity": "Restricted"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "inventory": {"id": 3},
            "risk_assessment": ["High Risk: Strict Access Control Required"]
        })))
        .mount(&server)
        .await;

    let draft = InventoryDraft::new("crm", "CRM Export").with_sensitivity(Sensitivity::Restricted);
    let response = client_for(&server)
        .create_inventory(&ProjectId::new("7"), &draft)
        .await
        .unwrap();

    assert_eq!(response.inventory.id.as_str(), "3");
    assert_eq!(
        response.risk_assessment,
        vec!["High Risk: Strict Access Control Required".to_string()]
    );
}

#[tokio::test]
async fn upload_sends_multipart_with_project() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("churn.csv"))
        .and(body_string_contains("project_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "info": "file 'churn.csv' saved",
            "dataset_id": 11,
            "warnings": [{"type": "Email", "column": "contact"}]
        })))
        .mount(&server)
        .await;

    let upload = UploadRequest::new("churn.csv", b"id,contact\n1,a@b.c\n".to_vec())
        .with_project(ProjectId::new("7"));
    let response = client_for(&server).upload(&upload).await.unwrap();

    assert_eq!(response.resolved_id(), Some(&DatasetId::new("11")));
    assert_eq!(response.warnings.len(), 1);
}

async fn upload_with_warnings(warnings: serde_json::Value) -> UploadResponse {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "info": "saved",
            "dataset_id": 4,
            "warnings": warnings
        })))
        .mount(&server)
        .await;

    let upload = UploadRequest::new("notes.txt", b"free text".to_vec());
    client_for(&server).upload(&upload).await.unwrap()
}

#[tokio::test]
async fn upload_tolerates_scan_error_warning() {
    let response =
        upload_with_warnings(json!([{"error": "Failed to scan dataset: unreadable"}])).await;

    assert_eq!(response.resolved_id(), Some(&DatasetId::new("4")));
    assert_eq!(
        response.warnings,
        vec![UploadWarning::ScanError {
            error: "Failed to scan dataset: unreadable".to_string()
        }]
    );
}

#[tokio::test]
async fn upload_tolerates_plain_string_warning() {
    let response = upload_with_warnings(json!(["Unsupported file format for scanning."])).await;

    assert_eq!(response.resolved_id(), Some(&DatasetId::new("4")));
    assert_eq!(
        response.warnings[0].to_string(),
        "Unsupported file format for scanning."
    );
}

#[tokio::test]
async fn upload_tolerates_finding_warning() {
    let response = upload_with_warnings(json!([{"type": "Email", "column": "contact"}])).await;

    assert!(matches!(
        &response.warnings[0],
        UploadWarning::Finding { kind, .. } if kind == "Email"
    ));
}

#[tokio::test]
async fn upload_without_any_id_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"info": "saved"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .upload(&UploadRequest::new("x.csv", Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MissingField("dataset_id")));
}

#[tokio::test]
async fn clean_then_preview() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/datasets/11/clean"))
        .and(body_json(json!({"operation": "anonymize", "params": {"column": "contact"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Operation 'anonymize' applied successfully"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/datasets/11/preview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": ["id", "contact"],
            "rows": [{"id": 1, "contact": "***"}],
            "pii_warnings": []
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let dataset = DatasetId::new("11");
    let outcome = client
        .clean(&dataset, &CleaningOperation::Anonymize { column: "contact".into() })
        .await
        .unwrap();
    let preview = client.preview(&dataset).await.unwrap();

    assert_eq!(outcome.status, "success");
    assert_eq!(preview.columns, vec!["id".to_string(), "contact".to_string()]);
    assert!(preview.pii_warnings.is_empty());
}

#[tokio::test]
async fn hypotheses_pass_story_type_and_audience() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ai/hypotheses/11"))
        .and(query_param("story_type", "root_cause"))
        .and(query_param("target_audience", "technical"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hypotheses": [{"type": "trend", "question": "Is tenure trending?", "rationale": "seasonality"}]
        })))
        .mount(&server)
        .await;

    let hypotheses = client_for(&server)
        .hypotheses(&DatasetId::new("11"), StoryType::RootCause, Audience::Technical)
        .await
        .unwrap();
    assert_eq!(hypotheses[0].question, "Is tenure trending?");
}

#[tokio::test]
async fn enrichments_unwrap_envelopes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ai/correlations/S1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "correlations": [{
                "var1": "tenure", "var2": "spend", "correlation": 0.81,
                "direction": "positive", "strength": "strong", "insight": "tenure and spend move together"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ai/recommendations/S1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recommendations": [{
                "action": "Address Missing Data", "priority": "high",
                "description": "Impute", "category": "Data Quality", "impact": "accuracy"
            }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let story = StoryId::new("S1");
    let correlations = client.correlations(&story).await.unwrap();
    let recommendations = client.recommendations(&story).await.unwrap();

    assert_eq!(correlations[0].strength, "strong");
    assert_eq!(recommendations[0].action, "Address Missing Data");
}

#[tokio::test]
async fn non_success_status_is_error_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/analysis/S1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Analysis failed: boom"))
        .mount(&server)
        .await;

    let err = client_for(&server).analysis(&StoryId::new("S1")).await.unwrap_err();
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ml/anomalies/S1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server).anomalies(&StoryId::new("S1")).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    assert!(!err.is_retryable());
}
