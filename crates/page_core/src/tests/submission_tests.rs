use super::*;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use shared::domain::FieldId;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::Instant,
};
use tokio::net::TcpListener;
use uuid::Uuid;

fn sample_submission() -> ContactSubmission {
    ContactSubmission {
        submission_id: Uuid::new_v4(),
        submitted_at: Utc::now(),
        fields: BTreeMap::from([
            (FieldId::from("name"), "Asha Rao".to_string()),
            (FieldId::from("email"), "asha@example.in".to_string()),
            (FieldId::from("phone"), "9876543210".to_string()),
        ]),
    }
}

async fn spawn_server(router: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    Url::parse(&format!("http://{addr}/api/contact")).expect("url")
}

#[tokio::test]
async fn simulated_submitter_accepts_after_latency() {
    let submitter = SimulatedSubmitter::new(Duration::from_millis(20));
    let submission = sample_submission();
    let started = Instant::now();

    let receipt = submitter.submit(&submission).await.expect("accepted");

    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(receipt.submission_id, submission.submission_id);
}

#[tokio::test]
async fn http_submitter_posts_json_and_reads_receipt() {
    let received: Arc<Mutex<Option<ContactSubmission>>> = Arc::new(Mutex::new(None));
    let router = Router::new()
        .route(
            "/api/contact",
            post(
                |State(received): State<Arc<Mutex<Option<ContactSubmission>>>>,
                 Json(body): Json<ContactSubmission>| async move {
                    let receipt = SubmissionReceipt {
                        submission_id: body.submission_id,
                        accepted_at: Utc::now(),
                    };
                    *received.lock().expect("lock") = Some(body);
                    Json(receipt)
                },
            ),
        )
        .with_state(received.clone());
    let endpoint = spawn_server(router).await;

    let submitter = HttpSubmitter::new(endpoint, Duration::from_secs(5)).expect("client");
    let submission = sample_submission();
    let receipt = submitter.submit(&submission).await.expect("accepted");

    assert_eq!(receipt.submission_id, submission.submission_id);
    let seen = received.lock().expect("lock").clone().expect("server saw body");
    assert_eq!(seen, submission);
}

#[tokio::test]
async fn http_submitter_accepts_empty_success_response() {
    let router = Router::new().route("/api/contact", post(|| async { StatusCode::NO_CONTENT }));
    let endpoint = spawn_server(router).await;

    let submitter = HttpSubmitter::new(endpoint, Duration::from_secs(5)).expect("client");
    let submission = sample_submission();
    let receipt = submitter.submit(&submission).await.expect("accepted");
    assert_eq!(receipt.submission_id, submission.submission_id);
}

#[tokio::test]
async fn http_submitter_maps_error_status_to_rejected() {
    let router = Router::new().route(
        "/api/contact",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
    );
    let endpoint = spawn_server(router).await;

    let submitter = HttpSubmitter::new(endpoint, Duration::from_secs(5)).expect("client");
    let err = submitter
        .submit(&sample_submission())
        .await
        .expect_err("should be rejected");
    assert_eq!(
        err,
        SubmissionError::Rejected {
            status: 503,
            message: "maintenance".into(),
        }
    );
}

#[tokio::test]
async fn http_submitter_times_out_on_slow_endpoint() {
    let router = Router::new().route(
        "/api/contact",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            StatusCode::OK
        }),
    );
    let endpoint = spawn_server(router).await;

    let submitter = HttpSubmitter::new(endpoint, Duration::from_millis(50)).expect("client");
    let err = submitter
        .submit(&sample_submission())
        .await
        .expect_err("should time out");
    assert_eq!(err, SubmissionError::Timeout);
}

#[tokio::test]
async fn http_submitter_reports_unreachable_endpoint_as_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let endpoint = Url::parse(&format!("http://{addr}/api/contact")).expect("url");
    let submitter = HttpSubmitter::new(endpoint, Duration::from_secs(2)).expect("client");
    let err = submitter
        .submit(&sample_submission())
        .await
        .expect_err("nothing is listening");
    assert!(matches!(err, SubmissionError::Network { .. }), "got {err:?}");
}

#[test]
fn settings_with_bad_endpoint_fail_to_build_transport() {
    let settings = SubmissionSettings {
        simulated_latency_ms: 10,
        endpoint: Some("not a url".into()),
        timeout_ms: 1000,
    };
    assert!(submitter_from_settings(&settings, true).is_err());
    assert!(submitter_from_settings(&settings, false).is_ok());
}
