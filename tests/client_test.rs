//! reqwest transport against a mock Tornado API

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tornado::client::{
    BulkItem, ClientError, Format, HttpConfig, HttpTransport, JobListFilter, JobOptions, JobStatus,
    PollRequest, TornadoClient,
};

const API_KEY: &str = "sk_test_123";

async fn setup() -> (MockServer, TornadoClient<HttpTransport>) {
    let server = MockServer::start().await;
    let transport = HttpTransport::new(&server.uri(), API_KEY, HttpConfig::default())
        .expect("Failed to build transport");
    (server, TornadoClient::new(transport))
}

#[tokio::test]
async fn test_create_job_sends_key_and_selected_options() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/jobs"))
        .and(header("x-api-key", API_KEY))
        .and(body_json(json!({
            "url": "https://www.youtube.com/watch?v=abc",
            "format": "webm",
            "download_thumbnail": true
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"job_id": "job-1", "status": "Pending"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let options = JobOptions::builder()
        .format(Format::Webm)
        .download_thumbnail(true)
        .audio_only(false)
        .build();
    let handle = client
        .create_job("https://www.youtube.com/watch?v=abc", &options)
        .await
        .unwrap();

    assert_eq!(handle.job_id(), "job-1");
    assert_eq!(handle.status(), Some(&JobStatus::Pending));
}

#[tokio::test]
async fn test_bulk_create() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/jobs/bulk"))
        .and(body_json(json!({
            "jobs": [
                {"url": "https://open.spotify.com/episode/1", "audio_only": true, "filename": "ep1"},
                {"url": "https://open.spotify.com/episode/2", "audio_only": true}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batch_id": "batch-9",
            "job_ids": ["a", "b"],
            "total_jobs": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items = vec![
        BulkItem::new("https://open.spotify.com/episode/1").with_filename("ep1"),
        BulkItem::new("https://open.spotify.com/episode/2"),
    ];
    let shared = JobOptions::builder().audio_only(true).build();

    let batch = client.create_bulk_jobs(&items, &shared).await.unwrap();
    assert_eq!(batch.batch_id(), "batch-9");
    assert_eq!(batch.get("total_jobs"), Some(&json!(2)));
}

#[tokio::test]
async fn test_non_success_status_becomes_remote_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/jobs/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Job not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.get_job_status("missing").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Remote { status: 404, ref message } if message == "Job not found"
    ));
}

#[tokio::test]
async fn test_list_jobs_only_sends_set_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/jobs"))
        .and(query_param("limit", "10"))
        .and(query_param("status", "Completed"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobs": [{"id": "a", "status": "Completed"}],
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = JobListFilter {
        limit: Some(10),
        offset: None,
        status: Some(JobStatus::Completed),
    };
    let jobs = client.list_jobs(&filter).await.unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id(), "a");
}

#[tokio::test]
async fn test_empty_body_reads_as_null() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/jobs/job-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let response = client.cancel_job("job-1").await.unwrap();
    assert!(response.is_null());
}

#[tokio::test]
async fn test_wait_for_completion_polls_until_completed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "job-1", "status": "Processing"})))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jobs/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-1",
            "status": "Completed",
            "s3_url": "https://bucket/job-1.mp4"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let job = client
        .wait_for_completion(PollRequest::new(
            "job-1",
            Duration::from_secs(10),
            Duration::from_millis(10),
        ))
        .await
        .unwrap();

    assert_eq!(job.status(), &JobStatus::Completed);
    assert_eq!(job.get("s3_url"), Some(&json!("https://bucket/job-1.mp4")));
}

#[tokio::test]
async fn test_wait_for_completion_surfaces_job_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/jobs/job-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-2",
            "status": "Failed",
            "error": "Video is private"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .wait_for_completion(PollRequest::new(
            "job-2",
            Duration::from_secs(10),
            Duration::from_millis(10),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Job failed: Video is private");
}

#[tokio::test]
async fn test_batch_status_and_metadata() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/batch/batch-9"))
        .and(header("x-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "batch-9",
            "jobs": [
                {"id": "a", "status": "Completed"},
                {"id": "b", "status": "Failed", "error": "Geo-blocked"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/metadata"))
        .and(body_json(json!({"url": "https://youtu.be/abc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Demo", "duration": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let batch = client.get_batch_status("batch-9").await.unwrap();
    assert_eq!(batch.batch_id(), "batch-9");
    assert_eq!(batch.jobs().len(), 2);
    assert!(batch.is_terminal());

    let metadata = client.get_metadata("https://youtu.be/abc").await.unwrap();
    assert_eq!(metadata["title"], "Demo");
}

#[tokio::test]
async fn test_job_id_is_sent_as_one_segment() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/jobs/a%3Fb"))
        .and(query_param_is_missing("b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cancelled": true})))
        .expect(1)
        .mount(&server)
        .await;

    let response = client.cancel_job("a?b").await.unwrap();
    assert_eq!(response["cancelled"], true);
}
