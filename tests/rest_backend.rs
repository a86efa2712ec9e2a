use std::sync::{Arc, Mutex};

use infra_review::config::ReviewConfig;
use infra_review::error::ApiError;
use infra_review::fetch::BasicClient;
use infra_review::infra::backend::RestBackend;
use infra_review::models::{InfraStatus, ProcessStatus, ScheduleStatus};
use infra_review::review::RecordFilter;
use infra_review::services::ReviewApi;
use reqwest::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves `responses` in order, one connection each, and records the
/// request heads it saw.
async fn serve(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let log = seen.clone();
    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            log.lock()
                .unwrap()
                .push(String::from_utf8_lossy(&head).to_string());

            let response = format!(
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    (base, seen)
}

fn backend(base: &str) -> RestBackend<BasicClient> {
    RestBackend::new(&format!("{base}/api"), BasicClient::new(), BasicClient::new()).unwrap()
}

fn request_line(head: &str) -> &str {
    head.lines().next().unwrap()
}

const RECORD_LIST: &str = r#"{
  "code": 200,
  "message": "ok",
  "data": [{
    "id": "p-1",
    "cameraId": "cam-7",
    "dateCaptured": "2024-11-17T21:02:52",
    "latitude": 21.0285,
    "longitude": 105.8048,
    "category": "LAMP",
    "name": "lamp post",
    "status": "NOT OK",
    "confidence": 0.87,
    "level": 2,
    "scheduleId": "s-1",
    "eventStatus": "NEW",
    "image": {"pathUrl": "http://minio/p-1.jpg", "frame": 90},
    "processStatus": "PENDING",
    "infraObject": {"id": "obj-3"}
  }]
}"#;

#[tokio::test]
async fn test_list_records_sends_only_set_filters() {
    let (base, seen) = serve(vec![(200, RECORD_LIST.to_string())]).await;
    let api = backend(&base);

    let filter = RecordFilter::pending();
    let records = api.list_records("s-1", &filter).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, InfraStatus::NotOk);
    assert_eq!(records[0].process_status, ProcessStatus::Pending);
    assert_eq!(records[0].video_frame(), Some(90));

    let seen = seen.lock().unwrap();
    assert_eq!(
        request_line(&seen[0]),
        "GET /api/infrastructures/process/schedule?scheduleId=s-1&processStatus=PENDING HTTP/1.1"
    );
}

#[tokio::test]
async fn test_mutations_use_backend_routes() {
    let ok = r#"{"code":200,"message":"ok","data":null}"#.to_string();
    let (base, seen) = serve(vec![(200, ok.clone()), (200, ok.clone()), (200, ok)]).await;
    let api = backend(&base);

    api.approve("p-1").await.unwrap();
    api.reject("p-2").await.unwrap();
    api.process_remaining("s-1").await.unwrap();

    let seen = seen.lock().unwrap();
    let lines: Vec<_> = seen.iter().map(|h| request_line(h)).collect();
    assert_eq!(
        lines,
        vec![
            "POST /api/infrastructures/process/p-1 HTTP/1.1",
            "PATCH /api/infrastructures/process/reject/p-2 HTTP/1.1",
            "POST /api/infrastructures/process/schedule/s-1 HTTP/1.1",
        ]
    );
}

#[tokio::test]
async fn test_rejected_transition_carries_backend_message() {
    let body = r#"{"code":400,"message":"infra object process is not pending","data":null}"#;
    let (base, _seen) = serve(vec![(400, body.to_string())]).await;
    let api = backend(&base);

    let err = api.approve("p-1").await.unwrap_err();

    match &err {
        ApiError::Rejected { status, message } => {
            assert_eq!(*status, StatusCode::BAD_REQUEST);
            assert_eq!(message, "infra object process is not pending");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message(), "infra object process is not pending");
}

#[tokio::test]
async fn test_schedule_decode_and_not_found() {
    let schedule = r#"{"code":200,"message":"ok","data":{
        "id": "s-1",
        "startTime": "2024-11-17T09:00:00",
        "endTime": "2024-11-17T10:00:00",
        "cameraId": "cam-7",
        "videoUrl": "http://minio/s-1.mp4",
        "gpsLogsUrl": "",
        "schedulingStatus": "DONE"
    }}"#;
    let missing = r#"{"code":404,"message":"scheduling not found","data":null}"#;
    let (base, seen) = serve(vec![(200, schedule.to_string()), (404, missing.to_string())]).await;
    let api = backend(&base);

    let s = api.get_schedule("s-1").await.unwrap();
    assert_eq!(s.scheduling_status, ScheduleStatus::Done);
    assert_eq!(s.gps_log_url(), None);
    assert_eq!(s.frame_rate_or(30.0), 30.0);

    let err = api.get_schedule("s-404").await.unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(
        request_line(&seen.lock().unwrap()[0]),
        "GET /api/cameras/scheduling/s-1 HTTP/1.1"
    );
}

#[tokio::test]
async fn test_bearer_token_only_on_backend_calls() {
    let gps = r#"[
        {"timestamp": 1000, "latitude": 21.0, "longitude": 105.0, "speed": 3.2},
        {"timestamp": 2000, "latitude": null, "longitude": 105.0},
        {"timestamp": 3000, "latitude": 21.1, "longitude": 105.1}
    ]"#;
    let (base, seen) = serve(vec![(200, RECORD_LIST.to_string()), (200, gps.to_string())]).await;

    let config = ReviewConfig {
        base_url: format!("{base}/api/"),
        api_token: Some("secret".to_string()),
        ..ReviewConfig::default()
    };
    let api = RestBackend::from_config(&config).unwrap();

    api.list_records("s-1", &RecordFilter::all()).await.unwrap();
    let track = api.fetch_gps_track(&format!("{base}/gps/s-1.json")).await;

    assert_eq!(track.len(), 2);
    assert_eq!(track[1].timestamp, Some(3000));

    let seen = seen.lock().unwrap();
    assert!(seen[0].to_ascii_lowercase().contains("authorization: bearer secret"));
    assert!(!seen[1].to_ascii_lowercase().contains("authorization"));
    assert_eq!(request_line(&seen[1]), "GET /gps/s-1.json HTTP/1.1");
}

#[tokio::test]
async fn test_gps_fetch_failure_yields_empty_track() {
    let (base, _seen) = serve(vec![(500, "boom".to_string()), (200, "not json".to_string())]).await;
    let api = backend(&base);

    assert!(api.fetch_gps_track(&format!("{base}/gps/a.json")).await.is_empty());
    assert!(api.fetch_gps_track(&format!("{base}/gps/b.json")).await.is_empty());
}
