use super::*;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use shared::{
    domain::{PlottedStar, StarRecord},
    error::ErrorCode,
};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

fn ok_response(stars: Vec<PlottedStar>) -> PlotResponse {
    PlotResponse {
        status: protocol::STATUS_SUCCESS.to_string(),
        message: None,
        stars,
        line_width: 2.0,
        star_size: 50.0,
    }
}

#[derive(Clone)]
struct ManualServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<ManualPlotRequest>>>>,
}

async fn handle_manual(
    State(state): State<ManualServerState>,
    Json(payload): Json<ManualPlotRequest>,
) -> Json<PlotResponse> {
    let response = ok_response(Vec::new());
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(payload);
    }
    Json(response)
}

async fn spawn_manual_server() -> (String, oneshot::Receiver<ManualPlotRequest>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = oneshot::channel();
    let state = ManualServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route(protocol::manual_route(), post(handle_manual))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), rx)
}

#[derive(Debug, Default, Clone)]
struct CapturedUpload {
    file_name: Option<String>,
    content_type: Option<String>,
    file_bytes: Option<Vec<u8>>,
    line_width: Option<String>,
    star_size: Option<String>,
}

#[derive(Clone)]
struct AutoServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<CapturedUpload>>>>,
}

async fn handle_auto(
    State(state): State<AutoServerState>,
    mut multipart: Multipart,
) -> Json<PlotResponse> {
    let mut captured = CapturedUpload::default();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        match field.name().unwrap_or_default().to_string().as_str() {
            name if name == protocol::FILE_FIELD => {
                captured.file_name = field.file_name().map(str::to_string);
                captured.content_type = field.content_type().map(str::to_string);
                captured.file_bytes = Some(field.bytes().await.expect("file bytes").to_vec());
            }
            name if name == protocol::LINE_WIDTH_FIELD => {
                captured.line_width = Some(field.text().await.expect("lineWidth text"));
            }
            name if name == protocol::STAR_SIZE_FIELD => {
                captured.star_size = Some(field.text().await.expect("starSize text"));
            }
            _ => {}
        }
    }
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(captured);
    }
    Json(ok_response(vec![PlottedStar {
        name: "Star1".to_string(),
        x: 12.0,
        y: 34.0,
        z: 150.0,
    }]))
}

async fn spawn_auto_server() -> (String, oneshot::Receiver<CapturedUpload>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = oneshot::channel();
    let state = AutoServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route(protocol::auto_route(), post(handle_auto))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), rx)
}

async fn spawn_rejecting_server() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route(
        protocol::manual_route(),
        post(|| async {
            (
                axum::http::StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiError::new(
                    ErrorCode::Validation,
                    "x is not a number for star 1",
                )),
            )
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn record(name: &str, x: &str, y: &str, z: &str) -> StarRecord {
    StarRecord {
        name: name.to_string(),
        x: x.to_string(),
        y: y.to_string(),
        z: z.to_string(),
    }
}

#[tokio::test]
async fn submit_manual_posts_the_entered_stars_verbatim() {
    let (server_url, payload_rx) = spawn_manual_server().await;
    let client = StarPlotClient::new(server_url);

    let request = ManualPlotRequest {
        stars: vec![record("Sirius", "1", "2", "3"), record("Vega", "4", "5", "6")],
        line_width: "2".to_string(),
        star_size: "50".to_string(),
    };

    let response = client.submit_manual(&request).await.expect("submit");
    assert_eq!(response.status, protocol::STATUS_SUCCESS);

    let payload = payload_rx.await.expect("payload");
    assert_eq!(
        payload.stars,
        vec![record("Sirius", "1", "2", "3"), record("Vega", "4", "5", "6")]
    );
    // Sizes are forwarded as the raw strings the user typed.
    assert_eq!(payload.line_width, "2");
    assert_eq!(payload.star_size, "50");
}

#[tokio::test]
async fn submit_manual_surfaces_the_server_error_envelope() {
    let server_url = spawn_rejecting_server().await;
    let client = StarPlotClient::new(server_url);

    let request = ManualPlotRequest {
        stars: vec![record("Sirius", "not-a-number", "2", "3")],
        line_width: "2".to_string(),
        star_size: "50".to_string(),
    };

    let err = client.submit_manual(&request).await.expect_err("must fail");
    match err {
        ClientError::Api(api_error) => {
            assert_eq!(api_error.code, ErrorCode::Validation);
            assert_eq!(api_error.message, "x is not a number for star 1");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn submit_manual_reports_transport_failures() {
    // Nothing listens on this port.
    let client = StarPlotClient::new("http://127.0.0.1:9");

    let request = ManualPlotRequest {
        stars: Vec::new(),
        line_width: "1".to_string(),
        star_size: "10".to_string(),
    };

    let err = client.submit_manual(&request).await.expect_err("must fail");
    assert!(matches!(err, ClientError::Http(_)));
}

#[tokio::test]
async fn submit_auto_sends_file_bytes_and_size_fields_as_multipart() {
    let (server_url, payload_rx) = spawn_auto_server().await;
    let client = StarPlotClient::new(server_url);

    let bytes = b"x,y\n1,2\n".to_vec();
    let file = SelectedFile {
        file_name: "data.csv".to_string(),
        bytes: bytes.clone(),
    };

    let response = client
        .submit_auto(Some(file), "2", "50")
        .await
        .expect("submit");
    assert_eq!(response.stars.len(), 1);
    assert_eq!(response.stars[0].name, "Star1");

    let captured = payload_rx.await.expect("captured upload");
    assert_eq!(captured.file_name.as_deref(), Some("data.csv"));
    assert_eq!(captured.content_type.as_deref(), Some("text/csv"));
    assert_eq!(captured.file_bytes, Some(bytes));
    assert_eq!(captured.line_width.as_deref(), Some("2"));
    assert_eq!(captured.star_size.as_deref(), Some("50"));
}

#[tokio::test]
async fn submit_auto_without_file_omits_the_file_part() {
    let (server_url, payload_rx) = spawn_auto_server().await;
    let client = StarPlotClient::new(server_url);

    client.submit_auto(None, "3", "75").await.expect("submit");

    let captured = payload_rx.await.expect("captured upload");
    assert_eq!(captured.file_bytes, None);
    assert_eq!(captured.file_name, None);
    assert_eq!(captured.line_width.as_deref(), Some("3"));
    assert_eq!(captured.star_size.as_deref(), Some("75"));
}
