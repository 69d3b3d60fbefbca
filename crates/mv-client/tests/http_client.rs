//! Client tests against a one-shot local HTTP responder

use mv_client::{ClientError, HttpMatrixClient, MatrixService, StorageFormat, TransferFormat};
use mv_core::{Matrix, RowLabel};
use mv_data::{ipc, matrix_to_columnar, TableData};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Raw request as seen by the responder
struct Captured {
    head: String,
    body: Vec<u8>,
}

/// Serve exactly one response, returning the base URL and the captured request
async fn serve_once(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers were complete");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status,
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.unwrap();

        Captured {
            head,
            body: buf[header_end..].to_vec(),
        }
    });

    (base_url, handle)
}

fn client(base_url: String) -> HttpMatrixClient {
    // bypass any proxy configured in the environment
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpMatrixClient::with_http_client(http, &base_url)
}

fn sample_matrix() -> Matrix {
    Matrix::new(
        vec!["x".to_string(), "y".to_string()],
        vec!["r0".into(), "r1".into()],
        vec![vec![1.0, 2.0], vec![3.0, 4.0]],
    )
    .unwrap()
}

#[tokio::test]
async fn test_generate_decodes_arrow_body() {
    let body = ipc::encode(&matrix_to_columnar(&sample_matrix()).unwrap()).unwrap();
    let (url, server) = serve_once("200 OK", body).await;

    let table = client(url).generate(2, 2).await.unwrap();
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.value(1, 1).unwrap(), 4.0);

    let request = server.await.unwrap();
    assert!(request.head.starts_with("GET /matrix/generate?cols=2&rows=2 HTTP/1.1"));
}

#[tokio::test]
async fn test_fetch_json_matrix() {
    let body = br#"{"columns":["a","b"],"index":["first","second"],"data":[[1.5,2.5],[3.5,4.5]]}"#;
    let (url, server) = serve_once("200 OK", body.to_vec()).await;

    let data = client(url)
        .fetch("demo", StorageFormat::Tsv, TransferFormat::Json)
        .await
        .unwrap();

    match data {
        TableData::Rows(matrix) => {
            assert_eq!(matrix.index()[1], RowLabel::Text("second".into()));
            assert_eq!(matrix.value(1, 0), Some(3.5));
        }
        TableData::Columnar(_) => panic!("JSON transfer should produce a row matrix"),
    }

    let request = server.await.unwrap();
    assert!(request
        .head
        .starts_with("GET /matrix/json?name=demo&storage_format=tsv HTTP/1.1"));
}

#[tokio::test]
async fn test_fetch_arrow_table() {
    let body = ipc::encode(&matrix_to_columnar(&sample_matrix()).unwrap()).unwrap();
    let (url, server) = serve_once("200 OK", body).await;

    let data = client(url)
        .fetch("demo", StorageFormat::Hdf5, TransferFormat::Arrow)
        .await
        .unwrap();
    assert!(matches!(data, TableData::Columnar(_)));
    assert_eq!(data.column_names(), vec!["x".to_string(), "y".to_string()]);

    let request = server.await.unwrap();
    assert!(request
        .head
        .starts_with("GET /matrix/arrow?name=demo&storage_format=hdf5 HTTP/1.1"));
}

#[tokio::test]
async fn test_store_arrow_sends_ipc_file() {
    let (url, server) = serve_once("200 OK", b"null".to_vec()).await;
    let payload = TableData::Rows(sample_matrix());

    client(url)
        .store("saved", StorageFormat::Hdf5, TransferFormat::Arrow, &payload)
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert!(request
        .head
        .starts_with("POST /matrix/arrow?name=saved&storage_format=hdf5 HTTP/1.1"));
    assert!(request
        .head
        .to_ascii_lowercase()
        .contains("content-type: application/octet-stream"));

    let table = ipc::decode(&request.body).unwrap();
    assert_eq!(table.column_names(), vec!["x".to_string(), "y".to_string()]);
    assert_eq!(table.value(0, 1).unwrap(), 3.0);
}

#[tokio::test]
async fn test_store_json_sends_matrix() {
    let (url, server) = serve_once("200 OK", b"null".to_vec()).await;
    let payload = TableData::Rows(sample_matrix());

    client(url)
        .store("saved", StorageFormat::Tsv, TransferFormat::Json, &payload)
        .await
        .unwrap();

    let request = server.await.unwrap();
    assert!(request.head.starts_with("POST /matrix/json?name=saved&storage_format=tsv"));
    assert!(request
        .head
        .to_ascii_lowercase()
        .contains("content-type: application/json"));

    let sent: Matrix = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(sent, sample_matrix());
}

#[tokio::test]
async fn test_missing_matrix_is_a_status_error() {
    let (url, _server) = serve_once("404 Not Found", b"no such matrix".to_vec()).await;

    let err = client(url)
        .fetch("missing", StorageFormat::Hdf5, TransferFormat::Arrow)
        .await
        .unwrap_err();

    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(body, "no such matrix");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_arrow_is_a_decode_error() {
    let (url, _server) = serve_once("200 OK", b"not an arrow payload".to_vec()).await;

    let err = client(url).generate(1, 1).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(url).generate(1, 1).await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}
