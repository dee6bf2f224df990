//! End-to-end tests of the HTTP clients against a throwaway local server.
//!
//! Each test binds an ephemeral port, serves exactly one canned response and
//! hands back the raw request head so the outgoing request can be checked.

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};
use wayfinder_providers::{
    CandidateLocation, Coordinates, GeocodeClient, GeocodeConfig, GeocodeError, Geocoder,
    chat::{ChatProxy, ChatRequest, ChatResponseBody},
};

async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        // Read the head, then drain any body so closing the socket does not reset it.
        let mut expected_len = None;
        loop {
            if expected_len.is_none() {
                if let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..head_end]).to_ascii_lowercase();
                    let body_len = head
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|len| len.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    expected_len = Some(head_end + 4 + body_len);
                }
            }
            if expected_len.is_some_and(|len| request.len() >= len) {
                break;
            }
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{addr}"), server)
}

#[tokio::test]
async fn test_nominatim_search() {
    let (base, server) = serve_once(
        "200 OK",
        r#"[
            {"place_id": 1, "display_name": "Golden Gate Park", "lat": "37.7694", "lon": "-122.4862"},
            {"place_id": 2, "display_name": "Golden Gate Bridge", "lat": "37.83", "lon": "-122.48"},
            {"place_id": 3, "display_name": "Golden Gate Heights", "lat": "37.7587", "lon": "-122.4692"}
        ]"#,
    )
    .await;

    let client =
        GeocodeClient::new(GeocodeConfig::nominatim().endpoint(format!("{base}/search"))).unwrap();
    let candidates = client.search("Golden Gate").await.unwrap();

    let labels: Vec<_> = candidates.iter().map(CandidateLocation::label).collect();
    assert_eq!(
        labels,
        ["Golden Gate Park", "Golden Gate Bridge", "Golden Gate Heights"]
    );
    assert_eq!(candidates[1].coordinates(), Coordinates::new(37.83, -122.48));

    let request = server.await.unwrap();
    let request_line = request.lines().next().unwrap();
    assert!(request_line.starts_with("GET /search?"));
    assert!(request_line.contains("q=Golden+Gate"));
    assert!(request_line.contains("limit=5"));
    assert!(request.to_ascii_lowercase().contains("user-agent: wayfinder/"));
}

#[tokio::test]
async fn test_results_are_truncated_to_limit() {
    let (base, server) = serve_once(
        "200 OK",
        r#"[
            {"place_id": 1, "display_name": "A", "lat": "1", "lon": "1"},
            {"place_id": 2, "display_name": "B", "lat": "2", "lon": "2"},
            {"place_id": 3, "display_name": "C", "lat": "3", "lon": "3"}
        ]"#,
    )
    .await;

    let client = GeocodeClient::new(GeocodeConfig::nominatim().endpoint(base).limit(2)).unwrap();
    let candidates = client.search("letters").await.unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].label(), "A");
    server.await.unwrap();
}

#[tokio::test]
async fn test_mapbox_search() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"type": "FeatureCollection", "features": [
            {"id": "poi.1", "place_name": "Golden Gate Bridge", "center": [-122.48, 37.83]}
        ]}"#,
    )
    .await;

    let client = GeocodeClient::new(
        GeocodeConfig::mapbox("pk.test").endpoint(format!("{base}/geocoding/v5/mapbox.places")),
    )
    .unwrap();
    let candidates = client.search("Golden Gate").await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].coordinates(), Coordinates::new(37.83, -122.48));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /geocoding/v5/mapbox.places/Golden%20Gate.json?"));
    assert!(request.contains("access_token=pk.test"));
}

#[tokio::test]
async fn test_error_status_is_transport_failure() {
    let (base, server) = serve_once("503 Service Unavailable", r#"{"error": "busy"}"#).await;

    let client = GeocodeClient::new(GeocodeConfig::nominatim().endpoint(base)).unwrap();
    let err = client.search("anything").await.unwrap_err();
    assert!(matches!(err, GeocodeError::Http(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_malformed_body_is_decode_failure() {
    let (base, server) = serve_once("200 OK", "<html>not json</html>").await;

    let client = GeocodeClient::new(GeocodeConfig::nominatim().endpoint(base)).unwrap();
    let err = client.search("anything").await.unwrap_err();
    assert!(matches!(err, GeocodeError::Decode(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        GeocodeClient::new(GeocodeConfig::nominatim().endpoint(format!("http://{addr}"))).unwrap();
    let err = client.search("anything").await.unwrap_err();
    assert!(matches!(err, GeocodeError::Http(_)));
}

#[tokio::test]
async fn test_chat_proxy_success() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"choices": [{"message": {"role": "assistant", "content": "The bridge opened in 1937."}}]}"#,
    )
    .await;

    let proxy = ChatProxy::new(Some("gsk_test".to_owned())).endpoint(format!("{base}/chat/completions"));
    let reply = proxy
        .handle(ChatRequest::new("When did the Golden Gate Bridge open?"))
        .await;

    assert_eq!(reply.status, 200);
    assert_eq!(
        reply.body,
        ChatResponseBody::Text {
            text: "The bridge opened in 1937.".to_owned()
        }
    );

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /chat/completions"));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer gsk_test"));
}

#[tokio::test]
async fn test_chat_proxy_empty_choices_is_empty_text() {
    let (base, server) = serve_once("200 OK", r#"{"choices": []}"#).await;

    let proxy = ChatProxy::new(Some("gsk_test".to_owned())).endpoint(base);
    let text = proxy.complete("hello").await.unwrap();
    assert_eq!(text, "");
    server.await.unwrap();
}

#[tokio::test]
async fn test_chat_proxy_upstream_failure() {
    let (base, server) = serve_once("401 Unauthorized", r#"{"error": {"message": "bad key"}}"#).await;

    let proxy = ChatProxy::new(Some("gsk_wrong".to_owned())).endpoint(base);
    let reply = proxy
        .handle(ChatRequest::new("hello"))
        .await;

    assert_eq!(reply.status, 500);
    match reply.body {
        ChatResponseBody::Error { error } => {
            assert!(error.starts_with("Failed to generate content: "));
        }
        ChatResponseBody::Text { .. } => panic!("upstream failure must not produce text"),
    }
    server.await.unwrap();
}
