use super::payload::{
    CloseData, CloseParams, CloseResult, QueryData, QueryParams, QueryResult, RouterRequest,
    RouterResponse, EVENT_STATE_NEW,
};
use crate::config::ReaperConfig;
use crate::reconcile::{EventCloser, EventPage, EventSource, PageSize, TransportError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// EventsRouter client for one event class.
///
/// Every request is a basic-auth `POST` to `/zport/dmd/evconsole_router`
/// with the client-wide timeout applied.
pub struct RouterClient {
    http: reqwest::Client,
    router_url: String,
    username: String,
    password: String,
    event_class: String,
    next_tid: AtomicU64,
}

impl RouterClient {
    pub fn new(config: &ReaperConfig) -> Result<Self, TransportError> {
        if !config.verify_tls {
            log::warn!("⚠️  TLS certificate verification is disabled");
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            http,
            router_url: config.router_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            event_class: config.event_class.clone(),
            next_tid: AtomicU64::new(1),
        })
    }

    pub fn event_class(&self) -> &str {
        &self.event_class
    }

    async fn call<D, R>(&self, method: &'static str, data: D) -> Result<R, TransportError>
    where
        D: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let tid = self.next_tid.fetch_add(1, Ordering::Relaxed);
        let request = RouterRequest::new(method, data, tid);

        let response = self
            .http
            .post(&self.router_url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status()));
        }

        let envelope: RouterResponse<R> = response.json().await?;
        envelope
            .into_result()
            .map_err(|msg| TransportError::Router(format!("{} (tid {}): {}", method, tid, msg)))
    }
}

#[async_trait]
impl EventSource for RouterClient {
    async fn fetch(&self, offset: u64, page_size: PageSize) -> Result<EventPage, TransportError> {
        let data = QueryData {
            start: offset,
            limit: page_size.get(),
            params: QueryParams {
                event_class: self.event_class.clone(),
                event_state: vec![EVENT_STATE_NEW],
            },
        };

        let result: QueryResult = self.call("query", data).await?;
        result
            .into_page()
            .map_err(|msg| TransportError::Router(format!("query at offset {}: {}", offset, msg)))
    }
}

#[async_trait]
impl EventCloser for RouterClient {
    async fn close(&self, event_ids: &[String]) -> Result<(), TransportError> {
        let data = CloseData {
            evids: event_ids,
            params: CloseParams {
                event_class: self.event_class.clone(),
            },
        };

        let result: CloseResult = self.call("close", data).await?;
        if result.success == Some(false) {
            return Err(TransportError::Router(
                result.msg.unwrap_or_else(|| "close was not successful".to_string()),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{Cutoff, ReconcileError, ReconciliationLoop};
    use crate::report::ConsoleReporter;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response on a local port.
    ///
    /// Returns the base URL and a handle resolving to the request body.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];

            // Read headers, then Content-Length bytes of body.
            let (header_end, content_length) = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending a request");
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&request[..pos]).to_lowercase();
                    let length = headers
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    break (pos + 4, length);
                }
            };
            while request.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request[header_end..]).to_string()
        });

        (base_url, handle)
    }

    fn client_for(base_url: String) -> RouterClient {
        let mut config = config("true");
        config.base_url = base_url;
        config.request_timeout = std::time::Duration::from_secs(5);
        RouterClient::new(&config).unwrap()
    }

    fn config(verify_tls: &str) -> ReaperConfig {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ZENOSS_URL", "https://zenoss.example.com"),
            ("ZENOSS_USERNAME", "admin"),
            ("ZENOSS_PASSWORD", "secret"),
            ("EVENT_CLASS", "/Status/Snmp"),
            ("VERIFY_TLS", verify_tls),
        ]);
        ReaperConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
    }

    #[test]
    fn test_client_builds_from_config() {
        let client = RouterClient::new(&config("false")).unwrap();
        assert_eq!(client.event_class(), "/Status/Snmp");
        assert_eq!(
            client.router_url,
            "https://zenoss.example.com/zport/dmd/evconsole_router"
        );
    }

    #[tokio::test]
    async fn test_unreachable_router_is_transport_error() {
        let mut config = config("true");
        config.base_url = "http://127.0.0.1:9".to_string();
        config.request_timeout = std::time::Duration::from_secs(2);
        let client = RouterClient::new(&config).unwrap();

        let err = client.fetch(0, PageSize::DEFAULT).await.unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
    }

    #[tokio::test]
    async fn test_fetch_returns_page() {
        let (url, request) = serve_once(
            "200 OK",
            r#"{"type":"rpc","tid":1,"result":{"events":[{"evid":"e1","eventClass":{"text":"/Status/Snmp"},"firstTime":1,"lastTime":2}],"totalCount":1,"success":true}}"#,
        )
        .await;
        let client = client_for(url);

        let page = client.fetch(40, PageSize::new(20).unwrap()).await.unwrap();
        assert_eq!(page.count(), 1);
        assert_eq!(page.records[0].evid_str(), Some("e1"));

        let body: serde_json::Value = serde_json::from_str(&request.await.unwrap()).unwrap();
        assert_eq!(body["method"], "query");
        assert_eq!(body["data"][0]["start"], 40);
        assert_eq!(body["data"][0]["limit"], 20);
        assert_eq!(body["data"][0]["params"]["eventClass"], "/Status/Snmp");
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let (url, _request) = serve_once("500 Internal Server Error", "{}").await;
        let client = client_for(url);

        let err = client.fetch(0, PageSize::DEFAULT).await.unwrap_err();
        assert!(matches!(err, TransportError::Status(status) if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn test_unsuccessful_query_is_router_error() {
        let (url, _request) = serve_once(
            "200 OK",
            r#"{"type":"rpc","tid":1,"result":{"success":false,"msg":"Invalid filter"}}"#,
        )
        .await;
        let client = client_for(url);

        let err = client.fetch(0, PageSize::DEFAULT).await.unwrap_err();
        assert!(matches!(err, TransportError::Router(ref msg) if msg.contains("Invalid filter")));
    }

    #[tokio::test]
    async fn test_unsuccessful_close_is_router_error() {
        let (url, request) = serve_once(
            "200 OK",
            r#"{"type":"rpc","tid":1,"result":{"success":false,"msg":"Permission denied"}}"#,
        )
        .await;
        let client = client_for(url);

        let ids = vec!["e1".to_string(), "e2".to_string()];
        let err = client.close(&ids).await.unwrap_err();
        assert!(matches!(err, TransportError::Router(ref msg) if msg.contains("Permission denied")));

        let body: serde_json::Value = serde_json::from_str(&request.await.unwrap()).unwrap();
        assert_eq!(body["method"], "close");
        assert_eq!(body["data"][0]["evids"], serde_json::json!(["e1", "e2"]));
    }

    #[tokio::test]
    async fn test_close_success() {
        let (url, _request) = serve_once("200 OK", r#"{"type":"rpc","tid":1,"result":{"success":true}}"#).await;
        let client = client_for(url);

        client.close(&["e1".to_string()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_result_without_events_aborts_run() {
        let (url, _request) = serve_once("200 OK", r#"{"type":"rpc","tid":1,"result":{"totalCount":250}}"#).await;
        let client = client_for(url);
        let mut reporter = ConsoleReporter::new(Vec::new(), chrono::Local::now());

        let failure = ReconciliationLoop::new(&client, &client, PageSize::DEFAULT, Cutoff::at(0.0))
            .run(&mut reporter)
            .await
            .unwrap_err();

        assert!(matches!(
            failure.error,
            ReconcileError::SourceUnavailable {
                offset: 0,
                source: TransportError::Router(_),
                ..
            }
        ));
        assert_eq!(failure.partial.events_processed, 0);
    }
}
