// Shared across test binaries; not every helper is used by every binary.
#![allow(dead_code)]

use async_trait::async_trait;
use inboxcore::net::{
    HttpClient, HttpRequest, HttpResponse, Transport, TransportEvent, TransportFactory,
};
use sakura_inbox::client::{InboxParams, InboxType, SyncClient};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};

/// One scripted HTTP exchange. Optional delay and gate let tests control
/// when the response resolves.
pub struct Scripted {
    pub response: HttpResponse,
    pub delay: Option<Duration>,
    pub gate: Option<Arc<Semaphore>>,
}

impl Scripted {
    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status_code: u16, body: &str) -> Self {
        Self {
            response: HttpResponse {
                status_code,
                body: body.as_bytes().to_vec(),
            },
            delay: None,
            gate: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }
}

/// Queue-backed HTTP client double. Records every request; when the queue
/// runs dry it answers with an empty users payload.
#[derive(Default)]
pub struct MockHttpClient {
    responses: Mutex<VecDeque<Scripted>>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl std::fmt::Debug for MockHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpClient").finish()
    }
}

impl MockHttpClient {
    pub fn new(responses: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> anyhow::Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(scripted) => {
                if let Some(delay) = scripted.delay {
                    tokio::time::sleep(delay).await;
                }
                if let Some(gate) = scripted.gate {
                    let permit = gate.acquire().await?;
                    permit.forget();
                }
                Ok(scripted.response)
            }
            None => Ok(HttpResponse {
                status_code: 200,
                body: br#"{"users": []}"#.to_vec(),
            }),
        }
    }
}

/// Transport double that records outgoing frames.
#[derive(Default)]
pub struct ScriptedTransport {
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_text(&self, text: &str) -> Result<(), anyhow::Error> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn disconnect(&self) {}
}

/// Factory handing out a single scripted connection whose events the test
/// feeds through the returned sender.
pub struct ScriptedTransportFactory {
    receiver: Mutex<Option<mpsc::Receiver<TransportEvent>>>,
    pub transport: Arc<ScriptedTransport>,
}

impl ScriptedTransportFactory {
    pub fn new() -> (Arc<Self>, mpsc::Sender<TransportEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (
            Arc::new(Self {
                receiver: Mutex::new(Some(rx)),
                transport: Arc::new(ScriptedTransport::default()),
            }),
            tx,
        )
    }
}

#[async_trait]
impl TransportFactory for ScriptedTransportFactory {
    async fn create_transport(
        &self,
        _url: &str,
    ) -> Result<(Arc<dyn Transport>, mpsc::Receiver<TransportEvent>), anyhow::Error> {
        let rx = self
            .receiver
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| anyhow::anyhow!("No more scripted connections"))?;
        Ok((self.transport.clone(), rx))
    }
}

pub fn admin_params(section: &str) -> InboxParams {
    InboxParams {
        inbox_type: InboxType::Agent,
        user_email: "admin@heirs.com".to_string(),
        user_id: None,
        section: section.to_string(),
    }
}

pub fn make_client(
    http_client: Arc<dyn HttpClient>,
    transport_factory: Arc<dyn TransportFactory>,
    params: InboxParams,
) -> Arc<SyncClient> {
    SyncClient::new(
        sakura_inbox::config::ClientConfig::new("http://localhost:8000"),
        params,
        http_client,
        transport_factory,
    )
}

/// Polls `check` until it returns true or two seconds elapse.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
