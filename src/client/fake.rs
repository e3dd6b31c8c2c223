use std::sync::{Arc, Mutex};
use std::time::Duration;

use url::Url;

use super::{
    BoxFuture, HttpRequest, HttpResponse, HttpTransport, SignalBridgeClient,
    SignalBridgeClientBuilder, TransportFailure,
};
use crate::domain::ApiToken;

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportFailure> + Send + Sync;
type Delay = dyn Fn(&HttpRequest) -> Duration + Send + Sync;

#[derive(Clone)]
pub(super) struct FakeTransport {
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    completed: Arc<Mutex<Vec<HttpRequest>>>,
    responder: Arc<Responder>,
    delay: Option<Arc<Delay>>,
}

impl FakeTransport {
    pub(super) fn new(
        responder: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportFailure>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            completed: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
            delay: None,
        }
    }

    /// Hold each response for a per-request duration before resolving.
    pub(super) fn with_delay(
        mut self,
        delay: impl Fn(&HttpRequest) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Arc::new(delay));
        self
    }

    pub(super) fn fixed(status: u16, body: &str) -> Self {
        let body = body.to_owned();
        Self::new(move |_| Ok(HttpResponse::new(status, body.clone())))
    }

    pub(super) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests in the order their responses resolved.
    pub(super) fn completed(&self) -> Vec<HttpRequest> {
        self.completed.lock().unwrap().clone()
    }
}

impl HttpTransport for FakeTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        let result = (self.responder)(&request);
        let delay = self
            .delay
            .as_ref()
            .map(|delay| delay(&request))
            .unwrap_or_default();
        self.requests.lock().unwrap().push(request.clone());

        let completed = self.completed.clone();
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            completed.lock().unwrap().push(request);
            result
        })
    }
}

pub(super) fn make_client(transport: FakeTransport) -> SignalBridgeClient {
    make_client_with(transport, |builder| builder)
}

pub(super) fn make_client_with(
    transport: FakeTransport,
    configure: impl FnOnce(SignalBridgeClientBuilder) -> SignalBridgeClientBuilder,
) -> SignalBridgeClient {
    let builder = SignalBridgeClient::builder(ApiToken::new("test-token").unwrap())
        .base_url("https://example.invalid/api");
    let mut client = configure(builder).build().unwrap();
    client.http = Arc::new(transport);
    client
}

pub(super) fn assert_query(url: &Url, key: &str, expected: &str) {
    let actual = url
        .query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned());
    assert_eq!(actual.as_deref(), Some(expected), "query parameter {key}");
}
