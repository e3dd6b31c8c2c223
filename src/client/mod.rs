//! Client layer: orchestrates transport calls and maps transport ↔ domain.

mod batch;
mod classify;
#[cfg(test)]
mod fake;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::domain::{
    Acknowledgement, ApiToken, BalanceSnapshot, BalanceSummary, CostEstimate, Currency, Delivery,
    Failure, FailureKind, MAX_BATCH_SIZE, MAX_MESSAGE_LENGTH, Message, MessageText, Money,
    Segmentation, TokenInfo, TransactionPage, TransactionQuery, ValidationError,
};

pub use classify::{HttpResponse, classify, classify_batch_item};

const DEFAULT_BASE_URL: &str = "https://signal-bridge.nugsoftstaging.com/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "SIGNALBRIDGE_TOKEN";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "SIGNALBRIDGE_URL";

const SEND_PATH: &str = "sms/send";
const SEND_BATCH_PATH: &str = "sms/send-batch";
const BALANCE_PATH: &str = "balance";
const BALANCE_SUMMARY_PATH: &str = "balance/summary";
const TRANSACTIONS_PATH: &str = "balance/transactions";
const TOKENS_PATH: &str = "tokens";
const CURRENT_TOKEN_PATH: &str = "tokens/current";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type TransportFailure = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HttpMethod {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone)]
struct HttpRequest {
    method: HttpMethod,
    url: Url,
    authorization: String,
    json: Option<Value>,
    timeout: Option<Duration>,
}

/// Issues one HTTP request and returns status and body even for 4xx/5xx.
trait HttpTransport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        Box::pin(async move {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Delete => reqwest::Method::DELETE,
            };
            let mut builder = self
                .client
                .request(method, request.url)
                .header(reqwest::header::AUTHORIZATION, request.authorization)
                .header(reqwest::header::ACCEPT, "application/json");
            if let Some(json) = request.json.as_ref() {
                builder = builder.json(json);
            }
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`SignalBridgeClient`].
///
/// This error separates:
/// - gateway outcomes classified into the closed [`Failure`] taxonomy,
/// - successful responses whose body cannot be decoded,
/// - local validation and configuration failures raised before any network call.
pub enum SignalBridgeError {
    /// The gateway (or the network in front of it) rejected the call.
    #[error(transparent)]
    Gateway(#[from] Failure),

    /// A 2xx response body did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(#[source] Box<dyn StdError + Send + Sync>),

    /// One of the domain checks rejected the input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The client could not be configured (missing token, bad base URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl SignalBridgeError {
    /// The classified gateway failure, if this error is one.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Gateway(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        self.failure().map(Failure::kind)
    }

    pub fn is_retryable(&self) -> bool {
        self.failure().is_some_and(Failure::is_retryable)
    }
}

fn protocol_error<E>(err: E) -> SignalBridgeError
where
    E: StdError + Send + Sync + 'static,
{
    SignalBridgeError::Protocol(Box::new(err))
}

#[derive(Debug, Clone)]
/// Builder for [`SignalBridgeClient`].
///
/// All settings are fixed once [`SignalBridgeClientBuilder::build`] returns.
pub struct SignalBridgeClientBuilder {
    token: ApiToken,
    base_url: String,
    timeout: Duration,
    batch_timeout: Duration,
    max_batch_size: usize,
    max_message_length: usize,
    batch_concurrency: usize,
    user_agent: Option<String>,
}

impl SignalBridgeClientBuilder {
    /// Create a builder with the default base URL and limits.
    pub fn new(token: ApiToken) -> Self {
        Self {
            token,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            max_batch_size: MAX_BATCH_SIZE,
            max_message_length: MAX_MESSAGE_LENGTH,
            batch_concurrency: 1,
            user_agent: None,
        }
    }

    /// Read [`TOKEN_ENV`] (required) and [`BASE_URL_ENV`] (optional).
    pub fn from_env() -> Result<Self, SignalBridgeError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SignalBridgeError> {
        let token = lookup(TOKEN_ENV)
            .ok_or_else(|| SignalBridgeError::Config(format!("{TOKEN_ENV} is not set")))?;
        let token = ApiToken::new(token)
            .map_err(|_| SignalBridgeError::Config(format!("{TOKEN_ENV} is empty")))?;

        let mut builder = Self::new(token);
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|it| !it.trim().is_empty()) {
            builder = builder.base_url(base_url);
        }
        Ok(builder)
    }

    /// Override the API base URL, e.g. `https://gateway.example/api`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Timeout applied to every request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Timeout for the gateway batch endpoint, which takes longer to answer.
    pub fn batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = timeout;
        self
    }

    /// Largest accepted batch; values below 1 are treated as 1.
    pub fn max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max.max(1);
        self
    }

    /// Longest accepted message body in characters; values below 1 are treated as 1.
    pub fn max_message_length(mut self, max: usize) -> Self {
        self.max_message_length = max.max(1);
        self
    }

    /// Number of sends a client-side batch keeps in flight; `1` sends sequentially.
    pub fn batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`SignalBridgeClient`].
    pub fn build(self) -> Result<SignalBridgeClient, SignalBridgeError> {
        let base_url = parse_base_url(&self.base_url)?;

        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().map_err(SignalBridgeError::HttpClient)?;

        Ok(SignalBridgeClient {
            token: self.token,
            base_url,
            batch_timeout: self.batch_timeout,
            max_batch_size: self.max_batch_size,
            max_message_length: self.max_message_length,
            batch_concurrency: self.batch_concurrency,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

/// Parse the base URL and make sure relative endpoint paths are appended to it.
fn parse_base_url(raw: &str) -> Result<Url, SignalBridgeError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|err| SignalBridgeError::Config(format!("invalid base URL {raw:?}: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(SignalBridgeError::Config(format!(
            "invalid base URL {raw:?}: not a hierarchical URL"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(Clone)]
/// High-level SignalBridge client.
///
/// Every call builds one request, sends it once (no internal retries), and classifies the
/// response. Clones share the same connection pool; separate clients share nothing.
pub struct SignalBridgeClient {
    token: ApiToken,
    base_url: Url,
    batch_timeout: Duration,
    max_batch_size: usize,
    max_message_length: usize,
    batch_concurrency: usize,
    http: Arc<dyn HttpTransport>,
}

impl SignalBridgeClient {
    /// Create a client with default settings.
    ///
    /// For more customization, use [`SignalBridgeClient::builder`].
    pub fn new(token: ApiToken) -> Result<Self, SignalBridgeError> {
        SignalBridgeClientBuilder::new(token).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(token: ApiToken) -> SignalBridgeClientBuilder {
        SignalBridgeClientBuilder::new(token)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    /// Send a single message.
    ///
    /// Errors:
    /// - [`SignalBridgeError::Validation`] when the body exceeds the configured maximum
    ///   (no request is made),
    /// - [`SignalBridgeError::Gateway`] with the classified [`Failure`],
    /// - [`SignalBridgeError::Protocol`] when a 2xx body lacks `data.id`/`data.status`.
    pub async fn send_one(&self, message: &Message) -> Result<Delivery, SignalBridgeError> {
        self.check_length(message)?;
        let payload = crate::transport::encode_message(message).map_err(protocol_error)?;

        let response = self
            .call(HttpMethod::Post, SEND_PATH, &[], Some(payload), None)
            .await?;

        crate::transport::decode_delivery(&response.body).map_err(protocol_error)
    }

    /// Fetch the balance for `currency`.
    pub async fn get_balance(&self, currency: &Currency) -> Result<BalanceSnapshot, SignalBridgeError> {
        let query = [(Currency::FIELD.to_owned(), currency.as_str().to_owned())];
        let response = self
            .call(HttpMethod::Get, BALANCE_PATH, &query, None, None)
            .await?;

        crate::transport::decode_balance(&response.body).map_err(protocol_error)
    }

    /// Fetch the account-wide balance summary.
    pub async fn get_balance_summary(&self) -> Result<BalanceSummary, SignalBridgeError> {
        let response = self
            .call(HttpMethod::Get, BALANCE_SUMMARY_PATH, &[], None, None)
            .await?;

        crate::transport::decode_balance_summary(&response.body).map_err(protocol_error)
    }

    /// Fetch one page of transaction history.
    pub async fn get_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<TransactionPage, SignalBridgeError> {
        query.validate()?;
        let params = crate::transport::encode_transaction_query(query);
        let response = self
            .call(HttpMethod::Get, TRANSACTIONS_PATH, &params, None, None)
            .await?;

        crate::transport::decode_transactions(&response.body).map_err(protocol_error)
    }

    /// List API tokens registered for the account.
    pub async fn list_tokens(&self) -> Result<Vec<TokenInfo>, SignalBridgeError> {
        let response = self
            .call(HttpMethod::Get, TOKENS_PATH, &[], None, None)
            .await?;

        crate::transport::decode_tokens(&response.body).map_err(protocol_error)
    }

    /// Revoke the token this client authenticates with. Later calls will fail with `NoClient`.
    pub async fn revoke_current_token(&self) -> Result<Acknowledgement, SignalBridgeError> {
        let response = self
            .call(HttpMethod::Delete, CURRENT_TOKEN_PATH, &[], None, None)
            .await?;

        crate::transport::decode_acknowledgement(&response.body).map_err(protocol_error)
    }

    /// Segment `body` against this client's maximum message length.
    pub fn segments(&self, body: &str) -> Result<Segmentation, ValidationError> {
        crate::domain::segment_with_limit(body, self.max_message_length)
    }

    /// Estimate the cost of `body` at `price_per_segment`.
    pub fn estimate_cost(
        &self,
        body: &str,
        price_per_segment: Money,
    ) -> Result<CostEstimate, ValidationError> {
        crate::domain::estimate_cost_with_limit(body, price_per_segment, self.max_message_length)
    }

    /// Estimate the cost of `body` at the account's current segment price for `currency`.
    ///
    /// The body is validated before the balance is fetched.
    pub async fn estimate_cost_with_balance(
        &self,
        body: &str,
        currency: &Currency,
    ) -> Result<CostEstimate, SignalBridgeError> {
        self.segments(body)?;
        let snapshot = self.get_balance(currency).await?;
        Ok(self.estimate_cost(body, snapshot.segment_price)?)
    }

    fn check_length(&self, message: &Message) -> Result<(), ValidationError> {
        let actual = message.body().char_count();
        if actual > self.max_message_length {
            return Err(ValidationError::TooLong {
                field: MessageText::FIELD,
                max: self.max_message_length,
                actual,
            });
        }
        Ok(())
    }

    fn endpoint(&self, path: &str, query: &[(String, String)]) -> Result<Url, SignalBridgeError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| SignalBridgeError::Config(format!("invalid endpoint {path:?}: {err}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send one request and classify the outcome; only accepted responses are returned.
    async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        json: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, SignalBridgeError> {
        let url = self.endpoint(path, query)?;
        tracing::debug!(?method, %url, "sending SignalBridge request");

        let request = HttpRequest {
            method,
            url,
            authorization: self.token.bearer(),
            json,
            timeout,
        };

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                let failure = classify::transport_failure(&*err);
                tracing::warn!(path, error = %err, "SignalBridge transport failure");
                return Err(SignalBridgeError::Gateway(failure));
            }
        };

        if let Err(failure) = classify(Ok(&response)) {
            tracing::warn!(
                path,
                status = response.status,
                kind = ?failure.kind(),
                message = failure.message(),
                "SignalBridge request failed"
            );
            return Err(SignalBridgeError::Gateway(failure));
        }

        Ok(response)
    }
}
