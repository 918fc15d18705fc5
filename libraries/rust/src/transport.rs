use crate::config::Config;
use crate::error::Error;
use async_trait::async_trait;
use mockall::automock;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client as HTTPClient;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

const USER_AGENT: &str = concat!("pam/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

/// One call against the API: a path template relative to the base URL, the
/// values substituted into its `{name}` placeholders, and either query
/// parameters or a JSON body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub path_parameters: Vec<(String, String)>,
    pub query_parameters: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    pub fn get(path: &str) -> Self {
        Request {
            method: Method::Get,
            path: path.to_string(),
            ..Default::default()
        }
    }

    pub fn post(path: &str, body: Value) -> Self {
        Request {
            method: Method::Post,
            path: path.to_string(),
            body: Some(body),
            ..Default::default()
        }
    }

    pub fn path_parameter(mut self, name: &str, value: &str) -> Self {
        self.path_parameters
            .push((name.to_string(), value.to_string()));
        self
    }

    pub fn query_parameters(mut self, parameters: Vec<(String, String)>) -> Self {
        self.query_parameters = parameters;
        self
    }

    /// The path template split on `/`, each `{name}` segment replaced by its
    /// raw parameter value.
    pub fn segments(&self) -> Result<Vec<String>, Error> {
        for (name, _) in &self.path_parameters {
            if !self
                .path
                .split('/')
                .any(|segment| placeholder(segment) == Some(name.as_str()))
            {
                return Err(Error::Other(format!(
                    "Path {} has no parameter named {}",
                    self.path, name
                )));
            }
        }

        self.path
            .split('/')
            .map(|segment| match placeholder(segment) {
                Some(name) => self
                    .path_parameters
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| {
                        Error::Other(format!(
                            "Path {} has unresolved parameter {}",
                            self.path, name
                        ))
                    }),
                None => Ok(segment.to_string()),
            })
            .collect()
    }

    /// `base_url` extended by the resolved path. Every segment is
    /// percent-encoded on its own, so a value never adds segments or a query.
    pub fn url(&self, base_url: &Url) -> Result<Url, Error> {
        let segments = self.segments()?;

        let mut url = base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Other(format!("Base URL {base_url} cannot carry a path")))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub text: String,
    /// Parsed body, only present for successful responses.
    pub data: Option<Value>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The parsed payload of a successful response, or the HTTP failure.
    pub fn into_payload(self) -> Result<Value, Error> {
        if !self.is_success() {
            error!(
                "Request failed with status {} {}: {}",
                self.status, self.reason, self.text
            );
            return Err(Error::Http {
                status: self.status,
                reason: self.reason,
                body: self.text,
            });
        }

        self.data
            .ok_or_else(|| Error::Other("Response has no payload".to_string()))
    }
}

#[automock]
#[async_trait]
pub trait Interface: Send + Sync {
    async fn submit(&self, request: Request) -> Result<Response, Error>;
}

/// Submit `request` once and unwrap the payload of a successful response.
pub async fn fetch(client: &dyn Interface, request: Request) -> Result<Value, Error> {
    client.submit(request).await?.into_payload()
}

#[cfg(test)]
pub(crate) fn success(payload: Value) -> Response {
    Response {
        status: 200,
        reason: "OK".to_string(),
        text: payload.to_string(),
        data: Some(payload),
    }
}

#[cfg(test)]
pub(crate) fn failure(status: u16, reason: &str, text: &str) -> Response {
    Response {
        status,
        reason: reason.to_string(),
        text: text.to_string(),
        data: None,
    }
}

#[derive(Clone)]
pub struct Client {
    base_url: Url,
    http_client: HTTPClient,
}

impl Client {
    pub fn new(config: Config) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.access_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Other(format!("Invalid access token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = HTTPClient::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Client {
            base_url: config.base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Interface for Client {
    async fn submit(&self, request: Request) -> Result<Response, Error> {
        let url = request.url(&self.base_url)?;

        debug!("Submitting {:?} {}", request.method, url);

        let mut builder = match request.method {
            Method::Get => self.http_client.get(url),
            Method::Post => self.http_client.post(url),
        };

        if !request.query_parameters.is_empty() {
            builder = builder.query(&request.query_parameters);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let text = response.text().await?;

        let data = if status.is_success() {
            Some(serde_json::from_str(&text)?)
        } else {
            None
        };

        Ok(Response {
            status: status.as_u16(),
            reason,
            text,
            data,
        })
    }
}
