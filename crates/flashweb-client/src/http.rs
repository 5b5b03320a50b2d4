//! reqwest-backed transport

use crate::error::{Result, TransportError};
use crate::transport::{RawResponse, Transport};
use flashweb_core::{PartValue, TransportPayload};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};

/// Relay endpoint, relative to the console base URL
pub const API_PATH: &str = "api/flashrom";

/// Posts payloads as `multipart/form-data` to a flashweb relay
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport for the console served at `base`
    pub fn new(base: &str) -> Result<Self> {
        Self::with_client(Client::new(), base)
    }

    /// Create a transport with a request timeout
    ///
    /// Without a timeout the platform default applies.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_timeout(base: &str, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base)
    }

    /// Create a transport reusing an existing client
    pub fn with_client(client: Client, base: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base).map_err(|e| TransportError::InvalidUrl(format!("{}: {}", base, e)))?;

        // Treat the base as a directory so joins stay beneath it
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let endpoint = base_url
            .join(API_PATH)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", base, e)))?;

        Ok(Self {
            client,
            base: base_url,
            endpoint,
        })
    }

    /// URL payloads are posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Resolve an artifact URL returned by the relay against the base
    pub fn resolve(&self, artifact_url: &str) -> Result<Url> {
        self.base
            .join(artifact_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", artifact_url, e)))
    }

    /// Fetch a produced artifact
    pub async fn download(&self, artifact_url: &str) -> Result<Vec<u8>> {
        let url = self.resolve(artifact_url)?;
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn to_form(payload: TransportPayload) -> Form {
    payload
        .into_iter()
        .fold(Form::new(), |form, part| match part.value {
            PartValue::Text(text) => form.text(part.name, text),
            PartValue::File { name, bytes } => {
                form.part(part.name, Part::bytes(bytes).file_name(name))
            }
        })
}

impl Transport for HttpTransport {
    async fn send(&self, payload: TransportPayload) -> Result<RawResponse> {
        log::debug!("POST {} ({} parts)", self.endpoint, payload.len());

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(to_form(payload))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        log::debug!("Response status {} ({} bytes)", status, body.len());

        Ok(RawResponse { status, body })
    }
}
