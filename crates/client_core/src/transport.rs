//! HTTP implementation of [`ContactBackend`] for a json-server style API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Contact, ContactId, NewContact},
    error::ApiError,
    protocol::{PageRequest, PageResult, TOTAL_COUNT_HEADER},
};
use tracing::{debug, warn};
use url::Url;

use crate::{error::ClientError, ContactBackend};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct HttpContactBackend {
    http: Client,
    base_url: String,
}

impl HttpContactBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url)
            .map_err(|err| ClientError::InvalidUrl(format!("{base_url}: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "{base_url}: unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    fn user_url(&self, id: ContactId) -> String {
        format!("{}/users/{id}", self.base_url)
    }
}

/// Turns non-2xx responses into [`ApiError`]s, passing successful ones through.
async fn check_status(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let err = ApiError::from_response(status.as_u16(), status.canonical_reason(), &body);
    warn!(status = status.as_u16(), message = %err.message, "backend rejected request");
    Err(ClientError::Backend(err))
}

fn total_count(res: &Response) -> Option<u64> {
    res.headers()
        .get(TOTAL_COUNT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[async_trait]
impl ContactBackend for HttpContactBackend {
    async fn list_contacts(&self, request: &PageRequest) -> Result<PageResult, ClientError> {
        let res = self
            .http
            .get(self.users_url())
            .query(&request.query_pairs())
            .send()
            .await?;
        let res = check_status(res).await?;
        let header_total = total_count(&res);
        let items: Vec<Contact> = res.json().await?;
        let total = match header_total {
            Some(total) => total,
            None => {
                warn!(header = TOTAL_COUNT_HEADER, "missing total count; using page length");
                items.len() as u64
            }
        };
        debug!(
            page = request.page,
            page_size = request.page_size,
            received = items.len(),
            total,
            "listed contacts"
        );
        Ok(PageResult::new(items, total))
    }

    async fn get_contact(&self, id: ContactId) -> Result<Contact, ClientError> {
        let res = self.http.get(self.user_url(id)).send().await?;
        Ok(check_status(res).await?.json().await?)
    }

    async fn create_contact(&self, contact: &NewContact) -> Result<Contact, ClientError> {
        let res = self.http.post(self.users_url()).json(contact).send().await?;
        let created: Contact = check_status(res).await?.json().await?;
        debug!(contact_id = %created.id, "created contact");
        Ok(created)
    }

    async fn delete_contact(&self, id: ContactId) -> Result<(), ClientError> {
        let res = self.http.delete(self.user_url(id)).send().await?;
        check_status(res).await?;
        debug!(contact_id = %id, "deleted contact");
        Ok(())
    }
}
