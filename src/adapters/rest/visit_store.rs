//! REST implementation of VisitStore.
//!
//! Talks to the portal backend:
//!
//! | Call | Request |
//! |------|---------|
//! | list | `GET /visitors` |
//! | contact history | `GET /contacts/:id/visits` |
//! | get | `GET /visitors/:id` |
//! | create | `POST /visitors` |
//! | update | `PUT /visitors/:id` |
//! | delete | `DELETE /visitors/:id` |
//!
//! Bodies are [`VisitRecord`] JSON. Every request carries the bearer token.
//! Records in a listing that fail validation are skipped with a warning so
//! one bad row cannot hide the whole queue.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::domain::foundation::{ContactId, DomainError, ErrorCode, VisitId};
use crate::domain::visit::{Visit, VisitRecord};
use crate::ports::VisitStore;

/// Configuration for the REST store.
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    pub base_url: String,
    token: SecretString,
    pub timeout: Duration,
}

impl RestStoreConfig {
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Visit store backed by the portal's REST API.
pub struct RestVisitStore {
    config: RestStoreConfig,
    client: Client,
}

impl RestVisitStore {
    /// Creates the store and its HTTP client.
    ///
    /// # Errors
    ///
    /// - `InternalError` if the HTTP client cannot be built
    pub fn new(config: RestStoreConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DomainError> {
        request
            .bearer_auth(self.config.token.expose_secret())
            .send()
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::StoreUnavailable,
                    format!("Visit store request failed: {}", e),
                )
            })
    }

    async fn decode_record(response: Response) -> Result<Visit, DomainError> {
        let record: VisitRecord = response.json().await.map_err(decode_error)?;
        Visit::from_record(record)
    }

    async fn decode_list(response: Response) -> Result<Vec<Visit>, DomainError> {
        let records: Vec<VisitRecord> = response.json().await.map_err(decode_error)?;
        Ok(records
            .into_iter()
            .filter_map(|record| {
                let id = record.id.clone();
                match Visit::from_record(record) {
                    Ok(visit) => Some(visit),
                    Err(err) => {
                        tracing::warn!(visit_id = %id, error = %err, "skipping invalid visit record");
                        None
                    }
                }
            })
            .collect())
    }
}

#[async_trait]
impl VisitStore for RestVisitStore {
    async fn list_visits(&self) -> Result<Vec<Visit>, DomainError> {
        let response = self.send(self.client.get(self.url("/visitors"))).await?;
        Self::decode_list(check_status(response, None).await?).await
    }

    async fn list_visits_for_contact(&self, contact_id: &ContactId) -> Result<Vec<Visit>, DomainError> {
        let path = format!("/contacts/{}/visits", contact_id);
        let response = self.send(self.client.get(self.url(&path))).await?;
        Self::decode_list(check_status(response, None).await?).await
    }

    async fn get_visit(&self, id: &VisitId) -> Result<Option<Visit>, DomainError> {
        let path = format!("/visitors/{}", id);
        let response = self.send(self.client.get(self.url(&path))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode_record(check_status(response, Some(id)).await?)
            .await
            .map(Some)
    }

    async fn create_visit(&self, visit: &Visit) -> Result<Visit, DomainError> {
        let request = self.client.post(self.url("/visitors")).json(&visit.to_record());
        let response = self.send(request).await?;
        let stored = Self::decode_record(check_status(response, None).await?).await?;
        tracing::debug!(local_id = %visit.id(), stored_id = %stored.id(), "visit created remotely");
        Ok(stored)
    }

    async fn update_visit(&self, visit: &Visit) -> Result<Visit, DomainError> {
        let path = format!("/visitors/{}", visit.id());
        let request = self.client.put(self.url(&path)).json(&visit.to_record());
        let response = self.send(request).await?;
        Self::decode_record(check_status(response, Some(visit.id())).await?).await
    }

    async fn delete_visit(&self, id: &VisitId) -> Result<(), DomainError> {
        let path = format!("/visitors/{}", id);
        let response = self.send(self.client.delete(self.url(&path))).await?;
        check_status(response, Some(id)).await?;
        Ok(())
    }
}

fn decode_error(e: reqwest::Error) -> DomainError {
    DomainError::new(
        ErrorCode::InternalError,
        format!("Unreadable visit store response: {}", e),
    )
}

/// Maps non-success statuses onto the error vocabulary.
async fn check_status(response: Response, id: Option<&VisitId>) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = format!("Visit store returned {}: {}", status, body.trim());

    let err = match status {
        StatusCode::NOT_FOUND => {
            let err = DomainError::new(ErrorCode::VisitNotFound, message);
            match id {
                Some(id) => err.with_detail("visit_id", id.as_str()),
                None => err,
            }
        }
        StatusCode::UNAUTHORIZED => DomainError::new(ErrorCode::Unauthorized, message),
        StatusCode::FORBIDDEN => DomainError::new(ErrorCode::Forbidden, message),
        s if s.is_client_error() => DomainError::new(ErrorCode::ValidationFailed, message),
        _ => DomainError::new(ErrorCode::StoreUnavailable, message),
    };
    Err(err)
}
