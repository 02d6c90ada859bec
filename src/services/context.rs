//! Shared plumbing for service implementations.

use crate::auth::AuthManager;
use crate::errors::{TeamsError, TeamsResult};
use crate::resilience::RequestExecutor;
use crate::transport::{HttpTransport, TransportRequest};
use crate::types::ListResponse;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Transport, credentials and executor shared by every service
#[derive(Clone)]
pub struct ServiceContext {
    transport: Arc<dyn HttpTransport>,
    auth: AuthManager,
    base_url: String,
    executor: Arc<RequestExecutor>,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth: AuthManager,
        base_url: String,
        executor: Arc<RequestExecutor>,
    ) -> Self {
        Self {
            transport,
            auth,
            base_url,
            executor,
        }
    }

    /// Build the full URL for a path
    pub fn build_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Executor used for every call
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Send a request through the executor and decode the body.
    ///
    /// Decoding happens inside the attempt, so a malformed body is retried
    /// and finally reported as a `ParsingError`.
    pub async fn send<T>(
        &self,
        endpoint: &str,
        request: TransportRequest,
        cancel: &CancellationToken,
    ) -> TeamsResult<T>
    where
        T: DeserializeOwned,
    {
        let transport = self.transport.clone();

        self.executor
            .execute(endpoint, cancel, |attempt| {
                let transport = transport.clone();
                let request = request.clone();
                async move {
                    let value = tokio::select! {
                        biased;
                        _ = attempt.cancelled() => return Err(TeamsError::Cancelled),
                        result = transport.send(request) => result?,
                    };
                    serde_json::from_value::<T>(value).map_err(TeamsError::from)
                }
            })
            .await
    }

    /// GET a single resource
    pub async fn get<T>(
        &self,
        endpoint: &str,
        path: &str,
        query: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> TeamsResult<T>
    where
        T: DeserializeOwned,
    {
        let headers = self.auth.headers().await?;
        let request = query.iter().fold(
            TransportRequest::get(self.build_url(path), headers),
            |request, (name, value)| request.query(*name, *value),
        );
        self.send(endpoint, request, cancel).await
    }

    /// POST a JSON body
    pub async fn post<T>(
        &self,
        endpoint: &str,
        path: &str,
        body: Value,
        cancel: &CancellationToken,
    ) -> TeamsResult<T>
    where
        T: DeserializeOwned,
    {
        let headers = self.auth.headers().await?;
        let request = TransportRequest::post(self.build_url(path), headers, body);
        self.send(endpoint, request, cancel).await
    }

    /// GET every page of a collection, following `@odata.nextLink`
    pub async fn list_all<T>(
        &self,
        endpoint: &str,
        path: &str,
        query: &[(&str, &str)],
        cancel: &CancellationToken,
    ) -> TeamsResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut page: ListResponse<T> = self.get(endpoint, path, query, cancel).await?;
        let mut items = std::mem::take(&mut page.value);

        while let Some(next_link) = page.next_link.take().filter(|link| !link.is_empty()) {
            let headers = self.auth.headers().await?;
            page = self
                .send(endpoint, TransportRequest::get(next_link, headers), cancel)
                .await?;
            items.append(&mut page.value);
        }

        Ok(items)
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish()
    }
}
