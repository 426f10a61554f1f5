// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hosted backend over HTTP.
//!
//! Talks to the project's auth endpoints (`/auth/v1/...`) and its REST row
//! endpoints (`/rest/v1/<table>`), authenticating every request with the
//! project key plus the session's bearer token. Change subscriptions are
//! delegated to the realtime socket.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use smark_core::{ChannelSpec, Filter, Identity, Query, Row};
use tokio::sync::RwLock;

use super::realtime::{self, RealtimeSettings, SharedSession};
use super::{BoxFuture, ChangeStream, RemoteError, RemoteResult, RemoteStore, SubscriptionHandle};
use crate::credentials::Credentials;

/// Connection settings for the hosted project.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Base URL without trailing slash.
    pub url: String,
    pub anon_key: String,
    pub timeout: Duration,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

/// [`RemoteStore`] backed by the hosted service.
pub struct HttpStore {
    settings: HttpSettings,
    realtime: RealtimeSettings,
    client: Client,
    session: SharedSession,
    next_subscription: AtomicU64,
}

impl HttpStore {
    /// Creates a store. `credentials` is the saved session, if any.
    pub fn new(
        settings: HttpSettings,
        realtime: RealtimeSettings,
        credentials: Option<Credentials>,
    ) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| RemoteError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(HttpStore {
            settings,
            realtime,
            client,
            session: Arc::new(RwLock::new(credentials)),
            next_subscription: AtomicU64::new(0),
        })
    }

    /// Current session tokens. These change when an expired session is refreshed.
    pub async fn credentials(&self) -> Option<Credentials> {
        self.session.read().await.clone()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.url, path)
    }

    async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|c| c.access_token.clone())
    }

    /// Adds the project key and, when signed in, the bearer token.
    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("apikey", &self.settings.anon_key);
        match self.access_token().await {
            Some(token) => request.bearer_auth(token),
            None => request.bearer_auth(&self.settings.anon_key),
        }
    }

    /// Sends an authorized request. On 401 the session is renewed with the
    /// refresh token, and the request is rebuilt and sent once more.
    async fn send_authorized<F>(&self, build: F) -> RemoteResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let response = self.authorize(build()).await.send().await.map_err(network)?;
        if response.status() != StatusCode::UNAUTHORIZED || !self.refresh_session().await? {
            return Ok(response);
        }
        tracing::debug!("retrying with renewed session");
        self.authorize(build()).await.send().await.map_err(network)
    }

    async fn fetch_user(&self) -> RemoteResult<Option<Identity>> {
        let url = self.endpoint("/auth/v1/user");
        let response = self.send_authorized(|| self.client.get(&url)).await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => {
                let body: Value = check(response).await?.json().await.map_err(malformed)?;
                let identity =
                    Identity::from_value(&body).map_err(|e| RemoteError::Malformed(e.to_string()))?;
                Ok(Some(identity))
            }
        }
    }

    /// Exchanges the refresh token for a new session. `false` when there is none.
    async fn refresh_session(&self) -> RemoteResult<bool> {
        let refresh_token = match self.session.read().await.as_ref() {
            Some(Credentials {
                refresh_token: Some(token),
                ..
            }) => token.clone(),
            _ => return Ok(false),
        };

        let response = self
            .client
            .post(self.endpoint("/auth/v1/token?grant_type=refresh_token"))
            .header("apikey", &self.settings.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(network)?;
        if matches!(
            response.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED
        ) {
            tracing::debug!("refresh token rejected");
            return Ok(false);
        }
        let tokens: TokenResponse = check(response).await?.json().await.map_err(malformed)?;

        *self.session.write().await = Some(Credentials {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token.or(Some(refresh_token)),
            expires_at: tokens.expires_at,
        });
        tracing::info!("session refreshed");
        Ok(true)
    }
}

impl RemoteStore for HttpStore {
    fn current_identity(&self) -> BoxFuture<'_, RemoteResult<Option<Identity>>> {
        Box::pin(async move {
            if self.access_token().await.is_none() {
                return Ok(None);
            }
            self.fetch_user().await
        })
    }

    fn query(&self, query: Query) -> BoxFuture<'_, RemoteResult<Vec<Row>>> {
        Box::pin(async move {
            let mut params = vec![("select".to_string(), "*".to_string())];
            if let Some(order) = &query.order {
                params.push(("order".to_string(), order.to_string()));
            }
            let url = self.endpoint(&format!("/rest/v1/{}", query.table));
            let response = self
                .send_authorized(|| self.client.get(&url).query(&params))
                .await?;
            let response = check(response).await?;

            let body: Vec<Value> = response.json().await.map_err(malformed)?;
            body.into_iter()
                .map(|value| match value {
                    Value::Object(row) => Ok(row),
                    other => Err(RemoteError::Malformed(format!("expected a row object, got {other}"))),
                })
                .collect()
        })
    }

    fn insert(&self, table: &str, fields: Row) -> BoxFuture<'_, RemoteResult<()>> {
        let url = self.endpoint(&format!("/rest/v1/{table}"));
        Box::pin(async move {
            let response = self
                .send_authorized(|| {
                    self.client
                        .post(&url)
                        .header("Prefer", "return=minimal")
                        .json(&fields)
                })
                .await?;
            check(response).await?;
            Ok(())
        })
    }

    fn delete(&self, table: &str, filter: Filter) -> BoxFuture<'_, RemoteResult<()>> {
        let url = self.endpoint(&format!("/rest/v1/{table}"));
        Box::pin(async move {
            let params = [(filter.column().to_string(), filter.operand())];
            let response = self
                .send_authorized(|| self.client.delete(&url).query(&params))
                .await?;
            check(response).await?;
            Ok(())
        })
    }

    fn subscribe(
        &self,
        spec: ChannelSpec,
    ) -> BoxFuture<'_, RemoteResult<(SubscriptionHandle, ChangeStream)>> {
        Box::pin(async move {
            let id = self.next_subscription.fetch_add(1, Ordering::Relaxed) + 1;
            realtime::open(self.realtime.clone(), Arc::clone(&self.session), spec, id).await
        })
    }

    fn unsubscribe(&self, mut handle: SubscriptionHandle) -> BoxFuture<'_, RemoteResult<()>> {
        Box::pin(async move {
            handle.stop();
            Ok(())
        })
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> RemoteResult<String> {
        Ok(format!(
            "{}?provider={}&redirect_to={}",
            self.endpoint("/auth/v1/authorize"),
            urlencoding::encode(provider),
            urlencoding::encode(redirect_to)
        ))
    }

    fn sign_out(&self) -> BoxFuture<'_, RemoteResult<()>> {
        Box::pin(async move {
            if self.access_token().await.is_some() {
                let request = self.authorize(self.client.post(self.endpoint("/auth/v1/logout"))).await;
                let response = request.send().await.map_err(network)?;
                if !matches!(
                    response.status(),
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
                ) {
                    check(response).await?;
                }
            }
            *self.session.write().await = None;
            Ok(())
        })
    }
}

fn network(e: reqwest::Error) -> RemoteError {
    RemoteError::Network(e.to_string())
}

fn malformed(e: reqwest::Error) -> RemoteError {
    RemoteError::Malformed(e.to_string())
}

/// Maps error statuses to [`RemoteError`], passing successful responses through.
async fn check(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::Unauthorized(message)),
        _ => Err(RemoteError::Rejected {
            status: status.as_u16(),
            message,
        }),
    }
}

/// Pulls a human-readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
