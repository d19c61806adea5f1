//! HTTP transport for the hosted backend
//!
//! Thin typed wrapper over `reqwest` covering the three backend surfaces the
//! client consumes: email/password auth, per-table row access with equality
//! filters, and named remote procedures. Row-level security on the backend
//! does the tenant isolation; nothing is enforced here.

use std::sync::RwLock;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use shared::auth::{AuthSession, AuthUser, CredentialsRequest};
use shared::error::{PosError, PosResult};

use crate::config::Config;

/// Typed client for the hosted backend
///
/// Cheap to clone is not needed here; the client is shared behind `Arc` by
/// the session coordinator and the remote source. The bearer token is
/// interior-mutable so one sign-in is visible to every holder.
#[derive(Debug)]
pub struct RestClient {
    client: Client,
    base_url: String,
    anon_key: String,
    schema: String,
    token: RwLock<Option<String>>,
}

impl RestClient {
    /// Create a new client from configuration
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            schema: config.schema.clone(),
            token: RwLock::new(None),
        }
    }

    /// Install the bearer token (after sign-in / session restore)
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("token lock poisoned") = Some(token.into());
    }

    /// Drop the bearer token
    pub fn clear_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    /// Current bearer token, if signed in
    pub fn token(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    fn bearer(&self) -> String {
        // 未登录时用匿名 key 作为 bearer
        self.token().unwrap_or_else(|| self.anon_key.clone())
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", self.bearer()))
            .header("Accept-Profile", &self.schema)
            .header("Content-Profile", &self.schema)
    }

    /// Map a non-success response onto a `PosError`, keeping the backend's
    /// message text intact
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> PosResult<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .or_else(|| v.get("error_description"))
                        .or_else(|| v.get("msg"))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or(body);

            return match status {
                StatusCode::UNAUTHORIZED => Err(PosError::Unauthorized),
                StatusCode::FORBIDDEN => Err(PosError::forbidden(message)),
                StatusCode::NOT_FOUND => Err(PosError::not_found(message)),
                StatusCode::CONFLICT => Err(PosError::conflict(message)),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Err(PosError::validation(message))
                }
                _ => Err(PosError::remote(status.as_u16(), message)),
            };
        }

        if status == StatusCode::NO_CONTENT {
            // 204 carries no body; deserialize from null
            return serde_json::from_value(serde_json::Value::Null).map_err(Into::into);
        }

        response
            .json()
            .await
            .map_err(|e| PosError::transport(e.to_string()))
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> PosResult<T> {
        let response = req
            .send()
            .await
            .map_err(|e| PosError::transport(e.to_string()))?;
        Self::handle_response(response).await
    }

    // ========== Auth API ==========

    /// Sign up a new user
    pub async fn sign_up(&self, email: &str, password: &str) -> PosResult<AuthSession> {
        let body = CredentialsRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.request(Method::POST, "/auth/v1/signup").json(&body))
            .await
    }

    /// Sign in with email/password, returning the issued session
    pub async fn sign_in(&self, email: &str, password: &str) -> PosResult<AuthSession> {
        let body = CredentialsRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session: AuthSession = self
            .send(
                self.request(Method::POST, "/auth/v1/token?grant_type=password")
                    .json(&body),
            )
            .await?;
        self.set_token(&session.access_token);
        Ok(session)
    }

    /// Sign out the current session on the backend
    pub async fn sign_out(&self) -> PosResult<()> {
        let _: serde_json::Value = self
            .send(self.request(Method::POST, "/auth/v1/logout"))
            .await
            .or_else(|e| match e {
                // 后端对已失效 token 返回 401，视为已登出
                PosError::Unauthorized => Ok(serde_json::Value::Null),
                other => Err(other),
            })?;
        self.clear_token();
        Ok(())
    }

    /// Fetch the user behind the current token, if the session is valid
    pub async fn current_user(&self) -> PosResult<AuthUser> {
        if self.token().is_none() {
            return Err(PosError::Unauthorized);
        }
        self.send(self.request(Method::GET, "/auth/v1/user")).await
    }

    // ========== Row API ==========

    fn row_path(table: &str) -> String {
        format!("/rest/v1/{table}")
    }

    fn apply_filters(
        req: reqwest::RequestBuilder,
        columns: &str,
        filters: &[(&str, &str)],
        order: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut req = req.query(&[("select", columns)]);
        for (column, value) in filters {
            req = req.query(&[(*column, format!("eq.{value}"))]);
        }
        if let Some(order) = order {
            req = req.query(&[("order", order)]);
        }
        req
    }

    /// Select rows from a table with equality filters and optional ordering
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        order: Option<&str>,
    ) -> PosResult<Vec<T>> {
        self.select_columns(table, "*", filters, order).await
    }

    /// Select with an explicit column projection (supports embedded joins,
    /// e.g. `"tenant_id,role,permissions,tenant:tenant_id(*)"`)
    pub async fn select_columns<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        filters: &[(&str, &str)],
        order: Option<&str>,
    ) -> PosResult<Vec<T>> {
        let req = Self::apply_filters(
            self.request(Method::GET, &Self::row_path(table)),
            columns,
            filters,
            order,
        );
        self.send(req).await
    }

    /// Insert a row, returning the created representation
    pub async fn insert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        payload: &B,
    ) -> PosResult<T> {
        let rows: Vec<T> = self
            .send(
                self.request(Method::POST, &Self::row_path(table))
                    .header("Prefer", "return=representation")
                    .json(payload),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PosError::remote(200, "insert returned no rows"))
    }

    /// Update the row with the given id, returning the new representation
    pub async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        id: &str,
        payload: &B,
    ) -> PosResult<T> {
        let rows: Vec<T> = self
            .send(
                self.request(Method::PATCH, &Self::row_path(table))
                    .query(&[("id", format!("eq.{id}"))])
                    .header("Prefer", "return=representation")
                    .json(payload),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PosError::not_found(format!("{table} row {id}")))
    }

    /// Delete the row with the given id
    pub async fn delete(&self, table: &str, id: &str) -> PosResult<()> {
        self.send(
            self.request(Method::DELETE, &Self::row_path(table))
                .query(&[("id", format!("eq.{id}"))]),
        )
        .await
    }

    // ========== RPC API ==========

    /// Invoke a named remote procedure
    ///
    /// The result is treated as opaque beyond the envelope error check done
    /// by `handle_response`.
    pub async fn rpc<T: DeserializeOwned, B: Serialize>(
        &self,
        name: &str,
        params: &B,
    ) -> PosResult<T> {
        self.send(
            self.request(Method::POST, &format!("/rest/v1/rpc/{name}"))
                .json(params),
        )
        .await
    }
}
