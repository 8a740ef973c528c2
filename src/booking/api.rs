//! Typed HTTP client for the PlanNGo REST API.

use std::{future::Future, pin::Pin};

use reqwest::{Client, RequestBuilder, StatusCode, header::AUTHORIZATION};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::ClientConfig,
    dto::{
        auth::{LoginRequest, LoginResponse, SignupRequest},
        bookings::{BookingWithEvent, CreateBookingRequest},
    },
    models::{Booking, Event, User},
    response::ApiResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, TLS.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Unauthorized - sign in again")]
    Unauthorized,

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    #[error("Response carried no data")]
    MissingData,
}

pub type ClientResult<T> = Result<T, ClientError>;

/// The two backend calls the booking flow depends on.
pub trait BookingBackend: Send + Sync {
    fn fetch_event(&self, id: Uuid) -> Pin<Box<dyn Future<Output = ClientResult<Event>> + Send + '_>>;

    fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Pin<Box<dyn Future<Output = ClientResult<Booking>> + Send + '_>>;
}

/// Filters for `GET /Events`; unset fields are left off the query string.
#[derive(Debug, Default, Clone, Serialize)]
pub struct EventSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Token as returned by login, with or without the `Bearer ` prefix.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub async fn signup(&self, payload: &SignupRequest) -> ClientResult<User> {
        self.send(self.client.post(self.url("/Auth/signup")).json(payload))
            .await
    }

    pub async fn login(&mut self, payload: &LoginRequest) -> ClientResult<LoginResponse> {
        let resp: LoginResponse = self
            .send(self.client.post(self.url("/Auth/login")).json(payload))
            .await?;
        self.token = Some(resp.token.clone());
        Ok(resp)
    }

    pub async fn list_events(&self, search: &EventSearch) -> ClientResult<Vec<Event>> {
        self.send(self.client.get(self.url("/Events")).query(search))
            .await
    }

    pub async fn get_event(&self, id: Uuid) -> ClientResult<Event> {
        self.send(self.client.get(self.url(&format!("/Events/{id}"))))
            .await
    }

    pub async fn post_booking(&self, payload: &CreateBookingRequest) -> ClientResult<Booking> {
        self.send(self.client.post(self.url("/bookings")).json(payload))
            .await
    }

    pub async fn user_bookings(&self, user_id: Uuid) -> ClientResult<Vec<BookingWithEvent>> {
        self.send(
            self.client
                .get(self.url(&format!("/bookings/user/{user_id}"))),
        )
        .await
    }

    pub async fn cancel_booking(&self, id: Uuid) -> ClientResult<Booking> {
        self.send(self.client.delete(self.url(&format!("/bookings/{id}"))))
            .await
    }

    pub async fn profile(&self) -> ClientResult<User> {
        self.send(self.client.get(self.url("/users/profile"))).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) if token.starts_with("Bearer ") => builder.header(AUTHORIZATION, token),
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Send, map the status, and unwrap the `data` field of the envelope.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ClientResult<T> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let envelope = response
                    .json::<ApiResponse<T>>()
                    .await
                    .map_err(|e| ClientError::ResponseParseFailed(e.to_string()))?;
                envelope.data.ok_or(ClientError::MissingData)
            }
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                    .map(|envelope| envelope.message)
                    .unwrap_or(body);
                tracing::warn!(status = status.as_u16(), %message, "api call rejected");
                Err(ClientError::ApiError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

impl BookingBackend for ApiClient {
    fn fetch_event(&self, id: Uuid) -> Pin<Box<dyn Future<Output = ClientResult<Event>> + Send + '_>> {
        Box::pin(self.get_event(id))
    }

    fn create_booking(
        &self,
        request: CreateBookingRequest,
    ) -> Pin<Box<dyn Future<Output = ClientResult<Booking>> + Send + '_>> {
        Box::pin(async move { self.post_booking(&request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = ClientConfig {
            api_base_url: "http://localhost:8081/api/".into(),
            ..ClientConfig::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8081/api");
        assert_eq!(client.url("/Events"), "http://localhost:8081/api/Events");
    }
}
