//! HTTP client for the booking backend.
//!
//! Every request goes through one path:
//! 1. Refresh the access token first if it has already expired
//! 2. Send with the bearer token attached
//! 3. On 401, refresh once and resend
//! 4. On transient failures of idempotent requests, back off and retry

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use deskbook_engine::validation::{require_purpose, validate_visitor};
use deskbook_engine::{ProposedWindow, ReservationWindow, ResourceId, ResourceKind, Window};
use rand::Rng;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::ports::{AvailabilityFetcher, BookingSubmitter};
use crate::session::{is_token_expired, Session, User};
use crate::types::{
    AvailabilityResponse, BookingConfirmation, BookingMetadata, BookingRequest,
    CancelBookingRequest, ConflictTicket, DeviceInfo, HealthResponse, LoginRequest, MyBooking,
    RaiseConflictRequest, TokenResponse, VisitorPassRequest, VisitorPassResponse, WfhResponse,
    WorkspaceOccupancy,
};

const AVAILABILITY_PATH: &str = "/employee/check_workspace_availability";
const WORKSPACES_PATH: &str = "/employee/get_workstation";
const BOOK_PATH: &str = "/employee/book_workspace";
const MY_BOOKINGS_PATH: &str = "/employee/my_bookings";
const CANCEL_PATH: &str = "/employee/delete_my_booking";
const RAISE_CONFLICT_PATH: &str = "/employee/raise_conflict";
const VISITOR_PASS_PATH: &str = "/employee/get_visitor_pass";
const WFH_PATH: &str = "/mark_wfh_tomorrow";
const HEALTH_PATH: &str = "/health";
const LOGIN_PATH: &str = "/auth/login";
const ME_PATH: &str = "/auth/me";
const REFRESH_PATH: &str = "/auth/refresh";

/// Cap on the backoff between retries.
const MAX_RETRY_DELAY_MS: u64 = 5_000;

/// Longest error body echoed back in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Whether a failed request may be resent after a transient error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retry {
    Transient,
    Never,
}

/// Client for the workspace-booking backend.
pub struct DeskbookClient {
    http: Client,
    config: ClientConfig,
    session: Arc<Session>,
}

impl DeskbookClient {
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            config,
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    // ── Authentication ──────────────────────────────────────────────────────

    /// Log in, store the access token and load the user profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        info!(email = %email, "Logging in");

        let body = LoginRequest {
            email,
            password,
            device_info: DeviceInfo {
                device_type: "cli",
                browser: self.config.user_agent.clone(),
                os: std::env::consts::OS,
                ip_address: "auto-detect",
            },
        };
        let response = self
            .http
            .post(self.config.endpoint(LOGIN_PATH)?)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let token = response
            .json::<TokenResponse>()
            .await?
            .access_token
            .ok_or_else(|| ClientError::Decode {
                message: "login response carried no access_token".to_string(),
            })?;
        self.session.set_token(token);

        let user: User = self.get_json(ME_PATH, &[]).await?;
        self.session.set_user(user.clone());
        info!(user = %user.email, "Logged in");
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.clear();
        info!("Logged out");
    }

    /// Ask the auth service for a new access token (refresh cookie based).
    ///
    /// Returns `Ok(false)` when the service declines.
    pub async fn refresh_token(&self) -> Result<bool> {
        let response = self
            .http
            .post(self.config.endpoint(REFRESH_PATH)?)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "Token refresh refused");
            return Ok(false);
        }

        match response.json::<TokenResponse>().await?.access_token {
            Some(token) => {
                self.session.set_token(token);
                info!("Access token refreshed");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Refresh, or clear the session and report it expired.
    async fn refresh_or_expire(&self, reason: &str) -> Result<()> {
        match self.refresh_token().await {
            Ok(true) => Ok(()),
            outcome => {
                if let Err(e) = &outcome {
                    warn!(error = %e, "Token refresh failed");
                }
                self.session.clear();
                Err(ClientError::SessionExpired {
                    message: format!("{}; please log in again", reason),
                })
            }
        }
    }

    async fn ensure_fresh_token(&self) -> Result<()> {
        if let Some(token) = self.session.token() {
            if is_token_expired(&token, Utc::now()) {
                debug!("Access token expired, refreshing before request");
                self.refresh_or_expire("access token expired").await?;
            }
        }
        Ok(())
    }

    // ── Request plumbing ────────────────────────────────────────────────────

    async fn execute<F>(&self, path: &str, retry: Retry, build: F) -> Result<Response>
    where
        F: Fn(&Client, Url) -> RequestBuilder + Send + Sync,
    {
        let url = self.config.endpoint(path)?;
        self.ensure_fresh_token().await?;

        let mut retries = 0u32;
        let mut refreshed = false;

        loop {
            let start = Instant::now();
            let mut request = build(&self.http, url.clone());
            if let Some(token) = self.session.token() {
                request = request.bearer_auth(token);
            }

            let result = match request.send().await {
                Ok(response) => check_status(response).await,
                Err(e) => Err(ClientError::from(e)),
            };

            let err = match result {
                Ok(response) => {
                    debug!(
                        path = %path,
                        status = response.status().as_u16(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Request completed"
                    );
                    return Ok(response);
                }
                Err(err) => err,
            };

            if err.needs_reauth() && !refreshed {
                refreshed = true;
                warn!(path = %path, "Unauthorized, refreshing token and retrying once");
                self.refresh_or_expire("unauthorized").await?;
                continue;
            }

            if retry == Retry::Transient && err.is_retryable() && retries < self.config.max_retries {
                retries += 1;
                let delay = self.retry_delay(retries);
                warn!(
                    path = %path,
                    attempt = retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying request"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            return Err(err);
        }
    }

    /// Exponential backoff with 0-20% jitter, capped.
    fn retry_delay(&self, attempt: u32) -> Duration {
        let base = self.config.retry_base_delay.as_millis() as u64;
        let exponential = base.saturating_mul(2u64.pow(attempt.saturating_sub(1).min(5)));
        let capped = exponential.min(MAX_RETRY_DELAY_MS);
        let jitter = rand::thread_rng().gen_range(0..=(capped / 5));
        Duration::from_millis(capped + jitter)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .execute(path, Retry::Transient, |client, url| client.get(url).query(query))
            .await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(path, Retry::Never, |client, url| client.post(url).json(body))
            .await?;
        Ok(response.json::<T>().await?)
    }

    // ── Availability and booking ────────────────────────────────────────────

    /// Existing reservations on `resource` for `date`.
    pub async fn check_availability(
        &self,
        resource: &ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<ReservationWindow>> {
        let date_param = date.format("%Y-%m-%d").to_string();
        info!(resource = %resource, date = %date_param, "Fetching availability");

        let response: AvailabilityResponse = self
            .get_json(
                AVAILABILITY_PATH,
                &[("workspace_ID", resource.as_str()), ("date", &date_param)],
            )
            .await?;
        let reservations = response.into_reservations()?;

        debug!(resource = %resource, count = reservations.len(), "Availability loaded");
        Ok(reservations)
    }

    /// Occupancy of every workspace of one kind.
    pub async fn list_workspaces(&self, kind: ResourceKind) -> Result<Vec<WorkspaceOccupancy>> {
        self.get_json(WORKSPACES_PATH, &[("type", kind.query_name())])
            .await
    }

    /// Send a booking. A 409 from the backend becomes `ClientError::SubmitConflict`.
    pub async fn book(&self, request: &BookingRequest) -> Result<BookingConfirmation> {
        info!(
            resource = %request.workspace_id,
            start = %request.start_time,
            end = %request.end_time,
            "Submitting booking"
        );

        match self.post_json(BOOK_PATH, request).await {
            Err(ClientError::Http { status: 409, message }) => {
                warn!(resource = %request.workspace_id, message = %message, "Backend rejected booking as conflicting");
                Err(ClientError::SubmitConflict { message })
            }
            other => other,
        }
    }

    pub async fn my_bookings(&self) -> Result<Vec<MyBooking>> {
        self.get_json(MY_BOOKINGS_PATH, &[]).await
    }

    pub async fn cancel_booking(&self, booking_id: &str) -> Result<()> {
        info!(booking_id = %booking_id, "Cancelling booking");
        let body = CancelBookingRequest { booking_id };
        self.execute(CANCEL_PATH, Retry::Never, |client, url| client.post(url).json(&body))
            .await?;
        Ok(())
    }

    // ── Other operations ────────────────────────────────────────────────────

    pub async fn mark_wfh_tomorrow(&self) -> Result<WfhResponse> {
        let response = self
            .execute(WFH_PATH, Retry::Never, |client, url| client.post(url))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn raise_conflict(&self, request: &RaiseConflictRequest) -> Result<ConflictTicket> {
        info!(severity = ?request.severity, required_time = %request.required_time, "Raising conflict");
        self.post_json(RAISE_CONFLICT_PATH, request).await
    }

    pub async fn request_visitor_pass(&self, request: &VisitorPassRequest) -> Result<VisitorPassResponse> {
        validate_visitor(&request.visitor_name, &request.visitor_phone)?;

        let response = self
            .execute(VISITOR_PASS_PATH, Retry::Never, |client, url| {
                let form = Form::new()
                    .text("visitor_name", request.visitor_name.clone())
                    .text("visitor_phone", request.visitor_phone.clone())
                    .text("purpose", request.purpose.clone());
                client.post(url).multipart(form)
            })
            .await?;
        Ok(response.json().await?)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_json(HEALTH_PATH, &[]).await
    }
}

/// Turn a non-success response into the matching error.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    if status == StatusCode::UNAUTHORIZED {
        Err(ClientError::Unauthorized { message })
    } else {
        Err(ClientError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

/// Backend error text: a `msg`/`message`/`detail`/`error` JSON field, else the raw body.
fn error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["msg", "message", "detail", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

#[async_trait]
impl AvailabilityFetcher for DeskbookClient {
    async fn fetch_reservations(
        &self,
        resource: &ResourceId,
        date: NaiveDate,
    ) -> Result<Vec<ReservationWindow>> {
        self.check_availability(resource, date).await
    }
}

#[async_trait]
impl BookingSubmitter for DeskbookClient {
    async fn submit_booking(
        &self,
        resource: &ResourceId,
        window: &ProposedWindow,
        metadata: &BookingMetadata,
    ) -> Result<BookingConfirmation> {
        // Hot seats carry a mandatory purpose; elsewhere it is optional.
        let purpose = if resource.kind() == Some(ResourceKind::HotSeat) {
            require_purpose(&metadata.purpose)?.to_string()
        } else {
            metadata.purpose.trim().to_string()
        };

        let request = BookingRequest {
            workspace_id: resource.clone(),
            start_time: window.start(),
            end_time: window.end(),
            purpose,
            date: metadata.date,
            schedule: metadata
                .schedule
                .as_ref()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
        };
        self.book(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(error_message(r#"{"msg":"slot taken"}"#).as_deref(), Some("slot taken"));
        assert_eq!(error_message(r#"{"detail":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(error_message("plain failure").as_deref(), Some("plain failure"));
        assert_eq!(error_message("   "), None);
    }

    #[test]
    fn retry_delay_backoff() {
        let client = DeskbookClient::new(ClientConfig::default(), Arc::new(Session::new())).unwrap();

        let d1 = client.retry_delay(1);
        let d2 = client.retry_delay(2);
        let d3 = client.retry_delay(3);

        // Each roughly doubles (jitter is at most 20%)
        assert!(d2 > d1);
        assert!(d3 > d2);
        assert!(client.retry_delay(30) <= Duration::from_millis(MAX_RETRY_DELAY_MS * 6 / 5));
    }
}
