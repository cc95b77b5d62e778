//! booking_api.rs
//!
//! Клиент REST API сервера бронирования (админская часть).
//!
//! Ключевые компоненты:
//! 1.  **CircuitBreaker**: "Автоматический выключатель". После серии сбоев
//!     запросы к серверу временно не отправляются вовсе.
//! 2.  **BookingApi**: трейт с операциями, которые нужны редактору схемы зала.
//!     Сессия редактора зависит только от трейта, поэтому в тестах сервер
//!     подменяется заглушкой.
//! 3.  **BookingApiClient**: реализация трейта поверх `reqwest`. Повторов нет:
//!     ошибка возвращается вызывающему один раз.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{BookingConfig, CircuitBreakerConfig};
use crate::models::{Screen, SeatPricesPayload, SeatRecord, SeatTypePrices, SetupSeatsPayload, Showtime};

/// Состояния "Автоматического выключателя".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Нормальный режим, запросы разрешены.
    Closed,
    /// Запросы запрещены до истечения таймаута.
    Open,
    /// Разрешен пробный запрос.
    HalfOpen,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    failure_count: AtomicU32,
    last_failure: Mutex<Option<Instant>>,
    failure_threshold: u32,
    timeout_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout_seconds: u64) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            last_failure: Mutex::new(None),
            failure_threshold: failure_threshold.max(1),
            timeout_duration: Duration::from_secs(timeout_seconds),
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self::new(config.failure_threshold, config.timeout_seconds)
    }

    /// Можно ли выполнить следующий запрос.
    pub fn can_execute(&self) -> bool {
        match self.get_state() {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let last_failure = *self.last_failure.lock().unwrap_or_else(|e| e.into_inner());
                let expired = last_failure.map_or(true, |at| at.elapsed() >= self.timeout_duration);
                if expired {
                    // Таймаут истек - пропускаем один пробный запрос.
                    *self.state.write().unwrap_or_else(|e| e.into_inner()) = CircuitState::HalfOpen;
                    info!("Circuit breaker transitioning to HalfOpen state");
                }
                expired
            }
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match *state {
            CircuitState::HalfOpen => {
                *state = CircuitState::Closed;
                self.failure_count.store(0, Ordering::Relaxed);
                info!("Circuit breaker recovered - transitioning to Closed state");
            }
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::Relaxed);
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let failure_count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        *self.last_failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        match *state {
            CircuitState::Closed => {
                if failure_count >= self.failure_threshold {
                    *state = CircuitState::Open;
                    error!(
                        "Circuit breaker OPENED - {} failures reached threshold {}",
                        failure_count, self.failure_threshold
                    );
                }
            }
            CircuitState::HalfOpen => {
                *state = CircuitState::Open;
                warn!("Circuit breaker test failed - returning to Open state");
            }
            CircuitState::Open => {}
        }
    }

    pub fn get_state(&self) -> CircuitState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Error)]
pub enum BookingApiError {
    #[error("Circuit breaker is open - booking server temporarily unavailable")]
    CircuitOpen,

    #[error("Booking server request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Booking server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Операции сервера бронирования, которые использует редактор схемы.
pub trait BookingApi: Send + Sync {
    fn fetch_seats(&self, screen_id: i64) -> impl Future<Output = Result<Vec<SeatRecord>, BookingApiError>> + Send;

    fn fetch_seat_prices(&self, screen_id: i64) -> impl Future<Output = Result<SeatTypePrices, BookingApiError>> + Send;

    fn fetch_showtimes(&self) -> impl Future<Output = Result<Vec<Showtime>, BookingApiError>> + Send;

    fn fetch_screen(&self, screen_id: i64) -> impl Future<Output = Result<Screen, BookingApiError>> + Send;

    fn save_seat_layout(
        &self,
        screen_id: i64,
        payload: &SetupSeatsPayload,
    ) -> impl Future<Output = Result<(), BookingApiError>> + Send;

    fn save_seat_prices(
        &self,
        screen_id: i64,
        prices: &SeatTypePrices,
    ) -> impl Future<Output = Result<(), BookingApiError>> + Send;
}

/// HTTP-клиент сервера бронирования.
#[derive(Clone)]
pub struct BookingApiClient {
    base_url: String,
    /// Bearer-токен администратора, если он есть.
    token: Option<String>,
    http_client: reqwest::Client,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl BookingApiClient {
    pub fn from_config(
        config: &BookingConfig,
        breaker: &CircuitBreakerConfig,
    ) -> Result<Self, BookingApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::from_config(breaker)),
        })
    }

    /// Копия клиента с токеном конкретного запроса. Выключатель общий.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            token: token.or_else(|| self.token.clone()),
            ..self.clone()
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.get_state()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Выполняет запрос через выключатель и проверяет статус ответа.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BookingApiError> {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking booking server request");
            return Err(BookingApiError::CircuitOpen);
        }

        let result = match self.authorize(request).send().await {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => {
                let status = response.status().as_u16();
                let message = response.text().await.unwrap_or_default();
                Err(BookingApiError::Status { status, message })
            }
            Err(e) => Err(BookingApiError::Request(e)),
        };

        match &result {
            Ok(_) => self.circuit_breaker.record_success(),
            Err(e) => {
                error!("Booking server request failed: {}", e);
                // 4xx - ответ сервера, а не его недоступность
                if !matches!(e, BookingApiError::Status { status, .. } if *status < 500) {
                    self.circuit_breaker.record_failure();
                }
            }
        }
        result
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BookingApiError> {
        let response = self.execute(self.http_client.get(self.url(path))).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), BookingApiError> {
        self.execute(self.http_client.post(self.url(path)).json(body)).await?;
        Ok(())
    }
}

impl BookingApi for BookingApiClient {
    async fn fetch_seats(&self, screen_id: i64) -> Result<Vec<SeatRecord>, BookingApiError> {
        info!("Fetching seats for screen {}", screen_id);
        self.get_json(&format!("/api/admin/screens/{}/seats", screen_id)).await
    }

    async fn fetch_seat_prices(&self, screen_id: i64) -> Result<SeatTypePrices, BookingApiError> {
        info!("Fetching seat prices for screen {}", screen_id);
        let payload: SeatPricesPayload = self
            .get_json(&format!("/api/admin/seatprices/screen/{}", screen_id))
            .await?;
        Ok(payload.seat_types)
    }

    async fn fetch_showtimes(&self) -> Result<Vec<Showtime>, BookingApiError> {
        self.get_json("/api/admin/showtimes").await
    }

    async fn fetch_screen(&self, screen_id: i64) -> Result<Screen, BookingApiError> {
        self.get_json(&format!("/api/admin/screens/{}", screen_id)).await
    }

    async fn save_seat_layout(&self, screen_id: i64, payload: &SetupSeatsPayload) -> Result<(), BookingApiError> {
        info!(
            "Saving seat layout for screen {}: {}x{}, {} seats",
            screen_id,
            payload.rows,
            payload.cols,
            payload.list_seats.len()
        );
        self.post_json(&format!("/api/admin/screens/{}/setupSeats", screen_id), payload)
            .await
    }

    async fn save_seat_prices(&self, screen_id: i64, prices: &SeatTypePrices) -> Result<(), BookingApiError> {
        info!("Saving seat prices for screen {}", screen_id);
        let payload = SeatPricesPayload { seat_types: *prices };
        self.post_json(&format!("/api/admin/seatprices/screen/{}", screen_id), &payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_opens_after_threshold() {
        let breaker = CircuitBreaker::new(2, 60);
        assert!(breaker.can_execute());
        breaker.record_failure();
        assert_eq!(breaker.get_state(), CircuitState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.get_state(), CircuitState::Open);
        assert!(!breaker.can_execute());
    }

    #[test]
    fn breaker_half_opens_after_timeout() {
        let breaker = CircuitBreaker::new(1, 0);
        breaker.record_failure();
        assert_eq!(breaker.get_state(), CircuitState::Open);

        assert!(breaker.can_execute());
        assert_eq!(breaker.get_state(), CircuitState::HalfOpen);

        breaker.record_success();
        assert_eq!(breaker.get_state(), CircuitState::Closed);
    }

    #[test]
    fn failed_half_open_call_reopens() {
        let breaker = CircuitBreaker::new(1, 0);
        breaker.record_failure();
        assert!(breaker.can_execute());
        breaker.record_failure();
        assert_eq!(breaker.get_state(), CircuitState::Open);
    }
}
