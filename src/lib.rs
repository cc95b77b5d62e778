pub mod config;
pub mod controllers;
pub mod grid;
pub mod middleware;
pub mod models;
pub mod services;
pub mod sessions;

use std::sync::Arc;

use services::booking_api::{BookingApiClient, BookingApiError};
use sessions::SessionStore;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub booking: BookingApiClient,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: &config::Config) -> Result<Arc<Self>, BookingApiError> {
        let booking = BookingApiClient::from_config(&config.booking, &config.circuit_breaker)?;

        Ok(Arc::new(Self {
            booking,
            sessions: SessionStore::new(),
        }))
    }
}
