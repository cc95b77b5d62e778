use serde::Deserialize;
use std::env;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub booking: BookingConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки сервера бронирования (админский REST API)
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    pub base_url: String,
    // Токен по умолчанию; токен из запроса консоли имеет приоритет
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

fn parsed<T: std::str::FromStr>(name: &str, default: &str) -> T {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{} must be a valid number", name))
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parsed("PORT", "8000"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "seat_setup=debug,tower_http=debug".to_string()),
            },
            booking: BookingConfig {
                base_url: env::var("BOOKING_API_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
                api_token: env::var("BOOKING_API_TOKEN").ok().filter(|t| !t.is_empty()),
                timeout_seconds: parsed("BOOKING_API_TIMEOUT_SECONDS", "30"),
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parsed("CIRCUIT_BREAKER_FAILURE_THRESHOLD", "5"),
                timeout_seconds: parsed("CIRCUIT_BREAKER_TIMEOUT_SECONDS", "60"),
            },
        }
    }
}
