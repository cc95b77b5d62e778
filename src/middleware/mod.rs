use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};

/// Bearer-токен администратора из запроса консоли.
///
/// Сам сервис токен не проверяет: он передается серверу бронирования,
/// который и решает, пускать ли запрос. Без заголовка используется
/// токен из конфигурации.
#[derive(Debug, Clone, Default)]
pub struct AdminToken(pub Option<String>);

impl<S> FromRequestParts<S> for AdminToken
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Получаем заголовок Authorization
        let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(AdminToken(None));
        };

        let value = value.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

        // Принимаем только Bearer
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AdminToken(Some(token.to_string())))
    }
}
