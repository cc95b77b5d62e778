use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theater {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
}

/// Зал (экран) кинотеатра, как его отдает сервер бронирования.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub id: i64,
    #[serde(default)]
    pub screen_number: String,
    #[serde(default)]
    pub total_seats: i64,
    #[serde(default)]
    pub theater: Theater,
}
