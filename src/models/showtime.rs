use serde::{Deserialize, Serialize};

/// Сеанс. Для редактора схемы важен только `screen_id`:
/// зал с сеансами менять нельзя. Остальные поля сервера игнорируются.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Showtime {
    #[serde(default)]
    pub id: Option<i64>,
    // Сеанс без зала не должен ломать разбор всего списка
    #[serde(default)]
    pub screen_id: Option<i64>,
}

pub fn screen_has_showtimes(showtimes: &[Showtime], screen_id: i64) -> bool {
    showtimes.iter().any(|s| s.screen_id == Some(screen_id))
}
