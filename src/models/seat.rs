use serde::{Deserialize, Serialize};

use super::price::PriceCategory;

/// Максимум рядов: ряд адресуется одной буквой A..Z.
pub const MAX_ROWS: usize = 26;

/// Максимум мест в ряду.
pub const MAX_COLS: usize = 50;

/// Тип ячейки в схеме зала.
///
/// `SupCouple` - правая половина парного места. Пользователь никогда не
/// выбирает его сам: он всегда стоит справа от `Couple`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Available,
    Vip,
    Couple,
    SupCouple,
    Unavailable,
}

impl SeatType {
    /// Все типы, которые можно выбрать кистью в редакторе.
    pub const PAINTABLE: [SeatType; 4] = [
        SeatType::Available,
        SeatType::Vip,
        SeatType::Couple,
        SeatType::Unavailable,
    ];

    /// Идентификатор типа места на стороне сервера бронирования.
    pub fn id(self) -> i32 {
        match self {
            SeatType::Available => 1,
            SeatType::Vip => 2,
            SeatType::Couple => 3,
            SeatType::Unavailable => 4,
            SeatType::SupCouple => 5,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(SeatType::Available),
            2 => Some(SeatType::Vip),
            3 => Some(SeatType::Couple),
            4 => Some(SeatType::Unavailable),
            5 => Some(SeatType::SupCouple),
            _ => None,
        }
    }

    /// Сохраняются на сервере только обычные, VIP и парные места.
    /// `SupCouple` восстанавливается при загрузке по соседству с `Couple`.
    pub fn is_persisted(self) -> bool {
        matches!(self, SeatType::Available | SeatType::Vip | SeatType::Couple)
    }

    pub fn is_paintable(self) -> bool {
        Self::PAINTABLE.contains(&self)
    }

    pub fn price_category(self) -> Option<PriceCategory> {
        match self {
            SeatType::Available => Some(PriceCategory::Available),
            SeatType::Vip => Some(PriceCategory::Vip),
            SeatType::Couple => Some(PriceCategory::Couple),
            SeatType::SupCouple | SeatType::Unavailable => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeatType::Available => "available",
            SeatType::Vip => "vip",
            SeatType::Couple => "couple",
            SeatType::SupCouple => "supcouple",
            SeatType::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for SeatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Место в формате API сервера бронирования.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRecord {
    // Список мест при загрузке приходит без screenId
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_id: Option<i64>,
    pub row: String,
    pub column: i32,
    pub seat_type_id: i32,
}

impl SeatRecord {
    pub fn new(screen_id: i64, row_index: usize, col_index: usize, seat_type: SeatType) -> Option<Self> {
        let letter = row_letter(row_index)?;
        let column = i32::try_from(col_index).ok()?.checked_add(1)?;
        Some(Self {
            screen_id: Some(screen_id),
            row: letter.to_string(),
            column,
            seat_type_id: seat_type.id(),
        })
    }

    /// 0-based индекс ряда, если буква корректна.
    pub fn row_index(&self) -> Option<usize> {
        let mut chars = self.row.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => row_index(letter),
            _ => None,
        }
    }

    /// 0-based индекс колонки; колонки на сервере нумеруются с 1.
    pub fn col_index(&self) -> Option<usize> {
        if self.column >= 1 {
            Some((self.column - 1) as usize)
        } else {
            None
        }
    }

    /// Совпадение по полям, которые сравнивает проверка изменений.
    pub fn same_position_and_type(&self, other: &SeatRecord) -> bool {
        self.row == other.row
            && self.column == other.column
            && self.seat_type_id == other.seat_type_id
    }
}

pub fn row_letter(index: usize) -> Option<char> {
    if index < MAX_ROWS {
        Some((b'A' + index as u8) as char)
    } else {
        None
    }
}

pub fn row_index(letter: char) -> Option<usize> {
    if letter.is_ascii_uppercase() {
        Some((letter as u8 - b'A') as usize)
    } else {
        None
    }
}

/// Тело запроса сохранения схемы зала.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupSeatsPayload {
    pub rows: usize,
    pub cols: usize,
    pub list_seats: Vec<SeatRecord>,
}
