//! Сборка сетки из плоского списка мест, полученного с сервера.

use tracing::warn;

use super::SeatGrid;
use crate::models::{SeatRecord, SeatType, MAX_COLS};

/// Строит сетку по списку мест зала.
///
/// 1. Размер - максимальные ряд и колонка среди мест.
/// 2. Все ячейки по умолчанию `Unavailable`.
/// 3. Каждое место ставится в свою ячейку (неизвестные типы пропускаются).
/// 4. Если в последней колонке есть `Couple`, добавляется колонка,
///    чтобы вторая половина пары поместилась.
/// 5. Справа от каждого `Couple` принудительно ставится `SupCouple`.
/// 6. Один раз отрезаются пустой первый ряд и пустая первая колонка.
///
/// Места за пределами `MAX_COLS` пропускаются. Пара в последней
/// допустимой колонке все равно расширяет сетку на одну колонку.
///
/// Пустой список дает пустую сетку 0x0.
pub fn from_seat_records(records: &[SeatRecord]) -> SeatGrid {
    let positioned: Vec<(usize, usize, i32)> = records
        .iter()
        .filter_map(|seat| match (seat.row_index(), seat.col_index()) {
            (Some(row), Some(col)) if col < MAX_COLS => Some((row, col, seat.seat_type_id)),
            _ => {
                warn!("Skipping seat with invalid position: row={:?}, column={}", seat.row, seat.column);
                None
            }
        })
        .collect();

    let rows = positioned.iter().map(|(r, _, _)| r + 1).max().unwrap_or(0);
    let mut cols = positioned.iter().map(|(_, c, _)| c + 1).max().unwrap_or(0);
    if rows == 0 || cols == 0 {
        return SeatGrid::default();
    }

    let mut cells = vec![vec![SeatType::Unavailable; cols]; rows];
    for (row, col, type_id) in positioned {
        match SeatType::from_id(type_id) {
            Some(seat_type) => cells[row][col] = seat_type,
            None => warn!("Unknown seatTypeId {} at ({}, {})", type_id, row, col),
        }
    }

    if cells.iter().any(|line| line[cols - 1] == SeatType::Couple) {
        cols += 1;
        for line in cells.iter_mut() {
            line.push(SeatType::Unavailable);
        }
    }

    // Восстанавливаем пары слева направо: уже проставленный SupCouple
    // не может стать началом новой пары.
    for line in cells.iter_mut() {
        for col in 0..cols {
            if line[col] == SeatType::Couple && col + 1 < cols {
                line[col + 1] = SeatType::SupCouple;
            }
        }
    }

    trim_leading(cells)
}

/// Убирает первый ряд и первую колонку, если они целиком недоступны.
/// Проверка однократная, не повторяется до первого непустого ряда.
fn trim_leading(mut cells: Vec<Vec<SeatType>>) -> SeatGrid {
    let is_empty = |t: &SeatType| *t == SeatType::Unavailable;

    if cells.first().is_some_and(|line| line.iter().all(is_empty)) {
        cells.remove(0);
    }
    if !cells.is_empty() && cells.iter().all(|line| line.first().is_some_and(is_empty)) {
        for line in cells.iter_mut() {
            line.remove(0);
        }
    }

    SeatGrid::from_rows(cells)
}
