//! grid
//!
//! Ядро редактора схемы зала: прямоугольная сетка типов мест.
//!
//! Все операции чистые: берут `&self` и возвращают новую сетку.
//! Сессия редактора просто заменяет старый снимок новым, поэтому
//! пересчет флагов `enabled` и проверка изменений работают со
//! снимками, а не с разделяемым состоянием.
//!
//! Главный инвариант - пары мест: справа от каждого `Couple` стоит
//! `SupCouple`, и слева от каждого `SupCouple` стоит `Couple`.

pub mod reconcile;
pub mod templates;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{SeatRecord, SeatType, SeatTypePrices, MAX_COLS, MAX_ROWS};

/// Размер сетки по умолчанию, если загрузить схему не удалось.
pub const FALLBACK_ROWS: usize = 5;
pub const FALLBACK_COLS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("a couple seat needs two adjacent free seats (row {row}, column {col})")]
    InvalidCouplePlacement { row: usize, col: usize },

    #[error("seat type '{0}' cannot be painted directly")]
    NotPaintable(SeatType),
}

/// Координаты ячейки, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatGrid {
    cells: Vec<Vec<SeatType>>,
}

impl SeatGrid {
    pub fn filled(rows: usize, cols: usize, seat_type: SeatType) -> Self {
        Self {
            cells: vec![vec![seat_type; cols]; rows],
        }
    }

    /// Сетка 5x8 из обычных мест.
    pub fn fallback() -> Self {
        Self::filled(FALLBACK_ROWS, FALLBACK_COLS, SeatType::Available)
    }

    /// Строки разной длины выравниваются по первой строке.
    pub fn from_rows(mut cells: Vec<Vec<SeatType>>) -> Self {
        let cols = cells.first().map(Vec::len).unwrap_or(0);
        for row in cells.iter_mut() {
            row.resize(cols, SeatType::Unavailable);
        }
        Self { cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows() == 0 || self.cols() == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Option<SeatType> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn as_rows(&self) -> &[Vec<SeatType>] {
        &self.cells
    }

    pub fn contains(&self, seat_type: SeatType) -> bool {
        self.cells.iter().flatten().any(|t| *t == seat_type)
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), GridError> {
        if row < self.rows() && col < self.cols() {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
        }
    }

    /// Клик по одной ячейке текущей кистью.
    ///
    /// Парное место ставится только на две свободные соседние ячейки,
    /// иначе ошибка и сетка не меняется. Любой другой тип, попавший на
    /// половину пары, разбивает пару целиком.
    pub fn paint_cell(&self, row: usize, col: usize, seat_type: SeatType) -> Result<SeatGrid, GridError> {
        if !seat_type.is_paintable() {
            return Err(GridError::NotPaintable(seat_type));
        }
        self.check_bounds(row, col)?;

        let mut next = self.clone();
        if !next.apply_to_cell(row, col, seat_type) {
            return Err(GridError::InvalidCouplePlacement { row, col });
        }
        Ok(next)
    }

    /// Закрашивает прямоугольник между двумя углами.
    ///
    /// Ячейки обходятся построчно, и каждая проверка пары смотрит на уже
    /// измененную сетку: пара, поставленная в (i, j), влияет на проверку
    /// в (i, j+1) в том же проходе. Ячейки, где пару поставить нельзя,
    /// пропускаются.
    pub fn paint_zone(&self, start: Cell, end: Cell, seat_type: SeatType) -> Result<SeatGrid, GridError> {
        if !seat_type.is_paintable() {
            return Err(GridError::NotPaintable(seat_type));
        }
        self.check_bounds(start.row, start.col)?;
        self.check_bounds(end.row, end.col)?;

        let (min_row, max_row) = (start.row.min(end.row), start.row.max(end.row));
        let (min_col, max_col) = (start.col.min(end.col), start.col.max(end.col));

        let mut next = self.clone();
        let mut skipped = 0usize;
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                if !next.apply_to_cell(row, col, seat_type) {
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            tracing::debug!("Zone paint skipped {} cells where a couple seat does not fit", skipped);
        }
        Ok(next)
    }

    fn can_place_couple(&self, row: usize, col: usize) -> bool {
        let taken = |t: Option<SeatType>| matches!(t, Some(SeatType::Couple) | Some(SeatType::SupCouple));
        col + 1 < self.cols() && !taken(self.get(row, col)) && !taken(self.get(row, col + 1))
    }

    /// Мутирует только локальную копию внутри `paint_cell`/`paint_zone`.
    /// Возвращает false, если пару поставить нельзя.
    fn apply_to_cell(&mut self, row: usize, col: usize, seat_type: SeatType) -> bool {
        if seat_type == SeatType::Couple {
            if !self.can_place_couple(row, col) {
                return false;
            }
            self.cells[row][col] = SeatType::Couple;
            self.cells[row][col + 1] = SeatType::SupCouple;
            return true;
        }

        let cols = self.cols();
        let line = &mut self.cells[row];
        match line[col] {
            SeatType::Couple => {
                if col + 1 < cols && line[col + 1] == SeatType::SupCouple {
                    line[col + 1] = seat_type;
                }
            }
            SeatType::SupCouple => {
                if col > 0 && line[col - 1] == SeatType::Couple {
                    line[col - 1] = seat_type;
                }
            }
            _ => {}
        }
        line[col] = seat_type;
        true
    }

    /// Меняет размер сетки, сохраняя уже расставленные места.
    ///
    /// Новые ряды и колонки заполняются обычными местами, лишние
    /// отрезаются с конца. Размер ограничен `MAX_ROWS` x `MAX_COLS`. Если последней ячейкой ряда оказалась левая
    /// половина пары, она становится обычным местом.
    pub fn resize(&self, rows: usize, cols: usize) -> SeatGrid {
        let rows = rows.clamp(1, MAX_ROWS);
        let cols = cols.clamp(1, MAX_COLS);

        let mut cells: Vec<Vec<SeatType>> = self
            .cells
            .iter()
            .take(rows)
            .map(|line| {
                let mut line = line.clone();
                line.resize(cols, SeatType::Available);
                if line[cols - 1] == SeatType::Couple {
                    line[cols - 1] = SeatType::Available;
                }
                line
            })
            .collect();
        cells.resize(rows, vec![SeatType::Available; cols]);

        SeatGrid { cells }
    }

    /// Плоский список мест для сохранения: только обычные, VIP и
    /// парные места, построчно.
    pub fn to_seat_records(&self, screen_id: i64) -> Vec<SeatRecord> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(row, line)| {
                line.iter()
                    .enumerate()
                    .filter(|(_, t)| t.is_persisted())
                    .filter_map(move |(col, t)| SeatRecord::new(screen_id, row, col, *t))
            })
            .collect()
    }

    /// Пересчитывает флаги `enabled` полным проходом по сетке.
    /// Цены не трогает.
    pub fn derive_prices(&self, prices: &SeatTypePrices) -> SeatTypePrices {
        let mut next = *prices;
        next.available.enabled = false;
        next.vip.enabled = false;
        next.couple.enabled = false;
        for seat_type in self.cells.iter().flatten() {
            if let Some(category) = seat_type.price_category() {
                next = next.with_enabled(category, true);
            }
        }
        next
    }

    /// Ячейки, нарушающие инвариант пары. Пустой список - сетка корректна.
    pub fn pairing_violations(&self) -> Vec<Cell> {
        let cols = self.cols();
        let mut violations = Vec::new();
        for (row, line) in self.cells.iter().enumerate() {
            for (col, t) in line.iter().enumerate() {
                let broken = match t {
                    SeatType::Couple => col + 1 >= cols || line[col + 1] != SeatType::SupCouple,
                    SeatType::SupCouple => col == 0 || line[col - 1] != SeatType::Couple,
                    _ => false,
                };
                if broken {
                    violations.push(Cell::new(row, col));
                }
            }
        }
        violations
    }
}
