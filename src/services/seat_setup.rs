//! seat_setup.rs
//!
//! Сессия редактора схемы зала: загрузка с сервера бронирования,
//! правка сетки и цен, проверка изменений и сохранение.
//!
//! Сетка и цены хранятся как неизменяемые снимки: каждое действие
//! строит новый снимок через чистые функции `grid` и заменяет старый.

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::grid::{reconcile, templates::Template, Cell, GridError, SeatGrid};
use crate::models::{
    showtime::screen_has_showtimes, PriceCategory, Screen, SeatRecord, SeatType, SeatTypePrices,
    SetupSeatsPayload,
};
use crate::services::booking_api::{BookingApi, BookingApiError};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("price for '{0}' can only be set when the layout has seats of that type")]
    CategoryDisabled(PriceCategory),

    #[error("price must be a non-negative number")]
    InvalidPrice,

    #[error("please enter a price for: {}", join_categories(.0))]
    MissingPrice(Vec<PriceCategory>),

    #[error("seats cannot be changed once showtimes exist for this screen")]
    ScreenHasShowtimes,

    #[error("saving the seat layout failed: {0}")]
    Submission(BookingApiError),
}

fn join_categories(categories: &[PriceCategory]) -> String {
    categories
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Результат клика по ячейке.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClickOutcome {
    Painted,
    ZoneStarted { start: Cell },
    ZonePainted { start: Cell, end: Cell },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmitOutcome {
    /// Схема и цены совпадают с загруженными, запросов не было.
    NoChanges,
    Saved,
}

#[derive(Debug, Clone)]
pub struct SeatSetupSession {
    screen_id: i64,
    screen: Option<Screen>,
    grid: SeatGrid,
    baseline_seats: Vec<SeatRecord>,
    prices: SeatTypePrices,
    baseline_prices: SeatTypePrices,
    selected_type: SeatType,
    zone_mode: bool,
    start_cell: Option<Cell>,
    end_cell: Option<Cell>,
    template_dialog_open: bool,
    selected_template: Template,
    locked: bool,
    notices: Vec<String>,
}

/// Снимок сессии для консоли.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub screen_id: i64,
    pub screen: Option<Screen>,
    pub rows: usize,
    pub cols: usize,
    pub grid: SeatGrid,
    pub selected_type: SeatType,
    pub zone_mode: bool,
    pub start_cell: Option<Cell>,
    pub template_dialog_open: bool,
    pub selected_template: Template,
    pub prices: SeatTypePrices,
    pub changed: bool,
    pub locked: bool,
    pub notices: Vec<String>,
}

impl SeatSetupSession {
    /// Новая сессия поверх уже готовых данных. Флаги `enabled`
    /// пересчитываются по сетке, базой для сравнения становится сама сетка.
    pub fn new(screen_id: i64, grid: SeatGrid, prices: SeatTypePrices) -> Self {
        let prices = grid.derive_prices(&prices);
        Self {
            screen_id,
            screen: None,
            baseline_seats: grid.to_seat_records(screen_id),
            grid,
            prices,
            baseline_prices: prices,
            selected_type: SeatType::Available,
            zone_mode: false,
            start_cell: None,
            end_cell: None,
            template_dialog_open: false,
            selected_template: Template::Default,
            locked: false,
            notices: Vec::new(),
        }
    }

    /// Загружает схему, цены, сеансы и сам зал параллельно.
    ///
    /// Ошибки загрузки не фатальны: они попадают в `notices`. Без схемы
    /// редактор открывается с сеткой 5x8 и пустой базой сравнения, так что
    /// такую сетку можно сохранить.
    pub async fn load<A: BookingApi>(api: &A, screen_id: i64) -> Self {
        let (prices, seats, showtimes, screen) = tokio::join!(
            api.fetch_seat_prices(screen_id),
            api.fetch_seats(screen_id),
            api.fetch_showtimes(),
            api.fetch_screen(screen_id),
        );
        let mut notices = Vec::new();

        let prices = prices.unwrap_or_else(|e| {
            error!("Failed to load seat prices for screen {}: {}", screen_id, e);
            notices.push(format!("Could not load seat prices: {}", e));
            SeatTypePrices::default()
        });

        let loaded = match seats {
            Ok(seats) => {
                let grid = reconcile::from_seat_records(&seats);
                if grid.is_empty() {
                    warn!("Screen {} has no seats, using default layout", screen_id);
                    notices.push("This screen has no seats yet, showing the default layout".to_string());
                    None
                } else {
                    Some(grid)
                }
            }
            Err(e) => {
                error!("Failed to load seats for screen {}: {}", screen_id, e);
                notices.push(format!("Could not load seats: {}", e));
                None
            }
        };

        let locked = match showtimes {
            Ok(showtimes) => screen_has_showtimes(&showtimes, screen_id),
            Err(e) => {
                error!("Failed to load showtimes: {}", e);
                notices.push(format!("Could not load showtimes: {}", e));
                false
            }
        };

        let screen = screen
            .map_err(|e| {
                warn!("Failed to load screen {}: {}", screen_id, e);
                notices.push(format!("Could not load screen details: {}", e));
            })
            .ok();

        let mut session = match loaded {
            Some(grid) => Self::new(screen_id, grid, prices),
            None => {
                let mut session = Self::new(screen_id, SeatGrid::fallback(), prices);
                session.baseline_seats = Vec::new();
                session
            }
        };
        session.screen = screen;
        session.locked = locked;
        session.notices = notices;

        info!(
            "Seat setup for screen {} loaded: {}x{}, locked={}",
            screen_id,
            session.grid.rows(),
            session.grid.cols(),
            locked
        );
        session
    }

    pub fn screen_id(&self) -> i64 {
        self.screen_id
    }

    pub fn grid(&self) -> &SeatGrid {
        &self.grid
    }

    pub fn prices(&self) -> &SeatTypePrices {
        &self.prices
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn replace_grid(&mut self, grid: SeatGrid) {
        self.prices = grid.derive_prices(&self.prices);
        self.grid = grid;
    }

    pub fn select_type(&mut self, seat_type: SeatType) -> Result<(), SetupError> {
        if !seat_type.is_paintable() {
            return Err(GridError::NotPaintable(seat_type).into());
        }
        self.selected_type = seat_type;
        Ok(())
    }

    /// Клик по ячейке. В режиме зоны первый клик задает начало, второй -
    /// конец; после второго зона закрашивается и выбор сбрасывается.
    pub fn click(&mut self, row: usize, col: usize) -> Result<ClickOutcome, SetupError> {
        if !self.zone_mode {
            let grid = self.grid.paint_cell(row, col, self.selected_type)?;
            self.replace_grid(grid);
            return Ok(ClickOutcome::Painted);
        }

        let cell = Cell::new(row, col);
        match self.start_cell {
            None => {
                if self.grid.get(row, col).is_none() {
                    return Err(GridError::OutOfBounds {
                        row,
                        col,
                        rows: self.grid.rows(),
                        cols: self.grid.cols(),
                    }
                    .into());
                }
                self.start_cell = Some(cell);
                Ok(ClickOutcome::ZoneStarted { start: cell })
            }
            Some(start) => {
                self.end_cell = Some(cell);
                let result = self.grid.paint_zone(start, cell, self.selected_type);
                self.start_cell = None;
                self.end_cell = None;
                self.replace_grid(result?);
                Ok(ClickOutcome::ZonePainted { start, end: cell })
            }
        }
    }

    pub fn toggle_zone_mode(&mut self) -> bool {
        self.zone_mode = !self.zone_mode;
        self.start_cell = None;
        self.end_cell = None;
        self.zone_mode
    }

    pub fn open_template_dialog(&mut self) {
        self.template_dialog_open = true;
    }

    pub fn close_template_dialog(&mut self) {
        self.template_dialog_open = false;
    }

    pub fn choose_template(&mut self, template: Template) {
        self.selected_template = template;
    }

    /// Полностью заменяет сетку выбранным шаблоном текущего размера.
    /// На сервер ничего не отправляет.
    pub fn apply_template(&mut self) {
        let grid = self
            .selected_template
            .generate(self.grid.rows(), self.grid.cols());
        self.replace_grid(grid);
        self.close_template_dialog();
    }

    pub fn resize(&mut self, rows: usize, cols: usize) {
        let grid = self.grid.resize(rows, cols);
        self.replace_grid(grid);
    }

    /// Цену можно менять только у категории, которая есть в сетке.
    pub fn set_price(&mut self, category: PriceCategory, price: f64) -> Result<(), SetupError> {
        if !price.is_finite() || price < 0.0 {
            return Err(SetupError::InvalidPrice);
        }
        if !self.prices.get(category).enabled {
            return Err(SetupError::CategoryDisabled(category));
        }
        self.prices = self.prices.with_price(category, price);
        Ok(())
    }

    /// Поэлементное сравнение с загруженной схемой: порядок важен,
    /// тот же набор мест в другом порядке считается изменением.
    pub fn has_changes(&self) -> bool {
        let seats = self.grid.to_seat_records(self.screen_id);
        let seats_changed = seats.len() != self.baseline_seats.len()
            || seats
                .iter()
                .zip(&self.baseline_seats)
                .any(|(current, initial)| !current.same_position_and_type(initial));

        seats_changed || self.prices != self.baseline_prices
    }

    pub fn validate_prices(&self) -> Result<(), SetupError> {
        let missing = self.prices.missing_prices();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SetupError::MissingPrice(missing))
        }
    }

    pub fn payload(&self) -> SetupSeatsPayload {
        SetupSeatsPayload {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            list_seats: self.grid.to_seat_records(self.screen_id),
        }
    }

    /// Сохраняет схему, затем цены.
    ///
    /// Порядок проверок: сеансы в зале, отсутствие изменений (тогда
    /// запросов нет вовсе), цены включенных категорий. Сессия не меняется,
    /// так что после ошибки сохранение можно повторить.
    pub async fn submit<A: BookingApi>(&self, api: &A) -> Result<SubmitOutcome, SetupError> {
        if self.locked {
            warn!("Screen {} has showtimes, seat layout is locked", self.screen_id);
            return Err(SetupError::ScreenHasShowtimes);
        }
        if !self.has_changes() {
            info!("No changes for screen {}, nothing to save", self.screen_id);
            return Ok(SubmitOutcome::NoChanges);
        }
        self.validate_prices()?;

        let payload = self.payload();
        api.save_seat_layout(self.screen_id, &payload)
            .await
            .map_err(SetupError::Submission)?;
        api.save_seat_prices(self.screen_id, &self.prices)
            .await
            .map_err(SetupError::Submission)?;

        info!(
            "Seat layout for screen {} saved: {} seats",
            self.screen_id,
            payload.list_seats.len()
        );
        Ok(SubmitOutcome::Saved)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            screen_id: self.screen_id,
            screen: self.screen.clone(),
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            grid: self.grid.clone(),
            selected_type: self.selected_type,
            zone_mode: self.zone_mode,
            start_cell: self.start_cell,
            template_dialog_open: self.template_dialog_open,
            selected_template: self.selected_template,
            prices: self.prices,
            changed: self.has_changes(),
            locked: self.locked,
            notices: self.notices.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SeatType::{Available as A, Couple as C, SupCouple as S, Vip as V};

    fn session(rows: Vec<Vec<SeatType>>) -> SeatSetupSession {
        SeatSetupSession::new(1, SeatGrid::from_rows(rows), SeatTypePrices::default())
    }

    #[test]
    fn new_session_is_unchanged() {
        let session = session(vec![vec![A, V]]);
        assert!(!session.has_changes());
        assert!(session.prices().available.enabled);
        assert!(session.prices().vip.enabled);
        assert!(!session.prices().couple.enabled);
    }

    #[test]
    fn click_rescans_enabled_flags() {
        let mut session = session(vec![vec![A, A, A]]);
        session.select_type(SeatType::Couple).unwrap();
        assert_eq!(session.click(0, 0).unwrap(), ClickOutcome::Painted);
        assert_eq!(session.grid().as_rows(), &[vec![C, S, A]]);
        assert!(session.prices().couple.enabled);
        assert!(session.has_changes());

        session.select_type(V).unwrap();
        session.click(0, 1).unwrap();
        session.click(0, 2).unwrap();
        assert!(!session.prices().couple.enabled);
        assert!(!session.prices().available.enabled);
    }

    #[test]
    fn rejected_couple_leaves_session_untouched() {
        let mut session = session(vec![vec![A, C, S]]);
        session.select_type(C).unwrap();
        let before = session.grid().clone();
        assert!(matches!(
            session.click(0, 0),
            Err(SetupError::Grid(GridError::InvalidCouplePlacement { .. }))
        ));
        assert_eq!(session.grid(), &before);
    }

    #[test]
    fn zone_mode_two_clicks() {
        let mut session = session(vec![vec![A, A], vec![A, A]]);
        session.select_type(V).unwrap();
        assert!(session.toggle_zone_mode());

        let first = session.click(0, 1).unwrap();
        assert_eq!(first, ClickOutcome::ZoneStarted { start: Cell::new(0, 1) });
        assert_eq!(session.grid().as_rows(), &[vec![A, A], vec![A, A]]);

        session.click(1, 0).unwrap();
        assert_eq!(session.grid().as_rows(), &[vec![V, V], vec![V, V]]);
        assert_eq!(session.view().start_cell, None);
    }

    #[test]
    fn toggling_zone_mode_resets_start() {
        let mut session = session(vec![vec![A, A]]);
        session.toggle_zone_mode();
        session.click(0, 0).unwrap();
        session.toggle_zone_mode();
        session.toggle_zone_mode();
        assert_eq!(session.view().start_cell, None);
    }

    #[test]
    fn template_replaces_grid_and_closes_dialog() {
        let mut session = session(vec![vec![V; 5]; 4]);
        session.open_template_dialog();
        session.choose_template(Template::Premium);
        session.apply_template();

        assert_eq!(session.grid(), &Template::Premium.generate(4, 5));
        assert!(!session.view().template_dialog_open);
        assert!(session.prices().couple.enabled);
    }

    #[test]
    fn price_requires_enabled_category() {
        let mut session = session(vec![vec![A, A]]);
        assert!(matches!(
            session.set_price(PriceCategory::Vip, 10.0),
            Err(SetupError::CategoryDisabled(PriceCategory::Vip))
        ));
        assert!(matches!(
            session.set_price(PriceCategory::Available, -1.0),
            Err(SetupError::InvalidPrice)
        ));
        session.set_price(PriceCategory::Available, 45.0).unwrap();
        assert_eq!(session.prices().available.price, 45.0);
        assert!(session.has_changes());
    }

    #[test]
    fn missing_price_blocks_validation() {
        let session = session(vec![vec![A, V]]);
        match session.validate_prices() {
            Err(SetupError::MissingPrice(missing)) => {
                assert_eq!(missing, vec![PriceCategory::Available, PriceCategory::Vip])
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn reorder_counts_as_change() {
        let mut session = session(vec![vec![A, V]]);
        session.baseline_seats.reverse();
        assert!(session.has_changes());
    }

    #[test]
    fn resize_back_and_forth_is_not_a_change() {
        let mut session = session(vec![vec![A, A], vec![A, A]]);
        session.resize(3, 2);
        assert!(session.has_changes());
        session.resize(2, 2);
        assert!(!session.has_changes());
    }
}
