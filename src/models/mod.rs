pub mod price;
pub mod screen;
pub mod seat;
pub mod showtime;

pub use price::{PriceCategory, SeatPricesPayload, SeatTypePrice, SeatTypePrices};
pub use screen::{Screen, Theater};
pub use seat::{SeatRecord, SeatType, SetupSeatsPayload, MAX_COLS, MAX_ROWS};
pub use showtime::Showtime;
