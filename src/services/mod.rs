pub mod booking_api;
pub mod seat_setup;
