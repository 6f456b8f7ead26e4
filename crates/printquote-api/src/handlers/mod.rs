pub mod health;
pub mod slice;
pub mod uploads;
