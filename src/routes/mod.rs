pub mod checkin;
pub mod classes;
pub mod health;
pub mod scores;
pub mod sessions;
