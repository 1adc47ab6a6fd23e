pub mod class_repository;
pub mod log_repository;
pub mod score_repository;
pub mod session_repository;

pub use class_repository::ClassRepository;
pub use log_repository::{CheckinMeta, LogRepository};
pub use score_repository::ScoreRepository;
pub use session_repository::SessionRepository;
