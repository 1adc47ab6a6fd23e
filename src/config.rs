use clap::Parser;
use once_cell::sync::Lazy;

// Scoring constants
pub const MAX_ATTENDANCE_SCORE: f32 = 10.0;
pub const ABSENCE_PENALTY_POINTS: f32 = 2.0;
pub const DEFAULT_MAX_ABSENT_ALLOWED: i32 = 3;

pub const JWT_EXPIRED_TIME: i64 = 86400i64;

pub static APP_CONFIG: Lazy<Config> = Lazy::new(Config::parse);

#[derive(Debug, Parser, Clone)]
pub struct Config {
    #[clap(long, env, default_value_t = 8080)]
    pub port: u16,

    #[clap(long, env, default_value_t = true)]
    pub swagger_enabled: bool,

    #[clap(long, env, default_value = "info")]
    pub log_level: String,

    #[clap(long, env)]
    pub database_url: String,

    #[clap(long, env)]
    pub jwt_secret: String,

    #[clap(long, env, default_value = "*")]
    pub cors_allowed_origins: String,

    #[clap(long, env, default_value = "local")]
    pub app_env: String,
}
