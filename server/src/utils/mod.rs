//! 工具模块：错误、日志、时间

pub mod error;
pub mod logger;
pub mod time;

pub use error::{AppError, AppResponse};

/// Result type for API handlers
pub type AppResult<T> = Result<T, AppError>;
