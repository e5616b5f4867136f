//! 服务器启动错误

use thiserror::Error;

/// 服务器生命周期错误 (启动/关闭阶段)
///
/// 请求处理阶段的错误使用 [`crate::utils::AppError`]。
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database initialization failed: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
