//! Mesa Reservation Server - 餐厅预订系统服务端
//!
//! # 架构概述
//!
//! 本模块是预订服务端的主入口，提供以下核心功能：
//!
//! - **预订核心** (`booking`): 时段可用性解析、事务化下单、预订生命周期
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **同步总线** (`message`): 资源变更的实时广播 (SSE 输出)
//! - **后台任务** (`services`): 过期时段的定时回收
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT 认证、管理员校验
//! ├── booking/       # 可用性解析、预订写入、生命周期
//! ├── services/      # 定时回收 (sweep)
//! ├── api/           # HTTP 路由和处理器
//! ├── message/       # 同步总线
//! ├── db/            # 数据库层
//! └── utils/         # 错误、日志、时间工具
//! ```

pub mod api;
pub mod auth;
pub mod booking;
pub mod core;
pub mod db;
pub mod message;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use booking::{AvailabilityResolver, BookingError, BookingWriter, ReservationLifecycle};
pub use core::{Config, Server, ServerState};
pub use message::SyncBus;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    __  ___
   /  |/  /__  _________ _
  / /|_/ / _ \/ ___/ __ `/
 / /  / /  __(__  ) /_/ /
/_/  /_/\___/____/\__,_/
    "#
    );
}
