use std::sync::Arc;

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::SyncAction;

use crate::auth::JwtService;
use crate::core::error::{Result, ServerError};
use crate::core::{BackgroundTasks, Config, TaskKind};
use crate::db::DbService;
use crate::message::SyncBus;
use crate::services::SweepService;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是服务端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，克隆成本极低。进程启动时显式构造一次，
/// 之后注入到所有 handler 和后台任务（便于测试时替换内存数据库）。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | sync_bus | SyncBus | 资源变更同步总线 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 同步总线 (资源变更广播)
    pub sync_bus: SyncBus,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(config: Config, db: Surreal<Db>, jwt_service: Arc<JwtService>, sync_bus: SyncBus) -> Self {
        Self {
            config,
            db,
            jwt_service,
            sync_bus,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/mesa.db)
    /// 3. JWT 服务与同步总线
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_dir().join("mesa.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let sync_bus = SyncBus::with_capacity(config.sync_channel_capacity);

        Ok(Self::new(config.clone(), db_service.db, jwt_service, sync_bus))
    }

    /// 创建内存态服务器状态 (测试用)
    ///
    /// 数据库使用内存引擎，不落盘。
    pub async fn in_memory(config: Config) -> Result<Self> {
        let db_service = DbService::memory()
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let sync_bus = SyncBus::with_capacity(config.sync_channel_capacity);
        Ok(Self::new(config, db_service.db, jwt_service, sync_bus))
    }

    /// 注册后台任务
    ///
    /// 必须在 `Server::run()` 中调用。
    ///
    /// 启动的任务：
    /// - 过期时段回收 (SweepService, Periodic)
    pub fn register_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let sweep = SweepService::new(
            self.db.clone(),
            self.sync_bus.clone(),
            std::time::Duration::from_secs(self.config.sweep_interval_secs),
        );
        let token = tasks.shutdown_token();
        tasks.spawn("slot_sweep", TaskKind::Periodic, async move {
            sweep.run(token).await;
        });
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 广播同步消息
    ///
    /// 向所有订阅者广播资源变更通知。
    /// 版本号由同步总线自动递增管理。
    ///
    /// # 参数
    /// - `resource`: 资源类型 (如 "reservation", "time_slot", "menu_item")
    /// - `action`: 变更类型
    /// - `id`: 资源 ID
    /// - `data`: 资源数据 (deleted 时为 None)
    pub fn broadcast_sync<T: Serialize>(
        &self,
        resource: &str,
        action: SyncAction,
        id: &str,
        data: Option<&T>,
    ) {
        self.sync_bus.publish(resource, action, id, data);
    }
}
