use std::sync::Arc;

use crate::core::Config;
use crate::db::ReservationStore;

/// 服务器状态 - 持有配置和持久化后端的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求处理器持有一份克隆。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | store | Arc<ReservationStore> | 所选的持久化后端 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 预订存储 (surreal / postgres / orm)
    pub store: Arc<ReservationStore>,
}

impl ServerState {
    pub fn new(config: Config, store: ReservationStore) -> Self {
        Self {
            config,
            store: Arc::new(store),
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 确保工作目录存在
    /// 2. 连接配置选定的持久化后端
    ///
    /// # Panics
    ///
    /// 后端初始化失败时 panic (启动期致命错误)
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let store = ReservationStore::connect(config)
            .await
            .expect("Failed to initialize reservation store");

        tracing::info!(backend = store.backend_name(), "Reservation store ready");

        Self::new(config.clone(), store)
    }
}
