//! Mesa Server - 餐厅预订服务
//!
//! # 架构概述
//!
//! - **HTTP API** (`api`): 预订相关的 RESTful 接口
//! - **数据库** (`db`): 三种可互换的持久化后端
//!   (嵌入式 SurrealDB 文档存储 / 原生 SQL PostgreSQL / SeaORM)
//! - **核心** (`core`): 配置、状态、服务器
//!
//! # 模块结构
//!
//! ```text
//! mesa-server/src/
//! ├── core/          # 配置、状态、服务器启动
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (store 分发 + 三个后端)
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, DatabaseBackend, Server, ServerState};
pub use db::{ReservationStore, StoreError};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env and initialize logging. Called once from main.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(level.as_deref(), std::env::var("LOG_DIR").ok().as_deref());
    Ok(())
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
