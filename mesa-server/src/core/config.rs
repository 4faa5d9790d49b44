use std::path::PathBuf;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/mesa | 工作目录 (嵌入式数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_BACKEND | surreal | 持久化后端: surreal \| postgres \| orm |
/// | DATABASE_URL | - | PostgreSQL 连接串 (postgres/orm 后端必需) |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// DATABASE_BACKEND=postgres DATABASE_URL=postgres://mesa@localhost/mesa cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储嵌入式数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 持久化后端
    pub database_backend: DatabaseBackend,
    /// PostgreSQL 连接串 (仅 postgres/orm 后端使用)
    pub database_url: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
}

/// Persistence backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatabaseBackend {
    /// Embedded SurrealDB document store
    #[default]
    Surreal,
    /// Hand-written SQL over PostgreSQL
    Postgres,
    /// SeaORM over PostgreSQL
    Orm,
}

impl DatabaseBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "surreal" => Some(DatabaseBackend::Surreal),
            "postgres" => Some(DatabaseBackend::Postgres),
            "orm" => Some(DatabaseBackend::Orm),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseBackend::Surreal => "surreal",
            DatabaseBackend::Postgres => "postgres",
            DatabaseBackend::Orm => "orm",
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/mesa".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_backend: std::env::var("DATABASE_BACKEND")
                .ok()
                .and_then(|v| DatabaseBackend::parse(&v))
                .unwrap_or_default(),
            database_url: std::env::var("DATABASE_URL").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 嵌入式数据库目录
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parsing_is_case_insensitive() {
        assert_eq!(DatabaseBackend::parse("Postgres"), Some(DatabaseBackend::Postgres));
        assert_eq!(DatabaseBackend::parse("ORM"), Some(DatabaseBackend::Orm));
        assert_eq!(DatabaseBackend::parse("mongo"), None);
    }
}
