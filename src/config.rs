use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub matcher: MatcherConfig,
    pub cart: CartConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 同时处理的最大请求数
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// 清单匹配参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// 置信度阈值 (0-100)，低于该值视为未匹配
    pub confidence_threshold: u8,
    /// 单次请求允许的最大非空行数
    pub max_lines: usize,
    /// 商品索引快照的有效期（秒），0 表示每次请求重建
    pub catalog_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartConfig {
    pub max_bulk_items: usize,
    pub insert_concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_concurrency: 256,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/grocery".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
            },
            matcher: MatcherConfig::default(),
            cart: CartConfig::default(),
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 60,
            max_lines: 500,
            catalog_ttl_secs: 0,
        }
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            max_bulk_items: 200,
            insert_concurrency: 8,
        }
    }
}

impl AppConfig {
    /// 加载配置：默认值 -> config/default.toml -> APP__* 环境变量 -> SERVER_HOST/SERVER_PORT/DATABASE_URL
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("server.max_concurrency", defaults.server.max_concurrency as i64)?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections as i64)?
            .set_default(
                "database.acquire_timeout_secs",
                defaults.database.acquire_timeout_secs as i64,
            )?
            .set_default(
                "matcher.confidence_threshold",
                defaults.matcher.confidence_threshold as i64,
            )?
            .set_default("matcher.max_lines", defaults.matcher.max_lines as i64)?
            .set_default("matcher.catalog_ttl_secs", defaults.matcher.catalog_ttl_secs as i64)?
            .set_default("cart.max_bulk_items", defaults.cart.max_bulk_items as i64)?
            .set_default("cart.insert_concurrency", defaults.cart.insert_concurrency as i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.matcher.confidence_threshold > 100 {
            return Err(ConfigError::Message(format!(
                "matcher.confidence_threshold must be within 0..=100, got {}",
                self.matcher.confidence_threshold
            )));
        }
        if self.cart.insert_concurrency == 0 || self.server.max_concurrency == 0 {
            return Err(ConfigError::Message(
                "concurrency limits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.matcher.confidence_threshold, 60);
        assert_eq!(config.matcher.catalog_ttl_secs, 0);
    }

    #[test]
    fn threshold_over_100_is_rejected() {
        let mut config = AppConfig::default();
        config.matcher.confidence_threshold = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_insert_concurrency_is_rejected() {
        let mut config = AppConfig::default();
        config.cart.insert_concurrency = 0;
        assert!(config.validate().is_err());
    }
}
