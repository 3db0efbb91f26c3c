//! 服务配置
//!
//! 加载顺序：配置文件（`config.toml` 或 `./config/config.toml`，都不存在时使用默认值）
//! -> 环境变量覆盖（`PORT`、`HOST`、`API_KEY`、`LOG_LEVEL`）-> 校验。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 默认查找的配置文件
pub const CONFIG_PATHS: [&str; 2] = ["config.toml", "./config/config.toml"];

/// 服务配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 服务配置
    pub http: HttpConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 认证配置
    pub auth: AuthConfig,
    /// 产品目录配置
    pub catalog: CatalogConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 绑定地址
    pub bind_address: String,
    /// HTTP 服务端口
    pub port: u16,
    /// 请求超时时间（秒）
    pub timeout_seconds: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 修改类接口需要携带的 API key
    pub api_key: String,
}

/// 产品目录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// 启动时是否载入示例产品
    pub seed_products: bool,
    /// 未指定 limit 时的分页大小
    pub default_page_size: usize,
    /// limit 的上限
    pub max_page_size: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            timeout_seconds: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: "secret-api-key".to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_products: true,
            default_page_size: 5,
            max_page_size: 100,
        }
    }
}

impl Config {
    /// 从配置文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::FileWrite(e.to_string()))?;
        }

        fs::write(path.as_ref(), content).map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }

    /// 用环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// 用任意来源覆盖配置，`lookup` 返回 `None` 表示该项未设置
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.http.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Some(host) = lookup("HOST") {
            self.http.bind_address = host;
        }
        if let Some(api_key) = lookup("API_KEY") {
            self.auth.api_key = api_key;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation("http.port must be greater than 0".to_string()));
        }
        if self.http.bind_address.is_empty() {
            return Err(ConfigError::Validation("http.bind_address must not be empty".to_string()));
        }
        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "http.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.auth.api_key.trim().is_empty() {
            return Err(ConfigError::Validation("auth.api_key must not be empty".to_string()));
        }

        if self.catalog.default_page_size == 0 {
            return Err(ConfigError::Validation(
                "catalog.default_page_size must be greater than 0".to_string(),
            ));
        }
        if self.catalog.max_page_size < self.catalog.default_page_size {
            return Err(ConfigError::Validation(format!(
                "catalog.max_page_size ({}) must not be below catalog.default_page_size ({})",
                self.catalog.max_page_size, self.catalog.default_page_size
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "invalid log level: {}, expected one of {:?}",
                self.logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(String),
    #[error("failed to write config file: {0}")]
    FileWrite(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("invalid config: {0}")]
    Validation(String),
}

/// 返回第一个存在的配置文件路径
pub fn find_config_file() -> Option<&'static str> {
    CONFIG_PATHS
        .iter()
        .copied()
        .find(|path| Path::new(path).exists())
}

/// 从文件或默认值加载配置，然后应用环境变量并校验
pub fn load_config() -> Result<Config, ConfigError> {
    let mut config = match find_config_file() {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    config.apply_env_overrides()?;
    config.validate()?;

    Ok(config)
}
