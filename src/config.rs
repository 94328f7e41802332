//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，LLM 密钥可由环境变量覆盖。
//! 配置在启动时注入各服务，运行期间只读。

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
    /// 上游请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// 资讯抓取超时（毫秒），限制报告链路的最坏延迟
    #[serde(default = "default_news_timeout_ms")]
    pub news_timeout_ms: u64,
}

/// 量化服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantConfig {
    /// 服务地址
    #[serde(default = "default_quant_base_url")]
    pub base_url: String,
    /// 请求超时时间（秒），财务计算较慢
    #[serde(default = "default_quant_timeout")]
    pub timeout_secs: u64,
}

/// LLM 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API Key，可由环境变量 GEMINI_API_KEY 覆盖
    #[serde(default)]
    pub api_key: String,
    /// 接口地址
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// 模型名称
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// 生成超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// API 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 量化服务配置
    #[serde(default)]
    pub quant: QuantConfig,
    /// LLM 配置
    #[serde(default)]
    pub llm: LlmConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_news_timeout_ms() -> u64 { 3500 }
fn default_quant_base_url() -> String { "http://localhost:8000".to_string() }
fn default_quant_timeout() -> u64 { 15 }
fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_llm_model() -> String { "gemini-1.5-pro".to_string() }
fn default_llm_timeout() -> u64 { 120 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            news_timeout_ms: default_news_timeout_ms(),
        }
    }
}

impl Default for QuantConfig {
    fn default() -> Self {
        Self {
            base_url: default_quant_base_url(),
            timeout_secs: default_quant_timeout(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            quant: QuantConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值，最后应用环境变量覆盖
    pub fn load() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        let mut config = Self::default();
        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(loaded) => {
                        log::info!("从 {} 加载配置成功", path);
                        config = loaded;
                        break;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        config.apply_env_overrides();
        config
    }

    /// 环境变量覆盖，便于容器部署时注入密钥
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = env::var("API_KEY") {
            self.api.api_key = key;
        }
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(base) = env::var("GEMINI_BASE_URL") {
            self.llm.base_url = base;
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            self.llm.model = model;
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
