//! 通用 API 响应模型

use chrono::Utc;
use chrono_tz::Asia::Shanghai;
use serde::{Deserialize, Serialize};

/// 获取北京时间（UTC+8）
fn get_beijing_time() -> chrono::DateTime<chrono_tz::Tz> {
    Utc::now().with_timezone(&Shanghai)
}

/// 统一 API 响应结构
///
/// 所有接口返回统一格式：
/// - success: 请求是否成功
/// - data: 响应数据（成功时有值，数据不可用时为 null）
/// - message: 响应消息
/// - timestamp: 响应时间戳（北京时间，ISO 8601 格式）
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
            timestamp: get_beijing_time().to_rfc3339(),
        }
    }

    /// 错误响应，data 为 null
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            timestamp: get_beijing_time().to_rfc3339(),
        }
    }
}
