//! 数据抓取错误分类
//!
//! 四类错误在各组件边界统一处理：记录日志后降级为"无数据"，
//! 绝不向上抛出异常。降级动作由调用方（handler / 报告组装）决定。

use thiserror::Error;

/// 抓取结果
pub type FetchResult<T> = Result<T, FetchError>;

/// 上游抓取错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 网络错误或超时
    #[error("上游请求失败: {0}")]
    Upstream(#[from] reqwest::Error),

    /// 非 200 状态码
    #[error("上游返回异常状态码: {0}")]
    Status(reqwest::StatusCode),

    /// 响应格式不符（缺少分隔符、字段不足、JSON 非法）
    #[error("响应格式不符: {0}")]
    Format(String),

    /// 编码假设错误导致的解码失败
    #[error("响应解码失败: {0}")]
    Decode(String),
}

impl FetchError {
    /// 是否为超时错误
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Upstream(e) if e.is_timeout())
    }
}
