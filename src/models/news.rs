//! 新闻数据模型

use serde::{Deserialize, Serialize};

/// 个股资讯条目
///
/// 来自股吧列表页，无独立标识，顺序即热度排序
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    /// 标题
    pub title: String,
    /// 摘要（通常为阅读热度）
    pub summary: String,
    /// 发布日期
    pub date: String,
    /// 来源
    pub source: String,
}
