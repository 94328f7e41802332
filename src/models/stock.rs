//! 股票数据模型
//!
//! 定义行情、搜索相关的数据结构

use serde::{Deserialize, Serialize};
use std::fmt;

/// 市场标识
///
/// 规范代码格式为 `代码.市场`，如 `00700.HK`、`600519.SH`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// 香港
    HK,
    /// 美国
    US,
    /// 上海
    SH,
    /// 深圳
    SZ,
    /// 北京
    BJ,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::HK => "HK",
            Market::US => "US",
            Market::SH => "SH",
            Market::SZ => "SZ",
            Market::BJ => "BJ",
        }
    }

    /// 解析规范代码中的大写市场后缀
    pub fn from_suffix(s: &str) -> Option<Market> {
        match s {
            "HK" => Some(Market::HK),
            "US" => Some(Market::US),
            "SH" => Some(Market::SH),
            "SZ" => Some(Market::SZ),
            "BJ" => Some(Market::BJ),
            _ => None,
        }
    }

    /// 解析上游接口返回的小写市场标签（hk/us/sh/sz/bj）
    pub fn from_lower_tag(s: &str) -> Option<Market> {
        match s {
            "hk" => Some(Market::HK),
            "us" => Some(Market::US),
            "sh" => Some(Market::SH),
            "sz" => Some(Market::SZ),
            "bj" => Some(Market::BJ),
            _ => None,
        }
    }

    /// 行情接口使用的小写前缀，如 `hk00700` 中的 `hk`
    pub fn lower_prefix(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 实时行情快照
///
/// 价格字段保留上游返回的字符串形式，不做数值转换
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockQuote {
    /// 股票名称
    pub name: String,
    /// 规范代码（带市场后缀）
    pub code: String,
    /// 当前价格
    pub price: String,
    /// 涨跌幅，非负值带 `+` 号，如 `+1.23%`
    pub change: String,
    /// 涨跌额
    pub change_value: String,
    /// 市场标识
    pub market: Market,
}

/// 搜索候选结果，以规范代码去重
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// 股票名称
    pub name: String,
    /// 规范代码，如 `00700.HK`
    pub code: String,
    /// 市场标识
    pub market: Market,
}

/// 搜索查询参数
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// 查询关键字（名称、拼音缩写或代码片段）
    #[serde(default)]
    pub q: String,
}
