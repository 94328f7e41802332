//! 财务数据模型
//!
//! 两种形态：快照指标（东方财富 push2 接口，展示用字符串），
//! 以及量化服务返回的完整财务数据（数值可空）

use serde::{Deserialize, Serialize};

/// 基本面快照指标
///
/// 所有字段为格式化后的展示字符串，缺失值统一为 `--`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalData {
    /// 市盈率（TTM），亏损股显示 `亏损`
    pub pe_ttm: String,
    /// 市净率
    pub pb: String,
    /// 总市值（带 亿/万 单位）
    pub total_market_cap: String,
    /// 毛利率（该接口暂不提供）
    pub gross_profit_margin: String,
    /// 当日主力净流入（带 亿/万 单位）
    pub main_force_inflow: String,
}

/// 完整财务数据
///
/// 由量化服务计算返回，数值字段缺失时为 null
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalsData {
    /// 股票代码（不带市场后缀）
    pub code: String,
    /// 每股收益
    #[serde(default)]
    pub eps: Option<f64>,
    /// 每股净资产
    #[serde(default)]
    pub bvps: Option<f64>,
    /// 净资产收益率
    #[serde(default)]
    pub roe: Option<f64>,
    /// 总资产报酬率
    #[serde(default)]
    pub roa: Option<f64>,
    /// 营业收入
    #[serde(default)]
    pub revenue: Option<f64>,
    /// 净利润
    #[serde(default)]
    pub net_profit: Option<f64>,
    /// 归母净利润
    #[serde(default)]
    pub net_profit_parent: Option<f64>,
    /// 毛利率
    #[serde(default)]
    pub gross_margin: Option<f64>,
    /// 销售净利率
    #[serde(default)]
    pub net_profit_margin: Option<f64>,
    /// 资产负债率
    #[serde(default)]
    pub debt_ratio: Option<f64>,
    /// 技术指标
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technicals: Option<Technicals>,
    /// 资金流向
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_flow: Option<CapitalFlow>,
}

/// 技术指标子记录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Technicals {
    #[serde(default)]
    pub ma5: Option<f64>,
    #[serde(default)]
    pub ma10: Option<f64>,
    #[serde(default)]
    pub ma20: Option<f64>,
    #[serde(default)]
    pub ma60: Option<f64>,
    #[serde(default)]
    pub ma120: Option<f64>,
    #[serde(default)]
    pub ma250: Option<f64>,
    #[serde(default)]
    pub rsi_6: Option<f64>,
    #[serde(default)]
    pub rsi_12: Option<f64>,
    #[serde(default)]
    pub rsi_24: Option<f64>,
    #[serde(default)]
    pub macd: Option<f64>,
    #[serde(default)]
    pub macd_signal: Option<f64>,
    #[serde(default)]
    pub macd_hist: Option<f64>,
    #[serde(default)]
    pub kdj_k: Option<f64>,
    #[serde(default)]
    pub kdj_d: Option<f64>,
    #[serde(default)]
    pub kdj_j: Option<f64>,
}

/// 资金流向子记录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapitalFlow {
    #[serde(default)]
    pub net_inflow: Option<f64>,
    #[serde(default)]
    pub net_inflow_str: Option<String>,
    #[serde(default)]
    pub net_inflow_ratio: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
}
