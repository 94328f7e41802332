//! 基本面数据抓取
//!
//! 两个来源：东方财富 push2 快照接口提供市盈率、市净率、总市值、
//! 主力净流入等展示指标；量化服务提供完整财务数据，这里只做透传。

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::code;
use super::error::{FetchError, FetchResult};
use super::BROWSER_UA;
use crate::models::{FundamentalData, FundamentalsData, Market};

const EASTMONEY_SNAPSHOT_API: &str = "https://push2.eastmoney.com/api/qt/stock/get";

// 快照字段: f162 市盈率(A股/北交所) f164 市盈率(港股) f167 市净率
//           f116 总市值 f135 当日主力净流入
const SNAPSHOT_FIELDS: &str = "f162,f164,f167,f116,f135";

/// 规范代码映射为东财 SecID
///
/// 00700.HK -> 116.00700, 600519.SH -> 1.600519, 000001.SZ -> 0.000001
fn map_to_sec_id(symbol: &str, market: Market) -> String {
    let upper = symbol.to_uppercase();
    match market {
        Market::HK => format!("116.{}", upper),
        Market::SH => format!("1.{}", upper),
        Market::SZ => format!("0.{}", upper),
        Market::US => format!("105.{}", upper),
        Market::BJ => format!("0.{}", symbol),
    }
}

/// 获取基本面快照指标
pub async fn fetch_snapshot(client: &Client, raw_code: &str) -> FetchResult<FundamentalData> {
    let full_code = code::normalize_code(raw_code);
    let (symbol, market) = code::split_code(&full_code)
        .ok_or_else(|| FetchError::Format(format!("无法识别代码: {}", raw_code)))?;
    let sec_id = map_to_sec_id(&symbol, market);
    log::debug!("请求基本面快照 secid: {}", sec_id);

    let response = client
        .get(EASTMONEY_SNAPSHOT_API)
        .query(&[
            ("invt", "2"),
            ("fltt", "2"),
            ("fields", SNAPSHOT_FIELDS),
            ("secid", &sec_id),
        ])
        .header("User-Agent", BROWSER_UA)
        .header("Referer", "https://eastmoney.com")
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    let json: Value = response.json().await?;
    parse_snapshot(&json)
}

fn parse_snapshot(json: &Value) -> FetchResult<FundamentalData> {
    let data = &json["data"];
    if data.is_null() {
        return Err(FetchError::Format("快照响应缺少 data 字段".to_string()));
    }

    // f162 缺失或为 "-" 时退用 f164，仍无有效值按亏损处理
    let pe_ttm = match field_text(&data["f162"]) {
        Some(v) if v != "-" => v,
        _ => field_text(&data["f164"])
            .filter(|v| v != "-")
            .unwrap_or_else(|| "亏损".to_string()),
    };
    let pb = field_text(&data["f167"]).unwrap_or_else(|| "--".to_string());

    Ok(FundamentalData {
        pe_ttm,
        pb,
        total_market_cap: clean_number(&data["f116"]),
        // 该接口不提供毛利率
        gross_profit_margin: "--".to_string(),
        main_force_inflow: clean_number(&data["f135"]),
    })
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// 大数换算为 亿/万 展示串，非法值统一为 `--`
fn clean_number(value: &Value) -> String {
    let num = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() && s != "-" => s.parse::<f64>().ok(),
        _ => None,
    };

    match num {
        Some(v) if v > 100_000_000.0 => format!("{:.2}亿", v / 100_000_000.0),
        Some(v) if v > 10_000.0 => format!("{:.2}万", v / 10_000.0),
        Some(v) => format!("{}", v),
        None => "--".to_string(),
    }
}

/// 获取完整财务数据
///
/// 量化服务接口: GET <base>/fundamentals/<代码>，代码不带市场后缀。
/// 财务计算较慢，超时独立于普通抓取配置
pub async fn fetch_detail(
    client: &Client,
    base_url: &str,
    timeout: Duration,
    raw_code: &str,
) -> FetchResult<FundamentalsData> {
    let full_code = code::normalize_code(raw_code);
    let clean_code = full_code.split('.').next().unwrap_or(&full_code);
    let url = format!("{}/fundamentals/{}", base_url.trim_end_matches('/'), clean_code);
    log::debug!("请求完整财务数据: {}", url);

    let response = client.get(&url).timeout(timeout).send().await?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    Ok(response.json::<FundamentalsData>().await?)
}
