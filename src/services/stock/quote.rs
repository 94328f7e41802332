//! 实时行情抓取
//!
//! 对接腾讯行情接口 https://qt.gtimg.cn/q=<市场><代码>
//! 响应为单行 JS 赋值语句，字段以 ~ 分隔，GBK 编码——
//! 必须先按 GBK 解码字节流再切分字段，否则中文名称静默乱码

use encoding_rs::GBK;
use regex::Regex;
use reqwest::Client;

use super::code;
use super::error::{FetchError, FetchResult};
use super::fetch_text;
use crate::models::{Market, StockQuote};

const TENCENT_QUOTE_API: &str = "https://qt.gtimg.cn/q=";

// 各市场字段位置略有差异，以下为通用下标
const FIELD_NAME: usize = 1;
const FIELD_PRICE: usize = 3;
const FIELD_CHANGE_VALUE: usize = 31;
const FIELD_CHANGE_PERCENT: usize = 32;

/// 少于该字段数视为无法识别的响应
const MIN_FIELDS: usize = 30;

/// 获取单只股票的实时行情
///
/// 输入允许缺少市场后缀，内部先做规范化。
/// 任何网络、解码或格式错误都以 Err 返回，由调用方降级
pub async fn get_stock_quote(client: &Client, raw_code: &str) -> FetchResult<StockQuote> {
    let full_code = code::normalize_code(raw_code);
    let (symbol, market) = code::split_code(&full_code)
        .ok_or_else(|| FetchError::Format(format!("无法识别代码: {}", raw_code)))?;

    let url = format!(
        "{}{}",
        TENCENT_QUOTE_API,
        code::quote_query_key(&symbol, market)
    );
    log::debug!("请求实时行情: {}", url);

    let text = fetch_text(client, &url, GBK, None).await?;
    parse_quote_line(&text, &full_code, market)
}

/// 解析行情赋值行
///
/// 格式: v_hk00700="100~腾讯控股~00700~385.200~..."
fn parse_quote_line(text: &str, full_code: &str, market: Market) -> FetchResult<StockQuote> {
    let re = Regex::new(r#"="([^"]*)""#).unwrap();
    let payload = re
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| FetchError::Format("行情响应缺少赋值内容".to_string()))?;

    let fields: Vec<&str> = payload.split('~').collect();
    if fields.len() < MIN_FIELDS {
        return Err(FetchError::Format(format!(
            "行情字段不足: {} 个",
            fields.len()
        )));
    }

    let name = fields[FIELD_NAME].to_string();
    let price = fields[FIELD_PRICE].to_string();
    let change_value = fields
        .get(FIELD_CHANGE_VALUE)
        .copied()
        .unwrap_or("")
        .to_string();
    let change_percent = fields.get(FIELD_CHANGE_PERCENT).copied().unwrap_or("");

    // 非负涨幅补 + 号，负值上游自带 - 号
    let non_negative = change_percent
        .parse::<f64>()
        .map(|v| v >= 0.0)
        .unwrap_or(false);
    let change = format!("{}{}%", if non_negative { "+" } else { "" }, change_percent);

    Ok(StockQuote {
        name,
        code: full_code.to_string(),
        price,
        change,
        change_value,
        market,
    })
}
