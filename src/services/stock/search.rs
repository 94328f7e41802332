//! 股票搜索聚合
//!
//! 混合搜索策略：并发请求腾讯智能匹配与新浪联想两个上游，
//! 腾讯结果排序质量更高放在前面，新浪结果追加在后——保留它
//! 只为补上北交所（bj 前缀）覆盖。按规范代码去重，先到先得，
//! 总量截断为 10 条。任何一侧失败降级为空列表，不影响另一侧。

use std::collections::HashSet;
use std::time::Duration;

use encoding_rs::{GBK, UTF_8};
use regex::Regex;
use reqwest::Client;

use super::error::FetchResult;
use super::fetch_text;
use crate::models::{Market, SearchResult};

const TENCENT_SUGGEST_API: &str = "https://smartbox.gtimg.cn/s3/?t=all&q=";
const SINA_SUGGEST_API: &str = "https://suggest3.sinajs.cn/suggest/type=&key=";

/// 最终结果条数上限
const MAX_SEARCH_RESULTS: usize = 10;

// 新浪联想记录的证券类型码
const SINA_TYPE_A_SHARE: &str = "11";
const SINA_TYPE_HK: &str = "31";
const SINA_TYPE_US: &str = "41";

/// 搜索股票
///
/// 两个上游并发执行，单侧失败记录日志后按空列表处理
pub async fn search_stocks(client: &Client, query: &str) -> Vec<SearchResult> {
    let (tencent, sina) = tokio::join!(
        fetch_tencent_suggest(client, query),
        fetch_sina_suggest(client, query),
    );

    let tencent = tencent.unwrap_or_else(|e| {
        log::warn!("腾讯搜索失败: {}", e);
        Vec::new()
    });
    let sina = sina.unwrap_or_else(|e| {
        log::warn!("新浪搜索失败: {}", e);
        Vec::new()
    });

    merge_by_code(tencent, sina, MAX_SEARCH_RESULTS)
}

/// 合并两个来源的候选列表
///
/// primary 先入（排序更可信），secondary 追加补充覆盖面；
/// 以规范代码去重，首次出现者保留
fn merge_by_code(
    primary: Vec<SearchResult>,
    secondary: Vec<SearchResult>,
    limit: usize,
) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for item in primary.into_iter().chain(secondary) {
        if seen.insert(item.code.clone()) {
            merged.push(item);
        }
    }

    merged.truncate(limit);
    merged
}

/// 腾讯智能匹配
///
/// 响应为带引号的载荷，记录以 ^ 分隔、字段以 ~ 分隔：
/// v_hint="sz~000858~五粮液~wly~GP-A^hk~00700~..."
async fn fetch_tencent_suggest(client: &Client, query: &str) -> FetchResult<Vec<SearchResult>> {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    let url = format!("{}{}", TENCENT_SUGGEST_API, encoded);
    log::debug!("请求腾讯搜索: {}", url);

    let text = fetch_text(client, &url, UTF_8, Some(Duration::from_secs(5))).await?;
    Ok(parse_tencent_payload(&text))
}

fn parse_tencent_payload(text: &str) -> Vec<SearchResult> {
    let re = Regex::new(r#""([^"]*)""#).unwrap();
    let payload = match re.captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => return Vec::new(),
    };
    // 无结果时载荷为单字符 N
    if payload.is_empty() || payload == "N" {
        return Vec::new();
    }

    payload
        .split('^')
        .filter_map(|record| {
            let parts: Vec<&str> = record.split('~').collect();
            if parts.len() < 3 {
                return None;
            }
            let market = Market::from_lower_tag(parts[0])?;
            let code = parts[1];
            let name = unescape_unicode(parts[2]);

            Some(SearchResult {
                name,
                code: format!("{}.{}", code, market),
                market,
            })
        })
        .collect()
}

/// 名称可能带 \uXXXX 转义，借助 JSON 字符串解析做尽力还原，
/// 失败时退回原始转义串，绝不报错
fn unescape_unicode(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string())
}

/// 新浪联想
///
/// 响应为 GBK 编码、带引号的载荷，记录以 ; 分隔、字段以 , 分隔，
/// 字段 1 为类型码（11=A股 31=港股 41=美股），字段 3 为带市场前缀
/// 的代码。北交所代码主要靠这个来源
async fn fetch_sina_suggest(client: &Client, query: &str) -> FetchResult<Vec<SearchResult>> {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    let url = format!("{}{}", SINA_SUGGEST_API, encoded);
    log::debug!("请求新浪搜索: {}", url);

    let text = fetch_text(client, &url, GBK, Some(Duration::from_secs(5))).await?;
    Ok(parse_sina_payload(&text))
}

fn parse_sina_payload(text: &str) -> Vec<SearchResult> {
    let re = Regex::new(r#""([^"]*)""#).unwrap();
    let payload = match re.captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => return Vec::new(),
    };

    payload
        .split(';')
        .filter_map(|record| {
            let parts: Vec<&str> = record.split(',').collect();
            if parts.len() < 5 {
                return None;
            }
            let sec_type = parts[1];
            let code = parts[2];
            let market_code = parts[3];
            let name = parts[4];

            // 其余类型多与腾讯结果重复，北交所记录无条件放行
            let known_type = matches!(sec_type, SINA_TYPE_A_SHARE | SINA_TYPE_HK | SINA_TYPE_US);
            if !known_type && !market_code.starts_with("bj") {
                return None;
            }

            let market = if market_code.starts_with("sh") {
                Some(Market::SH)
            } else if market_code.starts_with("sz") {
                Some(Market::SZ)
            } else if market_code.starts_with("bj") {
                Some(Market::BJ)
            } else if market_code.starts_with("hk") {
                Some(Market::HK)
            } else if market_code.starts_with("us") {
                Some(Market::US)
            } else if sec_type == SINA_TYPE_US {
                Some(Market::US)
            } else {
                None
            }?;

            Some(SearchResult {
                name: name.to_string(),
                code: format!("{}.{}", code, market),
                market,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, code: &str, market: Market) -> SearchResult {
        SearchResult {
            name: name.to_string(),
            code: code.to_string(),
            market,
        }
    }

    #[test]
    fn test_parse_tencent_payload() {
        let text = r#"v_hint="sz~000858~五粮液~wly~GP-A^hk~00700~\u817e\u8baf\u63a7\u80a1~txkg~GP^us~AAPL~Apple~apple~GP""#;
        let results = parse_tencent_payload(text);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "五粮液");
        assert_eq!(results[0].code, "000858.SZ");
        // 名称中的 \uXXXX 转义被还原
        assert_eq!(results[1].name, "腾讯控股");
        assert_eq!(results[1].code, "00700.HK");
        assert_eq!(results[2].code, "AAPL.US");
        assert_eq!(results[2].market, Market::US);
    }

    #[test]
    fn test_parse_tencent_skips_unknown_market() {
        let text = r#"v_hint="jj~000001~基金~jj~JJ^sh~600519~贵州茅台~gzmt~GP""#;
        let results = parse_tencent_payload(text);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "600519.SH");
    }

    #[test]
    fn test_parse_tencent_empty_marker() {
        assert!(parse_tencent_payload(r#"v_hint="N""#).is_empty());
        assert!(parse_tencent_payload("garbage without quotes").is_empty());
    }

    /// 转义失败时退回原始字符串
    #[test]
    fn test_unescape_unicode_degrades() {
        assert_eq!(unescape_unicode(r"五粮液"), "五粮液");
        assert_eq!(unescape_unicode(r"bad\u"), r"bad\u");
        assert_eq!(unescape_unicode("Apple"), "Apple");
    }

    #[test]
    fn test_parse_sina_payload() {
        let text = concat!(
            r#"var suggestvalue="五粮液,11,000858,sz000858,五粮液,,五粮液,99,1,,;"#,
            r#"贝特瑞,81,835185,bj835185,贝特瑞,,贝特瑞,99,1,,;"#,
            r#"苹果,41,AAPL,usAAPL,苹果公司,,苹果,99,1,,";"#
        );
        let results = parse_sina_payload(text);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].code, "000858.SZ");
        // 北交所记录类型码未知也放行，这是保留新浪来源的原因
        assert_eq!(results[1].code, "835185.BJ");
        assert_eq!(results[1].market, Market::BJ);
        assert_eq!(results[2].code, "AAPL.US");
    }

    #[test]
    fn test_parse_sina_filters_unknown_types() {
        // 类型 85 且非北交所前缀的记录被丢弃
        let text = r#"var suggestvalue="某债券,85,019547,sh019547,某债券,,某债券,99,1,,";"#;
        assert!(parse_sina_payload(text).is_empty());
    }

    #[test]
    fn test_parse_sina_us_type_fallback() {
        // 市场前缀不认识但类型码为美股时按美股处理
        let text = r#"var suggestvalue="特斯拉,41,TSLA,gb_tsla,特斯拉,,特斯拉,99,1,,";"#;
        let results = parse_sina_payload(text);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "TSLA.US");
    }

    /// 两侧重复代码只保留先入的腾讯结果，新浪独有的北交所记录保留
    #[test]
    fn test_merge_dedup_keeps_first() {
        let tencent = vec![result("平安银行", "000001.SZ", Market::SZ)];
        let sina = vec![
            result("平安银行(新浪)", "000001.SZ", Market::SZ),
            result("人民同泰", "920146.BJ", Market::BJ),
        ];

        let merged = merge_by_code(tencent, sina, MAX_SEARCH_RESULTS);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].code, "000001.SZ");
        assert_eq!(merged[0].name, "平安银行");
        assert_eq!(merged[1].code, "920146.BJ");
    }

    #[test]
    fn test_merge_truncates_to_limit() {
        let many: Vec<SearchResult> = (0..15)
            .map(|i| result("股票", &format!("{:06}.SZ", i), Market::SZ))
            .collect();
        let merged = merge_by_code(many, Vec::new(), MAX_SEARCH_RESULTS);
        assert_eq!(merged.len(), MAX_SEARCH_RESULTS);
    }

    /// 实盘探测，仅打印结果
    #[tokio::test]
    async fn test_live_search() {
        println!("\n========== 测试混合搜索 ==========");
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let results = search_stocks(&client, "腾讯").await;
        println!("  共 {} 条候选", results.len());
        for r in &results {
            println!("  【{}】{} - {}", r.market, r.code, r.name);
        }
        assert!(results.len() <= MAX_SEARCH_RESULTS);
    }
}
