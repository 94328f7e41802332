//! 个股资讯抓取
//!
//! 从东方财富股吧列表页提取最新帖子标题，作为报告生成的检索增强
//! 上下文。页面结构经常改版，解析按三套策略从新到旧依次尝试，
//! 前一套产出为空才进入下一套。全部落空返回空列表，调用方按
//! 无上下文继续，绝不视为致命错误。

use std::time::Duration;

use encoding_rs::UTF_8;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use super::code;
use super::error::FetchResult;
use super::fetch_text;
use crate::models::{Market, NewsItem};

const GUBA_BASE_URL: &str = "https://guba.eastmoney.com";
const NEWS_SOURCE: &str = "EastMoney";

/// 单次抓取保留的条目上限
const MAX_NEWS_ITEMS: usize = 8;
/// 标题中出现该标记的条目视为广告丢弃
const AD_MARKER: &str = "广告";

type NewsParser = fn(&str) -> Vec<NewsItem>;

/// 解析策略表，按从新到旧的页面结构排列
const PARSE_STRATEGIES: &[(&str, NewsParser)] = &[
    ("article_list JSON", parse_article_list_json),
    ("listitem 列表页", parse_listitem_html),
    ("articleh 旧版列表页", parse_articleh_html),
];

/// 获取个股最新资讯
///
/// 超时受独立的 news_timeout 约束，报告生成的整体延迟主要在
/// 大模型调用上，这里不允许拖长
pub async fn fetch_stock_news(
    client: &Client,
    timeout: Duration,
    raw_code: &str,
) -> FetchResult<Vec<NewsItem>> {
    let full_code = code::normalize_code(raw_code);
    let market = code::split_code(&full_code).map(|(_, m)| m);
    let url = guba_list_url(&full_code, market);
    log::debug!("请求个股资讯: {}", url);

    let html = fetch_text(client, &url, UTF_8, Some(timeout)).await?;
    Ok(parse_news_html(&html))
}

/// 推导股吧列表页 URL
///
/// 港股、美股代码带 hk/us 前缀，沪深京直接用数字代码
fn guba_list_url(full_code: &str, market: Option<Market>) -> String {
    let clean_code: String = full_code
        .split('.')
        .next()
        .unwrap_or(full_code)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    match market {
        Some(Market::HK) => format!("{}/list,hk{}.html", GUBA_BASE_URL, clean_code),
        Some(Market::US) => format!("{}/list,us{}.html", GUBA_BASE_URL, clean_code),
        _ => format!("{}/list,{}.html", GUBA_BASE_URL, clean_code),
    }
}

/// 依次尝试各解析策略，首个非空结果即返回
fn parse_news_html(html: &str) -> Vec<NewsItem> {
    for (name, parser) in PARSE_STRATEGIES {
        let items = parser(html);
        if !items.is_empty() {
            log::debug!("资讯解析策略 [{}] 命中 {} 条", name, items.len());
            return items;
        }
    }
    Vec::new()
}

/// 策略一：页面内嵌的 `var article_list = {...}` JSON
///
/// 最可靠的来源，对象的 re 数组即帖子列表
fn parse_article_list_json(html: &str) -> Vec<NewsItem> {
    let re = Regex::new(r"(?s)var\s+article_list\s*=\s*(\{.*?\});").unwrap();
    let json_text = match re.captures(html).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => return Vec::new(),
    };

    let data: serde_json::Value = match serde_json::from_str(json_text) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("article_list JSON 解析失败，回退 HTML 解析: {}", e);
            return Vec::new();
        }
    };

    let mut items = Vec::new();
    let list = data["re"].as_array().cloned().unwrap_or_default();
    for entry in &list {
        if items.len() >= MAX_NEWS_ITEMS {
            break;
        }

        let title = entry["post_title"].as_str().unwrap_or("");
        if title.chars().count() < 4 || title.contains(AD_MARKER) {
            continue;
        }

        let date = entry["post_publish_time"]
            .as_str()
            .and_then(|t| t.split(' ').next())
            .unwrap_or("")
            .to_string();
        let read_count = json_value_text(&entry["post_click_count"]);

        items.push(NewsItem {
            title: title.to_string(),
            summary: format!("(热度: {})", read_count),
            date,
            source: NEWS_SOURCE.to_string(),
        });
    }
    items
}

/// 阅读数字段在不同版本里可能是数字或字符串
fn json_value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// 策略二：新版列表页的 .listitem 节点
fn parse_listitem_html(html: &str) -> Vec<NewsItem> {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse(".listitem").unwrap();
    let title_selector = Selector::parse(".l3 a").unwrap();
    let read_selector = Selector::parse(".l1").unwrap();
    let date_selector = Selector::parse(".l5").unwrap();

    let mut items = Vec::new();
    for el in document.select(&item_selector) {
        if items.len() >= MAX_NEWS_ITEMS {
            break;
        }

        let title = select_text(&el, &title_selector);
        if title.chars().count() < 5 {
            continue;
        }
        let read_count = select_text(&el, &read_selector);
        let date = select_text(&el, &date_selector);

        items.push(NewsItem {
            title,
            summary: format!("(热度: {})", read_count),
            date,
            source: NEWS_SOURCE.to_string(),
        });
    }
    items
}

/// 策略三：旧版列表页的 .articleh 节点，最后兜底
fn parse_articleh_html(html: &str) -> Vec<NewsItem> {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse(".articleh").unwrap();
    let title_selector = Selector::parse(".l3 a").unwrap();
    let date_selector = Selector::parse(".l5").unwrap();

    let mut items = Vec::new();
    for el in document.select(&item_selector) {
        if items.len() >= MAX_NEWS_ITEMS {
            break;
        }

        let title = select_text(&el, &title_selector);
        if title.is_empty() {
            continue;
        }
        let date = select_text(&el, &date_selector);

        items.push(NewsItem {
            title,
            summary: "最新资讯".to_string(),
            date,
            source: NEWS_SOURCE.to_string(),
        });
    }
    items
}

fn select_text(el: &scraper::ElementRef<'_>, selector: &Selector) -> String {
    el.select(selector)
        .next()
        .map(|n| n.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guba_list_url_by_market() {
        assert_eq!(
            guba_list_url("00700.HK", Some(Market::HK)),
            "https://guba.eastmoney.com/list,hk00700.html"
        );
        assert_eq!(
            guba_list_url("AAPL.US", Some(Market::US)),
            "https://guba.eastmoney.com/list,usAAPL.html"
        );
        assert_eq!(
            guba_list_url("600519.SH", Some(Market::SH)),
            "https://guba.eastmoney.com/list,600519.html"
        );
        assert_eq!(
            guba_list_url("920146.BJ", Some(Market::BJ)),
            "https://guba.eastmoney.com/list,920146.html"
        );
    }

    #[test]
    fn test_parse_article_list_json() {
        let html = r#"<html><script>
            var article_list = {"re":[
                {"post_title":"腾讯控股获南向资金连续净买入","post_publish_time":"2026-01-30 15:30:00","post_click_count":10240},
                {"post_title":"涨","post_publish_time":"2026-01-30 14:00:00","post_click_count":5},
                {"post_title":"推荐开户广告专属优惠","post_publish_time":"2026-01-30 13:00:00","post_click_count":999},
                {"post_title":"四季度游戏业务点评","post_publish_time":"2026-01-29 09:10:00","post_click_count":"2048"}
            ],"count":4};
        </script></html>"#;

        let items = parse_article_list_json(html);

        // 过短标题与广告被过滤
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "腾讯控股获南向资金连续净买入");
        assert_eq!(items[0].summary, "(热度: 10240)");
        assert_eq!(items[0].date, "2026-01-30");
        // 阅读数为字符串时同样兼容
        assert_eq!(items[1].summary, "(热度: 2048)");
        assert_eq!(items[1].source, "EastMoney");
    }

    #[test]
    fn test_parse_article_list_caps_at_limit() {
        let entries: Vec<String> = (0..12)
            .map(|i| {
                format!(
                    r#"{{"post_title":"第{}条测试帖子标题","post_publish_time":"2026-01-30 10:00:00","post_click_count":{}}}"#,
                    i, i
                )
            })
            .collect();
        let html = format!(
            "<script>var article_list = {{\"re\":[{}]}};</script>",
            entries.join(",")
        );

        assert_eq!(parse_article_list_json(&html).len(), MAX_NEWS_ITEMS);
    }

    #[test]
    fn test_parse_listitem_html() {
        let html = r#"<html><body>
            <div class="listitem">
                <span class="l1">8866</span>
                <span class="l3"><a href="/news,1.html">公司公告点评：回购规模超预期</a></span>
                <span class="l5">01-30 15:02</span>
            </div>
            <div class="listitem">
                <span class="l1">12</span>
                <span class="l3"><a href="/news,2.html">冲</a></span>
                <span class="l5">01-30 14:40</span>
            </div>
        </body></html>"#;

        let items = parse_listitem_html(html);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "公司公告点评：回购规模超预期");
        assert_eq!(items[0].summary, "(热度: 8866)");
        assert_eq!(items[0].date, "01-30 15:02");
    }

    #[test]
    fn test_parse_articleh_html() {
        let html = r#"<html><body>
            <div class="articleh">
                <span class="l3"><a>三季报解读</a></span>
                <span class="l5">10-28</span>
            </div>
            <div class="articleh">
                <span class="l3"><a></a></span>
                <span class="l5">10-27</span>
            </div>
        </body></html>"#;

        let items = parse_articleh_html(html);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "三季报解读");
        assert_eq!(items[0].summary, "最新资讯");
    }

    /// JSON 策略产出为空时进入第二套策略，第三套不再执行：
    /// 页面同时带 .listitem 与 .articleh 节点，结果的摘要形态
    /// 证明命中的是第二套
    #[test]
    fn test_strategy_order_early_exit() {
        let html = r#"<html><script>var article_list = {"re":[]};</script><body>
            <div class="listitem">
                <span class="l1">100</span>
                <span class="l3"><a>新版结构里的一条帖子</a></span>
                <span class="l5">01-30</span>
            </div>
            <div class="articleh">
                <span class="l3"><a>旧版结构里的另一条帖子</a></span>
                <span class="l5">01-29</span>
            </div>
        </body></html>"#;

        let items = parse_news_html(html);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "新版结构里的一条帖子");
        assert_eq!(items[0].summary, "(热度: 100)");
    }

    #[test]
    fn test_all_strategies_miss_returns_empty() {
        let html = "<html><body><p>页面改版维护中</p></body></html>";
        assert!(parse_news_html(html).is_empty());
    }

    /// 实盘探测，仅打印结果；主机不可达时应在超时内返回错误而非悬挂
    #[tokio::test]
    async fn test_live_fetch_news() {
        println!("\n========== 测试个股资讯抓取 ==========");
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        match fetch_stock_news(&client, Duration::from_millis(3500), "600519.SH").await {
            Ok(items) => {
                println!("✅ 获取成功！共 {} 条", items.len());
                for item in items.iter().take(3) {
                    println!("  [{}] {} {}", item.date, item.title, item.summary);
                }
            }
            Err(e) => {
                println!("❌ 获取失败: {}", e);
            }
        }
    }
}
