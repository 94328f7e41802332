//! 股票数据服务模块
//!
//! 多数据源的行情、搜索、新闻与基本面抓取。
//! 所有抓取函数返回 [`FetchResult`]，错误在调用方降级为无数据，
//! 单个上游的失败不会导致整个请求失败。

pub mod code;
pub mod error;
pub mod fundamentals;
pub mod news;
pub mod quote;
pub mod search;

pub use error::{FetchError, FetchResult};

use std::time::Duration;

use encoding_rs::Encoding;
use reqwest::Client;

use crate::config::AppConfig;
use crate::models::{FundamentalData, FundamentalsData, NewsItem, SearchResult, StockQuote};

/// 浏览器 User-Agent，部分上游会屏蔽默认客户端标识
pub(crate) const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 按指定编码抓取文本
///
/// 编码是每个上游的显式参数：编码假设错误时多字节文本会静默变成
/// 乱码而不是报错，所以不允许隐式默认编码
pub(crate) async fn fetch_text(
    client: &Client,
    url: &str,
    encoding: &'static Encoding,
    timeout: Option<Duration>,
) -> FetchResult<String> {
    let mut request = client.get(url).header("User-Agent", BROWSER_UA);
    if let Some(t) = timeout {
        request = request.timeout(t);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    let bytes = response.bytes().await?;
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(FetchError::Decode(format!(
            "{} 响应不是合法的 {} 编码",
            url,
            encoding.name()
        )));
    }
    Ok(text.into_owned())
}

/// 股票数据服务
///
/// 持有复用的 HTTP 客户端与各上游超时，启动时由配置注入
pub struct StockService {
    client: Client,
    news_timeout: Duration,
    quant_base_url: String,
    quant_timeout: Duration,
}

impl StockService {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .connect_timeout(Duration::from_secs(config.api.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            news_timeout: Duration::from_millis(config.api.news_timeout_ms),
            quant_base_url: config.quant.base_url.clone(),
            quant_timeout: Duration::from_secs(config.quant.timeout_secs),
        })
    }

    /// 搜索股票，聚合两个上游，单侧失败不影响另一侧
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        search::search_stocks(&self.client, query).await
    }

    /// 获取实时行情，输入可以是不完整代码
    pub async fn quote(&self, raw_code: &str) -> FetchResult<StockQuote> {
        quote::get_stock_quote(&self.client, raw_code).await
    }

    /// 获取个股最新资讯
    pub async fn news(&self, raw_code: &str) -> FetchResult<Vec<NewsItem>> {
        news::fetch_stock_news(&self.client, self.news_timeout, raw_code).await
    }

    /// 获取基本面快照指标
    pub async fn fundamentals(&self, raw_code: &str) -> FetchResult<FundamentalData> {
        fundamentals::fetch_snapshot(&self.client, raw_code).await
    }

    /// 获取完整财务数据（量化服务计算）
    pub async fn fundamentals_detail(&self, raw_code: &str) -> FetchResult<FundamentalsData> {
        fundamentals::fetch_detail(
            &self.client,
            &self.quant_base_url,
            self.quant_timeout,
            raw_code,
        )
        .await
    }
}
