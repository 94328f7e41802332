//! 投资报告生成服务
//!
//! 把行情、基本面与最新资讯组装进大模型提示词，调用
//! Gemini 兼容接口生成报告。数据源缺哪块就降级到哪块的
//! 占位文案，大模型调用失败才算整体失败。

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use chrono_tz::Asia::Shanghai;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::LlmConfig;
use crate::models::{FundamentalData, NewsItem, StockQuote};
use crate::services::stock::StockService;

/// 报告生成服务
pub struct ReportService {
    client: Client,
    config: LlmConfig,
}

impl ReportService {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// 生成个股投资报告
    ///
    /// 行情、基本面、资讯三路数据各自降级互不影响，
    /// 行情缺失时以规范代码和占位价格继续
    pub async fn generate_report(&self, stocks: &StockService, raw_code: &str) -> Result<String> {
        let quote = match stocks.quote(raw_code).await {
            Ok(q) => Some(q),
            Err(e) => {
                log::warn!("行情不可用，使用占位数据继续: {}", e);
                None
            }
        };

        let fundamentals = match stocks.fundamentals(raw_code).await {
            Ok(f) => Some(f),
            Err(e) => {
                log::warn!("基本面不可用: {}", e);
                None
            }
        };

        let news = match stocks.news(raw_code).await {
            Ok(items) => items,
            Err(e) => {
                log::warn!("资讯抓取失败，按无上下文继续: {}", e);
                Vec::new()
            }
        };

        let prompt = build_prompt(raw_code, quote.as_ref(), fundamentals.as_ref(), &news);
        self.generate_content(&prompt).await
    }

    /// 调用 Gemini 兼容的 generateContent 接口
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        if self.config.api_key.is_empty() {
            bail!("未配置 LLM API Key");
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            log::error!("LLM 接口调用失败 {}: {}", status, detail);
            return Err(anyhow!("LLM 接口调用失败: {}", status));
        }

        let data: Value = response.json().await?;
        let text = data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("AI 未返回有效内容")
            .to_string();
        Ok(text)
    }
}

/// 组装提示词
///
/// 缺失的数据块用占位文案标明，要求模型只依据给出的事实
fn build_prompt(
    raw_code: &str,
    quote: Option<&StockQuote>,
    fundamentals: Option<&FundamentalData>,
    news: &[NewsItem],
) -> String {
    let today = Utc::now().with_timezone(&Shanghai).format("%Y-%m-%d");

    let (name, code, price, change) = match quote {
        Some(q) => (q.name.as_str(), q.code.as_str(), q.price.as_str(), q.change.as_str()),
        None => ("未知", raw_code, "暂无报价", "--"),
    };

    let fundamentals_context = match fundamentals {
        Some(f) => format!(
            "市盈率(TTM): {} | 市净率: {} | 总市值: {} | 主力净流入: {}",
            f.pe_ttm, f.pb, f.total_market_cap, f.main_force_inflow
        ),
        None => "暂无基本面数据".to_string(),
    };

    let news_context = if news.is_empty() {
        "暂无最新实时新闻".to_string()
    } else {
        news.iter()
            .enumerate()
            .map(|(i, n)| format!("{}. [{}] {} {}", i + 1, n.date, n.title, n.summary))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"[角色设定]
你是一位拥有 20 年经验的资深交易员，擅长用大白话给普通散户讲清复杂的金融逻辑。风格犀利直接，敢给结论，但必须提示风险。

[输入数据]
* 股票: {name} ({code})
* 当前价: {price}
* 今日涨跌: {change}
* 基本面: {fundamentals_context}
* 日期: {today}

[实时资讯上下文]
以下是刚从交易所和财经网站抓取的最新资讯，分析必须结合这些事实，不得编造：
{news_context}

[任务要求]
请分四个部分输出，多用二级、三级标题：

**第一部分：一句话结论** —— 用最直白的话给出当前状态判断。
**第二部分：未来 3 个月价格区间** —— 给出抄底线、止盈线、止损线三个具体点位，以表格输出，必须是具体数字。
**第三部分：逻辑拆解** —— 结合上面的资讯解释涨跌原因、主力动向与消息面。
**第四部分：风险提示** —— 指出当前最大的坑。

(直接输出 Markdown 正文，不要任何开场白)"#
    )
}
