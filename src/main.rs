//! 股票分析后端服务
//!
//! 聚合腾讯、新浪、东方财富等数据源的行情、搜索、资讯与基本面，
//! 并组装大模型提示词生成个股投资报告

mod config; // 配置加载
mod handlers; // HTTP 请求处理器
mod middleware; // 中间件
mod models; // 数据模型定义
mod services; // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::middleware::ApiKeyMiddleware;
use crate::services::{ReportService, StockService};

/// 应用程序入口
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统，默认日志级别为 info
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();
    if config.llm.api_key.is_empty() {
        log::warn!("未配置 LLM API Key，报告生成接口将不可用");
    }

    let stock_service = web::Data::new(StockService::new(&config)?);
    let report_service = web::Data::new(ReportService::new(config.llm.clone())?);

    let bind_addr = config.bind_addr();
    let api_key = config.api.api_key.clone();
    let workers = config.server.workers;

    log::info!("启动股票分析后端服务，监听 {}", bind_addr);

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default()) // 请求日志中间件
            .wrap(ApiKeyMiddleware::new(api_key.clone())) // API Key 认证
            .app_data(stock_service.clone())
            .app_data(report_service.clone())
            .configure(handlers::config) // 配置路由
    })
    .bind(&bind_addr)?;

    if workers > 0 {
        server = server.workers(workers);
    }

    server.run().await?;
    Ok(())
}
