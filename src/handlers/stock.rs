use actix_web::{web, HttpResponse, Result};

use crate::models::{
    ApiResponse, FundamentalData, NewsItem, SearchQuery, SearchResult, StockQuote,
};
use crate::services::{ReportService, StockService};

/// 搜索股票，两个上游并发聚合，永远返回列表（可能为空）
pub async fn search_stocks(
    service: web::Data<StockService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let keyword = query.q.trim();
    if keyword.is_empty() {
        let response = ApiResponse::success(Vec::<SearchResult>::new());
        return Ok(HttpResponse::Ok().json(response));
    }

    let results = service.search(keyword).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(results)))
}

/// 获取实时行情，数据不可用时返回 404 包装
pub async fn get_stock_quote(
    service: web::Data<StockService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    match service.quote(&code).await {
        Ok(quote) => Ok(HttpResponse::Ok().json(ApiResponse::success(quote))),
        Err(e) => {
            log::warn!("行情不可用 {}: {}", code, e);
            let response = ApiResponse::<StockQuote>::error(format!("行情不可用: {}", code));
            Ok(HttpResponse::NotFound().json(response))
        }
    }
}

/// 获取个股最新资讯，抓取失败降级为空列表而非错误
pub async fn get_stock_news(
    service: web::Data<StockService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    let items = match service.news(&code).await {
        Ok(items) => items,
        Err(e) if e.is_timeout() => {
            log::warn!("资讯抓取超时 {}", code);
            Vec::<NewsItem>::new()
        }
        Err(e) => {
            log::warn!("资讯抓取失败 {}: {}", code, e);
            Vec::<NewsItem>::new()
        }
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(items)))
}

/// 获取基本面快照
pub async fn get_stock_fundamentals(
    service: web::Data<StockService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    match service.fundamentals(&code).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => {
            log::warn!("基本面不可用 {}: {}", code, e);
            let response =
                ApiResponse::<FundamentalData>::error(format!("基本面不可用: {}", code));
            Ok(HttpResponse::NotFound().json(response))
        }
    }
}

/// 获取完整财务数据（量化服务透传）
pub async fn get_stock_fundamentals_detail(
    service: web::Data<StockService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    match service.fundamentals_detail(&code).await {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data))),
        Err(e) => {
            log::warn!("财务数据不可用 {}: {}", code, e);
            let response = ApiResponse::<crate::models::FundamentalsData>::error(format!(
                "财务数据不可用: {}",
                code
            ));
            Ok(HttpResponse::NotFound().json(response))
        }
    }
}

/// 生成投资报告
///
/// 数据源缺失各自降级，只有 LLM 调用失败才返回错误
pub async fn generate_report(
    stocks: web::Data<StockService>,
    reports: web::Data<ReportService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    match reports.generate_report(&stocks, &code).await {
        Ok(text) => Ok(HttpResponse::Ok().json(ApiResponse::success(text))),
        Err(e) => {
            log::error!("报告生成失败 {}: {}", code, e);
            let response = ApiResponse::<String>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .route("/search", web::get().to(search_stocks))
            .route("/{code}/quote", web::get().to(get_stock_quote))
            .route("/{code}/news", web::get().to(get_stock_news))
            .route("/{code}/fundamentals", web::get().to(get_stock_fundamentals))
            .route(
                "/{code}/fundamentals/detail",
                web::get().to(get_stock_fundamentals_detail),
            )
            .route("/{code}/report", web::post().to(generate_report)),
    );
}
