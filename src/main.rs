use axum::body::Bytes;
use axum::{Router, http::StatusCode, response::Json, routing::get};
use moka::future::Cache;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use toplangs_backend::cors::build_cors_layer;
use toplangs_backend::features::card::create_card_router;
use toplangs_backend::features::github::GithubClient;
use toplangs_backend::queue::spawn_render_queue;
use toplangs_backend::request_id::request_id_middleware;
use toplangs_backend::state::AppState;
use toplangs_backend::{AppError, ShutdownManager, config::AppConfig};
use tower_http::compression::CompressionLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn compression_predicate() -> impl tower_http::compression::predicate::Predicate {
    use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};

    // 压缩策略：明确排除不该压缩的响应，其余默认压缩。
    //
    // 主要考虑：
    // - 卡片是 SVG 文本，重复度高，gzip/brotli 收益明显（IMAGES 预设会
    //   放行 image/svg+xml，保持其被压缩）；
    // - png/jpg 等位图与常见二进制下载类型本身已压缩，再压只浪费 CPU。
    //
    // 仍保留默认的最小大小阈值（默认 32B），避免“压缩开销覆盖收益”。
    SizeAbove::default()
        .and(NotForContentType::GRPC)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
        .and(NotForContentType::const_new("application/octet-stream"))
        .and(NotForContentType::const_new("application/zip"))
        .and(NotForContentType::const_new("application/gzip"))
}


#[derive(OpenApi)]
#[openapi(
    paths(
        toplangs_backend::features::card::handler::get_card,
        health_check,
    ),
    components(schemas(AppError, toplangs_backend::error::GithubError)),
    tags(
        (name = "Card", description = "Language card APIs"),
        (name = "Health", description = "Health APIs"),
    ),
    info(
        title = "TopLangs Backend API",
        version = "0.1.0",
        description = "GitHub top languages card service (Axum)"
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/health",
    summary = "健康检查",
    description = "用于探活的健康检查端点，返回服务状态与版本信息。",
    responses((status = 200, description = "服务健康", body = serde_json::Value)),
    tag = "Health"
)]
async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "toplangs-backend",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toplangs_backend=info,tower_http=info".into()),
        )
        .init();

    // 创建优雅退出管理器
    let shutdown_manager = ShutdownManager::new();

    // Load config
    if let Err(e) = AppConfig::init_global() {
        tracing::error!("Config init failed: {}", e);
        std::process::exit(1);
    }
    let config = AppConfig::global();

    // 启动信号处理器
    if let Err(e) = shutdown_manager.start_signal_handler().await {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    // GitHub 客户端（唯一的上游凭证）
    let github = match GithubClient::new(&config.github) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("GitHub client init failed: {}", e);
            std::process::exit(1);
        }
    };

    // 初始化卡片缓存（容量按总字节数加权）
    let card_cache: Cache<String, Bytes> = {
        let card = &config.card;
        Cache::builder()
            .weigher(|_k, v: &Bytes| v.len() as u32)
            .max_capacity(card.cache_max_bytes)
            .time_to_live(Duration::from_secs(card.cache_ttl_secs))
            .time_to_idle(Duration::from_secs(card.cache_tti_secs))
            .build()
    };

    // 启动后台渲染队列（进程级单 worker）
    let queue = spawn_render_queue(config.queue.capacity, github.clone(), card_cache.clone());

    let app_state = AppState {
        github,
        card_cache,
        queue: queue.clone(),
    };

    // Routes
    let api_router = Router::<AppState>::new().merge(create_card_router());

    let mut app = Router::<AppState>::new()
        .route("/health", get(health_check))
        .nest(&config.api.prefix, api_router)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // CORS（按配置启用）
    if let Some(cors_layer) = build_cors_layer(&config.cors) {
        app = app.layer(cors_layer);
    }

    // 全局 request_id 中间件
    app = app.layer(axum::middleware::from_fn(request_id_middleware));

    // 应用内响应压缩：SVG/JSON 文本收益明显，位图与二进制类型除外
    app = app.layer(CompressionLayer::new().compress_when(compression_predicate()));

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Card API: http://{}{}/card", addr, config.api.prefix);

    // 启动服务器并等待优雅退出信号
    let shutdown_config = &config.shutdown;
    let shutdown_timeout = shutdown_config.timeout_duration();

    // 创建graceful shutdown future
    let queue_for_cleanup = queue.clone();
    let shutdown_signal = async move {
        let reason = shutdown_manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅退出...", reason);

        match tokio::time::timeout(shutdown_timeout, async move {
            tracing::info!("优雅退出超时时间: {}秒", shutdown_config.timeout_secs);

            // 停止后台渲染队列：当前任务跑完即退出，排队任务允许丢弃
            if let Err(e) = queue_for_cleanup
                .graceful_shutdown(shutdown_config.queue_drain_duration())
                .await
            {
                tracing::warn!("渲染队列关闭失败: {}", e);
            } else {
                tracing::info!("渲染队列已优雅关闭");
            }
        })
        .await
        {
            Ok(_) => {
                tracing::info!("优雅退出完成");
            }
            Err(_) => {
                tracing::warn!("优雅退出超时，强制退出");
            }
        }
    };

    // 运行服务器直到收到退出信号
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async {
        shutdown_signal.await;
        tracing::info!("开始优雅关闭HTTP服务器...");
    });

    if let Err(e) = graceful.await {
        tracing::error!("服务器运行错误: {}", e);
        std::process::exit(1);
    }

    tracing::info!("服务器已优雅关闭");
}
