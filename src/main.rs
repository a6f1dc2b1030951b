use grocery_list_matcher::{build_router, create_pool, AppConfig, AppState, PgStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let store = Arc::new(PgStore::new(pool));
    let state = AppState::new(store.clone(), store, &config);

    // 预热商品索引，失败不阻止启动（请求时会重试）
    if let Err(e) = state
        .shopping_list
        .catalog()
        .refresh(state.products.as_ref())
        .await
    {
        tracing::warn!("Catalog warm-up failed: {}", e);
    }

    let app = build_router(state, config.server.max_concurrency);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/parse-shopping-list/  - 购物清单解析");
    info!("  POST /api/bulk-add-to-cart/     - 批量加购");
    info!("  GET  /api/products/             - 商品列表");
    info!("  GET  /api/products/:id/         - 商品详情");
    info!("  GET  /api/cart/?user_id=        - 购物车");
    info!("  POST /api/cart/                 - 单个加购");
    info!("  DELETE /api/cart/:id/          - 删除购物车行");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
