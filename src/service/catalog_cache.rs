use crate::error::AppError;
use crate::service::catalog_index::CatalogIndex;
use crate::store::ProductSource;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Snapshot {
    index: Arc<CatalogIndex>,
    version: u64,
    built_at: Instant,
}

/// 商品索引快照缓存
///
/// 读取方拿到的是 `Arc<CatalogIndex>`，重建时整体替换，正在匹配的请求继续使用旧快照。
/// ttl 为 0 时每次请求都重建。
#[derive(Debug)]
pub struct CatalogCache {
    ttl: Duration,
    current: RwLock<Option<Snapshot>>,
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: RwLock::new(None),
        }
    }

    /// 当前快照版本号，未构建时为 0
    pub fn version(&self) -> u64 {
        self.current
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.version))
            .unwrap_or(0)
    }

    /// 获取可用快照，过期或不存在时从商品源重建
    pub async fn snapshot(&self, source: &dyn ProductSource) -> Result<Arc<CatalogIndex>, AppError> {
        if let Some(index) = self.fresh() {
            return Ok(index);
        }
        self.refresh(source).await
    }

    /// 强制重建
    pub async fn refresh(&self, source: &dyn ProductSource) -> Result<Arc<CatalogIndex>, AppError> {
        let start = Instant::now();
        let products = source.list_products().await.map_err(|e| {
            tracing::error!("✗ 商品索引构建失败: {}", e);
            AppError::CatalogUnavailable(e.to_string())
        })?;
        let index = Arc::new(CatalogIndex::build(products));

        let version = {
            let mut guard = self
                .current
                .write()
                .map_err(|_| AppError::CatalogUnavailable("catalog snapshot lock poisoned".to_string()))?;
            let version = guard.as_ref().map_or(1, |s| s.version + 1);
            *guard = Some(Snapshot {
                index: index.clone(),
                version,
                built_at: Instant::now(),
            });
            version
        };

        tracing::info!(
            "商品索引已构建: {} 个商品, 版本 {}, 耗时: {:?}",
            index.len(),
            version,
            start.elapsed()
        );
        Ok(index)
    }

    fn fresh(&self) -> Option<Arc<CatalogIndex>> {
        if self.ttl.is_zero() {
            return None;
        }
        let guard = self.current.read().ok()?;
        let snapshot = guard.as_ref()?;
        (snapshot.built_at.elapsed() < self.ttl).then(|| snapshot.index.clone())
    }
}
