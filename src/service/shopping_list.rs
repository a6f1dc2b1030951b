use crate::config::MatcherConfig;
use crate::error::AppError;
use crate::models::ParseResponse;
use crate::service::aggregator::aggregate;
use crate::service::catalog_cache::CatalogCache;
use crate::service::matcher::Matcher;
use crate::service::tokenizer::tokenize;
use crate::store::ProductSource;
use std::sync::Arc;
use std::time::Duration;

/// 购物清单解析服务：分词 -> 索引快照 -> 匹配 -> 汇总
pub struct ShoppingListService {
    products: Arc<dyn ProductSource>,
    catalog: CatalogCache,
    matcher: Matcher,
    max_lines: usize,
}

impl ShoppingListService {
    pub fn new(products: Arc<dyn ProductSource>, config: &MatcherConfig) -> Self {
        Self {
            products,
            catalog: CatalogCache::new(Duration::from_secs(config.catalog_ttl_secs)),
            matcher: Matcher::new(config.confidence_threshold),
            max_lines: config.max_lines,
        }
    }

    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// 解析整段清单
    pub async fn parse(&self, text: &str) -> Result<ParseResponse, AppError> {
        let items = tokenize(text);
        if items.is_empty() {
            return Ok(ParseResponse::empty());
        }
        if items.len() > self.max_lines {
            return Err(AppError::InvalidRequest(format!(
                "Shopping list too long: {} lines (max {})",
                items.len(),
                self.max_lines
            )));
        }

        let index = self.catalog.snapshot(self.products.as_ref()).await?;
        let matcher = self.matcher.clone();
        let total = items.len();

        // 评分为纯计算，放到阻塞线程池中执行
        let outcomes = tokio::task::spawn_blocking(move || matcher.match_items(&items, &index))
            .await
            .map_err(|e| AppError::Internal(format!("matcher task failed: {}", e)))?;

        let response = aggregate(outcomes);
        tracing::info!(
            "清单解析完成: {} 行, 匹配 {} 个商品, 未匹配 {} 行",
            total,
            response.matched_count,
            response.unmatched_items.len()
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::store::InMemoryStore;
    use bigdecimal::BigDecimal;

    fn product(id: i64, name: &str) -> Product {
        Product {
            product_id: id,
            product_name: name.to_string(),
            description: None,
            category: None,
            price: BigDecimal::from(100),
            stock_quantity: Some(10),
            unit: None,
            brand: None,
            image_url: None,
            synonyms: Vec::new(),
        }
    }

    fn service(products: Vec<Product>) -> (Arc<InMemoryStore>, ShoppingListService) {
        let store = Arc::new(InMemoryStore::new(products));
        let svc = ShoppingListService::new(store.clone(), &MatcherConfig::default());
        (store, svc)
    }

    #[tokio::test]
    async fn empty_input_is_empty_response() {
        let (_, svc) = service(vec![product(1, "Rice")]);
        assert_eq!(svc.parse("").await.unwrap(), ParseResponse::empty());
        assert_eq!(svc.parse("  \n \n").await.unwrap(), ParseResponse::empty());
    }

    #[tokio::test]
    async fn empty_input_does_not_touch_catalog() {
        let (store, svc) = service(vec![product(1, "Rice")]);
        store.set_offline(true);
        assert!(svc.parse("\n").await.is_ok());
        assert!(matches!(
            svc.parse("rice").await,
            Err(AppError::CatalogUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn every_line_lands_in_exactly_one_bucket() {
        let (_, svc) = service(vec![
            product(1, "Fresh Tomatoes"),
            product(2, "White Bread"),
            product(3, "Rice"),
        ]);
        let text = "Tomatoes\nBread\nRice 5kg\nunicorn steak\n5kg\n";
        let resp = svc.parse(text).await.unwrap();
        assert_eq!(resp.matched_count, resp.matched_products.len());
        let mut seen: Vec<&str> = resp
            .matched_products
            .iter()
            .map(|m| m.matched_text.as_str())
            .chain(resp.unmatched_items.iter().map(String::as_str))
            .collect();
        seen.sort();
        let mut expected = vec!["Tomatoes", "Bread", "Rice 5kg", "unicorn steak", "5kg"];
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn too_many_lines_is_rejected() {
        let store = Arc::new(InMemoryStore::new(vec![product(1, "Rice")]));
        let config = MatcherConfig {
            max_lines: 2,
            ..MatcherConfig::default()
        };
        let svc = ShoppingListService::new(store, &config);
        assert!(matches!(
            svc.parse("a\nb\nc").await,
            Err(AppError::InvalidRequest(_))
        ));
    }
}
