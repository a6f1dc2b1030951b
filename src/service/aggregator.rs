use crate::models::{MatchResult, ParseResponse};
use crate::service::matcher::ItemOutcome;
use indexmap::IndexMap;

/// 汇总逐行结果：按商品ID去重（保留首次出现位置、取较高置信度），未匹配行原样回显
pub fn aggregate(outcomes: Vec<ItemOutcome>) -> ParseResponse {
    let mut matched: IndexMap<i64, MatchResult> = IndexMap::new();
    let mut unmatched_items = Vec::new();

    for outcome in outcomes {
        match outcome {
            ItemOutcome::Matched(result) => match matched.get_mut(&result.product_id) {
                Some(existing) => {
                    if result.confidence > existing.confidence {
                        tracing::debug!(
                            "商品 {} 重复匹配, \"{}\" ({}) 替换 \"{}\" ({})",
                            result.product_id,
                            result.matched_text,
                            result.confidence,
                            existing.matched_text,
                            existing.confidence
                        );
                        *existing = result;
                    }
                }
                None => {
                    matched.insert(result.product_id, result);
                }
            },
            ItemOutcome::Unmatched(line) => unmatched_items.push(line),
        }
    }

    let matched_products: Vec<MatchResult> = matched.into_values().collect();
    ParseResponse {
        matched_count: matched_products.len(),
        matched_products,
        unmatched_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn hit(id: i64, text: &str, confidence: u8) -> ItemOutcome {
        ItemOutcome::Matched(MatchResult {
            product_id: id,
            product_name: format!("P{}", id),
            matched_text: text.to_string(),
            confidence,
            price: BigDecimal::from(1),
            quantity: None,
            unit: None,
        })
    }

    #[test]
    fn duplicates_keep_first_position_and_highest_confidence() {
        let resp = aggregate(vec![
            hit(42, "milk", 70),
            hit(7, "bread", 95),
            hit(42, "whole milk", 100),
            ItemOutcome::Unmatched("xyz".to_string()),
        ]);
        assert_eq!(resp.matched_count, 2);
        assert_eq!(resp.matched_products[0].product_id, 42);
        assert_eq!(resp.matched_products[0].confidence, 100);
        assert_eq!(resp.matched_products[0].matched_text, "whole milk");
        assert_eq!(resp.matched_products[1].product_id, 7);
        assert_eq!(resp.unmatched_items, vec!["xyz".to_string()]);
    }

    #[test]
    fn equal_confidence_keeps_earlier_line() {
        let resp = aggregate(vec![hit(1, "first", 80), hit(1, "second", 80)]);
        assert_eq!(resp.matched_products.len(), 1);
        assert_eq!(resp.matched_products[0].matched_text, "first");
    }

    #[test]
    fn consumed_duplicates_are_not_unmatched() {
        let resp = aggregate(vec![hit(1, "a", 90), hit(1, "b", 60)]);
        assert!(resp.unmatched_items.is_empty());
        assert_eq!(resp.matched_count, resp.matched_products.len());
    }

    #[test]
    fn empty_outcomes() {
        assert_eq!(aggregate(Vec::new()), ParseResponse::empty());
    }
}
