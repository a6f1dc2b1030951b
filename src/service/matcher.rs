use crate::models::{MatchResult, ParsedItem};
use crate::service::catalog_index::{singular, CatalogIndex, Surface};
use rayon::prelude::*;
use std::cmp::Ordering;
use strsim::normalized_levenshtein;

/// 默认置信度阈值
pub const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 60;

/// 词相似度低于该值按 0 计（编辑距离惩罚）
const TOKEN_SIMILARITY_FLOOR: f64 = 0.7;
const SINGULAR_SIMILARITY: f64 = 0.9;
const COVERAGE_WEIGHT: f64 = 70.0;
const PRECISION_WEIGHT: f64 = 30.0;
const SUBSTRING_BONUS: f64 = 10.0;

/// 单行的匹配结果
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Matched(MatchResult),
    Unmatched(String),
}

/// 候选评分
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    pos: usize,
    confidence: u8,
    overlap: usize,
}

/// 清单匹配器
#[derive(Debug, Clone)]
pub struct Matcher {
    threshold: u8,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl Matcher {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: threshold.min(100),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// 并行匹配所有行，输出顺序与输入一致
    pub fn match_items(&self, items: &[ParsedItem], index: &CatalogIndex) -> Vec<ItemOutcome> {
        items
            .par_iter()
            .map(|item| self.match_item(item, index))
            .collect()
    }

    /// 单行匹配：只取最优候选
    pub fn match_item(&self, item: &ParsedItem, index: &CatalogIndex) -> ItemOutcome {
        if !item.has_name() {
            return ItemOutcome::Unmatched(item.original.clone());
        }

        let mut best: Option<Candidate> = None;
        for pos in index.candidates(&item.tokens) {
            let Some(entry) = index.entry(pos) else {
                continue;
            };
            let (confidence, overlap) = entry
                .surfaces
                .iter()
                .map(|s| score_surface(&item.normalized, &item.tokens, s))
                .max()
                .unwrap_or((0, 0));
            if confidence < self.threshold {
                continue;
            }

            let cand = Candidate {
                pos,
                confidence,
                overlap,
            };
            let is_better = match &best {
                None => true,
                Some(current) => compare(&cand, current, index) == Ordering::Less,
            };
            if is_better {
                best = Some(cand);
            }
        }

        match best.and_then(|c| index.entry(c.pos).map(|e| (c, e))) {
            Some((cand, entry)) => ItemOutcome::Matched(MatchResult {
                product_id: entry.product.product_id,
                product_name: entry.product.product_name.clone(),
                matched_text: item.original.clone(),
                confidence: cand.confidence,
                price: entry.product.price.clone(),
                quantity: item.quantity,
                unit: item.unit,
            }),
            None => ItemOutcome::Unmatched(item.original.clone()),
        }
    }
}

/// 排序规则：置信度高 -> 精确重合词多 -> 名称短 -> 商品ID小
fn compare(a: &Candidate, b: &Candidate, index: &CatalogIndex) -> Ordering {
    let name_len = |c: &Candidate| {
        index
            .entry(c.pos)
            .map(|e| e.product.product_name.chars().count())
            .unwrap_or(usize::MAX)
    };
    let id = |c: &Candidate| index.entry(c.pos).map(|e| e.product.product_id).unwrap_or(i64::MAX);

    b.confidence
        .cmp(&a.confidence)
        .then_with(|| b.overlap.cmp(&a.overlap))
        .then_with(|| name_len(a).cmp(&name_len(b)))
        .then_with(|| id(a).cmp(&id(b)))
}

/// 对一种商品写法打分，返回 (置信度, 精确重合词数)
pub fn score_surface(query: &str, query_tokens: &[String], surface: &Surface) -> (u8, usize) {
    if query_tokens.is_empty() || surface.tokens.is_empty() {
        return (0, 0);
    }

    let coverage = mean_best_similarity(query_tokens, &surface.tokens);
    let precision = mean_best_similarity(&surface.tokens, query_tokens);
    let mut score = COVERAGE_WEIGHT * coverage + PRECISION_WEIGHT * precision;

    if coverage > 0.0 && contains_phrase(&surface.text, query, &surface.tokens, query_tokens) {
        score += SUBSTRING_BONUS;
    }

    let overlap = query_tokens
        .iter()
        .filter(|q| surface.tokens.contains(q))
        .count();

    (score.round().clamp(0.0, 100.0) as u8, overlap)
}

fn mean_best_similarity(from: &[String], to: &[String]) -> f64 {
    let total: f64 = from
        .iter()
        .map(|a| {
            to.iter()
                .map(|b| token_similarity(a, b))
                .fold(0.0_f64, f64::max)
        })
        .sum();
    total / from.len() as f64
}

/// 词相似度：相同 1.0，单复数相同 0.9，否则归一化编辑距离（低于下限记 0）
pub fn token_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if singular(a) == singular(b) {
        return SINGULAR_SIMILARITY;
    }
    let sim = normalized_levenshtein(a, b);
    if sim >= TOKEN_SIMILARITY_FLOOR {
        sim
    } else {
        0.0
    }
}

/// 子串加分：查询整体出现在商品写法中，或商品写法出现在较长的查询中
fn contains_phrase(surface: &str, query: &str, surface_tokens: &[String], query_tokens: &[String]) -> bool {
    if query.chars().count() >= 3 && surface.contains(query) {
        return true;
    }
    if surface.chars().count() >= 3 && query.contains(surface) {
        return true;
    }
    // 单复数差异不影响子串判断
    let s: Vec<String> = surface_tokens.iter().map(|t| singular(t)).collect();
    let q: Vec<String> = query_tokens.iter().map(|t| singular(t)).collect();
    q.len() <= s.len() && s.windows(q.len()).any(|w| w == q.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::service::tokenizer::{normalize_tokens, parse_line, tokenize};
    use bigdecimal::BigDecimal;

    fn product(id: i64, name: &str) -> Product {
        Product {
            product_id: id,
            product_name: name.to_string(),
            description: None,
            category: None,
            price: BigDecimal::from(id * 10),
            stock_quantity: Some(10),
            unit: None,
            brand: None,
            image_url: None,
            synonyms: Vec::new(),
        }
    }

    fn surface(name: &str) -> Surface {
        let tokens = normalize_tokens(name);
        Surface {
            text: tokens.join(" "),
            tokens,
        }
    }

    fn score(query: &str, name: &str) -> u8 {
        let item = parse_line(query);
        score_surface(&item.normalized, &item.tokens, &surface(name)).0
    }

    #[test]
    fn exact_name_scores_100() {
        assert_eq!(score("rice", "Rice"), 100);
        assert_eq!(score("Rice 5kg", "Rice"), 100);
    }

    #[test]
    fn partial_name_with_substring_bonus() {
        assert_eq!(score("tomatoes", "Fresh Tomatoes"), 95);
        assert_eq!(score("bread", "White Bread"), 95);
    }

    #[test]
    fn plural_difference_still_clears_threshold() {
        let s = score("tomato", "Fresh Tomatoes");
        assert!(s >= DEFAULT_CONFIDENCE_THRESHOLD && s < 95, "score {}", s);
    }

    #[test]
    fn misspelling_is_penalised_but_accepted() {
        let s = score("basmatti rice", "Basmati Rice");
        assert!(s >= DEFAULT_CONFIDENCE_THRESHOLD && s < 100, "score {}", s);
    }

    #[test]
    fn unrelated_words_score_zero() {
        assert_eq!(score("shampoo", "White Bread"), 0);
    }

    #[test]
    fn confidence_is_bounded() {
        for (q, n) in [("milk", "milk"), ("fresh milk", "milk"), ("a", "b")] {
            assert!(score(q, n) <= 100);
        }
    }

    #[test]
    fn scenario_tomatoes_bread_unknown() {
        let index = CatalogIndex::build(vec![product(1, "Fresh Tomatoes"), product(2, "White Bread")]);
        let items = tokenize("Tomatoes\nBread\nXYZ-nonexistent-item\n");
        let outcomes = Matcher::default().match_items(&items, &index);
        assert!(matches!(&outcomes[0], ItemOutcome::Matched(m) if m.product_id == 1 && m.matched_text == "Tomatoes"));
        assert!(matches!(&outcomes[1], ItemOutcome::Matched(m) if m.product_id == 2));
        assert_eq!(outcomes[2], ItemOutcome::Unmatched("XYZ-nonexistent-item".to_string()));
    }

    #[test]
    fn tie_prefers_shorter_name() {
        let index = CatalogIndex::build(vec![
            product(5, "Milk Chocolate Bar"),
            product(2, "Milk Powder"),
            product(3, "Whole Milk"),
        ]);
        match Matcher::default().match_item(&parse_line("milk"), &index) {
            ItemOutcome::Matched(m) => assert_eq!(m.product_id, 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tie_on_length_prefers_lower_id() {
        let index = CatalogIndex::build(vec![product(3, "Whole Milk"), product(2, "Milk Cream")]);
        match Matcher::default().match_item(&parse_line("milk"), &index) {
            ItemOutcome::Matched(m) => assert_eq!(m.product_id, 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn overlap_breaks_tie_before_name_length() {
        // 两者都封顶 100，较长的名称精确重合 2 个词
        assert_eq!(score("apple pie", "Apple Pie Slice"), 100);
        assert_eq!(score("apple pie", "Apples Pie"), 100);
        let index = CatalogIndex::build(vec![product(2, "Apples Pie"), product(1, "Apple Pie Slice")]);
        match Matcher::default().match_item(&parse_line("apple pie"), &index) {
            ItemOutcome::Matched(m) => assert_eq!(m.product_id, 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn ie_plural_scores_as_singular_variant() {
        assert_eq!(token_similarity("pies", "pie"), 0.9);
        assert_eq!(token_similarity("cookies", "cookie"), 0.9);
    }

    #[test]
    fn higher_confidence_beats_shorter_name() {
        let index = CatalogIndex::build(vec![product(1, "Eggs Large"), product(2, "Egg")]);
        match Matcher::default().match_item(&parse_line("eggs large"), &index) {
            ItemOutcome::Matched(m) => assert_eq!(m.product_id, 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn threshold_is_respected() {
        let index = CatalogIndex::build(vec![product(1, "Fresh Tomatoes")]);
        let strict = Matcher::new(100);
        assert!(matches!(
            strict.match_item(&parse_line("tomatoes"), &index),
            ItemOutcome::Unmatched(_)
        ));
        assert_eq!(strict.threshold(), 100);
    }

    #[test]
    fn quantity_only_line_is_unmatched() {
        let index = CatalogIndex::build(vec![product(1, "Rice")]);
        assert_eq!(
            Matcher::default().match_item(&parse_line("5kg"), &index),
            ItemOutcome::Unmatched("5kg".to_string())
        );
    }

    #[test]
    fn quantity_is_echoed() {
        let index = CatalogIndex::build(vec![product(1, "Rice")]);
        match Matcher::default().match_item(&parse_line("Rice 5kg"), &index) {
            ItemOutcome::Matched(m) => {
                assert_eq!(m.confidence, 100);
                assert_eq!(m.quantity, Some(5.0));
                assert_eq!(m.matched_text, "Rice 5kg");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn matching_is_deterministic() {
        let index = CatalogIndex::build(vec![
            product(1, "Whole Milk"),
            product(2, "Milk Powder"),
            product(3, "White Bread"),
            product(4, "Brown Bread"),
        ]);
        let items = tokenize("milk\nbread\nbred\nmilk powder\n");
        let matcher = Matcher::default();
        let first = matcher.match_items(&items, &index);
        for _ in 0..10 {
            assert_eq!(matcher.match_items(&items, &index), first);
        }
    }
}
