use crate::models::Product;
use crate::service::tokenizer::normalize_tokens;
use std::collections::{BTreeSet, HashMap, HashSet};

/// 模糊召回时词的三元组 Jaccard 下限
const TRIGRAM_MIN_JACCARD: f64 = 0.3;

/// 商品的一种可匹配写法（名称或同义词）
#[derive(Debug, Clone)]
pub struct Surface {
    pub text: String,
    pub tokens: Vec<String>,
}

/// 索引中的商品条目
#[derive(Debug, Clone)]
pub struct IndexedProduct {
    pub product: Product,
    pub surfaces: Vec<Surface>,
}

/// 商品索引快照：构建后只读
#[derive(Debug, Default)]
pub struct CatalogIndex {
    entries: Vec<IndexedProduct>,
    /// 词（单数形式）-> 商品位置
    postings: HashMap<String, BTreeSet<usize>>,
    /// 三元组 -> 词表中的词
    trigram_vocab: HashMap<String, HashSet<String>>,
}

impl CatalogIndex {
    /// 从商品列表构建索引，商品位置即列表顺序
    pub fn build(products: Vec<Product>) -> Self {
        let mut entries = Vec::with_capacity(products.len());
        let mut postings: HashMap<String, BTreeSet<usize>> = HashMap::new();
        let mut trigram_vocab: HashMap<String, HashSet<String>> = HashMap::new();

        for (pos, product) in products.into_iter().enumerate() {
            let mut surfaces = Vec::with_capacity(1 + product.synonyms.len());
            let mut seen_texts = HashSet::new();
            for raw in std::iter::once(&product.product_name).chain(product.synonyms.iter()) {
                let tokens = normalize_tokens(raw);
                if tokens.is_empty() {
                    continue;
                }
                let text = tokens.join(" ");
                if !seen_texts.insert(text.clone()) {
                    continue;
                }
                for token in &tokens {
                    let key = singular(token);
                    for gram in trigrams(&key) {
                        trigram_vocab.entry(gram).or_default().insert(key.clone());
                    }
                    postings.entry(key).or_default().insert(pos);
                }
                surfaces.push(Surface { text, tokens });
            }
            entries.push(IndexedProduct { product, surfaces });
        }

        Self {
            entries,
            postings,
            trigram_vocab,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, pos: usize) -> Option<&IndexedProduct> {
        self.entries.get(pos)
    }

    /// 候选召回：精确词、单复数、三元组相近词，结果按商品位置升序
    pub fn candidates(&self, tokens: &[String]) -> Vec<usize> {
        let mut found: BTreeSet<usize> = BTreeSet::new();

        for token in tokens {
            let key = singular(token);
            if let Some(hits) = self.postings.get(&key) {
                found.extend(hits.iter().copied());
            }
            for similar in self.similar_vocab(&key) {
                if let Some(hits) = self.postings.get(&similar) {
                    found.extend(hits.iter().copied());
                }
            }
        }

        found.into_iter().collect()
    }

    fn similar_vocab(&self, key: &str) -> Vec<String> {
        let query_grams: HashSet<String> = trigrams(key).into_iter().collect();
        if query_grams.is_empty() {
            return Vec::new();
        }

        let mut seen: HashSet<&String> = HashSet::new();
        let mut out = Vec::new();
        for gram in &query_grams {
            let Some(words) = self.trigram_vocab.get(gram) else {
                continue;
            };
            for word in words {
                if word == key || !seen.insert(word) {
                    continue;
                }
                let word_grams: HashSet<String> = trigrams(word).into_iter().collect();
                if jaccard(&query_grams, &word_grams) >= TRIGRAM_MIN_JACCARD {
                    out.push(word.clone());
                }
            }
        }
        out
    }
}

const IE_SINGULARS: &[&str] = &[
    "brownie", "calorie", "cookie", "hoagie", "movie", "rookie", "smoothie", "veggie", "zombie",
];

/// 粗略的单数化："tomatoes" -> "tomato", "berries" -> "berry", "apples" -> "apple"
pub fn singular(token: &str) -> String {
    if token.len() <= 3 || !token.is_ascii() {
        return token.to_string();
    }
    if let Some(stem) = token.strip_suffix("ies") {
        // pies / cookies 的单数以 ie 结尾
        if stem.len() <= 2 || IE_SINGULARS.contains(&&token[..token.len() - 1]) {
            return token[..token.len() - 1].to_string();
        }
        return format!("{}y", stem);
    }
    for suffix in ["oes", "ches", "shes", "xes", "sses"] {
        if token.ends_with(suffix) {
            return token[..token.len() - 2].to_string();
        }
    }
    if token.ends_with('s') && !token.ends_with("ss") && !token.ends_with("us") {
        return token[..token.len() - 1].to_string();
    }
    token.to_string()
}

/// 带边界填充的字符三元组
fn trigrams(word: &str) -> Vec<String> {
    let padded: Vec<char> = format!("  {} ", word).chars().collect();
    if word.is_empty() {
        return Vec::new();
    }
    padded
        .windows(3)
        .map(|w| w.iter().collect::<String>())
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let inter = a.intersection(b).count();
    let union = a.len() + b.len() - inter;
    if union == 0 {
        0.0
    } else {
        inter as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn product(id: i64, name: &str, synonyms: &[&str]) -> Product {
        Product {
            product_id: id,
            product_name: name.to_string(),
            description: None,
            category: Some("Grocery".to_string()),
            price: BigDecimal::from(1),
            stock_quantity: Some(10),
            unit: None,
            brand: None,
            image_url: None,
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn catalog() -> CatalogIndex {
        CatalogIndex::build(vec![
            product(1, "Fresh Tomatoes", &[]),
            product(2, "White Bread", &["sandwich loaf"]),
            product(3, "Basmati Rice", &[]),
            product(4, "Strawberries", &[]),
        ])
    }

    fn toks(s: &str) -> Vec<String> {
        normalize_tokens(s)
    }

    #[test]
    fn singular_forms() {
        assert_eq!(singular("tomatoes"), "tomato");
        assert_eq!(singular("strawberries"), "strawberry");
        assert_eq!(singular("apples"), "apple");
        assert_eq!(singular("glass"), "glass");
        assert_eq!(singular("peaches"), "peach");
        assert_eq!(singular("egg"), "egg");
    }

    #[test]
    fn ie_plurals_keep_their_ending() {
        assert_eq!(singular("pies"), "pie");
        assert_eq!(singular("ties"), "tie");
        assert_eq!(singular("cookies"), "cookie");
        assert_eq!(singular("smoothies"), "smoothie");
        assert_eq!(singular("berries"), "berry");
        assert_eq!(singular("cherries"), "cherry");
    }

    #[test]
    fn exact_and_plural_tokens_hit() {
        let index = catalog();
        assert_eq!(index.candidates(&toks("tomato")), vec![0]);
        assert_eq!(index.candidates(&toks("bread")), vec![1]);
        assert_eq!(index.candidates(&toks("strawberry")), vec![3]);
    }

    #[test]
    fn synonyms_are_indexed() {
        let index = catalog();
        assert_eq!(index.candidates(&toks("loaf")), vec![1]);
        assert_eq!(index.entry(1).map(|e| e.surfaces.len()), Some(2));
    }

    #[test]
    fn misspellings_hit_through_trigrams() {
        let index = catalog();
        assert_eq!(index.candidates(&toks("basmatti")), vec![2]);
    }

    #[test]
    fn unrelated_tokens_find_nothing() {
        let index = catalog();
        assert!(index.candidates(&toks("xyz nonexistent item")).is_empty());
    }

    #[test]
    fn candidate_order_is_catalog_order() {
        let index = catalog();
        assert_eq!(index.candidates(&toks("rice bread tomatoes")), vec![0, 1, 2]);
    }
}
