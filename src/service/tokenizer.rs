//! 清单分词：把多行文本拆成逐行的商品需求，并剥离数量与单位。

use crate::models::{ParsedItem, Unit};

const STOPWORDS: &[&str] = &["a", "an", "the", "of", "some", "and", "for"];

const BULLETS: &[char] = &['-', '*', '•', '+', '·', '–', '—', '>'];

/// 切分并解析整段清单，空行被丢弃，顺序与输入一致
pub fn tokenize(text: &str) -> Vec<ParsedItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

/// 解析单行
pub fn parse_line(line: &str) -> ParsedItem {
    let original = line.trim().to_string();
    let body = strip_list_marker(&original).to_lowercase();
    let words = split_words(&body);

    let mut quantity: Option<f64> = None;
    let mut unit: Option<Unit> = None;
    let mut tokens: Vec<String> = Vec::with_capacity(words.len());

    let mut after_quantity = false;
    let mut i = 0;
    while i < words.len() {
        let word = words[i].as_str();
        let follows_quantity = std::mem::take(&mut after_quantity);

        // "2 x eggs" / "eggs x 2" 中独立的乘号
        if word == "x"
            && (follows_quantity || words.get(i + 1).is_some_and(|n| n.parse::<f64>().is_ok()))
        {
            i += 1;
            continue;
        }

        if let Some((qty, attached)) = split_quantity(word) {
            // "5 kg" 形式：单位在下一个词
            let mut found_unit = attached;
            if found_unit.is_none() {
                if let Some(next) = words.get(i + 1).and_then(|w| Unit::parse(w)) {
                    found_unit = Some(next);
                    i += 1;
                }
            }
            if quantity.is_none() {
                quantity = Some(qty);
                unit = found_unit;
            }
            after_quantity = true;
            i += 1;
            continue;
        }

        if let Some(u) = Unit::parse(word) {
            // 单独出现的 "dozen" 等单位词不属于商品名
            if unit.is_none() && (quantity.is_some() || u == Unit::Dozen) {
                unit = Some(u);
                if quantity.is_none() {
                    quantity = Some(1.0);
                }
            }
            if quantity.is_some() || u == Unit::Dozen || word.len() > 2 {
                i += 1;
                continue;
            }
        }

        if !STOPWORDS.contains(&word) {
            tokens.push(word.to_string());
        }
        i += 1;
    }

    ParsedItem {
        original,
        normalized: tokens.join(" "),
        tokens,
        quantity,
        unit,
    }
}

/// 规范化任意文本（商品名、同义词），规则与清单行一致但不提取数量
pub fn normalize_tokens(text: &str) -> Vec<String> {
    split_words(&text.to_lowercase())
        .into_iter()
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// 去掉行首的项目符号或编号 ("- ", "* ", "1. ", "2) ")
fn strip_list_marker(line: &str) -> &str {
    let mut rest = line.trim_start();
    loop {
        let before = rest;
        rest = rest.trim_start_matches(BULLETS).trim_start();

        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits > 0 {
            let after = &rest[digits..];
            let mut chars = after.chars();
            if let (Some('.') | Some(')'), Some(next)) = (chars.next(), chars.next()) {
                if next.is_whitespace() {
                    rest = after[1..].trim_start();
                }
            }
        }
        if rest == before {
            return rest;
        }
    }
}

/// 按空白和标点切词，数字中间的小数点/逗号保留
fn split_words(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (idx, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            current.push(c);
            continue;
        }
        let decimal_point = (c == '.' || c == ',')
            && idx > 0
            && chars[idx - 1].is_ascii_digit()
            && chars.get(idx + 1).is_some_and(|n| n.is_ascii_digit());
        if decimal_point {
            current.push('.');
            continue;
        }
        if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// 识别数量词："5", "1.5", "5kg", "500ml", "x2", "2x"
fn split_quantity(word: &str) -> Option<(f64, Option<Unit>)> {
    if let Some(rest) = word.strip_prefix('x') {
        if let Ok(n) = rest.parse::<f64>() {
            return Some((n, None));
        }
    }

    let digits_end = word
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(word.len());
    if digits_end == 0 {
        return None;
    }
    let number: f64 = word[..digits_end].parse().ok()?;
    let suffix = &word[digits_end..];
    if suffix.is_empty() {
        return Some((number, None));
    }
    if suffix == "x" {
        return Some((number, None));
    }
    Unit::parse(suffix).map(|u| (number, Some(u)))
}
