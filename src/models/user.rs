use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// 用户ID：前端可能传数字也可能传字符串 ("42")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        let id = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n,
            Raw::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("invalid user_id: {:?}", s)))?,
        };
        if id <= 0 {
            return Err(de::Error::custom(format!("invalid user_id: {}", id)));
        }
        Ok(UserId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_number_and_numeric_string() {
        let a: UserId = serde_json::from_str("7").unwrap();
        let b: UserId = serde_json::from_str("\" 7 \"").unwrap();
        assert_eq!(a, UserId(7));
        assert_eq!(b, UserId(7));
    }

    #[test]
    fn rejects_garbage_and_null() {
        assert!(serde_json::from_str::<UserId>("\"abc\"").is_err());
        assert!(serde_json::from_str::<UserId>("null").is_err());
        assert!(serde_json::from_str::<UserId>("0").is_err());
    }
}
