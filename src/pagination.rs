use serde::Deserialize;

/// `offset`/`limit` query parameters shared by the list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    10
}

impl Pagination {
    /// Negative values are coerced to zero rather than rejected.
    pub fn clamp(self) -> Self {
        Self {
            limit: self.limit.max(0),
            offset: self.offset.max(0),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: default_limit(), offset: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_offset_0_limit_10() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.offset, 0);
        assert_eq!(p.limit, 10);
    }

    #[test]
    fn explicit_values_pass_through() {
        let p: Pagination = serde_json::from_str(r#"{"limit":2,"offset":2}"#).unwrap();
        let p = p.clamp();
        assert_eq!(p.limit, 2);
        assert_eq!(p.offset, 2);
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        let p: Pagination = serde_json::from_str(r#"{"limit":-5,"offset":-1}"#).unwrap();
        let p = p.clamp();
        assert_eq!(p.limit, 0);
        assert_eq!(p.offset, 0);
    }
}
