use serde::{Deserialize, Deserializer, Serialize};

/// 列表响应中的分页信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationInfo {
    /// 空结果也报告 1 页
    pub fn new(page: u64, page_size: u64, total: u64) -> Self {
        Self {
            page: page as i64,
            page_size: page_size as i64,
            total: total as i64,
            total_pages: total_pages(total, page_size) as i64,
        }
    }
}

pub fn total_pages(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size.max(1)).max(1)
}

/// 将请求页码限制在 [1, 总页数]
pub fn clamp_page(requested: i64, total: u64, page_size: u64) -> u64 {
    (requested.max(1) as u64).min(total_pages(total, page_size))
}

pub fn first_page() -> i64 {
    1
}

/// 页码参数：接受数字或数字字符串，缺失或无法解析时为第 1 页
///
/// 配合 `#[serde(default = "first_page", deserialize_with = "lenient_page")]` 使用
pub fn lenient_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(page)) => page,
        Some(Raw::Float(page)) if page.is_finite() => page as i64,
        Some(Raw::Text(text)) => text.trim().parse().unwrap_or(1),
        _ => 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct PageOnly {
        #[serde(default = "first_page", deserialize_with = "lenient_page")]
        page: i64,
    }

    fn page_of(json: serde_json::Value) -> i64 {
        serde_json::from_value::<PageOnly>(json).unwrap().page
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 25, 10), 1);
        assert_eq!(clamp_page(-3, 25, 10), 1);
        assert_eq!(clamp_page(2, 25, 10), 2);
        assert_eq!(clamp_page(99, 25, 10), 3);
        assert_eq!(clamp_page(5, 0, 10), 1);
    }

    #[test]
    fn test_lenient_page() {
        use serde_json::json;
        assert_eq!(page_of(json!({"page": 3})), 3);
        assert_eq!(page_of(json!({"page": " 4 "})), 4);
        assert_eq!(page_of(json!({"page": "abc"})), 1);
        assert_eq!(page_of(json!({"page": null})), 1);
        assert_eq!(page_of(json!({})), 1);
    }
}
