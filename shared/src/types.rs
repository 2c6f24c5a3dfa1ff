use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: i32 = 20;
pub const MAX_PAGE_SIZE: i32 = 100;

// Common Types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i32,
    pub page_size: i32,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i32,
    pub page_size: i32,
    pub total_pages: i32,
}

/// Response envelope used by the REST gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// Postal address, also used for geocoded store locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[validate(length(equal = 2))]
    pub country: String,
}

impl PageRequest {
    /// Normalizes out-of-range values instead of rejecting them: page 0
    /// becomes 1, page_size 0 becomes the default, oversized pages clamp.
    pub fn new(page: i32, page_size: i32) -> Self {
        let page = page.max(1);
        let page_size = if page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };
        Self {
            page,
            page_size,
            sort_by: None,
            sort_order: None,
            include_deleted: false,
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    /// Sort field for SQL assembly, restricted to a whitelist so callers
    /// can never inject through the sort parameter.
    pub fn sort_field<'a>(&'a self, allowed: &[&'a str], default: &'a str) -> &'a str {
        match &self.sort_by {
            Some(field) if allowed.contains(&field.as_str()) => field.as_str(),
            _ => default,
        }
    }

    pub fn sort_direction(&self) -> &'static str {
        match self.sort_order {
            Some(SortOrder::Asc) => "ASC",
            _ => "DESC",
        }
    }

    pub fn offset(&self) -> i64 {
        ((self.page - 1) * self.page_size) as i64
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl<T> PageResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: &PageRequest) -> Self {
        let total_pages = ((total as f64) / (page.page_size as f64)).ceil() as i32;
        Self {
            data,
            total,
            page: page.page,
            page_size: page.page_size,
            total_pages,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            error: None,
        }
    }

    pub fn success_with_total(data: T, total: i64) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: Some(total),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            total: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_normalization() {
        let p = PageRequest::new(0, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, DEFAULT_PAGE_SIZE);

        let p = PageRequest::new(3, 500);
        assert_eq!(p.page_size, MAX_PAGE_SIZE);
        assert_eq!(p.offset(), 200);
    }

    #[test]
    fn test_sort_whitelist() {
        let page = PageRequest::new(1, 20).sorted_by("total_amount", SortOrder::Asc);
        assert_eq!(
            page.sort_field(&["created_at", "total_amount"], "created_at"),
            "total_amount"
        );
        assert_eq!(page.sort_direction(), "ASC");

        let sneaky = PageRequest::new(1, 20).sorted_by("1; DROP TABLE orders", SortOrder::Desc);
        assert_eq!(
            sneaky.sort_field(&["created_at", "total_amount"], "created_at"),
            "created_at"
        );
        assert_eq!(PageRequest::default().sort_direction(), "DESC");
    }

    #[test]
    fn test_page_response_totals() {
        let page = PageRequest::new(1, 20);
        let resp = PageResponse::new(vec![1, 2, 3], 41, &page);
        assert_eq!(resp.total_pages, 3);
        assert_eq!(resp.total, 41);
    }

    #[test]
    fn test_envelope_shape() {
        let ok = ApiResponse::success(serde_json::json!({"id": 1}));
        let body = serde_json::to_value(&ok).unwrap();
        assert_eq!(body["success"], true);
        assert!(body.get("error").is_none());

        let err: ApiResponse<()> = ApiResponse::error("nope");
        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "nope");
    }
}
