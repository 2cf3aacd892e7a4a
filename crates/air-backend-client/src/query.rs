//! Row filter and ordering for table requests
//!
//! Renders to the backend's query-string dialect:
//! `select=*&user_id=eq.<id>&order=deadline.asc&limit=1`.

/// Filter set for one table request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<(String, String)>,
    /// Column sorted ascending
    order: Option<String>,
    limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality filter on a column
    pub fn eq(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.as_ref())));
        self
    }

    /// Sort ascending on a column
    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(column.to_string());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render filters only (for PATCH/DELETE, where `select` is not allowed)
    pub fn to_filter_string(&self) -> String {
        let mut params: Vec<String> = self
            .filters
            .iter()
            .map(|(c, v)| format!("{}={}", c, urlencoding::encode(v)))
            .collect();
        if let Some(column) = &self.order {
            params.push(format!("order={}.asc", column));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        params.join("&")
    }

    /// Render as a select query string
    pub fn to_select_string(&self) -> String {
        let filters = self.to_filter_string();
        if filters.is_empty() {
            "select=*".to_string()
        } else {
            format!("select=*&{}", filters)
        }
    }
}
