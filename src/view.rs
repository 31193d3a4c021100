//! Handler-to-renderer contract.
//!
//! Template rendering itself lives outside this service; handlers hand
//! the renderer a template name plus a data bag, delivered as a JSON
//! envelope `{"template": ..., "data": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// A page to render: template name, data bag, response status.
#[derive(Debug, Clone)]
pub struct Page {
    template: &'static str,
    status: StatusCode,
    data: Value,
}

impl Page {
    pub fn new(template: &'static str, data: Value) -> Self {
        Self { template, status: StatusCode::OK, data }
    }

    /// Same page with an explicit status, e.g. 422 for a form re-render
    /// after validation failure.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "template": self.template,
            "data": self.data,
        }));
        (self.status, body).into_response()
    }
}

/// Fixed placeholder response for endpoints that are part of the route
/// surface but deliberately unimplemented. Performs no state change.
pub fn not_implemented(operation: &str) -> Response {
    (
        StatusCode::NOT_IMPLEMENTED,
        format!("NOT IMPLEMENTED: {}", operation),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_to_ok() {
        let page = Page::new("index", json!({ "title": "Home" }));
        assert_eq!(page.status, StatusCode::OK);
        assert_eq!(page.template, "index");
    }

    #[test]
    fn with_status_overrides() {
        let page = Page::new("book_form", json!({})).with_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
