//! Conversion of resolved responses into HTTP responses.

use axum::http::{header, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::response::resolver::ResolvedResponse;

impl IntoResponse for ResolvedResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status_code, self.body).into_response();
        let headers = response.headers_mut();

        for (name, value) in self.headers.iter() {
            match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping header that is not valid HTTP"),
            }
        }

        match HeaderValue::try_from(self.content_type.as_str()) {
            Ok(value) => {
                headers.insert(header::CONTENT_TYPE, value);
            }
            Err(_) => tracing::warn!(content_type = %self.content_type, "Dropping invalid content type"),
        }

        response
    }
}
