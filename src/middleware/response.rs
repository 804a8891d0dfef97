use axum::{
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// A `201 Created` response carrying the new resource and its `Location`.
#[derive(Debug)]
pub struct Created<T: Serialize> {
    pub location: String,
    pub data: T,
}

impl<T: Serialize> Created<T> {
    pub fn at(location: impl Into<String>, data: T) -> Self {
        Self {
            location: location.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::CREATED, Json(self.data)).into_response();
        match HeaderValue::from_str(&self.location) {
            Ok(value) => {
                response.headers_mut().insert(LOCATION, value);
            }
            Err(e) => tracing::error!("Invalid Location header '{}': {}", self.location, e),
        }
        response
    }
}

pub type ApiResult<T> = Result<T, crate::error::ApiError>;
