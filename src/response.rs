use serde::Serialize;
use utoipa::ToSchema;

/// Pagination echo attached to list responses.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// Uniform response envelope. Single resources travel without `meta`;
/// list endpoints attach the pagination echo via [`ApiResponse::paged`].
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }

    pub fn paged(message: impl Into<String>, data: T, page: i64, per_page: i64, total: i64) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta: Some(Meta {
                page,
                per_page,
                total,
            }),
        }
    }
}
