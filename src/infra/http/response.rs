use serde::Serialize;

/// JSON body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<T>,
}

impl<T: Serialize> ApiEnvelope<T> {
    pub fn ok(message: &'static str, details: T) -> Self {
        Self {
            success: true,
            message,
            details: Some(details),
        }
    }
}

impl ApiEnvelope<String> {
    pub fn failure(message: &'static str, detail: Option<String>) -> Self {
        Self {
            success: false,
            message,
            details: detail,
        }
    }
}

/// Wraps a listing as `{ "data": [...] }`.
#[derive(Debug, Serialize)]
pub struct DataList<T> {
    pub data: T,
}
