//! Response envelopes
//!
//! Every API response carries its HTTP status in the body as well.

use serde::{Deserialize, Serialize};

/// Successful response: `{"status": 200, "data": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub status: u16,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { status: 200, data }
    }

    pub fn created(data: T) -> Self {
        Self { status: 201, data }
    }
}

/// Failed response: `{"status": 400, "message": "...", "errors": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

/// Machine-readable error entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
