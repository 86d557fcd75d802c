//! Response envelope shared by the user endpoints.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Success,
    Fail,
}

/// `{"status": "Success", "data": ...}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data,
        }
    }

    pub fn fail(data: T) -> Self {
        Self {
            status: Status::Fail,
            data,
        }
    }
}

/// One entry of a `Fail` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub code: String,
    pub description: String,
}
