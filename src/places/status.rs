use std::fmt;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    OK,
    #[serde(rename = "ZERO_RESULTS")]
    ZeroResults,
    #[serde(rename = "NOT_FOUND")]
    NotFound,
    #[serde(rename = "INVALID_REQUEST")]
    InvalidRequest,
    #[serde(rename = "OVER_QUERY_LIMIT")]
    OverQueryLimit,
    #[serde(rename = "REQUEST_DENIED")]
    RequestDenied,
    #[serde(rename = "UNKNOWN_ERROR")]
    UnknownError,
}

impl StatusCode {
    pub fn is_ok(&self) -> bool {
        matches!(self, StatusCode::OK)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::OK => "OK",
            StatusCode::ZeroResults => "ZERO_RESULTS",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::InvalidRequest => "INVALID_REQUEST",
            StatusCode::OverQueryLimit => "OVER_QUERY_LIMIT",
            StatusCode::RequestDenied => "REQUEST_DENIED",
            StatusCode::UnknownError => "UNKNOWN_ERROR",
        };
        f.write_str(name)
    }
}
