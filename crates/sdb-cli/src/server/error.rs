//! Maps every domain crate's error enum onto the `{"error": "..."}`
//! envelope and an HTTP status (§7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.0.is_server_error() {
            log::error!("{}", self.1);
        }
        (self.0, Json(ErrorBody { error: self.1 })).into_response()
    }
}

impl From<sdb_store::Error> for AppError {
    fn from(err: sdb_store::Error) -> Self {
        let status = match &err {
            sdb_store::Error::FileNotFound(_)
            | sdb_store::Error::BaseMissing(_)
            | sdb_store::Error::NoSchema(_) => StatusCode::NOT_FOUND,
            sdb_store::Error::InvalidFilename(_) | sdb_store::Error::MissingPayload => {
                StatusCode::BAD_REQUEST
            }
            sdb_store::Error::IdNotFound(_) => StatusCode::NOT_FOUND,
            sdb_store::Error::Codec(_) | sdb_store::Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError(status, err.to_string())
    }
}

impl From<sdb_wdbc::Error> for AppError {
    fn from(err: sdb_wdbc::Error) -> Self {
        let status = match &err {
            sdb_wdbc::Error::SchemaValidation(_)
            | sdb_wdbc::Error::InvalidRecord(_)
            | sdb_wdbc::Error::TypeConversion(_) => StatusCode::BAD_REQUEST,
            sdb_wdbc::Error::FileMissing(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError(status, err.to_string())
    }
}

impl From<sdb_spells::Error> for AppError {
    fn from(err: sdb_spells::Error) -> Self {
        let status = match &err {
            sdb_spells::Error::NotFound(_) => StatusCode::NOT_FOUND,
            sdb_spells::Error::IdAlreadyExists(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError(status, err.to_string())
    }
}

impl From<sdb_talents::Error> for AppError {
    fn from(err: sdb_talents::Error) -> Self {
        let status = match &err {
            sdb_talents::Error::RepackDisabled => StatusCode::GONE,
            sdb_talents::Error::ReadConfig { .. } | sdb_talents::Error::ParseConfig { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError(status, err.to_string())
    }
}

impl From<sdb_index::Error> for AppError {
    fn from(err: sdb_index::Error) -> Self {
        AppError(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl From<sdb_auth::Error> for AppError {
    fn from(err: sdb_auth::Error) -> Self {
        // Database failures never surface their SQL detail to the client
        // (§4.8 signup): a generic 403 covers every `Sql` variant.
        if matches!(err, sdb_auth::Error::Sql(_)) {
            return AppError(StatusCode::FORBIDDEN, "account operation failed".to_string());
        }
        let status = match &err {
            sdb_auth::Error::InvalidUsername
            | sdb_auth::Error::InvalidPassword
            | sdb_auth::Error::InvalidEmail => StatusCode::BAD_REQUEST,
            sdb_auth::Error::DuplicateAccount => StatusCode::CONFLICT,
            sdb_auth::Error::LoginFailed => StatusCode::UNAUTHORIZED,
            sdb_auth::Error::UnknownAccount => StatusCode::FORBIDDEN,
            sdb_auth::Error::Unauthorized => StatusCode::UNAUTHORIZED,
            sdb_auth::Error::UnknownService(_) => StatusCode::NOT_FOUND,
            sdb_auth::Error::Sql(_) | sdb_auth::Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError(status, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError(StatusCode::UNAUTHORIZED, message.into())
    }
}
