use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::borrow::Cow;

/// Internal error taxonomy. Services return these; the HTTP layer converts
/// them through `Error` at the boundary. Permission and validation failures
/// keep their message; everything unexpected is logged in full and surfaced
/// as a generic internal error.
#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Account is inactive")]
    AccountInactive,
    #[error("Permission denied: {0}")]
    PermissionDenied(Cow<'static, str>),
    #[error("Not found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Too large: {0}")]
    TooLarge(Cow<'static, str>),
    #[error("Type not allowed: {0}")]
    TypeNotAllowed(Cow<'static, str>),
    // Metadata exists but the backing bytes are gone. Kept distinct from
    // NotFound so operators can tell corruption from bad requests.
    #[error("Data missing: {0}")]
    DataMissing(Cow<'static, str>),
    #[error("Validation failed: {0}")]
    Validation(Cow<'static, str>),
    #[error("Conflict: {0:?}")]
    Conflict(Option<DbErrorMeta>),
    // Wrapped sources. All of these surface as a generic 500.
    #[error("Database error: {0}")]
    Database(Cow<'static, str>),
    #[error("Password hash error")]
    Hash(#[from] argon2::password_hash::Error),
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl SystemError {
    pub fn permission_denied(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn too_large(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::TooLarge(msg.into())
    }

    pub fn type_not_allowed(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::TypeNotAllowed(msg.into())
    }

    pub fn data_missing(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::DataMissing(msg.into())
    }

    pub fn validation(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation(msg.into())
    }
}

#[derive(Debug)]
pub struct DbErrorMeta {
    pub code: Option<String>,
    pub constraint: Option<String>,
    pub message: String,
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // 23505: unique violation, e.g. duplicate username or email
            if db_err.code().as_deref() == Some("23505") {
                return SystemError::Conflict(Some(DbErrorMeta {
                    code: db_err.code().map(|s| s.to_string()),
                    constraint: db_err.constraint().map(|s| s.to_string()),
                    message: db_err.message().to_string(),
                }));
            }
            log::error!("Database error: {:?}", db_err);
            return SystemError::Database(db_err.message().to_string().into());
        }
        SystemError::Internal(Box::new(err))
    }
}

fn conflict_message(meta: &Option<DbErrorMeta>) -> Cow<'static, str> {
    let Some(m) = meta else {
        return "Duplicate value".into();
    };
    let Some(constraint) = &m.constraint else {
        return "Duplicate value".into();
    };
    // Constraint names follow the <table>_<column>_key convention.
    let field = constraint
        .trim_end_matches("_key")
        .trim_end_matches("_idx")
        .split('_')
        .next_back()
        .unwrap_or("value");
    let mut chars = field.chars();
    let field = match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Value".to_string(),
    };
    format!("{field} already exists").into()
}

/// HTTP-facing error. Handlers return this; `ResponseError` turns it into a
/// JSON body with the matching status code.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Unauthorized: {0}")]
    Unauthorized(Cow<'static, str>),
    #[error("Forbidden: {0}")]
    Forbidden(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error("Gone: {0}")]
    Gone(Cow<'static, str>),
    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(Cow<'static, str>),
    #[error("Unsupported Media Type: {0}")]
    UnsupportedMediaType(Cow<'static, str>),
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub message: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Gone(_) => StatusCode::GONE,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());
        match self {
            Error::BadRequest(msg)
            | Error::Unauthorized(msg)
            | Error::Forbidden(msg)
            | Error::NotFound(msg)
            | Error::Conflict(msg)
            | Error::Gone(msg)
            | Error::PayloadTooLarge(msg)
            | Error::UnsupportedMediaType(msg) => res.json(ErrorBody { message: msg.clone() }),
            Error::InternalServer => res.json(ErrorBody { message: "Internal Server Error".into() }),
        }
    }
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::AuthenticationRequired => {
                Error::Unauthorized("Authentication required".into())
            }
            SystemError::InvalidCredentials => {
                Error::Unauthorized("Invalid username or password".into())
            }
            SystemError::AccountInactive => Error::Forbidden("Account is inactive".into()),
            SystemError::PermissionDenied(msg) => Error::Forbidden(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            SystemError::TooLarge(msg) => Error::PayloadTooLarge(msg),
            SystemError::TypeNotAllowed(msg) => Error::UnsupportedMediaType(msg),
            SystemError::DataMissing(msg) => Error::Gone(msg),
            SystemError::Validation(msg) => Error::BadRequest(msg),
            SystemError::Conflict(meta) => Error::Conflict(conflict_message(&meta)),
            other => {
                log::error!("Internal Server Error: {:?}", other);
                Error::InternalServer
            }
        }
    }
}
