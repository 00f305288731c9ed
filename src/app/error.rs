//! Application error that may occur during the processing of a request.
//!
//! See [`AppError`].

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    sync::Arc,
};

use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    response::{IntoResponse, Response},
};

use derive_more::{Display, From};

use http::StatusCode;

use crewmatch_model::ApiError;

use crate::app::AppJson;

/// Application error that may occur during the processing of a request.
///
/// This includes both internal errors and user errors.
#[derive(Debug)]
pub struct AppError {
    kind: AppErrorKind,
    message: Option<String>,
}

impl AppError {
    /// The inner [`AppErrorKind`] of the error.
    pub fn kind(&self) -> &AppErrorKind {
        &self.kind
    }

    /// Discards the error message, unwrapping the inner error.
    pub fn into_kind(self) -> AppErrorKind {
        self.kind
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.message.as_ref() {
            Some(msg) => f.write_str(msg),
            None => Display::fmt(&self.kind, f),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            AppErrorKind::Json(err) => Some(err),
            AppErrorKind::Form(err) => Some(err),
            AppErrorKind::Sqlx(err) => Some(err),
            _ => None,
        }
    }
}

impl<T> From<T> for AppError
where
    T: Into<AppErrorKind>,
{
    fn from(value: T) -> Self {
        AppError {
            kind: value.into(),
            message: None,
        }
    }
}

/// The specific kind of error that happened.
#[derive(Debug, Display, From)]
#[non_exhaustive]
pub enum AppErrorKind {
    /// The request's JSON payload was malformed or invalid.
    #[display("{_0}")]
    Json(JsonRejection),
    /// The request's urlencoded payload was malformed or invalid.
    #[display("{_0}")]
    Form(FormRejection),
    /// The request body failed validation.
    #[display("{_0}")]
    Garde(garde::Report),
    /// The request has no `Content-Type` header.
    #[display("missing content type")]
    #[from(ignore)]
    MissingContentType,
    /// The request's `Content-Type` is not one the API accepts.
    #[display("unsupported content type: {_0}")]
    #[from(ignore)]
    UnsupportedContentType(String),
    /// The referenced user does not exist.
    #[display("user not found")]
    #[from(ignore)]
    UserNotFound,
    /// The referenced crew does not exist.
    #[display("crew not found")]
    #[from(ignore)]
    TeamNotFound,
    /// A join was attempted on a crew at max capacity.
    #[display("crew is full")]
    #[from(ignore)]
    TeamFull,
    /// The user cannot afford the crew formation price.
    #[display("not enough coins to found a crew")]
    #[from(ignore)]
    InsufficientFunds,
    /// A leave was attempted on a crew the user does not belong to.
    #[display("user is not a member of this crew")]
    #[from(ignore)]
    NotAMember,
    /// A leave was attempted but the user belongs to no crew.
    #[display("user is not in a crew")]
    #[from(ignore)]
    NotInAnyTeam,
    /// An unexpected database error.
    #[display("{_0}")]
    Sqlx(sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut internal_error = None;

        let (status, mut error) = match self.kind {
            AppErrorKind::Json(error) => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    message: error.to_string(),
                },
            ),
            AppErrorKind::Form(error) => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    message: error.to_string(),
                },
            ),
            AppErrorKind::Garde(report) => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    message: report.to_string(),
                },
            ),
            AppErrorKind::MissingContentType => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    message: "Missing content type.".into(),
                },
            ),
            AppErrorKind::UnsupportedContentType(mime) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ApiError {
                    message: format!("Unsupported content type: {}", mime),
                },
            ),
            AppErrorKind::UserNotFound => (
                StatusCode::NOT_FOUND,
                ApiError {
                    message: "User not found.".into(),
                },
            ),
            AppErrorKind::TeamNotFound => (
                StatusCode::NOT_FOUND,
                ApiError {
                    message: "Crew not found.".into(),
                },
            ),
            AppErrorKind::TeamFull => (
                StatusCode::CONFLICT,
                ApiError {
                    message: "That crew is already full.".into(),
                },
            ),
            AppErrorKind::InsufficientFunds => (
                StatusCode::PAYMENT_REQUIRED,
                ApiError {
                    message: "Not enough coins to found a crew.".into(),
                },
            ),
            AppErrorKind::NotAMember => (
                StatusCode::CONFLICT,
                ApiError {
                    message: "User is not a member of that crew.".into(),
                },
            ),
            AppErrorKind::NotInAnyTeam => (
                StatusCode::CONFLICT,
                ApiError {
                    message: "User is not in a crew.".into(),
                },
            ),
            // fallthrough for internal server errors not turned into user
            // errors here
            error => {
                internal_error = Some(error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError {
                        message: "An internal server error occured.".into(),
                    },
                )
            }
        };

        // replace error message
        if let Some(message) = self.message {
            error.message = message;
        }

        let mut response = (status, AppJson(error)).into_response();
        if let Some(error) = internal_error {
            response.extensions_mut().insert(Arc::new(error));
        }
        response
    }
}
