use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{Debug, Display};

#[derive(Debug)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn is_unauthorized_error(&self) -> bool {
        self.code == 102
    }

    pub fn is_not_found_error(&self) -> bool {
        self.code == 103
    }

    pub fn is_no_drivers_available_error(&self) -> bool {
        self.code == 104
    }

    pub fn is_upstream_error(&self) -> bool {
        self.code == 3 || self.code == 4
    }
}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        policy_error(err)
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        token_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => {
                // internal details stay in the logs
                tracing::error!(code = self.code, message = %self.message, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            102 => (StatusCode::UNAUTHORIZED, self.message.as_str()),
            103 | 104 => (StatusCode::NOT_FOUND, self.message.as_str()),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_invocation_error() -> Error {
    Error {
        code: 100,
        message: "invalid invocation".into(),
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn unauthorized_error() -> Error {
    Error {
        code: 102,
        message: "authentication required".into(),
    }
}

pub fn not_found_error() -> Error {
    Error {
        code: 103,
        message: "not found".into(),
    }
}

pub fn no_drivers_available_error() -> Error {
    Error {
        code: 104,
        message: "no drivers available".into(),
    }
}

pub fn env_var_error(err: env::VarError) -> Error {
    Error {
        code: 1,
        message: format!("environment variable error: {}", err),
    }
}

pub fn config_error<T: Display>(err: T) -> Error {
    Error {
        code: 1,
        message: format!("configuration error: {}", err),
    }
}

pub fn store_error<T: Debug>(err: T) -> Error {
    Error {
        code: 2,
        message: format!("store error: {:?}", err),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    Error {
        code: 3,
        message: format!("reqwest error: {}", err),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn policy_error<T: Display>(err: T) -> Error {
    Error {
        code: 5,
        message: format!("policy error: {}", err),
    }
}

pub fn token_error<T: Display>(err: T) -> Error {
    Error {
        code: 6,
        message: format!("token error: {}", err),
    }
}

pub fn server_error<T: Display>(err: T) -> Error {
    Error {
        code: 7,
        message: format!("server error: {}", err),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 8,
        message: "unexpected error".into(),
    }
}

#[test]
fn internal_errors_hide_details() {
    let response = store_error("ride map poisoned").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = upstream_error().into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn client_errors_map_to_statuses() {
    assert_eq!(
        invalid_input_error().into_response().status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        unauthorized_error().into_response().status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        not_found_error().into_response().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        no_drivers_available_error().into_response().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        invalid_invocation_error().into_response().status(),
        StatusCode::BAD_REQUEST
    );
}
