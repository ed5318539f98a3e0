use axum::async_trait;
use axum::extract::FromRequest;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::user::gatekeeper::GateError;

pub mod activation;
pub mod admin;
pub mod change_password;
pub mod find_password;
pub mod login;
pub mod logout;
pub mod signup;
pub mod todo_list;
pub mod todo_remove;
pub mod todo_save;
pub mod withdraw;

/// Successful outcome: `{"res": 0, "msg": "success", ...data}`.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 .0 == other.0 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        ApiSuccess(Json(ApiResponseBody::new(data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.0).into_response()
    }
}

/// Coded failure: `{"res": <negative code>, "msg": <message>}`.
///
/// Every coded outcome travels with HTTP 200; clients branch on `res`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub res: i32,
    pub msg: String,
}

impl ApiError {
    pub const BAD_REQUEST: i32 = -400;
    pub const UNAUTHORIZED: i32 = -401;
    pub const NOT_FOUND: i32 = -404;
    pub const INTERNAL_SERVER_ERROR: i32 = -500;

    pub fn new(res: i32, msg: impl Into<String>) -> Self {
        Self {
            res,
            msg: msg.into(),
        }
    }

    pub fn bad_request() -> Self {
        Self::new(Self::BAD_REQUEST, "bad request.")
    }

    pub fn unauthorized() -> Self {
        Self::new(Self::UNAUTHORIZED, "login required.")
    }

    pub fn not_found() -> Self {
        Self::new(Self::NOT_FOUND, "not found.")
    }

    pub fn internal_server_error() -> Self {
        Self::new(Self::INTERNAL_SERVER_ERROR, "internal server error.")
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Unauthorized => ApiError::unauthorized(),
            GateError::PermissionDenied => admin::AdminFailure::PermissionDenied.into(),
            GateError::Internal(_) => ApiError::internal_server_error(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            Json(ApiErrorBody {
                res: self.res,
                msg: self.msg,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    res: i32,
    msg: String,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(data: T) -> Self {
        Self {
            res: 0,
            msg: "success".to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub res: i32,
    pub msg: String,
}

/// Success payload for operations that return nothing beyond the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Empty {}

/// JSON body extractor whose rejection is the coded bad-request envelope.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                Err(ApiError::bad_request())
            }
        }
    }
}

/// Route fallback answering unknown paths with the coded not-found envelope.
pub async fn not_found() -> ApiError {
    ApiError::not_found()
}
