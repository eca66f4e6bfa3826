use axum::{
    extract::Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// 未登录时的写操作, 在访问存储前拒绝
    #[error("sign in required")]
    Unauthorized,

    /// 删除需要明确确认
    #[error("delete must be confirmed")]
    ConfirmationRequired,

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::ConfirmationRequired => StatusCode::PRECONDITION_REQUIRED,
            AppError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::Payload(_) | StoreError::InvalidPatch) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Store(_) | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
