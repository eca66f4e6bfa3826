use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::models::UserId;
use crate::service::Session;

/// 上游认证网关写入的用户标识头
pub const USER_HEADER: &str = "x-user-id";

/// 从请求头取当前会话; 没有用户时得到匿名会话, 由服务层拒绝写操作
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(UserId::new);

        Ok(CurrentSession(match user {
            Some(user) => Session::signed_in(user),
            None => Session::anonymous(),
        }))
    }
}
