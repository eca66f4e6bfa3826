use crate::error::AppError;
use crate::models::UserId;

/// 当前会话 (由认证方提供); 没有用户时所有写操作都被拒绝
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<UserId>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    pub fn sign_in(&mut self, user: UserId) {
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> Result<&UserId, AppError> {
        self.user.as_ref().ok_or(AppError::Unauthorized)
    }
}

/// 删除前的用户确认
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}
