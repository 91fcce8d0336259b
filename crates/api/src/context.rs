use taskhub_core::UserId;

/// Authenticated caller for a request, inserted by the auth middleware.
///
/// This is immutable and present on every route behind the middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    user_id: UserId,
}

impl AuthContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
