use tubely_api::auth::make_jwt;
use uuid::Uuid;

/// Secret the test app's validator is configured with.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// A caller with a valid one-hour token.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn new() -> Self {
        let user_id = Uuid::new_v4();
        let token = make_jwt(user_id, TEST_JWT_SECRET, chrono::Duration::hours(1))
            .expect("Failed to sign test token");
        Self { user_id, token }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// A token for `user_id` signed with a secret the server does not know.
pub fn foreign_token(user_id: Uuid) -> String {
    make_jwt(
        user_id,
        "some-other-secret-that-is-32-chars-long",
        chrono::Duration::hours(1),
    )
    .expect("Failed to sign test token")
}
