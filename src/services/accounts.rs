use std::sync::Arc;

use bcrypt::verify;
use tracing::{info, warn};

use crate::auth::CredentialCodec;
use crate::errors::{AppError, AppResult};
use crate::models::{AuthenticationData, LoginRequest, SignupRequest, User};
use crate::services::store::UserStore;

/// Signup and login. Login is the only place credentials are issued.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    codec: Arc<CredentialCodec>,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, codec: Arc<CredentialCodec>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            codec,
            bcrypt_cost,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> AppResult<User> {
        let new_user = request.prepare(self.bcrypt_cost)?;
        let user = self.users.create(new_user).await?;
        info!(user_id = user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthenticationData> {
        let user = self.users.get_by_email(&request.email).await?;

        match verify(&request.password, &user.password) {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = user.id, "password mismatch");
                return Err(AppError::Unauthorized(
                    "the password does not match".into(),
                ));
            }
            Err(e) => return Err(AppError::Unauthorized(e.to_string())),
        }

        // Permissions are copied from the role held right now; later role
        // changes only take effect at the next login.
        let token = self.codec.issue(user.id, user.role)?;
        info!(user_id = user.id, "login succeeded");

        Ok(AuthenticationData {
            id: user.id.to_string(),
            token,
        })
    }
}
