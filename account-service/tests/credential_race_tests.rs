mod common;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use account_service::domain::user::errors::UserError;
use account_service::domain::user::models::ActivationKey;
use account_service::domain::user::models::LoginCommand;
use account_service::domain::user::models::LoginName;
use account_service::domain::user::models::NewUser;
use account_service::domain::user::models::Password;
use account_service::domain::user::models::SignupCommand;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserId;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::ports::UserServicePort;
use account_service::domain::user::service::UserService;
use account_service::domain::user::status::UserStatus;
use async_trait::async_trait;
use auth::Credential;
use common::test_authenticator;
use common::InMemoryUserRepository;
use common::RecordingMailer;

/// Store that lets a password change land right after a login lookup has
/// read the row, before the login writes anything back.
struct ChangeAfterLookup {
    inner: Arc<InMemoryUserRepository>,
    pending: Credential,
    armed: AtomicBool,
}

#[async_trait]
impl UserRepository for ChangeAfterLookup {
    async fn insert(&self, user: NewUser) -> Result<User, UserError> {
        self.inner.insert(user).await
    }

    async fn update_credential(
        &self,
        id: &UserId,
        credential: &Credential,
    ) -> Result<(), UserError> {
        self.inner.update_credential(id, credential).await
    }

    async fn set_temporary_credential(
        &self,
        id: &UserId,
        credential: &Credential,
    ) -> Result<(), UserError> {
        self.inner.set_temporary_credential(id, credential).await
    }

    async fn consume_temporary_credential(
        &self,
        id: &UserId,
        expected: &Credential,
    ) -> Result<bool, UserError> {
        self.inner.consume_temporary_credential(id, expected).await
    }

    async fn transition_status(
        &self,
        id: &UserId,
        from: UserStatus,
        to: UserStatus,
    ) -> Result<bool, UserError> {
        self.inner.transition_status(id, from, to).await
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.inner.delete(id).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_login_name(
        &self,
        login_name: &LoginName,
    ) -> Result<Option<User>, UserError> {
        let user = self.inner.find_by_login_name(login_name).await?;
        if let Some(user) = &user {
            if self.armed.swap(false, Ordering::SeqCst) {
                self.inner.update_credential(&user.id, &self.pending).await?;
            }
        }
        Ok(user)
    }

    async fn find_by_activation_key(
        &self,
        key: &ActivationKey,
    ) -> Result<Option<User>, UserError> {
        self.inner.find_by_activation_key(key).await
    }
}

fn login(id: &str, password: &str) -> LoginCommand {
    LoginCommand {
        login_name: LoginName::new(id.to_string()).unwrap(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_password_change_survives_concurrent_temporary_login() {
    let authenticator = test_authenticator();
    let users = Arc::new(InMemoryUserRepository::default());
    let mailer = Arc::new(RecordingMailer::default());
    let setup = UserService::new(
        Arc::clone(&users),
        Arc::clone(&mailer),
        Arc::clone(&authenticator),
    );

    let login_name = LoginName::new("race@example.com".to_string()).unwrap();
    setup
        .signup(SignupCommand::new(
            login_name.clone(),
            Password::new("old-password".to_string()).unwrap(),
            false,
        ))
        .await
        .unwrap();
    setup.request_password_reset(&login_name).await.unwrap();
    let temporary = mailer.temporary_password("race@example.com").unwrap();

    let racing = Arc::new(ChangeAfterLookup {
        inner: Arc::clone(&users),
        pending: authenticator.hash_password("brand-new").unwrap(),
        armed: AtomicBool::new(true),
    });
    let service = UserService::new(racing, Arc::clone(&mailer), Arc::clone(&authenticator));

    // The row read by this login still holds the temporary password, but the
    // change has cleared it by the time the login tries to consume it
    let result = service.login(login("race@example.com", &temporary)).await;
    assert!(matches!(result, Err(UserError::InvalidCredentials)));

    let stored = users.find("race@example.com").unwrap();
    assert!(stored.temporary_credential.is_none());

    assert!(service
        .login(login("race@example.com", "brand-new"))
        .await
        .is_ok());
    assert!(matches!(
        service.login(login("race@example.com", "old-password")).await,
        Err(UserError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_reset_does_not_touch_the_primary_password() {
    let authenticator = test_authenticator();
    let users = Arc::new(InMemoryUserRepository::default());
    let mailer = Arc::new(RecordingMailer::default());
    let service = UserService::new(
        Arc::clone(&users),
        Arc::clone(&mailer),
        Arc::clone(&authenticator),
    );

    let login_name = LoginName::new("reset@example.com".to_string()).unwrap();
    service
        .signup(SignupCommand::new(
            login_name.clone(),
            Password::new("old-password".to_string()).unwrap(),
            false,
        ))
        .await
        .unwrap();
    let before = users.find("reset@example.com").unwrap().credential;

    service.request_password_reset(&login_name).await.unwrap();

    let after = users.find("reset@example.com").unwrap();
    assert_eq!(after.credential, before);
    assert!(after.temporary_credential.is_some());
    assert!(service
        .login(login("reset@example.com", "old-password"))
        .await
        .is_ok());
}
