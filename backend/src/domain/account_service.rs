//! Account registration and credential checking.

use async_trait::async_trait;
use tracing::info;

use super::error::Error as DomainError;
use super::ports::{Accounts, NewAccount, UserRepository, UserStoreError};
use super::user::{EmailAddress, User, UserId};

/// [`Accounts`] implementation backed by a [`UserRepository`].
#[derive(Debug)]
pub struct AccountService<U> {
    users: U,
}

impl<U> AccountService<U> {
    /// Construct the service around a user repository.
    pub fn new(users: U) -> Self {
        Self { users }
    }
}

/// Single message for every credential failure, so a caller cannot probe
/// which addresses are registered.
const INVALID_CREDENTIALS: &str = "invalid credentials";

fn map_store_error(err: UserStoreError) -> DomainError {
    match err {
        UserStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserStoreError::Query { message } => {
            DomainError::internal(format!("user store query failed: {message}"))
        }
        UserStoreError::DuplicateEmail => {
            DomainError::conflict("email address is already registered")
        }
    }
}

#[async_trait]
impl<U> Accounts for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, account: NewAccount) -> Result<User, DomainError> {
        let NewAccount {
            name,
            email,
            password,
        } = account;
        let user = User::create(name, email, password);
        self.users.insert(&user).await.map_err(map_store_error)?;
        info!(user_id = %user.id(), "registered user");
        Ok(user)
    }

    async fn authenticate(
        &self,
        email: &EmailAddress,
        password: &str,
    ) -> Result<UserId, DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| DomainError::unauthorized(INVALID_CREDENTIALS))?;
        if !user.password().matches(password) {
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(*user.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::user::{PasswordDigest, UserName};
    use mockall::mock;
    use rstest::{fixture, rstest};

    mock! {
        Users {}

        #[async_trait]
        impl UserRepository for Users {
            async fn insert(&self, user: &User) -> Result<(), UserStoreError>;
            async fn find_by_email(
                &self,
                email: &EmailAddress,
            ) -> Result<Option<User>, UserStoreError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError>;
            async fn delete(&self, id: &UserId) -> Result<bool, UserStoreError>;
        }
    }

    #[fixture]
    fn account() -> NewAccount {
        NewAccount {
            name: UserName::new("Ada").expect("valid name"),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password: PasswordDigest::from_password("hunter2").expect("valid password"),
        }
    }

    #[rstest]
    #[actix_rt::test]
    async fn register_persists_and_returns_the_user(account: NewAccount) {
        let mut users = MockUsers::new();
        users.expect_insert().times(1).returning(|_| Ok(()));

        let service = AccountService::new(users);
        let user = service.register(account).await.expect("registration");
        assert_eq!(user.email().as_ref(), "ada@example.com");
    }

    #[rstest]
    #[actix_rt::test]
    async fn duplicate_email_maps_to_conflict(account: NewAccount) {
        let mut users = MockUsers::new();
        users
            .expect_insert()
            .returning(|_| Err(UserStoreError::DuplicateEmail));

        let service = AccountService::new(users);
        let err = service.register(account).await.expect_err("conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[actix_rt::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable(account: NewAccount) {
        let stored = User::create(
            account.name.clone(),
            account.email.clone(),
            account.password.clone(),
        );
        let mut users = MockUsers::new();
        users
            .expect_find_by_email()
            .returning(move |email| {
                if email.as_ref() == "ada@example.com" {
                    Ok(Some(stored.clone()))
                } else {
                    Ok(None)
                }
            });

        let service = AccountService::new(users);
        let wrong_password = service
            .authenticate(&account.email, "letmein")
            .await
            .expect_err("wrong password");
        let unknown = service
            .authenticate(
                &EmailAddress::new("ghost@example.com").expect("valid email"),
                "hunter2",
            )
            .await
            .expect_err("unknown email");

        assert_eq!(wrong_password.code(), ErrorCode::Unauthorized);
        assert_eq!(wrong_password.message(), unknown.message());
    }

    #[rstest]
    #[actix_rt::test]
    async fn valid_credentials_return_the_user_id(account: NewAccount) {
        let stored = User::create(
            account.name.clone(),
            account.email.clone(),
            account.password.clone(),
        );
        let expected = *stored.id();
        let mut users = MockUsers::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(stored.clone())));

        let service = AccountService::new(users);
        let id = service
            .authenticate(&account.email, "hunter2")
            .await
            .expect("authentication");
        assert_eq!(id, expected);
    }

    #[rstest]
    #[actix_rt::test]
    async fn connection_failure_maps_to_service_unavailable(account: NewAccount) {
        let mut users = MockUsers::new();
        users
            .expect_find_by_email()
            .returning(|_| Err(UserStoreError::connection("pool exhausted")));

        let service = AccountService::new(users);
        let err = service
            .authenticate(&account.email, "hunter2")
            .await
            .expect_err("unavailable");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
