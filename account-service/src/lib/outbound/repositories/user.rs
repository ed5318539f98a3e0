use async_trait::async_trait;
use auth::Credential;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use sqlx::Postgres;
use uuid::Uuid;

use crate::domain::user::models::AccountType;
use crate::domain::user::models::ActivationKey;
use crate::domain::user::models::LoginName;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::status::UserStatus;
use crate::user::errors::UserError;

macro_rules! user_columns {
    () => {
        "id, login_name, status, account_type, credential, temporary_credential, activation_key, created_at"
    };
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    login_name: String,
    status: i16,
    account_type: i16,
    credential: Vec<u8>,
    temporary_credential: Option<Vec<u8>>,
    activation_key: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let credential = |bytes: Vec<u8>| {
            Credential::from_bytes(bytes).map_err(|e| UserError::Credential(e.to_string()))
        };

        Ok(User {
            id: UserId(row.id),
            login_name: LoginName::new(row.login_name)?,
            status: UserStatus::try_from(row.status)?,
            account_type: AccountType::try_from(row.account_type)?,
            credential: credential(row.credential)?,
            temporary_credential: row.temporary_credential.map(credential).transpose()?,
            activation_key: row.activation_key.map(ActivationKey),
            created_at: row.created_at,
        })
    }
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one<T>(&self, sql: &'static str, value: T) -> Result<Option<User>, UserError>
    where
        T: 'static + Send + sqlx::Encode<'static, Postgres> + sqlx::Type<Postgres>,
    {
        let row = sqlx::query_as::<_, UserRow>(sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "INSERT INTO users (login_name, status, account_type, credential, activation_key, created_at) ",
            "VALUES ($1, $2, $3, $4, $5, $6) ",
            "RETURNING ",
            user_columns!()
        ))
        .bind(user.login_name.as_str())
        .bind(user.status.code())
        .bind(user.account_type.code())
        .bind(user.credential.as_bytes())
        .bind(user.activation_key.map(|key| key.0))
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("users_login_name_key")
                {
                    return UserError::LoginNameAlreadyExists(
                        user.login_name.as_str().to_string(),
                    );
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        User::try_from(row)
    }

    async fn update_credential(
        &self,
        id: &UserId,
        credential: &Credential,
    ) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET credential = $2, temporary_credential = NULL
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(credential.as_bytes())
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn set_temporary_credential(
        &self,
        id: &UserId,
        credential: &Credential,
    ) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET temporary_credential = $2
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(credential.as_bytes())
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn consume_temporary_credential(
        &self,
        id: &UserId,
        expected: &Credential,
    ) -> Result<bool, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET temporary_credential = NULL
            WHERE id = $1 AND temporary_credential = $2
            "#,
        )
        .bind(id.0)
        .bind(expected.as_bytes())
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn transition_status(
        &self,
        id: &UserId,
        from: UserStatus,
        to: UserStatus,
    ) -> Result<bool, UserError> {
        // Leaving Deactivated burns the activation key
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = $3,
                activation_key = CASE WHEN $2 = $4 THEN NULL ELSE activation_key END
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id.0)
        .bind(from.code())
        .bind(to.code())
        .bind(UserStatus::Deactivated.code())
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.find_one(
            concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1"),
            id.0,
        )
        .await
    }

    async fn find_by_login_name(
        &self,
        login_name: &LoginName,
    ) -> Result<Option<User>, UserError> {
        self.find_one(
            concat!("SELECT ", user_columns!(), " FROM users WHERE login_name = $1"),
            login_name.as_str().to_string(),
        )
        .await
    }

    async fn find_by_activation_key(
        &self,
        key: &ActivationKey,
    ) -> Result<Option<User>, UserError> {
        self.find_one(
            concat!("SELECT ", user_columns!(), " FROM users WHERE activation_key = $1"),
            key.0,
        )
        .await
    }
}
