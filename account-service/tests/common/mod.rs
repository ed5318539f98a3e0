#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use account_service::config::ActivationConfig;
use account_service::config::Config;
use account_service::config::DatabaseConfig;
use account_service::config::JwtConfig;
use account_service::config::ServerConfig;
use account_service::config::SharedConfig;
use account_service::config::SmtpConfig;
use account_service::domain::todo::errors::TodoError;
use account_service::domain::todo::models::NewTodo;
use account_service::domain::todo::models::TimeRange;
use account_service::domain::todo::models::Todo;
use account_service::domain::todo::models::TodoId;
use account_service::domain::todo::ports::TodoRepository;
use account_service::domain::todo::service::TodoService;
use account_service::domain::user::errors::MailError;
use account_service::domain::user::errors::UserError;
use account_service::domain::user::gatekeeper::AdminViolationSanction;
use account_service::domain::user::gatekeeper::Gatekeeper;
use account_service::domain::user::models::AccountType;
use account_service::domain::user::models::ActivationKey;
use account_service::domain::user::models::LoginName;
use account_service::domain::user::models::NewUser;
use account_service::domain::user::models::Password;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserId;
use account_service::domain::user::ports::Mailer;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::service::UserService;
use account_service::domain::user::status::UserStatus;
use account_service::inbound::http::router::create_router;
use async_trait::async_trait;
use auth::Authenticator;
use auth::Credential;
use auth::CredentialStore;
use auth::TokenService;
use serde_json::json;
use serde_json::Value;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;

const PRIVATE_KEY: &[u8] = include_bytes!("../../../auth/testdata/jwt_rsa.pem");
const PUBLIC_KEY: &[u8] = include_bytes!("../../../auth/testdata/jwt_rsa.pub.pem");

/// Test application that spawns a real server over in-memory stores
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub users: Arc<InMemoryUserRepository>,
    pub mailer: Arc<RecordingMailer>,
    pub config: SharedConfig,
}

impl TestApp {
    /// Spawn with activation disabled: new accounts are Normal right away
    pub async fn spawn() -> Self {
        Self::spawn_with(false, AdminViolationSanction::default()).await
    }

    pub async fn spawn_with(activation: bool, sanction: AdminViolationSanction) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let config = test_config(port, activation).into_shared();

        let authenticator = test_authenticator();

        let users = Arc::new(InMemoryUserRepository::default());
        let todos = Arc::new(InMemoryTodoRepository::default());
        let mailer = Arc::new(RecordingMailer::default());

        let user_service = Arc::new(UserService::new(
            Arc::clone(&users),
            Arc::clone(&mailer),
            Arc::clone(&authenticator),
        ));
        let todo_service = Arc::new(TodoService::new(todos));
        let gatekeeper = Arc::new(Gatekeeper::new(
            Arc::clone(&users),
            authenticator,
            sanction,
        ));

        let router = create_router(user_service, todo_service, gatekeeper, config.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            users,
            mailer,
            config,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Send a request and decode the envelope, which always arrives with HTTP 200
    pub async fn send(&self, request: reqwest::RequestBuilder) -> Value {
        let response = request.send().await.expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Failed to parse response")
    }

    pub async fn signup(&self, id: &str, password: &str) -> Value {
        self.send(self.post("/signup").json(&json!({"id": id, "password": password})))
            .await
    }

    pub async fn login(&self, id: &str, password: &str) -> Value {
        self.send(self.post("/login").json(&json!({"id": id, "password": password})))
            .await
    }

    /// Register a Normal account and return a bearer token for it
    pub async fn register(&self, id: &str, password: &str) -> String {
        let body = self.signup(id, password).await;
        assert_eq!(body["res"], 0, "signup failed: {}", body);

        let body = self.login(id, password).await;
        assert_eq!(body["res"], 0, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    /// Register an account, grant it admin out of band and return its token
    pub async fn register_admin(&self, id: &str, password: &str) -> String {
        let token = self.register(id, password).await;
        self.users.set_account_type(id, AccountType::Admin);
        token
    }
}

/// Cheap Argon2 parameters keep the suite fast
pub fn test_credentials() -> CredentialStore {
    CredentialStore::with_params(8, 1, 1).expect("Invalid Argon2 params")
}

pub fn test_authenticator() -> Arc<Authenticator> {
    let tokens = TokenService::from_rsa_pem(PRIVATE_KEY, PUBLIC_KEY, chrono::Duration::hours(24))
        .expect("Failed to load test keys");
    Arc::new(Authenticator::new(test_credentials(), tokens))
}

fn test_config(port: u16, activation: bool) -> Config {
    Config {
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        server: ServerConfig {
            http_port: port,
            public_url: format!("http://127.0.0.1:{}", port),
        },
        jwt: JwtConfig {
            private_key_file: "unused".to_string(),
            public_key_file: "unused".to_string(),
            expiration_hours: 24,
        },
        activation: ActivationConfig {
            enabled: activation,
        },
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 25,
            username: String::new(),
            password: String::new(),
            starttls: false,
            sender_name: "Accounts".to_string(),
            sender_address: "no-reply@example.com".to_string(),
        },
    }
}

/// Test database helper
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    server_url: String,
}

impl TestDb {
    /// Create a fresh, migrated database on the server named by `DATABASE_URL`.
    ///
    /// Returns `None` when `DATABASE_URL` is unset, so the rest of the suite
    /// runs without a Postgres server.
    pub async fn new() -> Option<Self> {
        let Ok(server_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping Postgres repository test");
            return None;
        };

        let db_name = format!(
            "test_account_service_{}",
            uuid::Uuid::new_v4().to_string().replace('-', "_")
        );

        let mut conn = PgConnection::connect(&server_url)
            .await
            .expect("Failed to connect to Postgres");

        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = server_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pool,
            db_name,
            server_url,
        })
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        // Database cleanup happens asynchronously
        let db_name = self.db_name.clone();
        let server_url = self.server_url.clone();
        tokio::spawn(async move {
            if let Ok(mut conn) = PgConnection::connect(&server_url).await {
                let _ = conn
                    .execute(
                        format!(
                            r#"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';"#,
                            db_name
                        )
                        .as_str(),
                    )
                    .await;

                let _ = conn
                    .execute(format!(r#"DROP DATABASE IF EXISTS "{}";"#, db_name).as_str())
                    .await;
            }
        });
    }
}

/// User store with the same compare-and-swap semantics as the Postgres one
#[derive(Default)]
pub struct InMemoryUserRepository {
    state: Mutex<UserTable>,
}

#[derive(Default)]
struct UserTable {
    next_id: i64,
    rows: HashMap<i64, User>,
}

impl InMemoryUserRepository {
    pub fn find(&self, login_name: &str) -> Option<User> {
        let table = self.state.lock().unwrap();
        table
            .rows
            .values()
            .find(|user| user.login_name.as_str() == login_name)
            .cloned()
    }

    pub fn set_account_type(&self, login_name: &str, account_type: AccountType) {
        let mut table = self.state.lock().unwrap();
        let user = table
            .rows
            .values_mut()
            .find(|user| user.login_name.as_str() == login_name)
            .expect("No such user");
        user.account_type = account_type;
    }

    /// Overwrite the status without touching the activation key
    pub fn set_status(&self, login_name: &str, status: UserStatus) {
        let mut table = self.state.lock().unwrap();
        let user = table
            .rows
            .values_mut()
            .find(|user| user.login_name.as_str() == login_name)
            .expect("No such user");
        user.status = status;
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, UserError> {
        let mut table = self.state.lock().unwrap();
        if table
            .rows
            .values()
            .any(|existing| existing.login_name == user.login_name)
        {
            return Err(UserError::LoginNameAlreadyExists(
                user.login_name.to_string(),
            ));
        }

        table.next_id += 1;
        let stored = User {
            id: UserId(table.next_id),
            login_name: user.login_name,
            status: user.status,
            account_type: user.account_type,
            credential: user.credential,
            temporary_credential: None,
            activation_key: user.activation_key,
            created_at: user.created_at,
        };
        table.rows.insert(stored.id.0, stored.clone());
        Ok(stored)
    }

    async fn update_credential(
        &self,
        id: &UserId,
        credential: &Credential,
    ) -> Result<(), UserError> {
        let mut table = self.state.lock().unwrap();
        let stored = table
            .rows
            .get_mut(&id.0)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        stored.credential = credential.clone();
        stored.temporary_credential = None;
        Ok(())
    }

    async fn set_temporary_credential(
        &self,
        id: &UserId,
        credential: &Credential,
    ) -> Result<(), UserError> {
        let mut table = self.state.lock().unwrap();
        let stored = table
            .rows
            .get_mut(&id.0)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        stored.temporary_credential = Some(credential.clone());
        Ok(())
    }

    async fn consume_temporary_credential(
        &self,
        id: &UserId,
        expected: &Credential,
    ) -> Result<bool, UserError> {
        let mut table = self.state.lock().unwrap();
        match table.rows.get_mut(&id.0) {
            Some(user) if user.temporary_credential.as_ref() == Some(expected) => {
                user.temporary_credential = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn transition_status(
        &self,
        id: &UserId,
        from: UserStatus,
        to: UserStatus,
    ) -> Result<bool, UserError> {
        let mut table = self.state.lock().unwrap();
        match table.rows.get_mut(&id.0) {
            Some(user) if user.status == from => {
                user.status = to;
                if from == UserStatus::Deactivated {
                    user.activation_key = None;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let mut table = self.state.lock().unwrap();
        table
            .rows
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.state.lock().unwrap().rows.get(&id.0).cloned())
    }

    async fn find_by_login_name(
        &self,
        login_name: &LoginName,
    ) -> Result<Option<User>, UserError> {
        Ok(self.find(login_name.as_str()))
    }

    async fn find_by_activation_key(
        &self,
        key: &ActivationKey,
    ) -> Result<Option<User>, UserError> {
        let table = self.state.lock().unwrap();
        Ok(table
            .rows
            .values()
            .find(|user| user.activation_key.as_ref() == Some(key))
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryTodoRepository {
    state: Mutex<TodoTable>,
}

#[derive(Default)]
struct TodoTable {
    next_id: i64,
    rows: HashMap<i64, Todo>,
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, TodoError> {
        let mut table = self.state.lock().unwrap();
        table.next_id += 1;
        let stored = Todo {
            id: TodoId(table.next_id),
            owner: todo.owner,
            category: todo.category,
            text: todo.text,
            limit_time: todo.limit_time,
            status: todo.status,
        };
        table.rows.insert(stored.id.0, stored.clone());
        Ok(stored)
    }

    async fn update(&self, todo: &Todo) -> Result<(), TodoError> {
        let mut table = self.state.lock().unwrap();
        match table.rows.get_mut(&todo.id.0) {
            Some(stored) => {
                *stored = todo.clone();
                Ok(())
            }
            None => Err(TodoError::NotFound(todo.id.to_string())),
        }
    }

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, TodoError> {
        Ok(self.state.lock().unwrap().rows.get(&id.0).cloned())
    }

    async fn list_between(
        &self,
        owner: &UserId,
        range: TimeRange,
    ) -> Result<Vec<Todo>, TodoError> {
        let table = self.state.lock().unwrap();
        let mut todos: Vec<Todo> = table
            .rows
            .values()
            .filter(|todo| todo.owner == *owner && range.contains(todo.limit_time))
            .cloned()
            .collect();
        todos.sort_by_key(|todo| (todo.limit_time, todo.id.0));
        Ok(todos)
    }

    async fn delete(&self, id: &TodoId) -> Result<(), TodoError> {
        let mut table = self.state.lock().unwrap();
        table
            .rows
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| TodoError::NotFound(id.to_string()))
    }
}

/// Mailer that keeps what it was asked to send
#[derive(Default)]
pub struct RecordingMailer {
    activations: Mutex<HashMap<String, ActivationKey>>,
    temporary_passwords: Mutex<HashMap<String, String>>,
}

impl RecordingMailer {
    pub fn activation_key(&self, login_name: &str) -> Option<ActivationKey> {
        self.activations.lock().unwrap().get(login_name).cloned()
    }

    pub fn temporary_password(&self, login_name: &str) -> Option<String> {
        self.temporary_passwords
            .lock()
            .unwrap()
            .get(login_name)
            .cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_activation(&self, user: &User, key: &ActivationKey) -> Result<(), MailError> {
        self.activations
            .lock()
            .unwrap()
            .insert(user.login_name.to_string(), key.clone());
        Ok(())
    }

    async fn send_temporary_password(
        &self,
        user: &User,
        password: &Password,
    ) -> Result<(), MailError> {
        self.temporary_passwords
            .lock()
            .unwrap()
            .insert(user.login_name.to_string(), password.as_str().to_string());
        Ok(())
    }
}
