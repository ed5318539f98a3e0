use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header;
use axum::http::HeaderName;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::activation::activate;
use super::handlers::admin::block_user;
use super::handlers::admin::reload_config;
use super::handlers::admin::unblock_user;
use super::handlers::change_password::change_password;
use super::handlers::find_password::find_password;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::not_found;
use super::handlers::signup::signup;
use super::handlers::todo_list::todo_list;
use super::handlers::todo_remove::todo_remove;
use super::handlers::todo_save::todo_save;
use super::handlers::withdraw::withdraw;
use super::middleware::authenticate as auth_middleware;
use super::middleware::require_admin;
use crate::config::SharedConfig;
use crate::domain::todo::ports::TodoServicePort;
use crate::domain::user::gatekeeper::GatekeeperPort;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
    pub todo_service: Arc<dyn TodoServicePort>,
    pub gatekeeper: Arc<dyn GatekeeperPort>,
    pub config: SharedConfig,
}

pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    todo_service: Arc<dyn TodoServicePort>,
    gatekeeper: Arc<dyn GatekeeperPort>,
    config: SharedConfig,
) -> Router {
    let state = AppState {
        user_service,
        todo_service,
        gatekeeper,
        config,
    };

    let public_routes = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/findpass", post(find_password))
        .route("/activation/:key", get(activate));

    let protected_routes = Router::new()
        .route("/logout", post(logout))
        .route("/withdraw", post(withdraw))
        .route("/changepassword", post(change_password))
        .route("/todolist", post(todo_list))
        .route("/todosave", post(todo_save))
        .route("/todoremove", post(todo_remove))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Layers run outermost-last: authentication first, then the admin check
    let admin_routes = Router::new()
        .route("/reloadconfig", get(reload_config))
        .route("/admin/block", post(block_user))
        .route("/admin/unblock", post(unblock_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .fallback(not_found)
        .layer(trace_layer)
        .layer(cors_layer())
        .with_state(state)
}

/// Echoes the request origin; pre-flight requests are answered here, before
/// any authentication.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::POST,
            Method::GET,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            header::AUTHORIZATION,
        ])
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::CredentialStore;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use chrono::Utc;
    use mockall::mock;
    use tower::ServiceExt;

    use super::*;
    use crate::config::ActivationConfig;
    use crate::config::Config;
    use crate::config::DatabaseConfig;
    use crate::config::JwtConfig;
    use crate::config::ServerConfig;
    use crate::config::SmtpConfig;
    use crate::domain::todo::errors::TodoError;
    use crate::domain::todo::models::SaveTodoCommand;
    use crate::domain::todo::models::TimeRange;
    use crate::domain::todo::models::Todo;
    use crate::domain::todo::models::TodoId;
    use crate::domain::user::gatekeeper::GateError;
    use crate::domain::user::models::AccountType;
    use crate::domain::user::models::ActivationKey;
    use crate::domain::user::models::LoginCommand;
    use crate::domain::user::models::LoginName;
    use crate::domain::user::models::LoginOutcome;
    use crate::domain::user::models::Password;
    use crate::domain::user::models::SignupCommand;
    use crate::domain::user::models::User;
    use crate::domain::user::models::UserId;
    use crate::domain::user::status::UserStatus;
    use crate::user::errors::UserError;

    mock! {
        pub TestUserService {}

        #[async_trait]
        impl UserServicePort for TestUserService {
            async fn signup(&self, command: SignupCommand) -> Result<User, UserError>;
            async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, UserError>;
            async fn activate(&self, key: &ActivationKey) -> Result<User, UserError>;
            async fn request_password_reset(&self, login_name: &LoginName) -> Result<(), UserError>;
            async fn change_password(&self, id: &UserId, password: Password) -> Result<(), UserError>;
            async fn withdraw(&self, id: &UserId) -> Result<(), UserError>;
            async fn block(&self, id: &UserId, reason: &str) -> Result<User, UserError>;
            async fn unblock(&self, id: &UserId, reason: &str) -> Result<User, UserError>;
            async fn get_user(&self, id: &UserId) -> Result<User, UserError>;
        }
    }

    mock! {
        pub TestTodoService {}

        #[async_trait]
        impl TodoServicePort for TestTodoService {
            async fn list(&self, owner: &UserId, range: TimeRange) -> Result<Vec<Todo>, TodoError>;
            async fn save(&self, owner: &UserId, command: SaveTodoCommand) -> Result<Todo, TodoError>;
            async fn remove(&self, owner: &UserId, id: &TodoId) -> Result<(), TodoError>;
        }
    }

    mock! {
        pub TestGatekeeper {}

        #[async_trait]
        impl GatekeeperPort for TestGatekeeper {
            async fn admit(&self, bearer_token: &str) -> Result<User, GateError>;
            async fn require_admin(&self, caller: &User) -> Result<(), GateError>;
        }
    }

    fn config() -> SharedConfig {
        Config {
            database: DatabaseConfig {
                url: "postgresql://unused".to_string(),
                max_connections: 1,
            },
            server: ServerConfig {
                http_port: 0,
                public_url: "http://localhost".to_string(),
            },
            jwt: JwtConfig {
                private_key_file: "unused".to_string(),
                public_key_file: "unused".to_string(),
                expiration_hours: 24,
            },
            activation: ActivationConfig { enabled: false },
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
        .into_shared()
    }

    fn caller() -> User {
        let credential = CredentialStore::with_params(8, 1, 1)
            .unwrap()
            .build_credential("pw")
            .unwrap();

        User {
            id: UserId(3),
            login_name: LoginName::new("zoe@example.com".to_string()).unwrap(),
            status: UserStatus::Normal,
            account_type: AccountType::Normal,
            credential,
            temporary_credential: None,
            activation_key: None,
            created_at: Utc::now(),
        }
    }

    fn router(gatekeeper: MockTestGatekeeper, todo_service: MockTestTodoService) -> Router {
        create_router(
            Arc::new(MockTestUserService::new()),
            Arc::new(todo_service),
            Arc::new(gatekeeper),
            config(),
        )
    }

    async fn json_body(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_preflight_skips_authentication() {
        // No expectations: any admission attempt would panic
        let app = router(MockTestGatekeeper::new(), MockTestTodoService::new());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/todosave")
                    .header(header::ORIGIN, "http://app.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://app.example.com"
        );
    }

    #[tokio::test]
    async fn test_missing_token_never_reaches_gatekeeper() {
        let app = router(MockTestGatekeeper::new(), MockTestTodoService::new());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/todolist")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"sdate": 0, "edate": 10}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"res": -401, "msg": "login required."})
        );
    }

    #[tokio::test]
    async fn test_admitted_caller_reaches_handler() {
        let mut gatekeeper = MockTestGatekeeper::new();
        gatekeeper
            .expect_admit()
            .withf(|token| token.to_string() == "good-token")
            .times(1)
            .returning(|_| Ok(caller()));

        let mut todo_service = MockTestTodoService::new();
        todo_service
            .expect_list()
            .withf(|owner, range| *owner == UserId(3) && range.start() == 0 && range.end() == 10)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let response = router(gatekeeper, todo_service)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/todolist")
                    .header(header::AUTHORIZATION, "Bearer good-token")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"sdate": 0, "edate": 10}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            json_body(response).await,
            serde_json::json!({"res": 0, "msg": "success", "todolist": []})
        );
    }

    #[tokio::test]
    async fn test_admin_route_denied_for_non_admin() {
        let mut gatekeeper = MockTestGatekeeper::new();
        gatekeeper.expect_admit().times(1).returning(|_| Ok(caller()));
        gatekeeper
            .expect_require_admin()
            .times(1)
            .returning(|_| Err(GateError::PermissionDenied));

        let response = router(gatekeeper, MockTestTodoService::new())
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/reloadconfig")
                    .header(header::AUTHORIZATION, "Bearer some-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            json_body(response).await,
            serde_json::json!({"res": -30, "msg": "permission denied."})
        );
    }

    #[tokio::test]
    async fn test_admin_sanction_failure_is_server_error() {
        let mut gatekeeper = MockTestGatekeeper::new();
        gatekeeper.expect_admit().times(1).returning(|_| Ok(caller()));
        gatekeeper
            .expect_require_admin()
            .times(1)
            .returning(|_| Err(GateError::Internal("connection reset".to_string())));

        let response = router(gatekeeper, MockTestTodoService::new())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/admin/block")
                    .header(header::AUTHORIZATION, "Bearer some-token")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"uid": 4}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(json_body(response).await["res"], -20);
    }
}
