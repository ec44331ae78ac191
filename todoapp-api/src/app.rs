/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use todoapp_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = todoapp_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{authorize::authorize_request, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use todoapp_shared::{
    auth::{authorization::RoutePolicy, middleware::create_jwt_middleware},
    models::role::{permissions, RoleName},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Policy for `GET /user/users`
pub const LIST_USERS_POLICY: RoutePolicy =
    RoutePolicy::new(&[RoleName::Admin]).with_permission(permissions::USERS_READ);

/// Policy for `GET /admin/todos`
pub const ALL_TODOS_POLICY: RoutePolicy =
    RoutePolicy::new(&[RoleName::Admin]).with_permission(permissions::TODOS_READ_ALL);

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Lifetime of newly issued access tokens
    pub fn access_ttl(&self) -> chrono::Duration {
        self.config.jwt.access_ttl()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health
/// ├── /user
/// │   ├── POST   /register
/// │   ├── POST   /login
/// │   ├── POST   /refresh
/// │   ├── GET    /me            (JWT)
/// │   ├── GET    /users         (JWT, admin + users:read)
/// │   └── PUT    /user/:id      (JWT, self or admin)
/// ├── /todo                     (JWT)
/// │   ├── POST   /
/// │   ├── GET    /
/// │   ├── PUT    /:id
/// │   ├── DELETE /:id
/// │   └── PUT    /status/:id
/// └── /admin                    (JWT)
///     └── GET    /todos         (admin + todos:read_all)
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, then per-route
/// JWT authentication and role/permission policies.
pub fn build_router(state: AppState) -> Router {
    let jwt_auth = middleware::from_fn(create_jwt_middleware(state.jwt_secret().to_string()));

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_user_routes = Router::new()
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login))
        .route("/refresh", post(routes::users::refresh));

    let protected_user_routes = Router::new()
        .route(
            "/users",
            get(routes::users::list_users).route_layer(middleware::from_fn_with_state(
                state.clone(),
                |State(state): State<AppState>, req: Request, next: Next| {
                    authorize_request(state, LIST_USERS_POLICY, req, next)
                },
            )),
        )
        .route("/me", get(routes::users::me))
        .route("/user/:id", put(routes::users::update_user))
        .route_layer(jwt_auth.clone());

    let todo_routes = Router::new()
        .route(
            "/",
            post(routes::todos::create_todo).get(routes::todos::list_todos),
        )
        .route(
            "/:id",
            put(routes::todos::update_todo).delete(routes::todos::delete_todo),
        )
        .route("/status/:id", put(routes::todos::update_todo_status))
        .route_layer(jwt_auth.clone());

    let admin_routes = Router::new()
        .route("/todos", get(routes::admin::list_all_todos))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            |State(state): State<AppState>, req: Request, next: Next| {
                authorize_request(state, ALL_TODOS_POLICY, req, next)
            },
        ))
        .route_layer(jwt_auth);

    Router::new()
        .merge(health_routes)
        .nest("/user", public_user_routes.merge(protected_user_routes))
        .nest("/todo", todo_routes)
        .nest("/admin", admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DatabaseConfig, JwtConfig};

    fn config(origins: &[&str]) -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                cors_origins: origins.iter().map(|s| s.to_string()).collect(),
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/todoapp".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "0123456789abcdef0123456789abcdef".to_string(),
                access_ttl_hours: 2,
            },
        }
    }

    #[test]
    fn test_route_policies() {
        assert!(LIST_USERS_POLICY.allows_role(RoleName::Admin));
        assert!(!LIST_USERS_POLICY.allows_role(RoleName::User));
        assert_eq!(LIST_USERS_POLICY.permission, Some(permissions::USERS_READ));
        assert_eq!(ALL_TODOS_POLICY.permission, Some(permissions::TODOS_READ_ALL));
    }

    #[tokio::test]
    async fn test_app_state_accessors() {
        let pool = PgPool::connect_lazy("postgresql://localhost/todoapp").unwrap();
        let state = AppState::new(pool, config(&["*"]));

        assert_eq!(state.jwt_secret(), "0123456789abcdef0123456789abcdef");
        assert_eq!(state.access_ttl(), chrono::Duration::hours(2));
    }

    async fn preflight(origins: &[&str], origin: &str) -> axum::response::Response {
        let app: Router = Router::new()
            .route("/todo", get(|| async { "ok" }))
            .layer(cors_layer(&config(origins)));

        tower::ServiceExt::oneshot(
            app,
            axum::http::Request::builder()
                .method(Method::OPTIONS)
                .uri("/todo")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let response = preflight(&["http://localhost:3001"], "http://localhost:3001").await;
        let headers = response.headers();

        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3001"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
        assert!(headers
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("PUT"));
    }

    #[tokio::test]
    async fn test_cors_ignores_unlisted_origin() {
        let response = preflight(&["http://localhost:3001"], "https://evil.example.com").await;

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_wildcard_is_permissive() {
        let response = preflight(&["*"], "https://anywhere.example.com").await;

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}
