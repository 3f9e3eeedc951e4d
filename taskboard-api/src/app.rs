/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_shared::db::pool::create_pool;
/// use taskboard_shared::store::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use taskboard_shared::{
    access::AccessLayer,
    auth::middleware::bearer_token,
    identity::{IdentityService, IdentitySettings},
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is reference-counted, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub store: Arc<dyn Store>,

    /// Sign-up, sign-in and sessions
    pub identity: IdentityService,

    /// Membership-scoped projects, tasks and team
    pub access: AccessLayer,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state over a store
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let settings = IdentitySettings::new(config.auth.jwt_secret.clone())
            .with_session_ttl(Duration::hours(config.auth.session_ttl_hours));

        Self {
            identity: IdentityService::new(store.clone(), settings),
            access: AccessLayer::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST  /sign-up        # public
///     │   ├── POST  /sign-in        # public
///     │   ├── POST  /refresh        # public
///     │   ├── POST  /sign-out
///     │   ├── GET   /me
///     │   ├── PATCH /me
///     │   └── PUT   /password
///     ├── /projects/
///     │   ├── GET   /               # ?search=
///     │   ├── POST  /
///     │   ├── GET   /:id
///     │   ├── PATCH /:id
///     │   ├── POST  /:id/members
///     │   ├── GET   /:id/tasks
///     │   └── POST  /:id/tasks
///     ├── /tasks/
///     │   ├── GET   /mine           # ?search=&status=&priority=&tab=
///     │   ├── GET   /:id
///     │   ├── PATCH /:id
///     │   ├── GET   /:id/comments
///     │   └── POST  /:id/comments
///     ├── /notifications/
///     │   ├── GET    /              # ?search=&type=&tab=
///     │   ├── POST   /read-all
///     │   ├── POST   /:id/read
///     │   └── DELETE /:id
///     └── GET /team                 # ?search=
/// ```
///
/// Everything under `/v1` except the three public auth routes requires a
/// bearer access token whose session is still active.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes that issue tokens (public)
    let public_auth_routes = Router::new()
        .route("/sign-up", post(routes::auth::sign_up))
        .route("/sign-in", post(routes::auth::sign_in))
        .route("/refresh", post(routes::auth::refresh));

    // Auth routes on the current session
    let session_routes = Router::new()
        .route("/sign-out", post(routes::auth::sign_out))
        .route(
            "/me",
            get(routes::auth::me).patch(routes::auth::update_me),
        )
        .route("/password", put(routes::auth::change_password))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project).patch(routes::projects::update_project),
        )
        .route("/:id/members", post(routes::projects::add_member))
        .route(
            "/:id/tasks",
            get(routes::tasks::list_project_tasks).post(routes::tasks::create_task),
        );

    let task_routes = Router::new()
        .route("/mine", get(routes::tasks::my_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task).patch(routes::tasks::update_task),
        )
        .route(
            "/:id/comments",
            get(routes::tasks::list_comments).post(routes::tasks::add_comment),
        );

    let notification_routes = Router::new()
        .route("/", get(routes::notifications::list_notifications))
        .route("/read-all", post(routes::notifications::mark_all_read))
        .route("/:id/read", post(routes::notifications::mark_read))
        .route("/:id", delete(routes::notifications::delete_notification));

    let protected_routes = Router::new()
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/notifications", notification_routes)
        .route("/team", get(routes::team::list_team))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(session_routes))
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.cors_permissive() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
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
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.hsts))
        .with_state(state)
}

/// Bearer authentication middleware layer
///
/// Validates the access token and its session, then injects the caller's
/// `AuthContext` into request extensions.
async fn auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let auth_context = state.identity.authenticate(token).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
