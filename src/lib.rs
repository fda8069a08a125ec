use crate::auth::AdminIdentity;
use crate::cli::Args;
use anyhow::Context;
use axum::extract::FromRef;
use axum::routing::{get, post};
use axum::{Extension, Router, middleware};
use axum_keycloak_auth::PassthroughMode;
use axum_keycloak_auth::instance::{KeycloakAuthInstance, KeycloakConfig};
use axum_keycloak_auth::layer::KeycloakAuthLayer;
use deadpool_diesel::Runtime;
use deadpool_diesel::postgres::{Manager, Pool};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod auth;
pub mod cli;
pub mod db;
pub mod model;
pub mod payloads;
pub mod response;
pub mod schema;
pub mod store;
pub mod views;

mod api;
pub mod errors;

/// Runtime settings shared with every handler.
#[derive(Debug, Clone)]
pub struct Settings {
    pub page_size: i64,
    pub login_url: String,
    pub admin_role: String,
    pub certificate_base_url: String,
}

impl Settings {
    fn from_args(args: &Args) -> Self {
        Settings {
            page_size: args.page_size.max(1),
            login_url: args.login_url.clone(),
            admin_role: args.admin_role.clone(),
            certificate_base_url: args.certificate_base_url.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub settings: Arc<Settings>,
}

impl FromRef<AppState> for Pool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Settings> {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}

pub async fn init_router(args: &Args) -> anyhow::Result<Router> {
    info!("Initializing database pool...");
    let pool = init_pool(&args.connection_str, args.db_pool_max_size)
        .context("Failed to initialize database pool")?;

    if args.run_migrations {
        info!("Applying pending migrations...");
        db::run_migrations(&pool)
            .await
            .context("Failed to apply migrations")?;
    }

    info!("Initializing Keycloak authentication layer...");
    let keycloak_layer =
        init_protection_layer(args).context("Failed to initialize Keycloak layer")?;

    let state = AppState {
        pool,
        settings: Arc::new(Settings::from_args(args)),
    };

    info!("Initializing router...");
    Ok(init_router_internal(state, keycloak_layer))
}

/// Router with a fixed administrator injected in place of Keycloak.
pub fn init_test_router(pool: Pool, settings: Settings) -> Router {
    let admin = AdminIdentity {
        subject: "test-admin".to_string(),
        username: "test-admin".to_string(),
    };
    let state = AppState {
        pool,
        settings: Arc::new(settings),
    };

    admin_routes()
        .layer(Extension(admin))
        .with_state(state)
}

pub fn default_test_settings() -> Settings {
    Settings {
        page_size: 20,
        login_url: "/login".to_string(),
        admin_role: "lms-admin".to_string(),
        certificate_base_url: "http://localhost:3000/verify/".to_string(),
    }
}

fn init_router_internal(state: AppState, keycloak_layer: KeycloakAuthLayer<String>) -> Router {
    admin_routes()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ))
        .layer(keycloak_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn init_pool(conn_str: &str, max_size: u32) -> anyhow::Result<Pool> {
    let manager = Manager::new(conn_str, Runtime::Tokio1);
    let pool = Pool::builder(manager).max_size(max_size as usize).build()?;
    Ok(pool)
}

fn init_protection_layer(args: &Args) -> anyhow::Result<KeycloakAuthLayer<String>> {
    let config = KeycloakConfig::builder()
        .server(args.keycloak_server_url.clone())
        .realm(args.keycloak_realm.clone())
        .build();

    let instance = KeycloakAuthInstance::new(config);

    let layer = KeycloakAuthLayer::builder()
        .instance(instance)
        .passthrough_mode(PassthroughMode::Pass)
        .persist_raw_claims(false)
        .expected_audiences(vec![args.keycloak_audiences.clone()])
        .build();

    Ok(layer)
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api::dashboard::show_dashboard))
        .merge(course_routes())
        .merge(module_routes())
        .merge(lesson_routes())
        .merge(quiz_routes())
        .merge(question_routes())
        .merge(student_routes())
        .merge(certificate_routes())
}

fn course_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/courses",
            get(api::courses::list_courses).post(api::courses::create_course),
        )
        .route("/courses/bulk", post(api::courses::bulk_courses))
        .route("/courses/{id}", post(api::courses::update_course))
        .route("/courses/{id}/edit", get(api::courses::edit_course))
        .route("/courses/{id}/toggle", post(api::courses::toggle_course))
        .route("/courses/{id}/delete", post(api::courses::delete_course))
}

fn module_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/modules",
            get(api::modules::list_modules).post(api::modules::create_module),
        )
        .route("/modules/{id}", post(api::modules::update_module))
        .route("/modules/{id}/edit", get(api::modules::edit_module))
        .route("/modules/{id}/toggle", post(api::modules::toggle_module))
        .route("/modules/{id}/delete", post(api::modules::delete_module))
}

fn lesson_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/lessons",
            get(api::lessons::list_lessons).post(api::lessons::create_lesson),
        )
        .route("/lessons/{id}", post(api::lessons::update_lesson))
        .route("/lessons/{id}/edit", get(api::lessons::edit_lesson))
        .route("/lessons/{id}/toggle", post(api::lessons::toggle_lesson))
        .route("/lessons/{id}/delete", post(api::lessons::delete_lesson))
}

fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/quizzes",
            get(api::quizzes::list_quizzes).post(api::quizzes::create_quiz),
        )
        .route("/quizzes/bulk", post(api::quizzes::bulk_quizzes))
        .route("/quizzes/{id}", post(api::quizzes::update_quiz))
        .route("/quizzes/{id}/edit", get(api::quizzes::edit_quiz))
        .route("/quizzes/{id}/toggle", post(api::quizzes::toggle_quiz))
        .route("/quizzes/{id}/delete", post(api::quizzes::delete_quiz))
}

fn question_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/questions",
            get(api::questions::list_questions).post(api::questions::create_question),
        )
        .route("/questions/new", get(api::questions::new_question))
        .route("/questions/{id}", post(api::questions::update_question))
        .route("/questions/{id}/edit", get(api::questions::edit_question))
        .route(
            "/questions/{id}/toggle",
            post(api::questions::toggle_question),
        )
        .route(
            "/questions/{id}/delete",
            post(api::questions::delete_question),
        )
        .route(
            "/questions/{id}/options",
            get(api::options::list_options).post(api::options::add_option),
        )
        .route(
            "/questions/{id}/options/bulk",
            post(api::options::bulk_update_options),
        )
        .route("/options/{id}/delete", post(api::options::delete_option))
}

fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(api::students::list_students))
        .route("/students/bulk", post(api::students::bulk_students))
        .route("/students/{id}", get(api::students::show_student))
        .route("/students/{id}/toggle", post(api::students::toggle_student))
}

fn certificate_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/certificates",
            get(api::certificates::list_certificates).post(api::certificates::issue_certificate),
        )
        .route(
            "/certificates/{id}/delete",
            post(api::certificates::revoke_certificate),
        )
}
