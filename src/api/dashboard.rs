use super::helper;
use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::payloads::Banner;
use crate::response::Page;
use crate::store::dashboard;
use crate::views;
use crate::views::layout::{self, Section};
use axum::Extension;
use axum::extract::{Query, State};
use deadpool_diesel::postgres::Pool;
use tracing::{info, instrument};

/// Landing page: platform totals and the latest student activity.
#[instrument(skip(pool, admin, banner))]
pub async fn show_dashboard(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Rendering dashboard for {}", admin.username);

    let (stats, activity) = helper::run_query(&pool, |conn| {
        let stats = dashboard::load_stats(conn)?;
        let activity = dashboard::recent_activity(conn)?;
        Ok((stats, activity))
    })
    .await?;

    info!(
        "Dashboard loaded: {} courses, {} students, {} activity items",
        stats.total_courses,
        stats.total_students,
        activity.len()
    );
    let body = views::dashboard::render(&stats, &activity);
    Ok(Page(layout::page(
        "Dashboard",
        Section::Dashboard,
        &admin,
        &banner,
        &body,
    )))
}
