use super::{helper, toggled};
use crate::Settings;
use crate::auth::AdminIdentity;
use crate::errors::AppError;
use crate::payloads::Banner;
use crate::payloads::catalog::{CreateModuleForm, ListModulesParams, UpdateModuleForm};
use crate::response::{Page, finish_write};
use crate::store::modules::{self, ModuleFilter};
use crate::store::{courses, search_term};
use crate::views;
use crate::views::layout::{self, Section};
use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::{Extension, Form};
use deadpool_diesel::postgres::Pool;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Module list, optionally narrowed to one course.
#[instrument(skip(pool, settings, admin, banner))]
pub async fn list_modules(
    State(pool): State<Pool>,
    State(settings): State<Arc<Settings>>,
    Extension(admin): Extension<AdminIdentity>,
    Query(params): Query<ListModulesParams>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Listing modules");
    debug!("List modules params: {:?}", params);

    let filter = ModuleFilter {
        course_id: params.course_id,
        search: search_term(params.search.as_deref()),
    };
    let page = params.page;
    let per_page = settings.page_size;
    let (rows, pagination, course_choices) = helper::run_query(&pool, move |conn| {
        let (rows, pagination) = modules::list_modules(conn, filter, page, per_page)?;
        let course_choices = courses::course_choices(conn)?;
        Ok((rows, pagination, course_choices))
    })
    .await?;
    info!("Fetched {} of {} modules", rows.len(), pagination.total);

    let body = views::modules::list(&rows, &pagination, &course_choices, &params);
    Ok(Page(layout::page(
        "Modules",
        Section::Modules,
        &admin,
        &banner,
        &body,
    )))
}

/// Creates a module in an active course.
///
/// Form fields: `course_id`, `title`, `description`, `order_sequence`,
/// `pass_threshold` (0-100), `is_active` checkbox.
///
/// Returns
/// * `303 See Other` to `/modules?course_id=..` with a `notice` on success.
/// * `303 See Other` to the same list with an `error` if the order is taken
///   among the active modules of the course, or the course is inactive.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, admin, form))]
pub async fn create_module(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    form: Result<Form<CreateModuleForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let mut back = "/modules".to_string();
    let outcome = async {
        let form = helper::accept_form(form)?;
        back = format!("/modules?course_id={}", form.course_id);
        info!(
            "Admin {} creating module '{}' in course {}",
            admin.username, form.title, form.course_id
        );
        helper::run_transaction(&pool, move |conn| {
            let title = form.title.trim().to_string();
            let id = modules::create_module(conn, form)?;
            Ok(format!("Module '{}' created with ID {}.", title, id))
        })
        .await
    }
    .await;
    finish_write(outcome, &back, &back)
}

/// Edit form of one module.
///
/// Returns
/// * The edit page (200 OK).
/// * `404 Not Found`: If the module does not exist.
#[instrument(skip(pool, admin, banner))]
pub async fn edit_module(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(module_id): Path<i64>,
    Query(banner): Query<Banner>,
) -> Result<Page, AppError> {
    info!("Opening module {} for editing", module_id);
    let (module, course) = helper::run_store(&pool, move |conn| {
        let module = modules::find_module(conn, module_id)?;
        let course = courses::find_course(conn, module.course_id)?;
        Ok((module, course))
    })
    .await?;

    let body = views::modules::edit(&module, &course.title);
    Ok(Page(layout::page(
        &format!("Edit module: {}", module.title),
        Section::Modules,
        &admin,
        &banner,
        &body,
    )))
}

/// Saves the edit form of a module, excluding itself from the order check.
///
/// Returns
/// * `303 See Other` to `/modules` with a `notice` on success.
/// * `303 See Other` back to `/modules/{id}/edit` with an `error` on a validation failure.
/// * `500 Internal Server Error`: If a database error occurs.
#[instrument(skip(pool, admin, form))]
pub async fn update_module(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(module_id): Path<i64>,
    form: Result<Form<UpdateModuleForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let outcome = async {
        let form = helper::accept_form(form)?;
        info!("Admin {} updating module {}", admin.username, module_id);
        helper::run_transaction(&pool, move |conn| {
            modules::update_module(conn, module_id, form)?;
            Ok("Module updated.".to_string())
        })
        .await
    }
    .await;
    finish_write(outcome, "/modules", &format!("/modules/{}/edit", module_id))
}

/// Re-activation is refused when another active module holds the same order.
#[instrument(skip(pool))]
pub async fn toggle_module(
    State(pool): State<Pool>,
    Path(module_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Toggling module {}", module_id);
    let outcome = helper::run_transaction(&pool, move |conn| {
        modules::toggle_module(conn, module_id).map(|active| toggled("Module", active))
    })
    .await;
    finish_write(outcome, "/modules", "/modules")
}

/// Deletes a module with its lessons, quizzes, questions and options.
///
/// Returns
/// * `303 See Other` to `/modules` with a `notice` on success.
/// * `303 See Other` to `/modules` with an `error` if progress rows or quiz attempts reference it.
#[instrument(skip(pool, admin))]
pub async fn delete_module(
    State(pool): State<Pool>,
    Extension(admin): Extension<AdminIdentity>,
    Path(module_id): Path<i64>,
) -> Result<Redirect, AppError> {
    info!("Admin {} deleting module {}", admin.username, module_id);
    let outcome = helper::run_transaction(&pool, move |conn| {
        let title = modules::delete_module(conn, module_id)?;
        Ok(format!("Module '{}' deleted.", title))
    })
    .await;
    finish_write(outcome, "/modules", "/modules")
}
