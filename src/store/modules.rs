use super::guards::{ensure_no_dependents, module_dependencies};
use super::{cascade, expect_single_row, in_range, like_pattern, required_text};
use crate::errors::AppError;
use crate::model::Pagination;
use crate::model::catalog::{Module, ModuleChangeset, ModuleChoice, ModuleListRow, NewModule};
use crate::payloads::catalog::{CreateModuleForm, UpdateModuleForm};
use crate::schema::{courses, lessons, modules, quizzes};
use chrono::Utc;
use diesel::dsl::{count_star, exists};
use diesel::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

pub const ORDER_MAX: i32 = 999;

#[derive(Debug, Default)]
pub struct ModuleFilter {
    pub course_id: Option<i64>,
    pub search: Option<String>,
}

pub fn list_modules(
    conn: &mut PgConnection,
    filter: ModuleFilter,
    page: Option<i64>,
    per_page: i64,
) -> QueryResult<(Vec<ModuleListRow>, Pagination)> {
    let mut count_query = modules::table.into_boxed();
    let mut rows_query = modules::table.into_boxed();
    if let Some(course_id) = filter.course_id {
        count_query = count_query.filter(modules::course_id.eq(course_id));
        rows_query = rows_query.filter(modules::course_id.eq(course_id));
    }
    if let Some(term) = filter.search {
        let pattern = like_pattern(&term);
        count_query = count_query.filter(modules::title.ilike(pattern.clone()));
        rows_query = rows_query.filter(modules::title.ilike(pattern));
    }

    let total = count_query.count().get_result::<i64>(conn)?;
    let pagination = Pagination::new(page, per_page, total);

    let page_modules = rows_query
        .order((modules::course_id.asc(), modules::order_sequence.asc()))
        .limit(pagination.per_page)
        .offset(pagination.offset())
        .select(Module::as_select())
        .load::<Module>(conn)?;
    let ids: Vec<i64> = page_modules.iter().map(|m| m.id).collect();
    let course_ids: Vec<i64> = page_modules.iter().map(|m| m.course_id).collect();

    let course_titles: HashMap<i64, String> = courses::table
        .filter(courses::id.eq_any(&course_ids))
        .select((courses::id, courses::title))
        .load::<(i64, String)>(conn)?
        .into_iter()
        .collect();
    let lesson_counts: HashMap<i64, i64> = lessons::table
        .filter(lessons::module_id.eq_any(&ids))
        .group_by(lessons::module_id)
        .select((lessons::module_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();
    let quiz_counts: HashMap<i64, i64> = quizzes::table
        .filter(quizzes::module_id.eq_any(&ids))
        .group_by(quizzes::module_id)
        .select((quizzes::module_id, count_star()))
        .load::<(i64, i64)>(conn)?
        .into_iter()
        .collect();

    let rows = page_modules
        .into_iter()
        .map(|module| ModuleListRow {
            course_title: course_titles
                .get(&module.course_id)
                .cloned()
                .unwrap_or_default(),
            lesson_count: lesson_counts.get(&module.id).copied().unwrap_or(0),
            quiz_count: quiz_counts.get(&module.id).copied().unwrap_or(0),
            module,
        })
        .collect();
    Ok((rows, pagination))
}

/// Every module with its course, ordered for select boxes.
pub fn module_choices(conn: &mut PgConnection) -> QueryResult<Vec<ModuleChoice>> {
    modules::table
        .inner_join(courses::table)
        .order((courses::title.asc(), modules::order_sequence.asc()))
        .select((
            modules::id,
            modules::title,
            courses::id,
            courses::title,
            modules::is_active,
        ))
        .load::<ModuleChoice>(conn)
}

pub fn find_module(conn: &mut PgConnection, module_id: i64) -> Result<Module, AppError> {
    modules::table
        .find(module_id)
        .select(Module::as_select())
        .first::<Module>(conn)
        .optional()?
        .ok_or_else(|| AppError::NotFound(format!("Module with ID {} not found.", module_id)))
}

/// Rejects `order_sequence` when another active module of the course uses it.
fn ensure_order_free(
    conn: &mut PgConnection,
    course_id: i64,
    order_sequence: i32,
    except_id: Option<i64>,
) -> Result<(), AppError> {
    let mut query = modules::table
        .filter(modules::course_id.eq(course_id))
        .filter(modules::order_sequence.eq(order_sequence))
        .filter(modules::is_active.eq(true))
        .into_boxed();
    if let Some(id) = except_id {
        query = query.filter(modules::id.ne(id));
    }
    let taken = diesel::select(exists(query)).get_result::<bool>(conn)?;
    if taken {
        warn!(
            "Order sequence {} already used in course {}",
            order_sequence, course_id
        );
        return Err(AppError::Validation(format!(
            "A module already exists with order sequence {} in this course.",
            order_sequence
        )));
    }
    Ok(())
}

pub fn create_module(conn: &mut PgConnection, form: CreateModuleForm) -> Result<i64, AppError> {
    let title = required_text(&form.title, "Title", 255)?;
    let order_sequence = in_range(form.order_sequence, "Order sequence", 1, ORDER_MAX)?;
    let pass_threshold = in_range(form.pass_threshold, "Pass threshold", 0, 100)?;

    let course_active = courses::table
        .find(form.course_id)
        .select(courses::is_active)
        .first::<bool>(conn)
        .optional()?
        .ok_or_else(|| {
            AppError::NotFound(format!("Course with ID {} not found.", form.course_id))
        })?;
    if !course_active {
        return Err(AppError::Validation(
            "Modules can only be added to an active course.".to_string(),
        ));
    }
    if form.is_active {
        ensure_order_free(conn, form.course_id, order_sequence, None)?;
    }

    let new_module = NewModule {
        course_id: form.course_id,
        title,
        description: form.description.trim().to_string(),
        order_sequence,
        pass_threshold,
        is_active: form.is_active,
    };
    let new_id = diesel::insert_into(modules::table)
        .values(&new_module)
        .returning(modules::id)
        .get_result::<i64>(conn)?;
    info!(
        "Inserted module '{}' with ID {} into course {}",
        new_module.title, new_id, new_module.course_id
    );
    Ok(new_id)
}

pub fn update_module(
    conn: &mut PgConnection,
    module_id: i64,
    form: UpdateModuleForm,
) -> Result<(), AppError> {
    let title = required_text(&form.title, "Title", 255)?;
    let order_sequence = in_range(form.order_sequence, "Order sequence", 1, ORDER_MAX)?;
    let pass_threshold = in_range(form.pass_threshold, "Pass threshold", 0, 100)?;

    let module = find_module(conn, module_id)?;
    if form.is_active {
        ensure_order_free(conn, module.course_id, order_sequence, Some(module_id))?;
    }

    let changes = ModuleChangeset {
        title,
        description: form.description.trim().to_string(),
        order_sequence,
        pass_threshold,
        is_active: form.is_active,
        updated_at: Utc::now(),
    };
    let affected = diesel::update(modules::table.find(module_id))
        .set(&changes)
        .execute(conn)?;
    expect_single_row(affected, "Module", module_id)
}

/// Flips `is_active`; re-activation must not collide on order sequence.
pub fn toggle_module(conn: &mut PgConnection, module_id: i64) -> Result<bool, AppError> {
    let module = find_module(conn, module_id)?;
    let activate = !module.is_active;
    if activate {
        ensure_order_free(conn, module.course_id, module.order_sequence, Some(module_id))?;
    }
    let affected = diesel::update(modules::table.find(module_id))
        .set(modules::is_active.eq(activate))
        .execute(conn)?;
    expect_single_row(affected, "Module", module_id)?;
    Ok(activate)
}

pub fn delete_module(conn: &mut PgConnection, module_id: i64) -> Result<String, AppError> {
    let module = find_module(conn, module_id)?;
    let dependencies = module_dependencies(conn, &[module_id])?;
    ensure_no_dependents(&format!("module '{}'", module.title), &dependencies)?;

    let deleted = cascade::delete_modules(conn, &[module_id])?;
    expect_single_row(deleted, "Module", module_id)?;
    Ok(module.title)
}
