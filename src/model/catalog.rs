use crate::schema::{courses, lessons, modules};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

#[derive(Insertable, Debug)]
#[diesel(table_name = courses)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub is_active: bool,
    // created_at, updated_at have DB defaults
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = courses)]
pub struct CourseChangeset {
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CourseListRow {
    pub course: Course,
    pub module_count: i64,
    pub enrollment_count: i64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = modules)]
pub struct NewModule {
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub order_sequence: i32,
    pub pass_threshold: i32,
    pub is_active: bool,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = modules)]
pub struct ModuleChangeset {
    pub title: String,
    pub description: String,
    pub order_sequence: i32,
    pub pass_threshold: i32,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = modules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Module {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub order_sequence: i32,
    pub pass_threshold: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ModuleListRow {
    pub module: Module,
    pub course_title: String,
    pub lesson_count: i64,
    pub quiz_count: i64,
}

/// Module joined with its course, used by select boxes and filters.
#[derive(Queryable, Debug, Clone)]
pub struct ModuleChoice {
    pub id: i64,
    pub title: String,
    pub course_id: i64,
    pub course_title: String,
    pub is_active: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = lessons)]
pub struct NewLesson {
    pub module_id: i64,
    pub title: String,
    pub content: String,
    pub order_sequence: i32,
    pub estimated_duration: Option<i32>,
    pub is_active: bool,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = lessons)]
#[diesel(treat_none_as_null = true)]
pub struct LessonChangeset {
    pub title: String,
    pub content: String,
    pub order_sequence: i32,
    pub estimated_duration: Option<i32>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = lessons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Lesson {
    pub id: i64,
    pub module_id: i64,
    pub title: String,
    pub content: String,
    pub order_sequence: i32,
    pub estimated_duration: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LessonListRow {
    pub lesson: Lesson,
    pub module_title: String,
    pub course_title: String,
}
