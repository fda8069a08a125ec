use super::form::{checkbox, empty_as_none};
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct ListCoursesParams {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct CourseForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_active: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListModulesParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub course_id: Option<i64>,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct CreateModuleForm {
    pub course_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order_sequence: i32,
    pub pass_threshold: i32,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_active: bool,
}

#[derive(Deserialize, Debug)]
pub struct UpdateModuleForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order_sequence: i32,
    pub pass_threshold: i32,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_active: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListLessonsParams {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub module_id: Option<i64>,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct CreateLessonForm {
    pub module_id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub order_sequence: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub estimated_duration: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateLessonForm {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub order_sequence: Option<i32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub estimated_duration: Option<i32>,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_active: bool,
}
