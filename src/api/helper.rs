use crate::errors::AppError;
use axum::Form;
use axum::extract::rejection::FormRejection;
use deadpool_diesel::postgres::Pool;
use diesel::prelude::*;
use tracing::{debug, warn};

/// Runs a plain Diesel query on a pooled connection.
pub(super) async fn run_query<T, F>(pool: &Pool, query: F) -> Result<T, AppError>
where
    F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
    T: Send + 'static,
{
    let conn = pool.get().await?;
    debug!("DB connection object obtained from pool for interaction");

    let result = conn.interact(query).await?;
    Ok(result?)
}

/// Runs a store function that reports domain errors, outside a transaction.
pub(super) async fn run_store<T, F>(pool: &Pool, work: F) -> Result<T, AppError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let conn = pool.get().await?;
    debug!("DB connection object obtained from pool for store call");

    conn.interact(work).await?
}

/// Runs `work` as one unit of work: committed on `Ok`, rolled back on `Err`.
pub(super) async fn run_transaction<T, F>(pool: &Pool, work: F) -> Result<T, AppError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let conn = pool.get().await?;
    debug!("DB connection object obtained from pool for transaction");

    conn.interact(move |conn| conn.transaction(work)).await?
}

/// Unwraps a typed form, reporting missing or malformed fields as a validation error.
pub(super) fn accept_form<T>(form: Result<Form<T>, FormRejection>) -> Result<T, AppError> {
    match form {
        Ok(Form(value)) => Ok(value),
        Err(rejection) => {
            warn!("Rejected form submission: {}", rejection.body_text());
            Err(AppError::Validation(
                "Some required fields are missing or contain invalid values.".to_string(),
            ))
        }
    }
}
