use crate::AppState;
use crate::errors::AppError;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_keycloak_auth::KeycloakAuthStatus;
use axum_keycloak_auth::decode::{KeycloakToken, ProfileAndEmail};
use axum_keycloak_auth::role::KeycloakRole;
use tracing::{debug, warn};

/// Verified administrator attached to every back-office request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub subject: String,
    pub username: String,
}

/// Resolves the Keycloak auth status left by the protection layer into an
/// `AdminIdentity` extension. Requests without a valid token are sent to the
/// login page; tokens lacking the admin role get a 403 page.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let status = request
        .extensions()
        .get::<KeycloakAuthStatus<String, ProfileAndEmail>>();
    let resolved = match status {
        Some(KeycloakAuthStatus::Success(token)) => Some(identity_from_token(
            token,
            &state.settings.admin_role,
        )),
        Some(KeycloakAuthStatus::Failure(err)) => {
            debug!("Token rejected for {}: {:?}", path, err);
            None
        }
        None => None,
    };

    match resolved {
        Some(Ok(identity)) => {
            debug!("Admin {} authorized for {}", identity.username, path);
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Some(Err(err)) => {
            warn!("Authenticated user refused on {}: {}", path, err);
            err.into_response()
        }
        None => {
            warn!("Unauthenticated request to {}, redirecting to login", path);
            Redirect::to(&state.settings.login_url).into_response()
        }
    }
}

fn identity_from_token(
    token: &KeycloakToken<String>,
    admin_role: &str,
) -> Result<AdminIdentity, AppError> {
    let roles: Vec<&str> = token
        .roles
        .iter()
        .map(|role| match role {
            KeycloakRole::Realm { role } => role.as_str(),
            KeycloakRole::Client { role, .. } => role.as_str(),
        })
        .collect();

    identity_from_claims(
        &token.subject,
        &token.extra.profile.preferred_username,
        &roles,
        admin_role,
    )
}

fn identity_from_claims(
    subject: &str,
    username: &str,
    roles: &[&str],
    admin_role: &str,
) -> Result<AdminIdentity, AppError> {
    if !roles.iter().any(|role| *role == admin_role) {
        return Err(AppError::Forbidden(format!(
            "User '{}' does not have the '{}' role.",
            username, admin_role
        )));
    }
    Ok(AdminIdentity {
        subject: subject.to_string(),
        username: username.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_grants_identity() {
        let identity =
            identity_from_claims("sub-1", "alice", &["offline_access", "lms-admin"], "lms-admin")
                .unwrap();
        assert_eq!(identity.subject, "sub-1");
        assert_eq!(identity.username, "alice");
    }

    #[test]
    fn missing_role_is_forbidden() {
        let err = identity_from_claims("sub-2", "bob", &["student"], "lms-admin").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
