use crate::features::auth::model::AuthenticatedUser;

use axum::{extract::Request, middleware::Next, Router};

pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: 1,
        username: "admin".to_string(),
        is_admin: true,
    }
}

/// Signed in, but without the admin flag
pub fn create_non_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: 2,
        username: "clerk".to_string(),
        is_admin: false,
    }
}

/// Inject a fixed session into every request, bypassing token checks
pub fn with_session(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

pub fn with_admin_auth(router: Router) -> Router {
    with_session(router, create_admin_user())
}
