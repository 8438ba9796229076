// handlers/public/auth/logout.rs - GET /admin/logout and GET /user/logout handlers

use axum::{extract::State, response::Redirect};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::Role;
use crate::middleware::auth::removal_cookie;
use crate::state::AppState;

fn logout(state: &AppState, jar: CookieJar, role: Role) -> (CookieJar, Redirect) {
    let jar = jar.remove(removal_cookie(&state.config.security));
    (jar, Redirect::to(role.login_path()))
}

/// GET /admin/logout - Clear the session and return to the admin login page
pub async fn admin_logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    logout(&state, jar, Role::Admin)
}

/// GET /user/logout - Clear the session and return to the owner login page
pub async fn owner_logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    logout(&state, jar, Role::User)
}
