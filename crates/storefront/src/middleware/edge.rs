//! Path-tree gating applied to every non-static request.
//!
//! | Path                                 | Check                                   |
//! |--------------------------------------|-----------------------------------------|
//! | `/static/*`, `/favicon.ico`, `/health*` | none                                 |
//! | `/admin-panel/login`, `/api/auth/admin-login` | none                           |
//! | `/admin-panel`, `/admin-panel/*`     | `admin_token` cookie present            |
//! | `/seller*`, `/customer*`             | provider session, when one is configured |
//! | everything else                      | none                                    |
//!
//! Paths are classified after percent-decoding and collapsing `//` and `.`
//! segments, the same form the static file service resolves.
//!
//! The admin check is cookie presence only. Token validity is enforced by the
//! backend on every proxied call, and by [`RequireAdmin`](super::RequireAdmin)
//! where a handler needs it confirmed.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::cookies::{ADMIN_TOKEN, read_cookie};
use crate::state::AppState;

/// Admin login page.
pub const ADMIN_LOGIN_PAGE: &str = "/admin-panel/login";

/// Seller and customer login page.
pub const USER_LOGIN_PAGE: &str = "/auth/login";

const ADMIN_TREE: &str = "/admin-panel";
const STATIC_TREES: &[&str] = &["/static", "/health"];
const STATIC_FILES: &[&str] = &["/favicon.ico"];
const UNGATED_PATHS: &[&str] = &[ADMIN_LOGIN_PAGE, "/api/auth/admin-login"];
const SESSION_TREES: &[&str] = &["/seller", "/customer"];

/// Which check a path falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Static assets and health checks.
    Static,
    /// Explicitly exempt (the admin login page and its API).
    Ungated,
    /// The admin panel tree.
    AdminPanel,
    /// Seller or customer dashboards.
    SessionTree,
    /// Anything else.
    Public,
}

/// Classify a normalized request path.
#[must_use]
pub fn classify(path: &str) -> PathClass {
    if STATIC_FILES.contains(&path) || STATIC_TREES.iter().any(|tree| in_tree(path, tree)) {
        return PathClass::Static;
    }
    let trimmed = path.trim_end_matches('/');
    if UNGATED_PATHS.contains(&trimmed) {
        return PathClass::Ungated;
    }
    if in_tree(path, ADMIN_TREE) {
        return PathClass::AdminPanel;
    }
    if SESSION_TREES.iter().any(|tree| in_tree(path, tree)) {
        return PathClass::SessionTree;
    }
    PathClass::Public
}

/// `tree` itself or anything below it.
fn in_tree(path: &str, tree: &str) -> bool {
    path.strip_prefix(tree)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Percent-decode `path` and resolve empty, `.` and `..` segments.
///
/// Returns `None` when the decoded path is not UTF-8.
#[must_use]
pub fn normalize(path: &str) -> Option<String> {
    let decoded = urlencoding::decode(path).ok()?;

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut normal = format!("/{}", segments.join("/"));
    if decoded.ends_with('/') && !segments.is_empty() {
        normal.push('/');
    }
    Some(normal)
}

/// Gate requests by path tree.
pub async fn edge_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(path) = normalize(request.uri().path()) else {
        debug!(uri = %request.uri(), "Undecodable path");
        return StatusCode::BAD_REQUEST.into_response();
    };

    match classify(&path) {
        PathClass::Static | PathClass::Ungated | PathClass::Public => {}
        PathClass::AdminPanel => {
            if read_cookie(request.headers(), ADMIN_TOKEN).is_none() {
                debug!(path = %path, "No admin cookie, redirecting to admin login");
                return Redirect::to(ADMIN_LOGIN_PAGE).into_response();
            }
        }
        PathClass::SessionTree => {
            if let Some(sessions) = state.sessions()
                && !sessions.has_session(request.headers()).await
            {
                debug!(path = %path, "No session, redirecting to login");
                return Redirect::to(USER_LOGIN_PAGE).into_response();
            }
        }
    }

    next.run(request).await
}
