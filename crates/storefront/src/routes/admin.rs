//! Admin session route.

use axum::Json;

use marketplace_core::Envelope;

use crate::middleware::RequireAdmin;

/// The backend-confirmed admin for the current cookies.
///
/// GET /api/admin/session
///
/// Redirects to the admin login page, or to the caller's own dashboard, when
/// the backend does not report an admin.
pub async fn session(RequireAdmin(admin): RequireAdmin) -> Json<Envelope> {
    Json(Envelope::with_user(admin.user))
}
