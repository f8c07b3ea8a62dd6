//! Staff identity extractor for axum.
//!
//! Authentication happens at the gateway in front of this service. The
//! gateway forwards the resolved staff member as headers:
//!
//! ```text
//! X-Staff-Id: s-42                      (required)
//! X-Staff-Name: Meera Nair              (required)
//! X-Staff-Role: Admin | Staff | Student (required)
//! X-Staff-Email: meera@example.com
//! X-Staff-Department: Admissions
//! X-Reception-Permissions: create,update,delete
//! X-Request-Id: 7f0c...                 (becomes the correlation id)
//! ```
//!
//! # Example
//!
//! ```ignore
//! async fn my_handler(RequireStaff(staff): RequireStaff) -> impl IntoResponse {
//!     format!("Hello, {}!", staff.actor.name)
//! }
//! ```

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::domain::foundation::{
    Actor, CommandMetadata, ReceptionPermissions, StaffId, StaffRole, ValidationError,
};

pub const STAFF_ID_HEADER: &str = "x-staff-id";
pub const STAFF_NAME_HEADER: &str = "x-staff-name";
pub const STAFF_ROLE_HEADER: &str = "x-staff-role";
pub const STAFF_EMAIL_HEADER: &str = "x-staff-email";
pub const STAFF_DEPARTMENT_HEADER: &str = "x-staff-department";
pub const RECEPTION_PERMISSIONS_HEADER: &str = "x-reception-permissions";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The staff member behind a request, plus its correlation id.
#[derive(Debug, Clone)]
pub struct StaffContext {
    pub actor: Actor,
    pub correlation_id: String,
}

impl StaffContext {
    /// Command metadata for handlers invoked by this request.
    pub fn metadata(&self) -> CommandMetadata {
        CommandMetadata::new(self.actor.clone())
            .with_correlation_id(self.correlation_id.clone())
            .with_source("api")
    }

    /// Reads the staff context from gateway headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, StaffRejection> {
        let id = required(headers, STAFF_ID_HEADER)?;
        let id = StaffId::new(id).map_err(|e| StaffRejection::Invalid {
            header: STAFF_ID_HEADER,
            message: e.to_string(),
        })?;
        let name = required(headers, STAFF_NAME_HEADER)?;
        let role: StaffRole = required(headers, STAFF_ROLE_HEADER)?
            .parse()
            .map_err(|e: ValidationError| StaffRejection::Invalid {
                header: STAFF_ROLE_HEADER,
                message: e.to_string(),
            })?;

        let mut actor = Actor::new(id, name, role);
        if let Some(email) = optional(headers, STAFF_EMAIL_HEADER) {
            actor = actor.with_email(email);
        }
        if let Some(department) = optional(headers, STAFF_DEPARTMENT_HEADER) {
            actor = actor.with_department(department);
        }
        if let Some(list) = optional(headers, RECEPTION_PERMISSIONS_HEADER) {
            actor = actor.with_reception(ReceptionPermissions::parse_list(list));
        }

        let correlation_id = optional(headers, REQUEST_ID_HEADER)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Self {
            actor,
            correlation_id,
        })
    }
}

fn optional<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn required<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, StaffRejection> {
    optional(headers, name).ok_or(StaffRejection::Missing(name))
}

/// Extractor that requires gateway staff headers.
#[derive(Debug, Clone)]
pub struct RequireStaff(pub StaffContext);

#[async_trait]
impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = StaffRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        StaffContext::from_headers(&parts.headers).map(RequireStaff)
    }
}

/// Rejection type for missing or malformed staff headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffRejection {
    Missing(&'static str),
    Invalid { header: &'static str, message: String },
}

impl IntoResponse for StaffRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            StaffRejection::Missing(header) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                format!("Missing {} header", header),
            ),
            StaffRejection::Invalid { header, message } => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                format!("Invalid {} header: {}", header, message),
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "code": code,
                "message": message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/test");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn extracts_full_staff_context() {
        let mut parts = parts(&[
            ("X-Staff-Id", "s-42"),
            ("X-Staff-Name", "Meera"),
            ("X-Staff-Role", "staff"),
            ("X-Staff-Email", "meera@example.com"),
            ("X-Staff-Department", "Admissions"),
            ("X-Reception-Permissions", "create, update"),
            ("X-Request-Id", "req-1"),
        ]);

        let RequireStaff(staff) = RequireStaff::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(staff.actor.id.as_str(), "s-42");
        assert_eq!(staff.actor.role, StaffRole::Staff);
        assert_eq!(staff.actor.department.as_deref(), Some("Admissions"));
        assert!(staff.actor.reception.create);
        assert!(!staff.actor.reception.delete);
        assert_eq!(staff.metadata().correlation_id(), "req-1");
        assert_eq!(staff.metadata().source(), Some("api"));
    }

    #[tokio::test]
    async fn missing_identity_is_unauthenticated() {
        let mut parts = parts(&[("X-Staff-Name", "Meera"), ("X-Staff-Role", "Admin")]);

        let result = RequireStaff::from_request_parts(&mut parts, &()).await;

        assert_eq!(result.unwrap_err(), StaffRejection::Missing(STAFF_ID_HEADER));
    }

    #[tokio::test]
    async fn unknown_role_is_bad_request() {
        let mut parts = parts(&[
            ("X-Staff-Id", "s-1"),
            ("X-Staff-Name", "Meera"),
            ("X-Staff-Role", "janitor"),
        ]);

        let rejection = RequireStaff::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();

        assert!(matches!(rejection, StaffRejection::Invalid { header, .. } if header == STAFF_ROLE_HEADER));
        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_header_returns_401() {
        let response = StaffRejection::Missing(STAFF_NAME_HEADER).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn generated_correlation_id_when_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(STAFF_ID_HEADER, "s-1".parse().unwrap());
        headers.insert(STAFF_NAME_HEADER, "Meera".parse().unwrap());
        headers.insert(STAFF_ROLE_HEADER, "Admin".parse().unwrap());

        let staff = StaffContext::from_headers(&headers).unwrap();

        assert!(staff.actor.is_admin());
        assert!(!staff.correlation_id.is_empty());
    }
}
