//! Route configuration for visit endpoints.

use axum::routing::{get, post, put};
use axum::Router;

use super::handlers::{
    call_next, call_visitor, check_in, check_out, contact_visits, delete_visit, display_board,
    edit_purpose, forward_visit, get_queue, get_visit, list_visits, reception_summary,
    record_milestone, schedule_visit, update_visit, walk_in, VisitAppState,
};

/// Creates the visit router with all endpoints.
///
/// Routes:
/// - `GET /api/visits` - Reception log
/// - `POST /api/visits/schedule` - Schedule
/// - `POST /api/visits/walk-in` - Walk-in check-in
/// - `GET|PATCH|DELETE /api/visits/:id` - Read, edit details, remove
/// - `POST /api/visits/:id/{check-in,check-out,call,forward,milestone}`
/// - `PUT /api/visits/:id/segments/:index/purpose` - Optimistic purpose edit
/// - `GET /api/queue?mode=mine|all` - Live queue
/// - `POST /api/queue/call-next` - Call next
/// - `GET /api/display` - Waiting-room board
/// - `GET /api/reception/summary` - Reception counters
/// - `GET /api/contacts/:id/visits` - Contact history
pub fn visit_router() -> Router<VisitAppState> {
    Router::new()
        .route("/api/visits", get(list_visits))
        .route("/api/visits/schedule", post(schedule_visit))
        .route("/api/visits/walk-in", post(walk_in))
        .route(
            "/api/visits/:id",
            get(get_visit).patch(update_visit).delete(delete_visit),
        )
        .route("/api/visits/:id/check-in", post(check_in))
        .route("/api/visits/:id/check-out", post(check_out))
        .route("/api/visits/:id/call", post(call_visitor))
        .route("/api/visits/:id/forward", post(forward_visit))
        .route("/api/visits/:id/milestone", post(record_milestone))
        .route("/api/visits/:id/segments/:index/purpose", put(edit_purpose))
        .route("/api/queue", get(get_queue))
        .route("/api/queue/call-next", post(call_next))
        .route("/api/display", get(display_board))
        .route("/api/reception/summary", get(reception_summary))
        .route("/api/contacts/:id/visits", get(contact_visits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryVisitStore, ManualClock, RoleCapabilityChecker};
    use crate::application::{FrontDesk, FrontDeskConfig};
    use crate::domain::foundation::Timestamp;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let clock = ManualClock::new(Timestamp::parse("2024-05-01T04:30:00Z").unwrap());
        let front_desk = FrontDesk::new(
            Arc::new(InMemoryVisitStore::new()),
            Arc::new(RoleCapabilityChecker::new()),
            Arc::new(clock),
            FrontDeskConfig::default(),
        );
        visit_router().with_state(VisitAppState::new(Arc::new(front_desk)))
    }

    fn request(method: &str, uri: &str, role: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-Staff-Id", "s-1")
            .header("X-Staff-Name", "Meera")
            .header("X-Staff-Role", role)
            .header("X-Staff-Department", "Admissions");
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn walk_in_asha(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/visits/walk-in",
                "Admin",
                Some(json!({
                    "visitor_name": "Asha",
                    "department": "Admissions",
                    "purpose": "Course enquiry"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["daily_sequence_number"], 1);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn walk_in_then_read_with_journey() {
        let app = app();
        let id = walk_in_asha(&app).await;

        let response = app
            .oneshot(request("GET", &format!("/api/visits/{}", id), "Staff", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["visit"]["status"], "Checked-in");
        assert_eq!(body["journey"]["route"][0], "Admissions");
    }

    #[tokio::test]
    async fn missing_staff_headers_are_rejected() {
        let response = app()
            .oneshot(Request::builder().uri("/api/visits").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_visit_is_404() {
        let response = app()
            .oneshot(request("GET", "/api/visits/nope", "Admin", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["code"], "VISIT_NOT_FOUND");
    }

    #[tokio::test]
    async fn student_cannot_forward() {
        let app = app();
        let id = walk_in_asha(&app).await;

        let response = app
            .oneshot(request(
                "POST",
                &format!("/api/visits/{}/forward", id),
                "Student",
                Some(json!({ "department": "Finance" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn checking_in_twice_is_a_conflict() {
        let app = app();
        let id = walk_in_asha(&app).await;

        let response = app
            .oneshot(request("POST", &format!("/api/visits/{}/check-in", id), "Admin", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn call_next_on_empty_queue_is_no_content() {
        let response = app()
            .oneshot(request("POST", "/api/queue/call-next", "Staff", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn call_next_lists_scheduled_head_awaiting_check_in() {
        let app = app();
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/visits/schedule",
                "Admin",
                Some(json!({
                    "visitor_name": "Ravi",
                    "department": "Admissions",
                    "scheduled_check_in_time": "2024-05-01T04:00:00Z"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = json_body(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(request("POST", "/api/queue/call-next", "Staff", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["called"].is_null());
        assert_eq!(body["awaiting_check_in"][0], id.as_str());
    }

    #[tokio::test]
    async fn forward_moves_visitor_to_new_queue() {
        let app = app();
        let id = walk_in_asha(&app).await;

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/visits/{}/forward", id),
                "Staff",
                Some(json!({ "department": "Finance", "purpose": "Fee payment" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["target"], "Finance");
        assert_eq!(body["segments"].as_array().unwrap().len(), 2);

        let queue = app
            .oneshot(request("GET", "/api/queue?mode=mine", "Staff", None))
            .await
            .unwrap();
        assert_eq!(queue.status(), StatusCode::OK);
        let queue = json_body(queue).await;
        assert!(queue["entries"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn purpose_edit_is_accepted_pending() {
        let app = app();
        let id = walk_in_asha(&app).await;

        let response = app
            .oneshot(request(
                "PUT",
                &format!("/api/visits/{}/segments/0/purpose", id),
                "Admin",
                Some(json!({ "purpose": "Scholarship enquiry" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = json_body(response).await;
        assert_eq!(body["edit_status"], "pending");
        assert_eq!(body["visit"]["segments"][0]["purpose"], "Scholarship enquiry");
    }

    #[tokio::test]
    async fn unknown_status_filter_is_bad_request() {
        let response = app()
            .oneshot(request("GET", "/api/visits?status=Lost", "Admin", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
