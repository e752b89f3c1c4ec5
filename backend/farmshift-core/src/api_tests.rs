// src/api_tests.rs

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::{router, AppState};
    use crate::clock::FixedClock;
    use crate::store::{ItemStore, MemoryTable};

    fn setup_test_environment(now: &str) -> (Router, Arc<MemoryTable>, FixedClock) {
        let clock = FixedClock::parse(now).unwrap();
        let table = Arc::new(MemoryTable::new());
        let store: Arc<dyn ItemStore> = table.clone();
        let state = AppState::new(store, Arc::new(clock.clone()), false);
        (router(state), table, clock)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn decimal(value: &Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    async fn create_employee(app: &Router, name: &str, skills: &[&str]) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/employees",
            Some(json!({ "name": name, "skills": skills })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "create employee failed: {}", body);
        body["employee_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_employee_lifecycle() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        let id = create_employee(&app, "Sato", &["milking"]).await;
        assert_eq!(id, "001");

        let (status, body) = send(&app, Method::GET, "/employees/001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending_approval");
        assert_eq!(body["vacation_days"], 20);

        let (status, body) = send(&app, Method::POST, "/employees/001/approve", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");

        let (status, _) = send(&app, Method::DELETE, "/employees/001", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, listed) = send(&app, Method::GET, "/employees", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
        let (_, listed) = send(&app, Method::GET, "/employees?include_deleted=true", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, body) = send(&app, Method::GET, "/employees/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn test_employee_requires_a_name() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        let (status, body) = send(&app, Method::POST, "/employees", Some(json!({ "name": " " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_generate_monthly_preview_writes_nothing() {
        let (app, table, _) = setup_test_environment("2025-11-15 09:00:00");
        for (name, skill) in [("Sato", "milking"), ("Suzuki", "feeding"), ("Ito", "cleaning"), ("Kato", "patrol")] {
            create_employee(&app, name, &[skill]).await;
        }
        let before = table.snapshot().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/shifts/generate-monthly",
            Some(json!({
                "month": "2025-12",
                "preview": true,
                "requirements": { "milking": 1, "feeding": 0, "cleaning": 0, "patrol": 0 }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["preview"], true);
        assert_eq!(body["count"], 31);
        assert_eq!(body["month"], "2025-12");
        let assignments = body["assignments"].as_array().unwrap();
        assert!(assignments.iter().all(|a| a["task_type"] == "milking"));
        assert_eq!(assignments[0]["start_time"], "05:00");
        assert_eq!(table.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_generate_monthly_rejects_past_and_malformed_months() {
        let (app, table, _) = setup_test_environment("2026-01-10 12:00:00");
        let before = table.snapshot().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/shifts/generate-monthly",
            Some(json!({ "month": "2020-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("past month"));

        let (status, _) = send(
            &app,
            Method::POST,
            "/shifts/generate-monthly",
            Some(json!({ "month": "2026-13" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(table.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_committed_generation_is_listed_by_month() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        create_employee(&app, "Sato", &["patrol"]).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/shifts/generate-monthly",
            Some(json!({ "month": "2026-02", "requirements": { "patrol": 1 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 28);
        assert_eq!(body["preview"], false);

        let (status, listed) = send(&app, Method::GET, "/shifts/by-month/2026-02", None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 28);
        assert_eq!(decimal(&listed[0]["duration_hours"]), dec!(0.5));
        assert_eq!(listed[0]["status"], "auto_assigned");
    }

    #[tokio::test]
    async fn test_manual_shift_conflicts_and_moves() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        create_employee(&app, "Sato", &["milking"]).await;
        create_employee(&app, "Ito", &["milking", "patrol"]).await;

        let shift = json!({
            "date": "2025-12-01",
            "employee_id": "001",
            "task_type": "milking",
            "start_time": "05:00",
            "end_time": "07:00"
        });
        let (status, body) = send(&app, Method::POST, "/shifts", Some(shift)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["status"], "scheduled");

        let second = json!({
            "date": "2025-12-01",
            "employee_id": "001",
            "task_type": "patrol",
            "start_time": "20:00",
            "end_time": "21:00"
        });
        let (status, _) = send(&app, Method::POST, "/shifts", Some(second)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let evening = json!({
            "date": "2025-12-01",
            "employee_id": "002",
            "task_type": "patrol",
            "start_time": "20:00",
            "end_time": "21:00"
        });
        let (status, _) = send(&app, Method::POST, "/shifts", Some(evening)).await;
        assert_eq!(status, StatusCode::CREATED);

        // 002 already works that day, so the move is refused.
        let (status, _) = send(
            &app,
            Method::PUT,
            "/shifts/2025-12-01/001/milking",
            Some(json!({ "employee_id": "002" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, Method::DELETE, "/shifts/2025-12-01/002/patrol", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, moved) = send(
            &app,
            Method::PUT,
            "/shifts/2025-12-01/001/milking",
            Some(json!({ "employee_id": "002", "start_time": "05:30" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["employee_id"], "002");
        assert_eq!(moved["start_time"], "05:30");

        let (_, day) = send(&app, Method::GET, "/shifts/2025-12-01", None).await;
        let day = day.as_array().unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0]["employee_id"], "002");
        assert_eq!(decimal(&day[0]["duration_hours"]), dec!(1.5));
    }

    #[tokio::test]
    async fn test_shift_validation_errors() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        create_employee(&app, "Sato", &["milking"]).await;

        for (date, start, end, employee) in [
            ("2025-12-1", "05:00", "07:00", "001"),
            ("2025-12-01", "5:00", "07:00", "001"),
            ("2025-12-01", "07:00", "05:00", "001"),
            ("2025-12-01", "05:00", "07:00", "999"),
        ] {
            let (status, body) = send(
                &app,
                Method::POST,
                "/shifts",
                Some(json!({
                    "date": date,
                    "employee_id": employee,
                    "task_type": "milking",
                    "start_time": start,
                    "end_time": end
                })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "expected rejection: {}", body);
        }

        let (status, _) = send(&app, Method::DELETE, "/shifts/2025-12-01/001/milking", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_assign_day_endpoint() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        create_employee(&app, "Sato", &["milking"]).await;
        create_employee(&app, "Ito", &["feeding"]).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/shifts/assign",
            Some(json!({
                "date": "2025-12-05",
                "required_tasks": [
                    { "task_type": "milking", "count": 1 },
                    { "task_type": "feeding", "count": 2 }
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["count"], 2);
        assert_eq!(body["assignments"][1]["start_time"], "08:00");
        assert_eq!(body["assignments"][1]["end_time"], "10:00");
    }

    #[tokio::test]
    async fn test_requirements_round_trip_and_drive_generation() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        create_employee(&app, "Sato", &["milking", "cleaning"]).await;

        let (status, body) = send(&app, Method::GET, "/requirements/default/2025-12", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requirements"], json!({}));

        let (status, _) = send(
            &app,
            Method::POST,
            "/requirements/default/2025-12",
            Some(json!({ "requirements": { "milking": 1 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(
            &app,
            Method::POST,
            "/requirements/daily/2025-12-31",
            Some(json!({ "requirements": { "cleaning": 1 } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            &app,
            Method::POST,
            "/shifts/generate-monthly",
            Some(json!({ "month": "2025-12", "preview": true })),
        )
        .await;
        let assignments = body["assignments"].as_array().unwrap();
        assert_eq!(assignments.len(), 31);
        assert_eq!(assignments[30]["task_type"], "cleaning");
        assert_eq!(assignments[29]["task_type"], "milking");

        let (status, _) = send(&app, Method::GET, "/requirements/daily/2025-12-32", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_tasks_crud_and_ordering() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        for id in ["milking", "2", "10"] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/tasks",
                Some(json!({ "task_type": id, "name": id })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }
        let (status, _) = send(
            &app,
            Method::POST,
            "/tasks",
            Some(json!({ "task_type": "milking", "name": "again" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, listed) = send(&app, Method::GET, "/tasks", None).await;
        let ids: Vec<&str> = listed
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["task_type"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["2", "10", "milking"]);

        let (status, updated) = send(
            &app,
            Method::PUT,
            "/tasks/milking",
            Some(json!({ "morning": { "start": "04:30", "end": "06:30" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "milking");
        assert_eq!(updated["morning"]["start"], "04:30");

        let (status, _) = send(&app, Method::DELETE, "/tasks/10", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/tasks/10", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_vacations_and_usage() {
        let (app, _, _) = setup_test_environment("2025-06-01 08:00:00");
        create_employee(&app, "Sato", &["milking"]).await;

        let (status, created) = send(
            &app,
            Method::POST,
            "/vacation-requests",
            Some(json!({
                "employee_id": "001",
                "start_date": "2025-07-01",
                "end_date": "2025-07-02",
                "reason": "family"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        assert_eq!(created["status"], "applying");
        assert_eq!(created["type"], "full");
        let id = created["request_id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/vacation-requests/{}", id),
            Some(json!({ "status": "approved" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, usage) = send(&app, Method::GET, "/employees/001/vacation-used?year=2025", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&usage["used_days"]), dec!(2));
        assert_eq!(decimal(&usage["remaining_days"]), dec!(18));

        let (_, mine) = send(&app, Method::GET, "/vacation-requests?employee_id=001", None).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            Method::POST,
            "/vacation-requests",
            Some(json!({
                "employee_id": "001",
                "start_date": "2025-07-05",
                "end_date": "2025-07-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_settings_defaults_and_updates() {
        let (app, _, _) = setup_test_environment("2025-06-01 08:00:00");
        let (_, body) = send(&app, Method::GET, "/settings/confirmation", None).await;
        assert_eq!(body["confirmation_day"], 25);

        let (status, _) = send(
            &app,
            Method::POST,
            "/settings/confirmation",
            Some(json!({ "confirmation_day": 40 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/settings/vacation-default",
            Some(json!({ "default_vacation_days": 15, "custom_vacation_types": ["bereavement"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["annual_vacation_days"], 0);
        let (_, body) = send(&app, Method::GET, "/settings/vacation-default", None).await;
        assert_eq!(body["default_vacation_days"], 15);
    }

    #[tokio::test]
    async fn test_employee_shift_views_and_summary() {
        let (app, _, clock) = setup_test_environment("2025-11-15 09:00:00");
        create_employee(&app, "Sato", &["cleaning"]).await;
        send(
            &app,
            Method::POST,
            "/shifts/generate-monthly",
            Some(json!({ "month": "2025-12", "requirements": { "cleaning": 1 } })),
        )
        .await;

        let (status, shifts) = send(&app, Method::GET, "/employees/001/shifts?month=2025-12", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(shifts.as_array().unwrap().len(), 31);

        let (_, single) = send(&app, Method::GET, "/employees/001/shifts?date=2025-12-10", None).await;
        assert_eq!(single.as_array().unwrap().len(), 1);

        // Default window is the last 30 days, which is all in November here.
        let (_, recent) = send(&app, Method::GET, "/employees/001/shifts", None).await;
        assert!(recent.as_array().unwrap().is_empty());
        clock.set_time(
            chrono::NaiveDate::from_ymd_opt(2025, 12, 10)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );
        let (_, recent) = send(&app, Method::GET, "/employees/001/shifts", None).await;
        assert_eq!(recent.as_array().unwrap().len(), 10);

        let (status, summary) = send(&app, Method::GET, "/employees/001/summary?month=2025-12", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["total_shifts"], 31);
        assert_eq!(decimal(&summary["total_hours"]), dec!(46.5));
        assert_eq!(decimal(&summary["average_hours"]), dec!(1.5));
        assert_eq!(summary["task_distribution"]["cleaning"], 31);

        let (_, by_task) = send(&app, Method::GET, "/tasks/cleaning/shifts?month=2025-12", None).await;
        assert_eq!(by_task.as_array().unwrap().len(), 31);
    }

    #[tokio::test]
    async fn test_task_identifiers_with_key_separator_are_rejected() {
        let (app, table, _) = setup_test_environment("2025-11-15 09:00:00");
        create_employee(&app, "Sato", &["milking"]).await;
        let before = table.snapshot().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/shifts",
            Some(json!({
                "date": "2025-12-01",
                "employee_id": "001",
                "task_type": "milk#ing",
                "start_time": "05:00",
                "end_time": "07:00"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("task_type"));

        let (status, _) = send(
            &app,
            Method::POST,
            "/shifts/assign",
            Some(json!({
                "date": "2025-12-01",
                "required_tasks": [{ "task_type": "milk#ing", "count": 1 }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/shifts/generate-monthly",
            Some(json!({ "month": "2025-12", "requirements": { "milking": 1, "pat#rol": 1 } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(table.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_generate_monthly_follows_requirement_order_from_the_body() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        create_employee(&app, "Sato", &["milking", "patrol"]).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/shifts/generate-monthly",
            Some(json!({
                "month": "2025-12",
                "preview": true,
                "requirements": { "patrol": 1, "milking": 1 }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        let assignments = body["assignments"].as_array().unwrap();
        assert_eq!(assignments.len(), 31);
        assert!(assignments.iter().all(|a| a["task_type"] == "patrol"));
    }

    #[tokio::test]
    async fn test_repair_endpoint_reports_nothing_on_clean_month() {
        let (app, _, _) = setup_test_environment("2025-11-15 09:00:00");
        let (status, report) = send(&app, Method::POST, "/shifts/by-month/2025-12/repair", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["removed"], json!([]));
        assert_eq!(report["failed"], 0);

        let (status, listed) = send(&app, Method::GET, "/shifts/by-month/2025-12?repair=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([]));
    }
}
