use admission_backend::config::AppConfig;
use admission_backend::entities::{applications, departments, prelude::*, users};
use admission_backend::infrastructure::database;
use admission_backend::services::intake::IntakeService;
use admission_backend::services::payments::PaymentService;
use admission_backend::services::review::ReviewService;
use admission_backend::services::storage::DocumentStore;
use admission_backend::utils::auth::create_jwt;
use admission_backend::{AppState, create_app};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header::SET_COOKIE};
use chrono::Utc;
use http_body_util::BodyExt;
use percent_encoding::percent_decode_str;
use sea_orm::{ActiveModelTrait, Database, EntityTrait, Set};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

struct NullDocumentStore;

#[async_trait]
impl DocumentStore for NullDocumentStore {
    async fn store(
        &self,
        application_id: &str,
        filename: &str,
        _data: &[u8],
    ) -> anyhow::Result<String> {
        Ok(format!("applications/{}/{}", application_id, filename))
    }
}

async fn setup_state() -> AppState {
    unsafe {
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
    }
    // One connection keeps every query on the same in-memory database
    let mut opt = sea_orm::ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let documents: Arc<dyn DocumentStore> = Arc::new(NullDocumentStore);

    AppState {
        db: db.clone(),
        documents: documents.clone(),
        intake: Arc::new(IntakeService::new(db.clone(), documents.clone())),
        review: Arc::new(ReviewService::new(db.clone())),
        payments: Arc::new(PaymentService::new(db)),
        config: AppConfig::default(),
    }
}

async fn insert_department(
    db: &sea_orm::DatabaseConnection,
    code: &str,
    seats: i32,
) -> departments::Model {
    departments::ActiveModel {
        code: Set(code.to_string()),
        name: Set(format!("{} Department", code)),
        total_credits: Set(140),
        per_credit_fee: Set(500),
        seats: Set(seats),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

async fn insert_application(
    db: &sea_orm::DatabaseConnection,
    department_id: i32,
    status: &str,
) -> applications::Model {
    applications::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        full_name: Set("Test Applicant".to_string()),
        email: Set("applicant@example.com".to_string()),
        phone: Set("01700000000".to_string()),
        guardian: Set(String::new()),
        address: Set(String::new()),
        education: Set(String::new()),
        exam_roll: Set(String::new()),
        department_id: Set(department_id),
        program: Set("bachelors".to_string()),
        fee_amount: Set(500),
        status: Set(status.to_string()),
        applied_at: Set(Utc::now()),
        paid_at: Set(None),
        receipt_text: Set(String::new()),
    }
    .insert(db)
    .await
    .unwrap()
}

async fn make_token(state: &AppState, is_staff: bool, is_active: bool) -> String {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        username: Set(format!("user-{}", Uuid::new_v4())),
        password_hash: Set("unused".to_string()),
        is_staff: Set(is_staff),
        is_active: Set(is_active),
        created_at: Set(Some(Utc::now())),
    }
    .insert(&state.db)
    .await
    .unwrap();

    create_jwt(&user.id, &state.config.jwt_secret).unwrap()
}

async fn post(app: &Router, uri: &str, token: Option<&str>) -> axum::http::Response<axum::body::Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn flash_messages(response: &axum::http::Response<axum::body::Body>) -> String {
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let value = cookie
        .trim_start_matches("flash=")
        .split(';')
        .next()
        .unwrap_or_default();
    percent_decode_str(value)
        .decode_utf8()
        .map(|s| s.to_string())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_accept_decrements_seats() {
    let state = setup_state().await;
    let dept = insert_department(&state.db, "CSE", 3).await;
    let application = insert_application(&state.db, dept.id, "docs_verified").await;
    let token = make_token(&state, true, true).await;
    let app = create_app(state.clone());

    let response = post(
        &app,
        &format!("/applications/{}/accept", application.id),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/applications");

    let application = Applications::find_by_id(&application.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, "accepted");

    let dept = Departments::find_by_id(dept.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dept.seats, 2);
}

#[tokio::test]
async fn test_accept_with_no_seats_mutates_nothing() {
    let state = setup_state().await;
    let dept = insert_department(&state.db, "ARCH", 0).await;
    let application = insert_application(&state.db, dept.id, "submitted").await;
    let token = make_token(&state, true, true).await;
    let app = create_app(state.clone());

    let response = post(
        &app,
        &format!("/applications/{}/accept", application.id),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(flash_messages(&response).contains("No seats left in ARCH."));

    let application = Applications::find_by_id(&application.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, "submitted");

    let dept = Departments::find_by_id(dept.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dept.seats, 0);
}

#[tokio::test]
async fn test_double_accept_decrements_once() {
    let state = setup_state().await;
    let dept = insert_department(&state.db, "CSE", 3).await;
    let application = insert_application(&state.db, dept.id, "submitted").await;
    let token = make_token(&state, true, true).await;
    let app = create_app(state.clone());

    let uri = format!("/applications/{}/accept", application.id);
    let first = post(&app, &uri, Some(&token)).await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);

    let second = post(&app, &uri, Some(&token)).await;
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert!(flash_messages(&second).contains("already accepted"));

    let dept = Departments::find_by_id(dept.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dept.seats, 2);
}

#[tokio::test]
async fn test_reject_sets_status_regardless_of_seats() {
    let state = setup_state().await;
    let dept = insert_department(&state.db, "EEE", 0).await;
    let application = insert_application(&state.db, dept.id, "docs_verified").await;
    let token = make_token(&state, true, true).await;
    let app = create_app(state.clone());

    let response = post(
        &app,
        &format!("/applications/{}/reject", application.id),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let application = Applications::find_by_id(&application.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, "rejected");

    // Rejecting again is harmless
    let response = post(
        &app,
        &format!("/applications/{}/reject", application.id),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_non_staff_is_redirected_to_login() {
    let state = setup_state().await;
    let dept = insert_department(&state.db, "CSE", 3).await;
    let application = insert_application(&state.db, dept.id, "submitted").await;
    let token = make_token(&state, false, true).await;
    let app = create_app(state.clone());

    let response = post(
        &app,
        &format!("/applications/{}/accept", application.id),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/auth/login");

    let application = Applications::find_by_id(&application.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, "submitted");

    let dept = Departments::find_by_id(dept.id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dept.seats, 3);
}

#[tokio::test]
async fn test_inactive_staff_and_garbage_tokens_are_redirected() {
    let state = setup_state().await;
    let dept = insert_department(&state.db, "CSE", 3).await;
    let application = insert_application(&state.db, dept.id, "submitted").await;
    let app = create_app(state.clone());

    let inactive = make_token(&state, true, false).await;
    let uri = format!("/applications/{}/accept", application.id);

    let response = post(&app, &uri, Some(&inactive)).await;
    assert_eq!(response.headers()["location"], "/auth/login");

    let response = post(&app, &uri, Some("not-a-jwt")).await;
    assert_eq!(response.headers()["location"], "/auth/login");

    let response = post(&app, &uri, None).await;
    assert_eq!(response.headers()["location"], "/auth/login");
}

#[tokio::test]
async fn test_accept_unknown_application_is_not_found() {
    let state = setup_state().await;
    insert_department(&state.db, "CSE", 3).await;
    let token = make_token(&state, true, true).await;
    let app = create_app(state.clone());

    let response = post(
        &app,
        &format!("/applications/{}/accept", Uuid::new_v4()),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_application_detail_plain_text() {
    let state = setup_state().await;
    let dept = insert_department(&state.db, "CSE", 3).await;
    let application = insert_application(&state.db, dept.id, "submitted").await;
    let app = create_app(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/applications/{}", application.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert_eq!(
        text,
        format!(
            "Application: Test Applicant ({}) - Status: submitted",
            application.id
        )
    );
}

#[tokio::test]
async fn test_application_detail_unknown_id_is_404() {
    let state = setup_state().await;
    let app = create_app(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/applications/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_staff_listing_requires_staff_session() {
    let state = setup_state().await;
    let dept = insert_department(&state.db, "CSE", 3).await;
    insert_application(&state.db, dept.id, "submitted").await;
    insert_application(&state.db, dept.id, "accepted").await;
    let token = make_token(&state, true, true).await;
    let app = create_app(state.clone());

    // Without a session: redirected, not served
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/applications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/auth/login");

    // With a staff session: full listing, optionally filtered by status
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/applications?status=accepted")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let rows: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "accepted");
    assert_eq!(rows[0]["department"], "CSE");
}

#[tokio::test]
async fn test_login_issues_token_for_seeded_staff() {
    let state = setup_state().await;
    admission_backend::infrastructure::seed::seed_initial_data(&state.db)
        .await
        .unwrap();
    let app = create_app(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"username": "admin", "password": "admin"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let token = json["token"].as_str().unwrap();

    // The issued token passes the staff gate
    let dept = insert_department(&state.db, "CSE", 3).await;
    let application = insert_application(&state.db, dept.id, "submitted").await;
    let response = post(
        &app,
        &format!("/applications/{}/accept", application.id),
        Some(token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/applications");
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let state = setup_state().await;
    admission_backend::infrastructure::seed::seed_initial_data(&state.db)
        .await
        .unwrap();
    let app = create_app(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"username": "admin", "password": "wrong"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
