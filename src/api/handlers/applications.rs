use crate::api::error::AppError;
use crate::api::middleware::auth::CurrentUser;
use crate::api::notify::{Notice, flash_redirect};
use crate::entities::{applications, prelude::*};
use crate::models::DocumentKind;
use crate::services::intake::{IntakeError, SubmitApplication, UploadedDocument};
use crate::services::payments::PaymentError;
use crate::services::review::ReviewError;
use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ApplicationSummary {
    pub id: String,
    pub full_name: String,
    pub department: String,
    pub program: String,
    pub status: String,
    pub fee_amount: i32,
    pub applied_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

fn short_id(id: &str) -> &str {
    &id[..10.min(id.len())]
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    let err_msg = e.to_string();
    if err_msg.contains("length limit exceeded") {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(err_msg)
    }
}

#[utoipa::path(
    post,
    path = "/apply",
    request_body(content = Multipart, description = "Application form with optional photo/sign/transcript uploads"),
    responses(
        (status = 303, description = "Redirect back to the apply page; outcome flashed as a notification")
    ),
    tag = "applications"
)]
pub async fn submit_application(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = SubmitApplication::default();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if let Ok(kind) = name.parse::<DocumentKind>() {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field.bytes().await.map_err(multipart_error)?.to_vec();

            // A file input left empty still submits an empty part; skip it.
            if filename.is_empty() || data.is_empty() {
                continue;
            }

            uploads.push(UploadedDocument {
                kind,
                filename,
                data,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(multipart_error)?
                .trim()
                .to_string();

            match name.as_str() {
                "full_name" => form.full_name = value,
                "email" => form.email = value,
                "phone" => form.phone = value,
                "guardian" => form.guardian = value,
                "address" => form.address = value,
                "education" => form.education = value,
                "exam_roll" => form.exam_roll = value,
                "department" => form.department = value,
                "program" => form.program = (!value.is_empty()).then_some(value),
                "fee_amount" => form.fee_amount = (!value.is_empty()).then_some(value),
                _ => {}
            }
        }
    }

    match state.intake.submit(form, uploads).await {
        Ok(outcome) => Ok(flash_redirect(
            "/apply",
            &[Notice::success(format!(
                "Application submitted successfully (ID: {}).",
                short_id(&outcome.application_id)
            ))],
        )),
        Err(e @ (IntakeError::Validation(_) | IntakeError::DepartmentNotFound)) => Ok(
            flash_redirect("/apply", &[Notice::error(e.to_string())]),
        ),
        Err(IntakeError::Db(e)) => Err(AppError::Database(e)),
        Err(IntakeError::Storage(e)) => Err(AppError::Anyhow(e)),
    }
}

#[utoipa::path(
    get,
    path = "/applications/{id}",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "Plain-text application summary"),
        (status = 404, description = "Unknown application id")
    ),
    tag = "applications"
)]
pub async fn application_detail(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let app = Applications::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {} not found", id)))?;

    let content = format!(
        "Application: {} ({}) - Status: {}",
        app.full_name, app.id, app.status
    );
    Ok(content.into_response())
}

#[utoipa::path(
    get,
    path = "/applications",
    params(
        ("status" = Option<String>, Query, description = "Restrict the listing to one workflow status")
    ),
    responses(
        (status = 200, description = "Applications for review, newest first", body = [ApplicationSummary]),
        (status = 303, description = "Not staff; redirected to login")
    ),
    security(("jwt" = [])),
    tag = "applications"
)]
pub async fn list_applications(
    State(state): State<crate::AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ApplicationSummary>>, AppError> {
    let mut select = Applications::find()
        .find_also_related(Departments)
        .order_by_desc(applications::Column::AppliedAt);

    if let Some(status) = &query.status {
        select = select.filter(applications::Column::Status.eq(status));
    }

    let rows = select.all(&state.db).await?;

    Ok(Json(
        rows.into_iter()
            .map(|(app, dept)| ApplicationSummary {
                id: app.id,
                full_name: app.full_name,
                department: dept.map(|d| d.code).unwrap_or_default(),
                program: app.program,
                status: app.status,
                fee_amount: app.fee_amount,
                applied_at: app.applied_at,
            })
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/applications/{id}/accept",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 303, description = "Redirect with outcome notification"),
        (status = 404, description = "Unknown application id")
    ),
    security(("jwt" = [])),
    tag = "review"
)]
pub async fn accept_applicant(
    State(state): State<crate::AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    tracing::debug!("Accept of {} requested by {}", id, user.username);

    match state.review.accept(&id).await {
        Ok(outcome) => Ok(flash_redirect(
            "/applications",
            &[Notice::success(format!(
                "Application {} accepted; seats left: {}",
                outcome.application_id, outcome.seats_left
            ))],
        )),
        Err(ReviewError::NotFound) => {
            Err(AppError::NotFound(format!("Application {} not found", id)))
        }
        Err(e @ (ReviewError::NoSeatsLeft { .. } | ReviewError::AlreadyDecided { .. })) => Ok(
            flash_redirect("/applications", &[Notice::error(e.to_string())]),
        ),
        Err(ReviewError::Db(e)) => Err(AppError::Database(e)),
    }
}

#[utoipa::path(
    post,
    path = "/applications/{id}/reject",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 303, description = "Redirect with outcome notification"),
        (status = 404, description = "Unknown application id")
    ),
    security(("jwt" = [])),
    tag = "review"
)]
pub async fn reject_applicant(
    State(state): State<crate::AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    tracing::debug!("Reject of {} requested by {}", id, user.username);

    match state.review.reject(&id).await {
        Ok(application_id) => Ok(flash_redirect(
            "/applications",
            &[Notice::success(format!(
                "Application {} rejected.",
                application_id
            ))],
        )),
        Err(ReviewError::NotFound) => {
            Err(AppError::NotFound(format!("Application {} not found", id)))
        }
        Err(e @ (ReviewError::NoSeatsLeft { .. } | ReviewError::AlreadyDecided { .. })) => Ok(
            flash_redirect("/applications", &[Notice::error(e.to_string())]),
        ),
        Err(ReviewError::Db(e)) => Err(AppError::Database(e)),
    }
}

#[utoipa::path(
    post,
    path = "/applications/{id}/pay",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 303, description = "Redirect to the application with outcome notification"),
        (status = 404, description = "Unknown application id")
    ),
    tag = "applications"
)]
pub async fn confirm_payment(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    match state.payments.confirm(&id).await {
        Ok(outcome) => Ok(flash_redirect(
            &format!("/applications/{}", outcome.application_id),
            &[Notice::success(format!(
                "Payment of {} BDT recorded for application {}.",
                outcome.amount,
                short_id(&outcome.application_id)
            ))],
        )),
        Err(PaymentError::NotFound) => {
            Err(AppError::NotFound(format!("Application {} not found", id)))
        }
        Err(e @ PaymentError::AlreadyPaid) => Ok(flash_redirect(
            &format!("/applications/{}", id),
            &[Notice::error(e.to_string())],
        )),
        Err(PaymentError::Db(e)) => Err(AppError::Database(e)),
    }
}
