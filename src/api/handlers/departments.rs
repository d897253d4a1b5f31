use crate::api::error::AppError;
use crate::entities::{departments, prelude::*, teachers};
use axum::{Json, extract::State};
use sea_orm::{EntityTrait, QueryOrder};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct DepartmentResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub total_credits: i32,
    pub per_credit_fee: i32,
    pub seats: i32,
}

#[derive(Serialize, ToSchema)]
pub struct TeacherResponse {
    pub id: i32,
    pub name: String,
    pub position: String,
    pub degrees: String,
    pub email: String,
    pub phone: String,
    pub department_id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/departments",
    responses(
        (status = 200, description = "All departments ordered by code", body = [DepartmentResponse])
    ),
    tag = "departments"
)]
pub async fn list_departments(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<DepartmentResponse>>, AppError> {
    let departments = Departments::find()
        .order_by_asc(departments::Column::Code)
        .all(&state.db)
        .await?;

    Ok(Json(
        departments
            .into_iter()
            .map(|d| DepartmentResponse {
                id: d.id,
                code: d.code,
                name: d.name,
                total_credits: d.total_credits,
                per_credit_fee: d.per_credit_fee,
                seats: d.seats,
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/teachers",
    responses(
        (status = 200, description = "Teacher directory", body = [TeacherResponse])
    ),
    tag = "departments"
)]
pub async fn list_teachers(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<TeacherResponse>>, AppError> {
    let teachers = Teachers::find()
        .order_by_asc(teachers::Column::DepartmentId)
        .order_by_asc(teachers::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(
        teachers
            .into_iter()
            .map(|t| TeacherResponse {
                id: t.id,
                name: t.name,
                position: t.position,
                degrees: t.degrees,
                email: t.email,
                phone: t.phone,
                department_id: t.department_id,
            })
            .collect(),
    ))
}
