use crate::entities::{departments, prelude::*, users};
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::env;
use tracing::info;
use uuid::Uuid;

/// Demo departments, seeded when SEED_DEMO_DATA is set.
const DEMO_DEPARTMENTS: [(&str, &str, i32, i32, i32); 5] = [
    ("CSE", "Computer Science & Engineering", 140, 500, 50),
    ("EEE", "Electrical & Electronic Engineering", 140, 500, 36),
    ("CIVIL", "Civil Engineering", 135, 450, 30),
    ("ARCH", "Architecture", 160, 550, 16),
    ("BBA", "Business Administration", 120, 400, 40),
];

pub async fn seed_initial_data(db: &DatabaseConnection) -> anyhow::Result<()> {
    seed_staff_account(db).await?;

    let seed_demo = env::var("SEED_DEMO_DATA")
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(false);
    if seed_demo {
        seed_demo_departments(db).await?;
    }

    Ok(())
}

/// Ensures at least one active staff account exists for the review workflow.
async fn seed_staff_account(db: &DatabaseConnection) -> anyhow::Result<()> {
    let staff = Users::find()
        .filter(users::Column::IsStaff.eq(true))
        .one(db)
        .await?;

    if staff.is_some() {
        return Ok(());
    }

    let username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash admin password: {}", e))?
        .to_string();

    users::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        username: Set(username.clone()),
        password_hash: Set(password_hash),
        is_staff: Set(true),
        is_active: Set(true),
        created_at: Set(Some(Utc::now())),
    }
    .insert(db)
    .await?;

    info!("🌱 Seeded staff account '{}'", username);
    Ok(())
}

pub async fn seed_demo_departments(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("🌱 Seeding demo departments...");

    for (code, name, total_credits, per_credit_fee, seats) in DEMO_DEPARTMENTS {
        let exists = Departments::find()
            .filter(departments::Column::Code.eq(code))
            .one(db)
            .await?;

        if exists.is_none() {
            departments::ActiveModel {
                code: Set(code.to_string()),
                name: Set(name.to_string()),
                total_credits: Set(total_credits),
                per_credit_fee: Set(per_credit_fee),
                seats: Set(seats),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}
