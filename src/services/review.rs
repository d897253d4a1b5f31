use crate::entities::{prelude::*, *};
use crate::models::ApplicationStatus;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QuerySelect, Set, TransactionError,
    TransactionTrait,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Application not found")]
    NotFound,

    #[error("No seats left in {code}.")]
    NoSeatsLeft { code: String },

    #[error("Application already {status}.")]
    AlreadyDecided { status: String },

    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

#[derive(Debug)]
pub struct AcceptOutcome {
    pub application_id: String,
    pub department_code: String,
    pub seats_left: i32,
}

pub struct ReviewService {
    db: DatabaseConnection,
}

impl ReviewService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Accepts an application and decrements its department's seat count.
    ///
    /// Runs as one transaction with exclusive row locks so concurrent
    /// accepts against the same department cannot lose updates. Only an
    /// undecided application (submitted/docs_verified) can be accepted, so
    /// re-invoking accept never decrements twice.
    pub async fn accept(&self, application_id: &str) -> Result<AcceptOutcome, ReviewError> {
        let id = application_id.to_string();

        let outcome = self
            .db
            .transaction::<_, AcceptOutcome, ReviewError>(move |txn| {
                Box::pin(async move {
                    let app = Applications::find_by_id(&id)
                        .lock_exclusive()
                        .one(txn)
                        .await?
                        .ok_or(ReviewError::NotFound)?;

                    let undecided = ApplicationStatus::parse(&app.status)
                        .map(|s| s.accept_allowed())
                        .unwrap_or(false);
                    if !undecided {
                        return Err(ReviewError::AlreadyDecided {
                            status: app.status.clone(),
                        });
                    }

                    let dept = Departments::find_by_id(app.department_id)
                        .lock_exclusive()
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ReviewError::Db(DbErr::RecordNotFound(format!(
                                "department {}",
                                app.department_id
                            )))
                        })?;

                    if dept.seats <= 0 {
                        return Err(ReviewError::NoSeatsLeft {
                            code: dept.code.clone(),
                        });
                    }

                    let seats_left = dept.seats - 1;
                    let application_id = app.id.clone();
                    let department_code = dept.code.clone();

                    let mut app_active: applications::ActiveModel = app.into();
                    app_active.status =
                        Set(ApplicationStatus::Accepted.as_str().to_string());
                    app_active.update(txn).await?;

                    let mut dept_active: departments::ActiveModel = dept.into();
                    dept_active.seats = Set(seats_left);
                    dept_active.update(txn).await?;

                    Ok(AcceptOutcome {
                        application_id,
                        department_code,
                        seats_left,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(err) => ReviewError::Db(err),
                TransactionError::Transaction(err) => err,
            })?;

        tracing::info!(
            "✅ Application {} accepted; {} seats left in {}",
            outcome.application_id,
            outcome.seats_left,
            outcome.department_code
        );

        Ok(outcome)
    }

    /// Rejects an application. No seat effect; safe to re-invoke.
    pub async fn reject(&self, application_id: &str) -> Result<String, ReviewError> {
        let app = Applications::find_by_id(application_id)
            .one(&self.db)
            .await?
            .ok_or(ReviewError::NotFound)?;

        let id = app.id.clone();
        let mut active: applications::ActiveModel = app.into();
        active.status = Set(ApplicationStatus::Rejected.as_str().to_string());
        active.update(&self.db).await?;

        tracing::info!("🚫 Application {} rejected", id);

        Ok(id)
    }
}
