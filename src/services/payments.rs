use crate::entities::{prelude::*, *};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionError, TransactionTrait,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Application not found")]
    NotFound,

    #[error("Payment already recorded.")]
    AlreadyPaid,

    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

#[derive(Debug)]
pub struct PaymentOutcome {
    pub application_id: String,
    pub amount: i32,
    pub receipt: String,
}

/// Mock payment confirmation: flips the pending payment created at intake to
/// paid and writes the receipt onto both rows.
pub struct PaymentService {
    db: DatabaseConnection,
}

impl PaymentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn confirm(&self, application_id: &str) -> Result<PaymentOutcome, PaymentError> {
        let id = application_id.to_string();

        let outcome = self
            .db
            .transaction::<_, PaymentOutcome, PaymentError>(move |txn| {
                Box::pin(async move {
                    let app = Applications::find_by_id(&id)
                        .lock_exclusive()
                        .one(txn)
                        .await?
                        .ok_or(PaymentError::NotFound)?;

                    let payment = Payments::find()
                        .filter(payments::Column::ApplicationId.eq(&id))
                        .lock_exclusive()
                        .one(txn)
                        .await?
                        .ok_or(PaymentError::NotFound)?;

                    if payment.status == "paid" {
                        return Err(PaymentError::AlreadyPaid);
                    }

                    let dept_code = Departments::find_by_id(app.department_id)
                        .one(txn)
                        .await?
                        .map(|d| d.code)
                        .unwrap_or_default();

                    let paid_at = Utc::now();
                    let receipt = format!(
                        "UAP RECEIPT\nAppID: {}\nName: {}\nProgram: {}\nDept: {}\nAmount: {} BDT\nPaidAt: {}",
                        app.id,
                        app.full_name,
                        app.program,
                        dept_code,
                        payment.amount,
                        paid_at.to_rfc3339()
                    );

                    let amount = payment.amount;
                    let application_id = app.id.clone();

                    let mut pay_active: payments::ActiveModel = payment.into();
                    pay_active.status = Set("paid".to_string());
                    pay_active.paid_at = Set(Some(paid_at));
                    pay_active.receipt_data = Set(receipt.clone());
                    pay_active.update(txn).await?;

                    let mut app_active: applications::ActiveModel = app.into();
                    app_active.paid_at = Set(Some(paid_at));
                    app_active.receipt_text = Set(receipt.clone());
                    app_active.update(txn).await?;

                    Ok(PaymentOutcome {
                        application_id,
                        amount,
                        receipt,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(err) => PaymentError::Db(err),
                TransactionError::Transaction(err) => err,
            })?;

        tracing::info!(
            "💳 Payment of {} recorded for application {}",
            outcome.amount,
            outcome.application_id
        );

        Ok(outcome)
    }
}
