use crate::entities::{prelude::*, *};
use crate::models::{ApplicationStatus, DocumentKind, Program};
use crate::services::storage::DocumentStore;
use crate::utils::validation::validate_document;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionError,
    TransactionTrait,
};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill name, email, phone and select department.";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("{0}")]
    Validation(String),

    #[error("Selected department does not exist.")]
    DepartmentNotFound,

    #[error("Database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("Document store error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Applicant-submitted form fields, collected from the multipart request.
/// Text fields arrive pre-trimmed by the handler.
#[derive(Debug, Default, Validate)]
pub struct SubmitApplication {
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub phone: String,
    pub guardian: String,
    pub address: String,
    pub education: String,
    pub exam_roll: String,
    /// Department primary key or code
    #[validate(length(min = 1))]
    pub department: String,
    pub program: Option<String>,
    pub fee_amount: Option<String>,
}

#[derive(Debug)]
pub struct UploadedDocument {
    pub kind: DocumentKind,
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub struct SubmissionOutcome {
    pub application_id: String,
    pub status: ApplicationStatus,
    pub fee_amount: i32,
    pub department_code: String,
}

pub struct IntakeService {
    db: DatabaseConnection,
    documents: Arc<dyn DocumentStore>,
}

impl IntakeService {
    pub fn new(db: DatabaseConnection, documents: Arc<dyn DocumentStore>) -> Self {
        Self { db, documents }
    }

    /// Validates and persists one application with its documents and a
    /// pending payment, in one transaction. Nothing is written when any
    /// validation step fails.
    pub async fn submit(
        &self,
        form: SubmitApplication,
        uploads: Vec<UploadedDocument>,
    ) -> Result<SubmissionOutcome, IntakeError> {
        form.validate()
            .map_err(|_| IntakeError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()))?;

        let program = match form
            .program
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            None => Program::Bachelors,
            Some(p) => p.parse::<Program>().map_err(|_| {
                IntakeError::Validation(format!("Unknown program '{}'.", p))
            })?,
        };

        let department = self
            .resolve_department(form.department.trim())
            .await?
            .ok_or(IntakeError::DepartmentNotFound)?;

        // A caller-supplied fee wins when it parses; anything else falls back
        // to the department's per-credit fee.
        let fee_amount = form
            .fee_amount
            .as_deref()
            .and_then(|v| v.trim().parse::<i32>().ok())
            .filter(|v| *v >= 0)
            .unwrap_or(department.per_credit_fee);

        // One bad upload rejects the whole submission, before any writes.
        let mut documents = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let filename = validate_document(&upload.filename, &upload.data)
                .map_err(|e| IntakeError::Validation(e.to_string()))?;
            documents.push(UploadedDocument { filename, ..upload });
        }

        let application_id = Uuid::new_v4().to_string();
        let id_for_txn = application_id.clone();
        let store = self.documents.clone();
        let department_id = department.id;
        let program_tag = program.as_str().to_string();
        let applied_at = Utc::now();

        let status = self
            .db
            .transaction::<_, ApplicationStatus, IntakeError>(move |txn| {
                Box::pin(async move {
                    let inserted = applications::ActiveModel {
                        id: Set(id_for_txn.clone()),
                        full_name: Set(form.full_name),
                        email: Set(form.email),
                        phone: Set(form.phone),
                        guardian: Set(form.guardian),
                        address: Set(form.address),
                        education: Set(form.education),
                        exam_roll: Set(form.exam_roll),
                        department_id: Set(department_id),
                        program: Set(program_tag),
                        fee_amount: Set(fee_amount),
                        status: Set(ApplicationStatus::Submitted.as_str().to_string()),
                        applied_at: Set(applied_at),
                        paid_at: Set(None),
                        receipt_text: Set(String::new()),
                    }
                    .insert(txn)
                    .await?;

                    let mut saved_any_file = false;
                    for doc in &documents {
                        let key = store
                            .store(&id_for_txn, &doc.filename, &doc.data)
                            .await?;

                        application_files::ActiveModel {
                            id: Set(Uuid::new_v4().to_string()),
                            application_id: Set(id_for_txn.clone()),
                            kind: Set(doc.kind.as_str().to_string()),
                            file_path: Set(key),
                            uploaded_at: Set(Utc::now()),
                        }
                        .insert(txn)
                        .await?;
                        saved_any_file = true;
                    }

                    payments::ActiveModel {
                        id: Set(Uuid::new_v4().to_string()),
                        application_id: Set(id_for_txn.clone()),
                        amount: Set(fee_amount),
                        method: Set("mock".to_string()),
                        status: Set("pending".to_string()),
                        paid_at: Set(None),
                        receipt_data: Set(String::new()),
                    }
                    .insert(txn)
                    .await?;

                    // Documents on file mean the submission is verifiable.
                    let mut status = ApplicationStatus::Submitted;
                    if saved_any_file {
                        let mut active: applications::ActiveModel = inserted.into();
                        active.status =
                            Set(ApplicationStatus::DocsVerified.as_str().to_string());
                        active.update(txn).await?;
                        status = ApplicationStatus::DocsVerified;
                    }

                    Ok(status)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(err) => IntakeError::Db(err),
                TransactionError::Transaction(err) => err,
            })?;

        tracing::info!(
            "📝 Application {} submitted to {} ({})",
            &application_id[..10.min(application_id.len())],
            department.code,
            status
        );

        Ok(SubmissionOutcome {
            application_id,
            status,
            fee_amount,
            department_code: department.code,
        })
    }

    /// Department lookup: numeric values are tried as primary keys first,
    /// anything else (or a pk miss) falls back to a case-insensitive code
    /// match.
    async fn resolve_department(
        &self,
        ident: &str,
    ) -> Result<Option<departments::Model>, sea_orm::DbErr> {
        if let Ok(pk) = ident.parse::<i32>() {
            if let Some(dept) = Departments::find_by_id(pk).one(&self.db).await? {
                return Ok(Some(dept));
            }
        }

        Departments::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(departments::Column::Code)))
                    .eq(ident.to_lowercase()),
            )
            .one(&self.db)
            .await
    }
}
