use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub guardian: String,
    pub address: String,
    pub education: String,
    pub exam_roll: String,
    pub department_id: i32,
    pub program: String,
    pub fee_amount: i32,
    // Workflow state: submitted -> docs_verified -> accepted | rejected
    pub status: String,
    pub applied_at: DateTimeUtc,
    pub paid_at: Option<DateTimeUtc>,
    pub receipt_text: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Departments,
    #[sea_orm(has_many = "super::application_files::Entity")]
    ApplicationFiles,
    #[sea_orm(has_one = "super::payments::Entity")]
    Payments,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departments.def()
    }
}

impl Related<super::application_files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ApplicationFiles.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
