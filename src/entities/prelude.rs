pub use super::application_files::Entity as ApplicationFiles;
pub use super::applications::Entity as Applications;
pub use super::departments::Entity as Departments;
pub use super::payments::Entity as Payments;
pub use super::teachers::Entity as Teachers;
pub use super::users::Entity as Users;
