pub mod auth;

pub mod student_records;

pub mod users;

pub use auth::configure_auth_routes;
pub use student_records::configure_student_record_routes;
pub use users::configure_user_routes;
