pub mod rbac;
pub mod task;
pub mod user;
