pub mod bonus;
pub mod member;
pub mod payroll_settings;
pub mod role;
pub mod sale;
