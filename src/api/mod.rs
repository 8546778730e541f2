pub mod bonus;
pub mod member;
pub mod payroll;
pub mod sale;
