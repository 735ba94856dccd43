pub mod packages;
pub mod projects;
