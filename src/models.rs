pub mod code;
pub mod lifecycle;
pub mod package;
pub mod project;
pub mod store;
