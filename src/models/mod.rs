pub mod classify_types;
pub mod image_types;
pub mod report_types;
pub mod session_types;
