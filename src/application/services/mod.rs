//! Application services

pub mod document;
pub mod editing;

pub use document::DocumentService;
pub use editing::EditingService;
