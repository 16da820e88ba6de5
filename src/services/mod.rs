pub mod export_service;
pub mod library_service;

pub use export_service::*;
pub use library_service::*;
