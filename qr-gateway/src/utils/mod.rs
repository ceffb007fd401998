//! 工具模块

pub mod error;
pub mod logger;

pub use error::{AppError, AppResponse, AppResult};
