//! Store Module
//!
//! 持久化端口 (port) 及其进程内实现。
//!
//! 网关核心不直接拥有数据库：会话与请求通过 [`SessionStore`] /
//! [`RequestStore`] 两个异步 trait 落盘，宿主服务注入实现。
//! 本 crate 自带基于 DashMap 的进程内实现，作用域跟随宿主进程，
//! 不使用任何静态/全局变量。

pub mod request;
pub mod session;

// Re-exports
pub use request::{MemoryRequestStore, RequestStore};
pub use session::{MemorySessionStore, SessionStore};

use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
