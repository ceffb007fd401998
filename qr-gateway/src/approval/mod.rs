//! 审批模块

pub mod coordinator;

pub use coordinator::ApprovalCoordinator;
