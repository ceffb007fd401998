//! 访客请求模块

pub mod handler;

pub use handler::GuestRequestService;
