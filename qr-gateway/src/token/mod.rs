//! 令牌模块
//!
//! - [`codec`]: QR 令牌与访客访问令牌的签发/验证 (HS256 签名，不加密)
//! - [`version`]: 餐厅 QR 版本注册表，轮换即作废已印刷的旧码

pub mod codec;
pub mod version;

pub use codec::{TokenConfig, TokenError, TokenService};
pub use version::QrVersionRegistry;
