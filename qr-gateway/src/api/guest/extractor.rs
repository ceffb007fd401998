//! Guest Token Extractor
//!
//! Custom extractor for automatically validating guest access tokens

use axum::{extract::FromRequestParts, http::request::Parts};

use shared::models::GuestAccessTokenPayload;

use crate::core::ServerState;
use crate::token::{TokenError, TokenService};
use crate::utils::AppError;

/// 访客认证上下文
///
/// 在受保护的访客处理函数中使用此 extractor，
/// 自动验证访问令牌并得到其中的会话作用域。
#[derive(Debug, Clone)]
pub struct GuestAuth(pub GuestAccessTokenPayload);

impl FromRequestParts<ServerState> for GuestAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => TokenService::extract_from_header(header)
                .ok_or(AppError::InvalidToken)?,
            None => {
                tracing::warn!(uri = %parts.uri, "Guest request without access token");
                return Err(AppError::Unauthorized);
            }
        };

        match state.tokens.verify_guest_access_token(token) {
            Ok(payload) => Ok(GuestAuth(payload)),
            Err(e) => {
                tracing::warn!(uri = %parts.uri, error = %e, "Guest token rejected");
                match e {
                    TokenError::Expired => Err(AppError::TokenExpired),
                    _ => Err(AppError::InvalidToken),
                }
            }
        }
    }
}
