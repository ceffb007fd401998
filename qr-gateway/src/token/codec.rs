//! 令牌编解码服务
//!
//! 处理两类签名令牌的生成、验证和解析：
//!
//! - QR 令牌: 印在桌台码里，无自身过期，验证时与餐厅当前
//!   qr_version 比对 — 版本不符返回 [`TokenError::VersionMismatch`]
//!   而非笼统的无效令牌，让运营方能区分"该换印码了"和"令牌被篡改"
//! - 访客访问令牌: 会话创建后签发，作用域为单个会话
//!
//! 验证是纯 CPU 操作，无任何 I/O；签名密钥通过 [`TokenConfig`]
//! 在启动时显式注入，编解码器内部不读取环境变量。

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::models::token_payload::{TOKEN_TYPE_GUEST, TOKEN_TYPE_QR};
use shared::models::{GuestAccessTokenPayload, QrTokenPayload};

/// 令牌配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// 签名密钥 (应至少 32 字节)
    pub secret: String,
}

impl TokenConfig {
    /// 从环境变量加载
    ///
    /// 生产环境必须设置 `TOKEN_SECRET`；开发环境缺省时生成临时密钥。
    pub fn from_env() -> Self {
        let secret = match std::env::var("TOKEN_SECRET") {
            Ok(secret) if secret.len() >= 32 => secret,
            Ok(_) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!("TOKEN_SECRET shorter than 32 bytes, generating temporary key");
                    generate_secure_printable_secret()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("TOKEN_SECRET must be at least 32 characters long in production");
                }
            }
            Err(_) => {
                #[cfg(debug_assertions)]
                {
                    tracing::warn!(
                        "TOKEN_SECRET not set! Generating secure temporary key for development."
                    );
                    generate_secure_printable_secret()
                }
                #[cfg(not(debug_assertions))]
                {
                    panic!("TOKEN_SECRET environment variable must be set in production!");
                }
            }
        };
        Self { secret }
    }
}

/// 令牌错误
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌已过期")]
    Expired,

    #[error("QR 版本不匹配: 令牌版本 {embedded}, 当前版本 {current}")]
    VersionMismatch { embedded: u64, current: u64 },

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// 生成可打印的安全密钥 (用于开发环境)
pub fn generate_secure_printable_secret() -> String {
    let allowed_chars =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";

    let rng = SystemRandom::new();
    let mut key = String::new();

    for _ in 0..64 {
        let mut byte = [0u8; 1];
        if rng.fill(&mut byte).is_err() {
            return "QrGatewayDevelopmentSecureKey2025!ReplaceInProduction".to_string();
        }
        let idx = (byte[0] as usize) % allowed_chars.len();
        key.push(allowed_chars.as_bytes()[idx] as char);
    }

    key
}

/// 令牌编解码服务
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    /// 使用指定配置创建令牌服务
    pub fn with_config(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 当前配置
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    // 两类令牌都不携带 exp；QR 令牌靠版本号作废，
    // 访客令牌的有效期完全跟随会话
    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);
        validation
    }

    /// 签发 QR 令牌 (印码用)
    pub fn issue_qr_token(
        &self,
        restaurant_id: &str,
        table_id: &str,
        qr_version: u64,
    ) -> Result<String, TokenError> {
        let payload = QrTokenPayload {
            restaurant_id: restaurant_id.to_string(),
            table_id: table_id.to_string(),
            qr_version,
            iat: Utc::now().timestamp(),
            token_type: TOKEN_TYPE_QR.to_string(),
        };

        encode(&Header::default(), &payload, &self.encoding_key)
            .map_err(|e| TokenError::GenerationFailed(e.to_string()))
    }

    /// 验证 QR 令牌
    ///
    /// 依次检查签名完整性、载荷形状、类型标签，
    /// 最后将内嵌 qr_version 与餐厅当前版本比对。
    /// 当前版本由调用方提供查询函数 (版本注册表是外部协作者)。
    pub fn verify_qr_token(
        &self,
        token: &str,
        current_version_of: impl Fn(&str) -> u64,
    ) -> Result<QrTokenPayload, TokenError> {
        let data = decode::<QrTokenPayload>(token, &self.decoding_key, &Self::validation())
            .map_err(map_jwt_error)?;
        let payload = data.claims;

        if payload.token_type != TOKEN_TYPE_QR {
            return Err(TokenError::InvalidToken(format!(
                "unexpected token type '{}'",
                payload.token_type
            )));
        }

        let current = current_version_of(&payload.restaurant_id);
        if payload.qr_version != current {
            return Err(TokenError::VersionMismatch {
                embedded: payload.qr_version,
                current,
            });
        }

        Ok(payload)
    }

    /// 签发访客访问令牌 (会话创建后)
    pub fn issue_guest_access_token(
        &self,
        session_id: &str,
        restaurant_id: &str,
        table_id: &str,
    ) -> Result<String, TokenError> {
        let payload = GuestAccessTokenPayload {
            session_id: session_id.to_string(),
            restaurant_id: restaurant_id.to_string(),
            table_id: table_id.to_string(),
            iat: Utc::now().timestamp(),
            token_type: TOKEN_TYPE_GUEST.to_string(),
        };

        encode(&Header::default(), &payload, &self.encoding_key)
            .map_err(|e| TokenError::GenerationFailed(e.to_string()))
    }

    /// 验证访客访问令牌
    pub fn verify_guest_access_token(
        &self,
        token: &str,
    ) -> Result<GuestAccessTokenPayload, TokenError> {
        let data =
            decode::<GuestAccessTokenPayload>(token, &self.decoding_key, &Self::validation())
                .map_err(map_jwt_error)?;
        let payload = data.claims;

        if payload.token_type != TOKEN_TYPE_GUEST {
            return Err(TokenError::InvalidToken(format!(
                "unexpected token type '{}'",
                payload.token_type
            )));
        }

        Ok(payload)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidToken => TokenError::InvalidToken(e.to_string()),
        _ => TokenError::InvalidToken(format!("Token validation failed: {}", e)),
    }
}
