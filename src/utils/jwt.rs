//! 访问令牌与刷新令牌
//!
//! access token 放在 `Authorization: Bearer` 中，refresh token 只通过 http-only cookie
//! 下发。两类令牌共用密钥，靠 `token_type` 区分，互相不能冒用。

use crate::config::AppConfig;
use crate::models::users::entities::User;
use actix_web::HttpRequest;
use actix_web::cookie::{Cookie, SameSite, time};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error, ErrorKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // 用户 ID
    pub role: String,
    pub token_type: TokenType,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }

    /// 距离过期的剩余秒数（已过期为 0）
    pub fn remaining_secs(&self) -> u64 {
        (self.exp as i64 - Utc::now().timestamp()).max(0) as u64
    }
}

/// 登录时签发的一对令牌；`refresh_ttl` 同时决定 cookie 的有效期
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_ttl: Duration,
}

pub struct JwtUtils;

impl JwtUtils {
    fn secret() -> &'static [u8] {
        AppConfig::get().jwt.secret.as_bytes()
    }

    fn issue(user_id: i64, role: &str, token_type: TokenType, ttl: Duration) -> Result<String, Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            token_type,
            exp: (now + ttl).timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(Self::secret()))
    }

    /// 校验签名、过期时间与令牌类型
    fn verify(token: &str, expected: TokenType) -> Result<Claims, Error> {
        let claims = decode::<Claims>(token, &DecodingKey::from_secret(Self::secret()), &Validation::default())?.claims;
        if claims.token_type != expected {
            return Err(ErrorKind::InvalidToken.into());
        }
        Ok(claims)
    }

    pub fn generate_access_token(user_id: i64, role: &str) -> Result<String, Error> {
        let ttl = Duration::minutes(AppConfig::get().jwt.access_token_expiry);
        Self::issue(user_id, role, TokenType::Access, ttl)
    }

    /// 勾选“记住我”时 refresh token 使用更长的有效期
    pub fn generate_token_pair(user: &User, remember_me: bool) -> Result<TokenPair, Error> {
        let jwt = &AppConfig::get().jwt;
        let refresh_ttl = Duration::days(if remember_me {
            jwt.refresh_token_remember_me_expiry
        } else {
            jwt.refresh_token_expiry
        });
        let role = user.role.as_str();

        Ok(TokenPair {
            access_token: Self::generate_access_token(user.id, role)?,
            refresh_token: Self::issue(user.id, role, TokenType::Refresh, refresh_ttl)?,
            refresh_ttl,
        })
    }

    pub fn verify_access_token(token: &str) -> Result<Claims, Error> {
        Self::verify(token, TokenType::Access)
    }

    /// 用 refresh token 换取新的 access token，角色沿用原令牌
    pub fn refresh_access_token(refresh_token: &str) -> Result<String, Error> {
        let claims = Self::verify(refresh_token, TokenType::Refresh)?;
        let user_id = claims.user_id().ok_or(ErrorKind::InvalidToken)?;
        Self::generate_access_token(user_id, &claims.role)
    }

    fn cookie(value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build(REFRESH_COOKIE, value)
            .path("/")
            .max_age(max_age)
            .same_site(SameSite::Strict)
            .http_only(true)
            .secure(AppConfig::get().is_production())
            .finish()
    }

    pub fn create_refresh_token_cookie(pair: &TokenPair) -> Cookie<'static> {
        Self::cookie(
            pair.refresh_token.clone(),
            time::Duration::seconds(pair.refresh_ttl.num_seconds()),
        )
    }

    /// max_age 为 0，浏览器收到后删除 cookie
    pub fn create_empty_refresh_token_cookie() -> Cookie<'static> {
        Self::cookie(String::new(), time::Duration::ZERO)
    }

    pub fn extract_refresh_token_from_cookie(req: &HttpRequest) -> Option<String> {
        req.cookie(REFRESH_COOKIE).map(|cookie| cookie.value().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{UserRole, UserStatus};

    fn user(role: UserRole) -> User {
        User {
            id: 3,
            username: "teacher_a".to_string(),
            email: "a@school.test".to_string(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_carries_user_and_role() {
        let token = JwtUtils::generate_access_token(7, "teacher").unwrap();
        let claims = JwtUtils::verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.role, "teacher");
        assert!(claims.remaining_secs() > 0);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let pair = JwtUtils::generate_token_pair(&user(UserRole::Admin), false).unwrap();
        assert!(JwtUtils::refresh_access_token(&pair.access_token).is_err());
        assert!(JwtUtils::verify_access_token(&pair.refresh_token).is_err());

        let refreshed = JwtUtils::refresh_access_token(&pair.refresh_token).unwrap();
        let claims = JwtUtils::verify_access_token(&refreshed).unwrap();
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_remember_me_extends_refresh_cookie() {
        let jwt = &AppConfig::get().jwt;
        let short = JwtUtils::generate_token_pair(&user(UserRole::Teacher), false).unwrap();
        let long = JwtUtils::generate_token_pair(&user(UserRole::Teacher), true).unwrap();
        assert_eq!(short.refresh_ttl, Duration::days(jwt.refresh_token_expiry));
        assert_eq!(long.refresh_ttl, Duration::days(jwt.refresh_token_remember_me_expiry));

        let cookie = JwtUtils::create_refresh_token_cookie(&long);
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::days(jwt.refresh_token_remember_me_expiry))
        );
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_expired_or_tampered_token_is_rejected() {
        let expired = JwtUtils::issue(1, "teacher", TokenType::Access, Duration::minutes(-10)).unwrap();
        assert!(JwtUtils::verify_access_token(&expired).is_err());

        let mut tampered = JwtUtils::generate_access_token(1, "teacher").unwrap();
        tampered.push('x');
        assert!(JwtUtils::verify_access_token(&tampered).is_err());
    }
}
