//! 安全的路径参数提取器
//!
//! 非法 ID 统一返回 404 JSON，而不是 actix 默认的纯文本 400。

use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError,
    http::StatusCode,
};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

/// 路径中的 `{id}`，必须为正整数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeIDI64(pub i64);

impl SafeIDI64 {
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<i64>().ok().filter(|id| *id > 0).map(SafeIDI64)
    }
}

impl FromRequest for SafeIDI64 {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let raw = req.match_info().get("id").unwrap_or_default();
        ready(SafeIDI64::parse(raw).ok_or_else(|| {
            let response = HttpResponse::build(StatusCode::NOT_FOUND).json(
                ApiResponse::error_empty(ErrorCode::NotFound, format!("Invalid id: {raw}")),
            );
            InternalError::from_response("invalid path id", response).into()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_only_positive_integers() {
        assert_eq!(SafeIDI64::parse("42"), Some(SafeIDI64(42)));
        assert_eq!(SafeIDI64::parse("0"), None);
        assert_eq!(SafeIDI64::parse("-7"), None);
        assert_eq!(SafeIDI64::parse("abc"), None);
        assert_eq!(SafeIDI64::parse(""), None);
    }
}
