use serde::{Deserialize, Serialize};

use crate::models::ErrorCode;

/// JSON 接口的统一包裹：`{code, message, data?, timestamp}`，`code` 取自 [`ErrorCode`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T> {
    fn build(code: ErrorCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::build(ErrorCode::Success, Some(data), message)
    }

    /// 失败时附带数据，例如逐条的校验错误
    pub fn error(code: ErrorCode, data: T, message: impl Into<String>) -> Self {
        Self::build(code, Some(data), message)
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self::build(ErrorCode::Success, None, message)
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::build(code, None, message)
    }
}

/// 表单提交结果：`{success, errors?, message?, data?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> FormResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            errors: None,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl FormResponse<()> {
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            data: None,
            ..FormResponse::ok((), message)
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors: Some(errors),
            message: None,
            data: None,
        }
    }

    pub fn failed_one(error: impl Into<String>) -> Self {
        Self::failed(vec![error.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_failure_shape() {
        let json = serde_json::to_value(FormResponse::failed_one("Bad marks")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0], "Bad marks");
        assert!(json.get("data").is_none());
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_api_error_carries_code_without_data() {
        let json = serde_json::to_value(ApiResponse::error_empty(ErrorCode::NotFound, "gone")).unwrap();
        assert_eq!(json["code"], ErrorCode::NotFound as i32);
        assert_eq!(json["message"], "gone");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_form_success_omits_errors() {
        let json = serde_json::to_value(FormResponse::ok_empty("done")).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("errors").is_none());
    }
}
