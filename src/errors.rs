//! 存储层与服务层共用的错误类型

use std::fmt;

/// 每个变体携带一条详情，并绑定错误代码与类别名称；
/// 同时为每个变体生成 snake_case 构造函数，例如 `PortalError::not_found(..)`
macro_rules! portal_errors {
    ($($variant:ident => $code:literal, $label:literal;)*) => {
        #[derive(Debug, Clone)]
        pub enum PortalError {
            $($variant(String),)*
        }

        impl PortalError {
            pub fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $code,)*
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => $label,)*
                }
            }

            pub fn message(&self) -> &str {
                match self {
                    $(Self::$variant(detail) => detail,)*
                }
            }
        }

        paste::paste! {
            impl PortalError {
                $(
                    pub fn [<$variant:snake>](detail: impl Into<String>) -> Self {
                        Self::$variant(detail.into())
                    }
                )*
            }
        }
    };
}

portal_errors! {
    DatabaseConfig => "E001", "Database Configuration Error";
    DatabaseConnection => "E002", "Database Connection Error";
    DatabaseOperation => "E003", "Database Operation Error";
    Validation => "E004", "Validation Error";
    NotFound => "E005", "Resource Not Found";
    IntegrityConflict => "E006", "Integrity Conflict";
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.message())
    }
}

impl std::error::Error for PortalError {}

/// 唯一约束冲突单独归类，其余数据库错误一律视为操作失败
impl From<sea_orm::DbErr> for PortalError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => Self::IntegrityConflict(detail),
            _ => Self::DatabaseOperation(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_bind_code_and_label() {
        let err = PortalError::not_found("Student record 7");
        assert_eq!(err.code(), "E005");
        assert_eq!(err.label(), "Resource Not Found");
        assert_eq!(err.message(), "Student record 7");
        assert_eq!(err.to_string(), "Resource Not Found: Student record 7");

        assert_eq!(PortalError::validation("x").code(), "E004");
        assert_eq!(PortalError::integrity_conflict("x").code(), "E006");
    }

    #[test]
    fn test_plain_db_error_is_operation_error() {
        let err: PortalError = sea_orm::DbErr::Custom("boom".into()).into();
        assert_eq!(err.code(), "E003");
        assert!(err.message().contains("boom"));
    }
}
