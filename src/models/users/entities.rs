use serde::{Deserialize, Serialize};

/// 以小写字符串存储和传输的枚举：生成 `as_str`、`Display`、`FromStr` 与 serde 实现
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!(
                        concat!("Invalid ", $label, ": '{}'. Expected one of: ", $($text, " "),+),
                        s
                    )),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_enum!(
    /// 账号角色；管理员同时拥有教师权限
    UserRole, "user role" {
        Teacher => "teacher",
        Admin => "admin",
    }
);

string_enum!(
    /// 只有 active 账号能通过认证
    UserStatus, "user status" {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
);

impl UserRole {
    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::Admin]
    }

    pub fn teacher_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher, &Self::Admin]
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub display_name: Option<String>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// 展示名，未设置时回退为用户名
    pub fn name_for_greeting(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_from_str() {
        assert_eq!("teacher".parse::<UserRole>(), Ok(UserRole::Teacher));
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert!("student".parse::<UserRole>().is_err());
        assert_eq!(UserRole::Teacher.to_string(), "teacher");
    }

    #[test]
    fn test_role_deserialize_rejects_unknown() {
        let err = serde_json::from_str::<UserRole>("\"root\"").unwrap_err();
        assert!(err.to_string().contains("Invalid user role: 'root'"));
    }

    #[test]
    fn test_status_serializes_as_lowercase() {
        assert_eq!(serde_json::to_string(&UserStatus::Suspended).unwrap(), "\"suspended\"");
        assert_eq!("inactive".parse::<UserStatus>(), Ok(UserStatus::Inactive));
    }
}
