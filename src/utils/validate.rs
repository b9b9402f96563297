use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::student_records::entities::{MAX_MARKS, MIN_MARKS, round_marks};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid username regex"));

static STUDENT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("Invalid student name regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").expect("Invalid email regex")
});

/// 学生姓名与科目的最大长度
pub const MAX_FIELD_LENGTH: usize = 100;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// 每个字母段首字母大写，其余小写
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_alpha = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_alpha {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_alpha = true;
        } else {
            result.push(c);
            previous_is_alpha = false;
        }
    }
    result
}

fn check_length(value: String) -> Result<String, String> {
    let length = value.chars().count();
    if length > MAX_FIELD_LENGTH {
        return Err(format!(
            "Ensure this value has at most {MAX_FIELD_LENGTH} characters (it has {length})."
        ));
    }
    Ok(value)
}

/// 校验并规范化学生姓名：仅字母和空格，去除首尾空白后首字母大写
pub fn normalize_student_name(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() {
        return Err(REQUIRED_MESSAGE.to_string());
    }
    if !STUDENT_NAME_RE.is_match(raw) {
        return Err("Name should only contain letters and spaces.".to_string());
    }
    check_length(title_case(raw.trim()))
}

/// 规范化科目名：去除首尾空白后首字母大写
pub fn normalize_subject(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(REQUIRED_MESSAGE.to_string());
    }
    check_length(title_case(trimmed))
}

/// 校验分数：有限值，范围 [0, 100]，至多两位小数
pub fn validate_marks(marks: f64) -> Result<f64, String> {
    if !marks.is_finite() {
        return Err("Enter a number.".to_string());
    }
    if !(MIN_MARKS..=MAX_MARKS).contains(&marks) {
        return Err("Marks should be between 0 and 100.".to_string());
    }
    let scaled = marks * 100.0;
    if (scaled - scaled.round()).abs() > 1e-6 {
        return Err("Ensure that there are no more than 2 decimal places.".to_string());
    }
    Ok(round_marks(marks))
}

/// 常见弱口令，比较时忽略大小写
const COMMON_PASSWORDS: &[&str] = &["password1", "qwerty123", "admin1234", "abcd1234", "teacher1", "welcome1"];

/// 教师账号字段校验，返回全部错误
pub fn account_errors(username: &str, email: &str, password: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();

    if !(5..=16).contains(&username.chars().count()) {
        errors.push("Username length must be between 5 and 16 characters");
    } else if !USERNAME_RE.is_match(username) {
        errors.push("Username must contain only letters, numbers, underscores or hyphens");
    }
    if !EMAIL_RE.is_match(email) {
        errors.push("Email format is invalid");
    }

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    let has = |class: fn(&char) -> bool| password.chars().any(|c| class(&c));
    if !(has(char::is_ascii_uppercase) && has(char::is_ascii_lowercase) && has(char::is_ascii_digit)) {
        errors.push("Password must mix upper case letters, lower case letters and digits");
    }
    if COMMON_PASSWORDS.iter().any(|weak| password.eq_ignore_ascii_case(weak)) {
        errors.push("Password is too common, please choose a stronger password");
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("john smith"), "John Smith");
        assert_eq!(title_case("  mARY  ann"), "  Mary  Ann");
        assert_eq!(title_case("3d art"), "3D Art");
        assert_eq!(title_case("physics-ii"), "Physics-Ii");
    }

    #[test]
    fn test_student_name_normalization() {
        assert_eq!(normalize_student_name(" john ").unwrap(), "John");
        assert_eq!(normalize_student_name("ADA lovelace").unwrap(), "Ada Lovelace");
    }

    #[test]
    fn test_student_name_rejects_digits_and_symbols() {
        assert_eq!(
            normalize_student_name("John123").unwrap_err(),
            "Name should only contain letters and spaces."
        );
        assert!(normalize_student_name("O'Brien").is_err());
        assert_eq!(normalize_student_name("   ").unwrap_err(), REQUIRED_MESSAGE);
    }

    #[test]
    fn test_field_length_limit() {
        let long_name = "a".repeat(101);
        let err = normalize_student_name(&long_name).unwrap_err();
        assert!(err.contains("at most 100 characters"));
        assert!(normalize_subject(&"b".repeat(100)).is_ok());
    }

    #[test]
    fn test_subject_normalization() {
        assert_eq!(normalize_subject("  physics ").unwrap(), "Physics");
        assert_eq!(normalize_subject("").unwrap_err(), REQUIRED_MESSAGE);
    }

    #[test]
    fn test_marks_range() {
        assert_eq!(validate_marks(0.0), Ok(0.0));
        assert_eq!(validate_marks(100.0), Ok(100.0));
        assert_eq!(validate_marks(72.5), Ok(72.5));
        assert!(validate_marks(-0.01).is_err());
        assert!(validate_marks(100.01).is_err());
        assert!(validate_marks(f64::NAN).is_err());
        assert!(validate_marks(12.345).is_err());
    }

    #[test]
    fn test_account_errors_are_collected() {
        assert!(account_errors("teacher_a", "a@school.test", "SecurePass123").is_empty());

        let errors = account_errors("ab", "not-an-email", "abc");
        assert_eq!(
            errors,
            vec![
                "Username length must be between 5 and 16 characters",
                "Email format is invalid",
                "Password must be at least 8 characters long",
                "Password must mix upper case letters, lower case letters and digits",
            ]
        );

        assert_eq!(
            account_errors("bad name!", "a@school.test", "SecurePass123"),
            vec!["Username must contain only letters, numbers, underscores or hyphens"]
        );
        assert_eq!(
            account_errors("teacher_a", "a@school.test", "ABCD1234"),
            vec![
                "Password must mix upper case letters, lower case letters and digits",
                "Password is too common, please choose a stronger password",
            ]
        );
    }
}
