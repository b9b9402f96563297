use serde::Deserialize;

use super::entities::NewStudentRecord;
use crate::models::common::pagination::{first_page, lenient_page};
use crate::utils::validate::{
    REQUIRED_MESSAGE, normalize_student_name, normalize_subject, validate_marks,
};

/// 数字字段：JSON 中为数字，表单中为字符串
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    fn parse(&self) -> Result<f64, String> {
        match self {
            NumberInput::Number(value) => Ok(*value),
            NumberInput::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(REQUIRED_MESSAGE.to_string());
                }
                text.parse::<f64>()
                    .map_err(|_| "Enter a number.".to_string())
            }
        }
    }
}

fn clean_marks(marks: Option<&NumberInput>) -> Result<f64, String> {
    let value = marks.ok_or_else(|| REQUIRED_MESSAGE.to_string())?.parse()?;
    validate_marks(value)
}

// 新增/累加成绩表单
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRecordForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: String,
    pub marks: Option<NumberInput>,
}

impl StudentRecordForm {
    /// 校验所有字段，错误按字段顺序平铺返回
    pub fn clean(&self) -> Result<NewStudentRecord, Vec<String>> {
        let name = normalize_student_name(&self.name);
        let subject = normalize_subject(&self.subject);
        let marks = clean_marks(self.marks.as_ref());

        match (name, subject, marks) {
            (Ok(name), Ok(subject), Ok(marks)) => Ok(NewStudentRecord {
                name,
                subject,
                marks,
            }),
            (name, subject, marks) => Err([name.err(), subject.err(), marks.err()]
                .into_iter()
                .flatten()
                .collect()),
        }
    }
}

// 修改分数表单
#[derive(Debug, Clone, Deserialize)]
pub struct MarksUpdateForm {
    pub marks: Option<NumberInput>,
}

impl MarksUpdateForm {
    pub fn clean(&self) -> Result<f64, Vec<String>> {
        clean_marks(self.marks.as_ref()).map_err(|e| vec![e])
    }
}

// 教师面板查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardParams {
    pub search: Option<String>,
    #[serde(default = "first_page", deserialize_with = "lenient_page")]
    pub page: i64,
}

/// 去除空白，空串视为未提供
pub fn normalize_search(search: Option<String>) -> Option<String> {
    search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// 管理员记录查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct AdminRecordParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub subject: Option<String>,
    pub teacher_id: Option<i64>,
}

// 管理员记录查询（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct AdminRecordQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub subject: Option<String>,
    pub teacher_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, subject: &str, marks: Option<NumberInput>) -> StudentRecordForm {
        StudentRecordForm {
            name: name.to_string(),
            subject: subject.to_string(),
            marks,
        }
    }

    #[test]
    fn test_clean_normalizes_fields() {
        let cleaned = form(" john ", "  physics", Some(NumberInput::Number(40.0)))
            .clean()
            .unwrap();
        assert_eq!(cleaned.name, "John");
        assert_eq!(cleaned.subject, "Physics");
        assert_eq!(cleaned.marks, 40.0);
    }

    #[test]
    fn test_clean_collects_all_errors() {
        let errors = form("John123", "", Some(NumberInput::Number(120.0)))
            .clean()
            .unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Name should only contain letters and spaces.".to_string(),
                REQUIRED_MESSAGE.to_string(),
                "Marks should be between 0 and 100.".to_string(),
            ]
        );
    }

    #[test]
    fn test_marks_from_form_text() {
        let cleaned = form("Ann", "Maths", Some(NumberInput::Text(" 55.25 ".into())))
            .clean()
            .unwrap();
        assert_eq!(cleaned.marks, 55.25);

        let errors = form("Ann", "Maths", Some(NumberInput::Text("lots".into())))
            .clean()
            .unwrap_err();
        assert_eq!(errors, vec!["Enter a number.".to_string()]);

        let errors = form("Ann", "Maths", None).clean().unwrap_err();
        assert_eq!(errors, vec![REQUIRED_MESSAGE.to_string()]);
    }

    #[test]
    fn test_form_and_dashboard_params_deserialize() {
        let json: StudentRecordForm =
            serde_json::from_str(r#"{"name":"Ann","subject":"Art","marks":12.5}"#).unwrap();
        assert!(matches!(json.marks, Some(NumberInput::Number(v)) if v == 12.5));

        let query: DashboardParams =
            serde_json::from_value(serde_json::json!({"search": "phys", "page": "abc"})).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.search.as_deref(), Some("phys"));
    }

    #[test]
    fn test_normalize_search() {
        assert_eq!(normalize_search(Some("  ".into())), None);
        assert_eq!(normalize_search(Some(" phys ".into())), Some("phys".into()));
        assert_eq!(normalize_search(None), None);
    }

    #[test]
    fn test_update_form_validates_range() {
        let form = MarksUpdateForm {
            marks: Some(NumberInput::Number(-1.0)),
        };
        assert_eq!(
            form.clean().unwrap_err(),
            vec!["Marks should be between 0 and 100.".to_string()]
        );
    }
}
