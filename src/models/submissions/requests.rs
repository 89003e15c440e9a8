use serde::Deserialize;
use ts_rs::TS;

use super::entities::SubmissionStatus;

// 新提交（存储层使用）
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub class_id: i64,
    pub assignment_id: i64,
    pub teacher_id: i64,
    pub student_id: i64,
    pub file_id: String,
    pub note: Option<String>,
}

/// 请求中的分数字段
///
/// 前端可能发送数字、数字字符串、空字符串或 null。
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GradeInput {
    // 字段未出现
    #[default]
    Unchanged,
    // 空字符串或 null，清除分数
    Clear,
    Value(f64),
    Invalid(String),
}

impl GradeInput {
    /// 校验原始值在 0-100 范围内，再四舍五入
    pub fn resolve(&self) -> Result<Option<Option<i32>>, String> {
        match self {
            GradeInput::Unchanged => Ok(None),
            GradeInput::Clear => Ok(Some(None)),
            GradeInput::Value(v) => {
                if !v.is_finite() {
                    return Err("Grade must be a number".to_string());
                }
                if !(0.0..=100.0).contains(v) {
                    return Err("Grade must be between 0 and 100".to_string());
                }
                Ok(Some(Some(v.round() as i32)))
            }
            GradeInput::Invalid(raw) => Err(format!("Grade must be a number, got '{raw}'")),
        }
    }
}

fn deserialize_grade<'de, D>(deserializer: D) -> Result<GradeInput, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Visitor};
    use std::fmt;

    struct GradeVisitor;

    impl<'de> Visitor<'de> for GradeVisitor {
        type Value = GradeInput;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number, a numeric string, an empty string or null")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(GradeInput::Value(value as f64))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(GradeInput::Value(value as f64))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(GradeInput::Value(value))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(GradeInput::Clear);
            }
            Ok(trimmed
                .parse::<f64>()
                .map(GradeInput::Value)
                .unwrap_or_else(|_| GradeInput::Invalid(trimmed.to_string())))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(GradeInput::Clear)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(GradeInput::Clear)
        }
    }

    deserializer.deserialize_any(GradeVisitor)
}

// 批改请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "submission.ts")]
pub struct ReviewSubmissionRequest {
    pub status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_grade")]
    #[ts(type = "number | string | null")]
    pub grade: GradeInput,
    pub feedback: Option<String>,
}

// 批改更新（存储层使用）
#[derive(Debug, Clone)]
pub struct SubmissionReview {
    pub status: SubmissionStatus,
    pub grade: Option<i32>,
    pub feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ReviewSubmissionRequest {
        serde_json::from_str(body).expect("valid review body")
    }

    #[test]
    fn test_grade_variants() {
        assert_eq!(parse(r#"{}"#).grade, GradeInput::Unchanged);
        assert_eq!(parse(r#"{"grade": null}"#).grade, GradeInput::Clear);
        assert_eq!(parse(r#"{"grade": ""}"#).grade, GradeInput::Clear);
        assert_eq!(parse(r#"{"grade": 87}"#).grade, GradeInput::Value(87.0));
        assert_eq!(parse(r#"{"grade": "92.5"}"#).grade, GradeInput::Value(92.5));
        assert_eq!(
            parse(r#"{"grade": "abc"}"#).grade,
            GradeInput::Invalid("abc".to_string())
        );
    }

    #[test]
    fn test_grade_resolve_bounds() {
        assert_eq!(GradeInput::Value(100.0).resolve(), Ok(Some(Some(100))));
        assert_eq!(GradeInput::Value(0.0).resolve(), Ok(Some(Some(0))));
        assert_eq!(GradeInput::Value(79.6).resolve(), Ok(Some(Some(80))));
        assert!(GradeInput::Value(101.0).resolve().is_err());
        assert!(GradeInput::Value(-1.0).resolve().is_err());
        assert!(GradeInput::Value(100.4).resolve().is_err());
        assert!(GradeInput::Value(-0.4).resolve().is_err());
        assert_eq!(GradeInput::Value(99.6).resolve(), Ok(Some(Some(100))));
        assert!(GradeInput::Invalid("x".into()).resolve().is_err());
        assert_eq!(GradeInput::Clear.resolve(), Ok(Some(None)));
        assert_eq!(GradeInput::Unchanged.resolve(), Ok(None));
    }
}
