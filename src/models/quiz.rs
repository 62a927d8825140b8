use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};

/// 单道选择题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McqItem {
    /// 题干
    pub mcq: String,
    /// 选项（保持模型返回的顺序），如 ("a", "选项内容")
    pub options: Vec<(String, String)>,
    /// 正确答案
    pub correct: String,
}

/// 模型返回的整套题目
///
/// 键为题号字符串（"1"、"2"…），顺序与 JSON 中一致
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quiz {
    pub items: Vec<(String, McqItem)>,
}

impl Quiz {
    /// 严格解析：必须是对象，且每一项都包含 mcq / options / correct
    pub fn parse(raw: &str) -> AppResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> AppResult<Self> {
        let entries = value.as_object().ok_or_else(|| {
            AppError::response_parse(
                "题目 JSON 顶层必须是对象",
                Some(format!("实际类型: {}", json_type(value))),
            )
        })?;

        let mut items = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            items.push((key.clone(), McqItem::from_value(key, entry)?));
        }

        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 转换为表格行
    pub fn rows(&self) -> Vec<McqRow> {
        self.items.iter().map(|(_, item)| McqRow::from(item)).collect()
    }
}

impl McqItem {
    fn from_value(key: &str, entry: &Value) -> AppResult<Self> {
        let obj = entry.as_object().ok_or_else(|| {
            schema_mismatch(key, "条目", format!("应为对象，实际为 {}", json_type(entry)))
        })?;

        let mcq = required_str(key, obj, "mcq")?;
        let correct = required_str(key, obj, "correct")?;

        let options_value = obj
            .get("options")
            .ok_or_else(|| schema_mismatch(key, "options", "缺少字段".to_string()))?;
        let options_obj = options_value.as_object().ok_or_else(|| {
            schema_mismatch(
                key,
                "options",
                format!("应为对象，实际为 {}", json_type(options_value)),
            )
        })?;
        if options_obj.is_empty() {
            return Err(schema_mismatch(key, "options", "选项不能为空".to_string()));
        }

        let options = options_obj
            .iter()
            .map(|(letter, text)| (letter.clone(), value_to_text(text)))
            .collect();

        Ok(Self {
            mcq,
            options,
            correct,
        })
    }

    /// 选项拼接为 `a-> xxx || b-> yyy`
    pub fn choices_text(&self) -> String {
        self.options
            .iter()
            .map(|(letter, text)| format!("{}-> {}", letter, text))
            .collect::<Vec<_>>()
            .join(" || ")
    }
}

/// 表格中的一行，同时也是 CSV 的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McqRow {
    #[serde(rename = "MCQ")]
    pub mcq: String,
    #[serde(rename = "Choices")]
    pub choices: String,
    #[serde(rename = "Correct")]
    pub correct: String,
}

impl McqRow {
    /// 表头，顺序与序列化字段一致
    pub const HEADERS: [&'static str; 3] = ["MCQ", "Choices", "Correct"];
}

impl From<&McqItem> for McqRow {
    fn from(item: &McqItem) -> Self {
        Self {
            mcq: item.mcq.clone(),
            choices: item.choices_text(),
            correct: item.correct.clone(),
        }
    }
}

/// 宽松地把题目 JSON 转成表格行
///
/// 空字符串、非法 JSON、结构不符或没有任何题目时返回 `None`，调用方直接省略表格
pub fn table_rows(quiz_json: &str) -> Option<Vec<McqRow>> {
    let cleaned = strip_code_fence(quiz_json);
    if cleaned.trim().is_empty() {
        debug!("题目内容为空，跳过表格");
        return None;
    }

    match Quiz::parse(&cleaned) {
        Ok(quiz) if !quiz.is_empty() => Some(quiz.rows()),
        Ok(_) => None,
        Err(e) => {
            warn!("题目 JSON 无法转换为表格: {}", e);
            None
        }
    }
}

/// 去掉模型常见的 ```json ... ``` 包裹
pub fn strip_code_fence(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(re) = Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$") {
        if let Some(caps) = re.captures(trimmed) {
            if let Some(inner) = caps.get(1) {
                return inner.as_str().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// 发送给模型的示例结构（RESPONSE_JSON）
pub fn response_json_example() -> Value {
    let mut example = Map::new();
    for index in 1..=3 {
        example.insert(
            index.to_string(),
            json!({
                "mcq": "multiple choice question",
                "options": {
                    "a": "choice here",
                    "b": "choice here",
                    "c": "choice here",
                    "d": "choice here",
                },
                "correct": "correct answer",
            }),
        );
    }
    Value::Object(example)
}

fn required_str(key: &str, obj: &Map<String, Value>, field: &str) -> AppResult<String> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(schema_mismatch(
            key,
            field,
            format!("应为字符串，实际为 {}", json_type(other)),
        )),
        None => Err(schema_mismatch(key, field, "缺少字段".to_string())),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn schema_mismatch(key: &str, field: &str, reason: String) -> AppError {
    AppError::response_parse(
        format!("题目结构不符合约定: 第 {} 题的 {} {}", key, field, reason),
        None,
    )
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "1": {"mcq": "What is Rust?", "options": {"a": "A language", "b": "A metal", "c": "A game", "d": "A color"}, "correct": "a"},
        "2": {"mcq": "Who owns data?", "options": {"a": "Borrower", "b": "Owner", "c": "Nobody", "d": "Everyone"}, "correct": "b"}
    }"#;

    #[test]
    fn test_parse_keeps_order() {
        let quiz = Quiz::parse(SAMPLE).unwrap();
        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz.items[0].0, "1");
        assert_eq!(quiz.items[1].1.correct, "b");
        let letters: Vec<&str> = quiz.items[0].1.options.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(letters, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_table_rows_count_and_keys() {
        let rows = table_rows(SAMPLE).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].choices,
            "a-> A language || b-> A metal || c-> A game || d-> A color"
        );
        for row in &rows {
            let value = serde_json::to_value(row).unwrap();
            let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
            assert_eq!(keys, McqRow::HEADERS.to_vec());
        }
    }

    #[test]
    fn test_table_rows_lenient_on_bad_input() {
        assert!(table_rows("").is_none());
        assert!(table_rows("   ").is_none());
        assert!(table_rows("not json at all").is_none());
        assert!(table_rows("{}").is_none());
        assert!(table_rows("[1, 2, 3]").is_none());
        assert!(table_rows(r#"{"1": {"mcq": "no options"}}"#).is_none());
    }

    #[test]
    fn test_strict_parse_reports_field() {
        let err = Quiz::parse(r#"{"1": {"mcq": "q", "options": {"a": "x"}}}"#).unwrap_err();
        assert_eq!(err.kind(), "ResponseParseError");
        let message = err.to_string();
        assert!(message.contains("correct"), "{}", message);
        assert!(message.contains('1'), "{}", message);
    }

    #[test]
    fn test_strict_parse_rejects_empty_options() {
        let err = Quiz::parse(r#"{"1": {"mcq": "q", "options": {}, "correct": "a"}}"#).unwrap_err();
        assert!(err.to_string().contains("options"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert!(table_rows(&format!("```json\n{}\n```", SAMPLE)).is_some());
    }

    #[test]
    fn test_non_string_option_values_are_stringified() {
        let quiz = Quiz::parse(r#"{"1": {"mcq": "2+2?", "options": {"a": 4, "b": 5}, "correct": "a"}}"#).unwrap();
        assert_eq!(quiz.items[0].1.choices_text(), "a-> 4 || b-> 5");
    }

    #[test]
    fn test_response_json_example_is_valid_quiz() {
        let example = response_json_example();
        let quiz = Quiz::from_value(&example).unwrap();
        assert_eq!(quiz.len(), 3);
    }
}
