use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

/// A project item exactly as the GraphQL endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub id: String,
    #[serde(default)]
    pub field_values: Option<FieldValueConnection>,
    #[serde(default)]
    pub content: Option<ItemContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldValueConnection {
    #[serde(default)]
    pub nodes: Vec<RawFieldValue>,
}

/// One field-value entry. Either `text` or `number` is populated depending on
/// the field type; entries for unsupported field types arrive empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFieldValue {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub number: Option<f64>,
    #[serde(default)]
    pub field: Option<FieldMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldMetadata {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemContent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    /// Numeric reading of the value. Text is accepted when it parses as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(t) => t.trim().parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemState {
    Open,
    Closed,
    Other(String),
}

impl From<&str> for ItemState {
    fn from(value: &str) -> Self {
        match value {
            "OPEN" => ItemState::Open,
            "CLOSED" => ItemState::Closed,
            other => ItemState::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedItem {
    pub title: String,
    pub state: ItemState,
    pub closed_at: Option<String>,
    pub fields: BTreeMap<String, FieldValue>,
}

/// Completed value per closure date.
pub type AggregationBucket = BTreeMap<NaiveDate, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct BurndownSeries {
    pub dates: Vec<NaiveDate>,
    pub ideal: Vec<f64>,
    pub actual: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_issue_item() {
        let json = r#"{
            "id": "PVTI_1",
            "fieldValues": {"nodes": [
                {"text": "Login page", "field": {"name": "Title"}},
                {"number": 3.0, "field": {"name": "Estimate"}},
                {}
            ]},
            "content": {"title": "Login page", "state": "CLOSED", "closedAt": "2025-01-13T10:00:00Z"}
        }"#;

        let item: ProjectItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "PVTI_1");
        let nodes = item.field_values.unwrap().nodes;
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1].number, Some(3.0));
        assert!(nodes[2].field.is_none());
        let content = item.content.unwrap();
        assert_eq!(content.closed_at.as_deref(), Some("2025-01-13T10:00:00Z"));
    }

    #[test]
    fn deserializes_draft_item_without_issue_content() {
        let item: ProjectItem =
            serde_json::from_str(r#"{"id": "PVTI_2", "fieldValues": {"nodes": []}, "content": {}}"#)
                .unwrap();
        let content = item.content.unwrap();
        assert!(content.title.is_none());
        assert!(content.state.is_none());
    }

    #[test]
    fn state_parsing_is_exact() {
        assert_eq!(ItemState::from("CLOSED"), ItemState::Closed);
        assert_eq!(ItemState::from("OPEN"), ItemState::Open);
        assert_eq!(ItemState::from("closed"), ItemState::Other("closed".to_string()));
    }

    #[test]
    fn numeric_text_reads_as_number() {
        assert_eq!(FieldValue::Text(" 2.5 ".to_string()).as_number(), Some(2.5));
        assert_eq!(FieldValue::Text("large".to_string()).as_number(), None);
        assert_eq!(FieldValue::Number(4.0).as_number(), Some(4.0));
    }
}
