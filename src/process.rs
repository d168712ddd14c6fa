use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::error::{BurndownError, Result};
use crate::models::{AggregationBucket, FieldValue, ItemState, ProcessedItem, ProjectItem};

pub const CLOSED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Flattens each raw item into a [`ProcessedItem`]. Never drops an item.
pub fn process_items(items: &[ProjectItem]) -> Vec<ProcessedItem> {
    items.iter().map(process_item).collect()
}

fn process_item(item: &ProjectItem) -> ProcessedItem {
    let content = item.content.clone().unwrap_or_default();
    let title = content.title.unwrap_or_else(|| "No Title".to_string());
    let mut fields: BTreeMap<String, FieldValue> = BTreeMap::new();

    let entries = item
        .field_values
        .as_ref()
        .map(|connection| connection.nodes.as_slice())
        .unwrap_or_default();

    for entry in entries {
        let Some(name) = entry.field.as_ref().and_then(|f| f.name.as_deref()) else {
            log::warn!("skipping field with missing metadata on '{}' ({}): {:?}", title, item.id, entry);
            continue;
        };

        let value = match (&entry.text, entry.number) {
            (Some(text), _) if !text.is_empty() => FieldValue::Text(text.clone()),
            (_, Some(number)) => FieldValue::Number(number),
            (Some(text), None) => FieldValue::Text(text.clone()),
            (None, None) => {
                log::debug!("field '{}' on '{}' ({}) carries no value", name, title, item.id);
                continue;
            }
        };

        fields.insert(name.to_string(), value);
    }

    ProcessedItem {
        title,
        state: content
            .state
            .as_deref()
            .map(ItemState::from)
            .unwrap_or_else(|| ItemState::Other("Unknown".to_string())),
        closed_at: content.closed_at,
        fields,
    }
}

/// Numeric reading of `field_name` on `item`. Absent fields and empty text
/// read as `None`; any other text that does not parse is an error.
fn numeric_field(item: &ProcessedItem, field_name: &str) -> Result<Option<f64>> {
    match item.fields.get(field_name) {
        None => Ok(None),
        Some(FieldValue::Text(text)) if text.is_empty() => Ok(None),
        Some(value) => value.as_number().map(Some).ok_or_else(|| BurndownError::NonNumeric {
            field: field_name.to_string(),
            item: item.title.clone(),
            value: match value {
                FieldValue::Text(text) => text.clone(),
                FieldValue::Number(number) => number.to_string(),
            },
        }),
    }
}

/// Groups closed items by closure date.
///
/// Without `field_name` every closed item counts as 1. With it, the item
/// contributes the numeric value of that field; a missing or zero value
/// contributes nothing, and non-numeric text fails the run.
pub fn calculate_by_date(items: &[ProcessedItem], field_name: Option<&str>) -> Result<AggregationBucket> {
    let mut closed_per_day = AggregationBucket::new();

    for item in items {
        if item.state != ItemState::Closed {
            continue;
        }
        let Some(closed_at) = item.closed_at.as_deref() else {
            continue;
        };

        let value = match field_name {
            None => 1.0,
            Some(name) => numeric_field(item, name)?.unwrap_or(0.0),
        };
        if value == 0.0 {
            continue;
        }

        let closed_date = NaiveDateTime::parse_from_str(closed_at, CLOSED_AT_FORMAT)
            .map_err(|source| BurndownError::Format {
                value: closed_at.to_string(),
                source,
            })?
            .date();

        *closed_per_day.entry(closed_date).or_insert(0.0) += value;
    }

    Ok(closed_per_day)
}

/// Sum of `field_name` over every item that carries a value for it.
pub fn total_estimate(items: &[ProcessedItem], field_name: &str) -> Result<f64> {
    let mut total = 0.0;
    for item in items {
        if let Some(value) = numeric_field(item, field_name)? {
            total += value;
        }
    }
    Ok(total)
}
