// Deterministic local mock data used when the LLM is unavailable

use crate::models::MockDataFormat;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::borrow::Cow;

pub type SampleRecord = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Id,
    Name,
    Email,
    Date,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SampleField {
    key: &'static str,
    kind: FieldKind,
}

/// Pick the field set from keywords in the schema description
fn infer_fields(schema_description: &str) -> Vec<SampleField> {
    let lower = schema_description.to_lowercase();
    let mut fields = Vec::new();

    if lower.contains("id") {
        fields.push(SampleField {
            key: "id",
            kind: FieldKind::Id,
        });
    }
    if lower.contains("name") {
        fields.push(SampleField {
            key: "name",
            kind: FieldKind::Name,
        });
    }
    if lower.contains("email") {
        fields.push(SampleField {
            key: "email",
            kind: FieldKind::Email,
        });
    }
    if ["date", "timestamp", "created"]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        fields.push(SampleField {
            key: "created_at",
            kind: FieldKind::Date,
        });
    }

    if fields.is_empty() {
        fields.push(SampleField {
            key: "id",
            kind: FieldKind::Id,
        });
        fields.push(SampleField {
            key: "value",
            kind: FieldKind::Text,
        });
    }

    fields
}

/// Generate `rows` records for the schema description, dated relative to now
pub fn generate_local_sample(rows: u32, schema_description: &str) -> Vec<SampleRecord> {
    generate_local_sample_at(rows, schema_description, Utc::now())
}

/// Same as [`generate_local_sample`] with an explicit reference time
pub fn generate_local_sample_at(
    rows: u32,
    schema_description: &str,
    now: DateTime<Utc>,
) -> Vec<SampleRecord> {
    let fields = infer_fields(schema_description);

    (0..rows)
        .map(|i| {
            let n = i + 1;
            let mut record = SampleRecord::new();
            for field in &fields {
                let value = match field.kind {
                    FieldKind::Id => Value::from(n),
                    FieldKind::Name => Value::from(format!("Test User {}", n)),
                    FieldKind::Email => Value::from(format!("user{}@example.com", n)),
                    FieldKind::Date => Value::from(
                        (now - Duration::days(i64::from(i)))
                            .to_rfc3339_opts(SecondsFormat::Millis, true),
                    ),
                    FieldKind::Text => Value::from(format!("{}_{}", field.key, n)),
                };
                record.insert(field.key.to_string(), value);
            }
            record
        })
        .collect()
}

/// Quote a CSV field if it contains a comma, quote or newline; inner quotes are doubled
pub fn escape_csv(value: &str) -> Cow<'_, str> {
    // Fixed quoting rule: only comma, quote and LF trigger quoting, a bare CR does not
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Header row from the first record's keys, then one line per record
pub fn to_csv(records: &[SampleRecord]) -> String {
    let keys: Vec<&String> = records
        .first()
        .map(|first| first.keys().collect())
        .unwrap_or_default();

    let header = keys
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let mut lines = vec![header];
    for record in records {
        let line = keys
            .iter()
            .map(|k| escape_csv(&csv_cell(record.get(k.as_str()))).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\n")
}

/// Render a local sample in the requested format
pub fn render_sample(records: &[SampleRecord], format: MockDataFormat) -> String {
    match format {
        MockDataFormat::Json => {
            serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
        }
        MockDataFormat::Csv => to_csv(records),
    }
}

/// Pretty-print LLM output when JSON was requested and it parses; otherwise pass it through
pub fn reformat_llm_output(raw: String, format: MockDataFormat) -> String {
    if format != MockDataFormat::Json {
        return raw;
    }
    match serde_json::from_str::<Value>(&raw) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or(raw),
        Err(_) => raw,
    }
}
