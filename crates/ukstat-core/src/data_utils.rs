//! DataFrame value extraction and column-name helpers.

use anyhow::Result;
use polars::prelude::{AnyValue, Column, DataFrame, DataType};

use ukstat_model::StatError;

/// Render a single cell as a string. Nulls become the empty string.
pub fn any_to_string(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// All values of a column rendered as trimmed strings.
pub fn column_string_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        values.push(any_to_string(&value).trim().to_string());
    }
    Ok(values)
}

/// All values of a column as `f64`, casting integers on the way.
pub fn column_numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let casted = df.column(name)?.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok(ca.into_iter().collect())
}

/// Render one cell of a column as a trimmed string.
pub fn cell_string(column: &Column, idx: usize) -> String {
    let value = column.get(idx).unwrap_or(AnyValue::Null);
    any_to_string(&value).trim().to_string()
}

/// Normalize a raw category label into a lowercase snake_case column
/// name: non-alphanumerics collapse to single underscores, leading and
/// trailing underscores are trimmed.
pub fn snake_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_underscore = true;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    if out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("column");
    }
    out
}

/// Snake-case a list of labels, suffixing repeats so the result is
/// collision-free and stable across calls.
pub fn snake_case_unique(labels: &[String], reserved: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = reserved.to_vec();
    let mut out = Vec::with_capacity(labels.len());
    for label in labels {
        let base = snake_case(label);
        let mut name = base.clone();
        let mut n = 2;
        while seen.iter().any(|s| s == &name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        seen.push(name.clone());
        out.push(name);
    }
    out
}

/// Allow-list column selection.
///
/// Keeps exactly the expected columns, in the given order. Extra upstream
/// columns are dropped without complaint; expected columns that are
/// entirely absent fail with [`StatError::MissingColumns`] naming each
/// one.
pub fn select_expected(df: &DataFrame, expected: &[&str]) -> Result<DataFrame> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let missing: Vec<String> = expected
        .iter()
        .filter(|name| !present.iter().any(|p| p == *name))
        .map(|name| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StatError::MissingColumns { columns: missing }.into());
    }
    Ok(df.select(expected.iter().copied())?)
}
