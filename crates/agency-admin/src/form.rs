//! Form drafts and the list-builder helpers for array fields

use agency_core::{FieldValue, Record};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{AdminError, AdminResult};

/// Input widget of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "options")]
pub enum FieldKind {
    /// Single-line text
    Text,
    /// Multi-line text
    TextArea,
    /// Numeric input
    Number,
    /// Checkbox
    Toggle,
    /// Fixed choice list
    Select(&'static [&'static str]),
    /// Add/remove list builder
    List,
}

/// Declaration of one form field
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// Record key
    pub key: &'static str,
    /// Label
    pub label: &'static str,
    /// Widget
    pub kind: FieldKind,
    /// Must be filled in before saving
    pub required: bool,
    /// Value for a fresh create form
    pub default: FieldValue,
}

impl FormField {
    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let default = match kind {
            FieldKind::Text | FieldKind::TextArea => FieldValue::Text(String::new()),
            FieldKind::Number => FieldValue::Null,
            FieldKind::Toggle => FieldValue::Bool(false),
            FieldKind::Select(options) => options
                .first()
                .map_or(FieldValue::Text(String::new()), |first| (*first).into()),
            FieldKind::List => FieldValue::List(Vec::new()),
        };
        Self {
            key,
            label,
            kind,
            required: false,
            default,
        }
    }

    /// Single-line text field
    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    /// Multi-line text field
    pub fn textarea(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::TextArea)
    }

    /// Numeric field, blank by default
    pub fn number(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Number)
    }

    /// Checkbox, unchecked by default
    pub fn toggle(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Toggle)
    }

    /// Choice list; defaults to the first option
    pub fn select(key: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        Self::new(key, label, FieldKind::Select(options))
    }

    /// List builder, empty by default
    pub fn list(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::List)
    }

    /// Mark as required
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the create-form default
    #[must_use]
    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = value.into();
        self
    }

    /// Bring a stored value into the shape this widget edits
    fn coerce(&self, value: FieldValue) -> FieldValue {
        match (self.kind, value) {
            (FieldKind::Number, FieldValue::Text(text)) if text.trim().is_empty() => {
                FieldValue::Null
            }
            (FieldKind::Number, FieldValue::Text(text)) => {
                parse_number(text.trim()).unwrap_or(FieldValue::Text(text))
            }
            (FieldKind::List, FieldValue::Text(text)) => FieldValue::List(
                text.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            (FieldKind::List, FieldValue::Null) => FieldValue::List(Vec::new()),
            (FieldKind::Text | FieldKind::TextArea, FieldValue::Null) => {
                FieldValue::Text(String::new())
            }
            (_, value) => value,
        }
    }
}

/// Parse numeric input, keeping whole numbers exact
///
/// Non-finite values such as `inf` are not numbers here.
fn parse_number(input: &str) -> Option<FieldValue> {
    if let Ok(whole) = input.parse::<i64>() {
        return Some(FieldValue::from(whole));
    }
    if let Ok(whole) = input.parse::<u64>() {
        return Some(FieldValue::from(whole));
    }
    input
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(FieldValue::from)
}

/// Append the trimmed `input` unless it is empty or already present
///
/// Duplicates are exact, case-sensitive matches. Returns whether the list grew.
pub fn add_unique(items: &mut Vec<String>, input: &str) -> bool {
    let item = input.trim();
    if item.is_empty() || items.iter().any(|existing| existing == item) {
        return false;
    }
    items.push(item.to_string());
    true
}

/// Remove the element at `index`, keeping the others in order
pub fn remove_at(items: &mut Vec<String>, index: usize) -> Option<String> {
    (index < items.len()).then(|| items.remove(index))
}

/// Rendered form field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    /// Record key
    pub key: &'static str,
    /// Label, with ` *` when required
    pub label: String,
    /// Widget
    pub kind: FieldKind,
    /// Current value as text
    pub value: String,
    /// Elements of a list field, each with its own remove control
    pub items: Vec<String>,
    /// Pending list-builder input
    pub input: String,
}

/// Mutable draft of one record being created or edited
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    fields: Vec<FormField>,
    values: IndexMap<String, FieldValue>,
    inputs: HashMap<String, String>,
}

impl FormState {
    /// Draft seeded from each field's default
    pub fn from_defaults(fields: &[FormField]) -> Self {
        let values = fields
            .iter()
            .map(|field| (field.key.to_string(), field.default.clone()))
            .collect();
        Self {
            fields: fields.to_vec(),
            values,
            inputs: HashMap::new(),
        }
    }

    /// Draft seeded from an existing record; missing fields take their default
    pub fn from_record(fields: &[FormField], record: &Record) -> Self {
        let values = fields
            .iter()
            .map(|field| {
                let value = record
                    .get(field.key)
                    .cloned()
                    .map_or_else(|| field.default.clone(), |v| field.coerce(v));
                (field.key.to_string(), value)
            })
            .collect();
        Self {
            fields: fields.to_vec(),
            values,
            inputs: HashMap::new(),
        }
    }

    /// Declared fields
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    fn field(&self, key: &str) -> AdminResult<&FormField> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .ok_or_else(|| AdminError::validation(key, format!("{key} is not a field of this form")))
    }

    /// Current value of a field
    pub fn value(&self, key: &str) -> &FieldValue {
        static NULL: FieldValue = FieldValue::Null;
        self.values.get(key).unwrap_or(&NULL)
    }

    /// Set a field directly
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form has no such field.
    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) -> AdminResult<()> {
        let value = self.field(key)?.coerce(value.into());
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Apply raw text typed into a field
    ///
    /// Numbers are parsed when possible, toggles accept `true/yes/on/1`, and
    /// list fields store the text as their pending input.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form has no such field.
    pub fn set_input(&mut self, key: &str, raw: &str) -> AdminResult<()> {
        let kind = self.field(key)?.kind;
        match kind {
            FieldKind::List => {
                self.inputs.insert(key.to_string(), raw.to_string());
            }
            FieldKind::Toggle => {
                let on = matches!(
                    raw.trim().to_ascii_lowercase().as_str(),
                    "true" | "yes" | "on" | "1"
                );
                self.values.insert(key.to_string(), on.into());
            }
            FieldKind::Text | FieldKind::TextArea | FieldKind::Number | FieldKind::Select(_) => {
                self.set(key, raw)?;
            }
        }
        Ok(())
    }

    /// Pending list-builder input
    pub fn list_input(&self, key: &str) -> &str {
        self.inputs.get(key).map_or("", String::as_str)
    }

    fn list_mut(&mut self, key: &str) -> AdminResult<&mut Vec<String>> {
        if self.field(key)?.kind != FieldKind::List {
            return Err(AdminError::validation(key, format!("{key} is not a list")));
        }
        let slot = self
            .values
            .entry(key.to_string())
            .or_insert_with(|| FieldValue::List(Vec::new()));
        if !matches!(slot, FieldValue::List(_)) {
            *slot = FieldValue::List(Vec::new());
        }
        let FieldValue::List(items) = slot else {
            return Err(AdminError::validation(key, format!("{key} is not a list")));
        };
        Ok(items)
    }

    /// Add the pending input to a list field
    ///
    /// The input is cleared only when the item was accepted.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `key` is not a list field.
    pub fn add_list_item(&mut self, key: &str) -> AdminResult<bool> {
        let input = self.list_input(key).to_string();
        let added = add_unique(self.list_mut(key)?, &input);
        if added {
            self.inputs.remove(key);
        }
        Ok(added)
    }

    /// Remove element `index` of a list field
    ///
    /// # Errors
    ///
    /// Returns a validation error if `key` is not a list field.
    pub fn remove_list_item(&mut self, key: &str, index: usize) -> AdminResult<Option<String>> {
        Ok(remove_at(self.list_mut(key)?, index))
    }

    /// Required fields that are still blank
    pub fn missing_required(&self) -> Vec<&FormField> {
        self.fields
            .iter()
            .filter(|field| field.required && self.value(field.key).is_blank())
            .collect()
    }

    /// Check required fields, numbers and choices
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] naming the first offending field.
    pub fn validate(&self) -> AdminResult<()> {
        let missing = self.missing_required();
        if let Some(first) = missing.first() {
            let labels: Vec<&str> = missing.iter().map(|field| field.label).collect();
            return Err(AdminError::validation(
                first.key,
                format!("Please fill in all required fields: {}", labels.join(", ")),
            ));
        }

        for field in &self.fields {
            let value = self.value(field.key);
            match field.kind {
                FieldKind::Number if matches!(value, FieldValue::Text(_)) => {
                    return Err(AdminError::validation(
                        field.key,
                        format!("{} must be a number", field.label),
                    ));
                }
                FieldKind::Select(options)
                    if value.as_str().is_some_and(|v| !v.is_empty() && !options.contains(&v)) =>
                {
                    return Err(AdminError::validation(
                        field.key,
                        format!("{} must be one of: {}", field.label, options.join(", ")),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Payload for the backend, in field order
    pub fn to_record(&self) -> Record {
        self.fields
            .iter()
            .map(|field| (field.key.to_string(), self.value(field.key).clone()))
            .collect()
    }

    /// Render every field
    pub fn view(&self) -> Vec<FieldView> {
        self.fields
            .iter()
            .map(|field| {
                let value = self.value(field.key);
                FieldView {
                    key: field.key,
                    label: if field.required {
                        format!("{} *", field.label)
                    } else {
                        field.label.to_string()
                    },
                    kind: field.kind,
                    value: value.to_display_string(),
                    items: value.as_list().map(<[String]>::to_vec).unwrap_or_default(),
                    input: self.list_input(field.key).to_string(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    const CATEGORIES: &[&str] = &["Template", "Plugin"];

    fn fields() -> Vec<FormField> {
        vec![
            FormField::text("name", "Name").required(),
            FormField::number("pricing", "Price").required(),
            FormField::select("category", "Category", CATEGORIES),
            FormField::list("features", "Features"),
            FormField::toggle("active", "Active").default_value(true),
        ]
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[rstest]
    #[case(&["React"], "React", &["React"])]
    #[case(&["React"], "react", &["React", "react"])]
    #[case(&["React"], "  ", &["React"])]
    #[case(&[], "  Vue  ", &["Vue"])]
    fn test_add_unique(#[case] start: &[&str], #[case] input: &str, #[case] expected: &[&str]) {
        let mut items = strings(start);
        add_unique(&mut items, input);
        assert_eq!(items, strings(expected));
    }

    #[test]
    fn test_remove_at_keeps_order() {
        let mut items = strings(&["a", "b", "c"]);
        assert_eq!(remove_at(&mut items, 1), Some("b".to_string()));
        assert_eq!(items, strings(&["a", "c"]));
        assert_eq!(remove_at(&mut items, 5), None);
    }

    #[test]
    fn test_defaults() {
        let form = FormState::from_defaults(&fields());

        assert_eq!(form.value("name"), &FieldValue::Text(String::new()));
        assert_eq!(form.value("pricing"), &FieldValue::Null);
        assert_eq!(form.value("category").as_str(), Some("Template"));
        assert_eq!(form.value("features"), &FieldValue::List(Vec::new()));
        assert_eq!(form.value("active"), &FieldValue::Bool(true));
    }

    #[test]
    fn test_seed_from_record() {
        let record = Record::new()
            .with("id", "p1")
            .with("name", "Kit")
            .with("pricing", "49.99")
            .with("features", "Dark mode, SEO");
        let form = FormState::from_record(&fields(), &record);

        assert_eq!(form.value("pricing").as_f64(), Some(49.99));
        assert_eq!(
            form.value("features").as_list(),
            Some(strings(&["Dark mode", "SEO"]).as_slice())
        );
        assert_eq!(form.value("category").as_str(), Some("Template"));
        assert!(!form.to_record().contains("id"));
    }

    #[rstest]
    #[case("49.99", FieldValue::from(49.99))]
    #[case("3", FieldValue::from(3_i64))]
    #[case("9007199254740993", FieldValue::from(9_007_199_254_740_993_i64))]
    #[case("18446744073709551615", FieldValue::from(u64::MAX))]
    #[case("inf", FieldValue::Text("inf".to_string()))]
    #[case("abc", FieldValue::Text("abc".to_string()))]
    fn test_number_input(#[case] input: &str, #[case] expected: FieldValue) {
        let mut form = FormState::from_defaults(&fields());
        form.set_input("pricing", input).unwrap();
        assert_eq!(form.value("pricing"), &expected);
    }

    #[test]
    fn test_list_builder_clears_input_on_success() {
        let mut form = FormState::from_defaults(&fields());

        form.set_input("features", " Dark mode ").unwrap();
        assert!(form.add_list_item("features").unwrap());
        assert_eq!(form.list_input("features"), "");

        form.set_input("features", "Dark mode").unwrap();
        assert!(!form.add_list_item("features").unwrap());
        assert_eq!(form.list_input("features"), "Dark mode");

        assert_eq!(
            form.remove_list_item("features", 0).unwrap(),
            Some("Dark mode".to_string())
        );
        assert!(form.add_list_item("name").is_err());
    }

    #[test]
    fn test_validate_required_before_anything_else() {
        let mut form = FormState::from_defaults(&fields());
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("Name, Price"));

        form.set_input("name", "Kit").unwrap();
        form.set_input("pricing", "cheap").unwrap();
        let err = form.validate().unwrap_err();
        assert_eq!(err.user_message(), "Price must be a number");

        form.set_input("pricing", "49.99").unwrap();
        form.set_input("category", "Course").unwrap();
        assert!(form.validate().is_err());

        form.set_input("category", "Plugin").unwrap();
        form.validate().unwrap();
    }

    #[test]
    fn test_to_record_follows_field_order() {
        let mut form = FormState::from_defaults(&fields());
        form.set("name", "Kit").unwrap();
        form.set("pricing", 49.99).unwrap();
        form.set_input("active", "no").unwrap();

        let record = form.to_record();
        let keys: Vec<&str> = record.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "pricing", "category", "features", "active"]);
        assert_eq!(record.value("active").as_bool(), Some(false));
        assert!(form.set("unknown", "x").is_err());
    }

    #[test]
    fn test_view_marks_required() {
        let form = FormState::from_defaults(&fields());
        let view = form.view();
        assert_eq!(view[0].label, "Name *");
        assert_eq!(view[2].label, "Category");
        assert!(view[3].items.is_empty());
    }

    proptest! {
        #[test]
        fn prop_add_is_idempotent(
            start in proptest::collection::vec("[a-z]{1,4}", 0..10),
            input in "[ a-z]{0,5}",
        ) {
            let mut once = start.clone();
            add_unique(&mut once, &input);
            let mut twice = once.clone();
            add_unique(&mut twice, &input);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.len() <= start.len() + 1);
        }

        #[test]
        fn prop_remove_preserves_relative_order(
            items in proptest::collection::vec("[a-z]{1,4}", 1..12),
            index in 0usize..12,
        ) {
            let mut list = items.clone();
            let removed = remove_at(&mut list, index);
            if index < items.len() {
                prop_assert_eq!(removed, Some(items[index].clone()));
                let mut expected = items.clone();
                expected.remove(index);
                prop_assert_eq!(list, expected);
            } else {
                prop_assert_eq!(removed, None);
                prop_assert_eq!(list, items);
            }
        }
    }
}
