//! Core data types for the admin dashboard

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::utils::format_number;

/// Identifier key used by the dashboard for every record
pub const ID_FIELD: &str = "id";

/// Identifier key used by the backend
pub const SOURCE_ID_FIELD: &str = "_id";

/// A single field value of a record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent or null value
    #[default]
    Null,
    /// Boolean flag
    Bool(bool),
    /// Numeric value, kept exactly as received
    Number(Number),
    /// Free text
    Text(String),
    /// List of strings (tags, features, requirements, technologies)
    List(Vec<String>),
    /// Any other JSON shape, carried through untouched
    Other(Value),
}

impl FieldValue {
    /// String form used for display and search
    ///
    /// Lists join their elements with `,` and null renders empty.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
            Self::Number(n) => n.as_f64().map(format_number).unwrap_or_default(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(","),
            Self::Other(Value::String(s)) => s.clone(),
            Self::Other(v) => v.to_string(),
        }
    }

    /// Borrow the value as text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value, if this is a number
    ///
    /// Integers beyond 2^53 lose precision here; use [`Self::as_i64`] for those.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Integer value, if this is a number that fits an `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Boolean value, if this is a flag
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the value as a list of strings
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether the value counts as "filled in" for a required form field
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) | Self::List(_) | Self::Other(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    /// NaN and infinities have no JSON form and become `Null`
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(String::from).collect())
    }
}

/// One entity instance as held in dashboard state
///
/// Field order is preserved from the source so that rendering and search are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Parse a record from a JSON object and normalize its identifier
    ///
    /// # Errors
    ///
    /// Returns a validation error if the value is not a JSON object.
    pub fn from_json(value: Value) -> crate::Result<Self> {
        if !value.is_object() {
            return Err(crate::Error::validation(
                "record",
                "expected a JSON object",
            ));
        }
        let record: Self = serde_json::from_value(value)?;
        Ok(record.normalized())
    }

    /// Serialize the record back to a JSON object
    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.fields).unwrap_or(Value::Null)
    }

    /// Move the backend identifier (`_id`) to the display identifier (`id`)
    ///
    /// Idempotent. When both keys are present the record is left unchanged.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if !self.fields.contains_key(ID_FIELD)
            && let Some(source) = self.fields.shift_remove(SOURCE_ID_FIELD)
        {
            self.fields.shift_insert(0, ID_FIELD.to_string(), source);
        }
        self
    }

    /// Display identifier of the record
    pub fn id(&self) -> Option<String> {
        match self.fields.get(ID_FIELD)? {
            FieldValue::Null => None,
            value => Some(value.to_display_string()),
        }
    }

    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Look up a field, treating a missing key as null
    pub fn value(&self, key: &str) -> &FieldValue {
        static NULL: FieldValue = FieldValue::Null;
        self.fields.get(key).unwrap_or(&NULL)
    }

    /// Text field shorthand
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    /// Set a field, keeping its position if it already exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Remove a field, preserving the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.shift_remove(key)
    }

    /// Whether the record carries the given field
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate over fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Iterate over values in order
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.values()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overwrite every field present in `other`, keeping the rest
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            self.fields.insert(key.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Authenticated dashboard user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    #[serde(alias = "_id")]
    pub id: String,

    /// Login email
    pub email: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Role, as reported by the identity provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// An authenticated session: bearer token plus the user it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Raw bearer token
    pub token: String,

    /// Current user
    pub user: User,
}

/// Envelope some endpoints wrap their payload in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Success status
    pub success: bool,

    /// Response data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Optional message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Create a successful envelope
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Create a failed envelope with a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Strip an optional `{success, data}` envelope from a response body
///
/// A JSON object carrying a boolean `success` key is treated as an envelope and
/// its `data` (or null) is returned. Any other value is returned unchanged.
///
/// # Errors
///
/// Returns the envelope's `message` (or `error`) when `success` is false.
pub fn unwrap_envelope(value: Value) -> std::result::Result<Value, String> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };

    match map.get("success") {
        Some(Value::Bool(true)) => Ok(map.remove("data").unwrap_or(Value::Null)),
        Some(Value::Bool(false)) => {
            let message = map
                .get("message")
                .or_else(|| map.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("request was not successful")
                .to_string();
            Err(message)
        }
        _ => Ok(Value::Object(map)),
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::float_cmp)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_field_value_deserialization() {
        let record = Record::from_json(json!({
            "_id": "p1",
            "name": "Kit",
            "pricing": 49.99,
            "stock": 3,
            "active": true,
            "features": ["a", "b"],
            "cover": null,
            "meta": {"k": 1}
        }))
        .unwrap();

        assert_eq!(record.value("name"), &FieldValue::Text("Kit".to_string()));
        assert_eq!(record.value("pricing").as_f64(), Some(49.99));
        assert_eq!(record.value("stock").as_f64(), Some(3.0));
        assert_eq!(record.value("active").as_bool(), Some(true));
        assert_eq!(record.value("features").as_list().unwrap().len(), 2);
        assert_eq!(record.value("cover"), &FieldValue::Null);
        assert!(matches!(record.value("meta"), FieldValue::Other(_)));
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(FieldValue::Null.to_display_string(), "");
        assert_eq!(FieldValue::Bool(false).to_display_string(), "false");
        assert_eq!(FieldValue::from(5.0).to_display_string(), "5");
        assert_eq!(FieldValue::from(5_i64).to_display_string(), "5");
        assert_eq!(FieldValue::from(49.99).to_display_string(), "49.99");
        assert_eq!(FieldValue::from(f64::NAN), FieldValue::Null);
        assert_eq!(
            FieldValue::from(vec!["React", "Rust"]).to_display_string(),
            "React,Rust"
        );
    }

    #[test]
    fn test_normalization_moves_source_id_first() {
        let record = Record::from_json(json!({"title": "A", "_id": "abc"})).unwrap();

        assert_eq!(record.id().as_deref(), Some("abc"));
        assert!(!record.contains(SOURCE_ID_FIELD));
        assert_eq!(record.iter().next().map(|(k, _)| k.as_str()), Some("id"));
        assert_eq!(record.text("title"), Some("A"));
    }

    #[test]
    fn test_normalization_keeps_both_when_present() {
        let record = Record::new()
            .with("id", "display")
            .with("_id", "source")
            .normalized();

        assert_eq!(record.id().as_deref(), Some("display"));
        assert!(record.contains(SOURCE_ID_FIELD));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Record::from_json(json!([1, 2])).is_err());
        assert!(Record::from_json(json!("text")).is_err());
    }

    #[test]
    fn test_numeric_ids() {
        let record = Record::from_json(json!({"id": 42})).unwrap();
        assert_eq!(record.id().as_deref(), Some("42"));
    }

    #[test]
    fn test_large_integers_survive_roundtrip() {
        let input = json!({
            "id": 9_007_199_254_740_993_u64,
            "views": 9_007_199_254_740_993_u64,
            "stock": 3,
            "offset": -9_007_199_254_740_993_i64,
            "pricing": 49.99
        });
        let record = Record::from_json(input.clone()).unwrap();

        assert_eq!(record.id().as_deref(), Some("9007199254740993"));
        assert_eq!(record.value("views").to_display_string(), "9007199254740993");
        assert_eq!(record.value("stock").as_i64(), Some(3));
        assert_eq!(record.value("offset").as_i64(), Some(-9_007_199_254_740_993));
        assert_eq!(record.to_json(), input);
        assert_eq!(
            serde_json::to_string(&record.value("stock")).unwrap(),
            "3"
        );
    }

    #[test]
    fn test_unwrap_envelope_variants() {
        let bare = json!([{"id": "1"}]);
        let wrapped = json!({"success": true, "data": [{"id": "1"}]});

        assert_eq!(unwrap_envelope(bare.clone()).unwrap(), bare);
        assert_eq!(unwrap_envelope(wrapped).unwrap(), bare);

        let no_data = json!({"success": true, "message": "deleted"});
        assert_eq!(unwrap_envelope(no_data).unwrap(), Value::Null);

        let failed = json!({"success": false, "message": "nope"});
        assert_eq!(unwrap_envelope(failed).unwrap_err(), "nope");

        let entity = json!({"id": "1", "title": "x"});
        assert_eq!(unwrap_envelope(entity.clone()).unwrap(), entity);
    }

    #[test]
    fn test_session_roundtrip_accepts_backend_id() {
        let session: Session = serde_json::from_value(json!({
            "token": "t0k",
            "user": {"_id": "u1", "email": "admin@example.com"}
        }))
        .unwrap();

        assert_eq!(session.user.id, "u1");
        assert!(session.user.name.is_none());
    }

    proptest! {
        #[test]
        fn test_normalization_is_idempotent(
            id in "[a-z0-9]{1,12}",
            title in ".*",
            use_source in any::<bool>(),
        ) {
            let key = if use_source { SOURCE_ID_FIELD } else { ID_FIELD };
            let record = Record::new().with(key, id.as_str()).with("title", title.as_str());

            let once = record.normalized();
            let twice = once.clone().normalized();

            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.id(), Some(id));
            prop_assert_eq!(once.text("title"), Some(title.as_str()));
        }
    }
}
