//! Dynamic form model
//!
//! A form is a list of field specs plus current values. Forms opened on an
//! existing record start read-only and must be switched into edit mode
//! before values can change.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Dropdown,
    Date,
    Textarea,
    Password,
    Radio,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    Required,
    Email,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub validators: Vec<Validator>,
    /// Choices for dropdown and radio fields
    pub options: Vec<Value>,
    /// Object fields joined with " - " to label an option
    pub display_fields: Vec<String>,
    /// Object field used as an option's value
    pub value_field: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            validators: Vec::new(),
            options: Vec::new(),
            display_fields: Vec::new(),
            value_field: Some("id".to_string()),
        }
    }

    pub fn required(mut self) -> Self {
        self.validators.push(Validator::Required);
        self
    }

    pub fn email(mut self) -> Self {
        self.validators.push(Validator::Email);
        self
    }

    pub fn with_options(mut self, options: Vec<Value>) -> Self {
        self.options = options;
        self
    }

    pub fn with_display_fields(mut self, fields: &[&str]) -> Self {
        self.display_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_value_field(mut self, field: Option<&str>) -> Self {
        self.value_field = field.map(str::to_string);
        self
    }

    /// Options whose label contains `text`, case-insensitively
    pub fn filter_options(&self, text: &str) -> Vec<&Value> {
        filter_options(&self.options, &self.display_fields, text)
    }

    pub fn format_option(&self, option: &Value) -> String {
        format_option(option, &self.display_fields)
    }

    pub fn option_value(&self, option: &Value) -> Value {
        option_value(option, self.value_field.as_deref())
    }
}

/// Options whose label contains `text`, case-insensitively.
///
/// Object options are searched on their display fields when any are given;
/// anything else is searched on its display text.
pub fn filter_options<'a>(
    options: &'a [Value],
    display_fields: &[String],
    text: &str,
) -> Vec<&'a Value> {
    let needle = text.to_lowercase();
    options
        .iter()
        .filter(|option| match option {
            Value::Object(map) if !display_fields.is_empty() => display_fields.iter().any(|f| {
                map.get(f)
                    .map(|v| scalar_text(v).to_lowercase().contains(&needle))
                    .unwrap_or(false)
            }),
            other => format_option(other, &[]).to_lowercase().contains(&needle),
        })
        .collect()
}

/// Label shown for an option
pub fn format_option(option: &Value, display_fields: &[String]) -> String {
    match option {
        Value::Object(map) if !display_fields.is_empty() => display_fields
            .iter()
            .map(|f| match map.get(f) {
                Some(v) if !is_empty_value(v) => scalar_text(v),
                _ => String::new(),
            })
            .collect::<Vec<_>>()
            .join(" - "),
        other => scalar_text(other),
    }
}

/// Value stored when an option is picked: primitives as-is, objects by
/// `value_field` (or whole when there is none)
pub fn option_value(option: &Value, value_field: Option<&str>) -> Value {
    match (option, value_field) {
        (Value::Object(map), Some(field)) => map.get(field).cloned().unwrap_or(Value::Null),
        _ => option.clone(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Dot-separated atoms, then `@`, then hostname labels of at most 63
/// characters that neither start nor end with a hyphen
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("Email regex invalid")
});

const EMAIL_MAX_LEN: usize = 254;
const EMAIL_LOCAL_MAX_LEN: usize = 64;

fn is_email(s: &str) -> bool {
    let local_len = s.find('@').unwrap_or(s.len());
    s.len() <= EMAIL_MAX_LEN && local_len <= EMAIL_LOCAL_MAX_LEN && EMAIL_REGEX.is_match(s)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Form is read-only; enable edit mode first")]
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Required { field: String },
    InvalidEmail { field: String },
    PasswordMismatch { field: String },
}

impl FieldError {
    pub fn field(&self) -> &str {
        match self {
            FieldError::Required { field }
            | FieldError::InvalidEmail { field }
            | FieldError::PasswordMismatch { field } => field,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FieldError::Required { .. } => "This field is required",
            FieldError::InvalidEmail { .. } => "Please enter a valid email address",
            FieldError::PasswordMismatch { .. } => "Passwords do not match",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormModel {
    fields: Vec<FieldSpec>,
    values: BTreeMap<String, Value>,
    editing: bool,
    password_match: Option<(String, String)>,
}

impl FormModel {
    /// An editable form with every field empty
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        let values = fields
            .iter()
            .map(|f| (f.name.clone(), Value::String(String::new())))
            .collect();

        Self {
            fields,
            values,
            editing: true,
            password_match: None,
        }
    }

    /// A read-only form showing an existing record
    pub fn for_record(fields: Vec<FieldSpec>, record: &Value) -> Self {
        let mut form = Self::new(fields);
        form.patch(record);
        form.editing = false;
        form
    }

    /// Require `confirm` to equal `field`
    pub fn with_password_match(mut self, field: &str, confirm: &str) -> Self {
        self.password_match = Some((field.to_string(), confirm.to_string()));
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Switch between read-only and edit mode; returns the new mode
    pub fn toggle_edit(&mut self) -> bool {
        self.editing = !self.editing;
        self.editing
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> String {
        self.values.get(name).map(scalar_text).unwrap_or_default()
    }

    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), FormError> {
        if !self.editing {
            return Err(FormError::ReadOnly);
        }
        let slot = self
            .values
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        *slot = value;
        Ok(())
    }

    /// Copy matching fields from a record, regardless of edit mode.
    /// Unknown keys are ignored.
    pub fn patch(&mut self, record: &Value) {
        let Value::Object(map) = record else {
            return;
        };
        for (key, value) in map {
            if let Some(slot) = self.values.get_mut(key) {
                *slot = value.clone();
            }
        }
    }

    /// Current values as a JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        for field in &self.fields {
            let value = self.values.get(&field.name).unwrap_or(&Value::Null);
            for validator in &field.validators {
                match validator {
                    Validator::Required if is_empty_value(value) => {
                        errors.push(FieldError::Required {
                            field: field.name.clone(),
                        });
                    }
                    Validator::Email => {
                        if let Value::String(s) = value
                            && !s.is_empty()
                            && !is_email(s)
                        {
                            errors.push(FieldError::InvalidEmail {
                                field: field.name.clone(),
                            });
                        }
                    }
                    _ => {}
                }
            }
        }

        if let Some((field, confirm)) = &self.password_match
            && self.values.get(field) != self.values.get(confirm)
        {
            errors.push(FieldError::PasswordMismatch {
                field: confirm.clone(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn status_options() -> Vec<Value> {
    vec![
        serde_json::json!({"value": true, "label": "Active"}),
        serde_json::json!({"value": false, "label": "Inactive"}),
    ]
}

pub fn user_form(roles: &[String]) -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("username", "Username", FieldKind::Text).required(),
        FieldSpec::new("firstName", "First Name", FieldKind::Text).required(),
        FieldSpec::new("lastName", "Last Name", FieldKind::Text).required(),
        FieldSpec::new("email", "Email", FieldKind::Text).required().email(),
        FieldSpec::new("role", "Role", FieldKind::Dropdown)
            .required()
            .with_options(roles.iter().map(|r| Value::String(r.clone())).collect())
            .with_value_field(None),
        FieldSpec::new("active", "Status", FieldKind::Radio)
            .with_options(status_options())
            .with_display_fields(&["label"])
            .with_value_field(Some("value")),
    ]
}

pub fn customer_form(types: &[String]) -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("name", "Name", FieldKind::Text).required(),
        FieldSpec::new("identifierNo", "Identifier No", FieldKind::Text).required(),
        FieldSpec::new("type", "Type", FieldKind::Dropdown)
            .required()
            .with_options(types.iter().map(|t| Value::String(t.clone())).collect())
            .with_value_field(None),
        FieldSpec::new("email", "Email", FieldKind::Text).email(),
        FieldSpec::new("phone", "Phone", FieldKind::Text),
        FieldSpec::new("address", "Address", FieldKind::Textarea),
        FieldSpec::new("active", "Status", FieldKind::Radio)
            .with_options(status_options())
            .with_display_fields(&["label"])
            .with_value_field(Some("value")),
    ]
}

/// Ticket form. `users` and `customers` are the dropdown choices as
/// returned by the backend.
pub fn ticket_form(statuses: &[String], users: Vec<Value>, customers: Vec<Value>) -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("title", "Title", FieldKind::Text).required(),
        FieldSpec::new("status", "Status", FieldKind::Dropdown)
            .required()
            .with_options(statuses.iter().map(|s| Value::String(s.clone())).collect())
            .with_value_field(None),
        FieldSpec::new("dueDate", "Due Date", FieldKind::Date).required(),
        FieldSpec::new("assignee", "Assignee", FieldKind::Dropdown)
            .required()
            .with_options(users.clone())
            .with_display_fields(&["username", "fullName"])
            .with_value_field(Some("username")),
        FieldSpec::new("reporter", "Reporter", FieldKind::Dropdown)
            .required()
            .with_options(users)
            .with_display_fields(&["username", "fullName"])
            .with_value_field(Some("username")),
        FieldSpec::new("requestBy", "Requested By", FieldKind::Dropdown)
            .required()
            .with_options(customers)
            .with_display_fields(&["name", "identifierNo"]),
        FieldSpec::new("description", "Description", FieldKind::Editor).required(),
    ]
}

pub fn reset_password_form() -> FormModel {
    FormModel::new(vec![
        FieldSpec::new("newPassword", "New Password", FieldKind::Password).required(),
        FieldSpec::new("confirmPassword", "Confirm Password", FieldKind::Password).required(),
    ])
    .with_password_match("newPassword", "confirmPassword")
}
