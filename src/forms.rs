//! Declarative form validation and sanitization.
//!
//! Inbound form bodies are held as a multi-valued field map. Each
//! entity's rules and sanitizers are plain data (`Rule`, `Sanitizer`)
//! interpreted by a single evaluator, so they can be tested in
//! isolation from request handling. Sanitizers mutate field values in
//! place and run regardless of the validation outcome.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Calendar date format accepted from form fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Multi-valued form field map. Every field is a sequence of values;
/// a scalar submission is a one-element sequence, an absent field an
/// empty one.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
}

impl FormData {
    /// Build from decoded urlencoded pairs, preserving repeated keys.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            fields.entry(key).or_default().push(value);
        }
        Self { fields }
    }

    /// First value of a field, or "" when absent.
    pub fn first(&self, field: &str) -> &str {
        self.fields
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All values of a field; empty when absent.
    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Coerce a field that may arrive absent, as a single scalar, or
    /// repeated into a uniform sequence before validation runs.
    pub fn normalize_list(&mut self, field: &str) {
        self.fields.entry(field.to_string()).or_default();
    }

    /// Optional date value: empty string maps to None, a well-formed
    /// date to Some. Call after the `ToDate` sanitizer has run.
    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        let value = self.first(field).trim();
        if value.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
    }

    fn values_mut(&mut self, field: &str) -> Option<&mut Vec<String>> {
        self.fields.get_mut(field)
    }
}

/// A single field-level check
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Non-empty after trimming surrounding whitespace
    Required,
    /// At most this many characters
    MaxLength(usize),
    /// Empty, or a well-formed calendar date
    OptionalDate,
}

/// Declarative validation rule: field, check, human-readable message
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
}

/// Validation error attributed to one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Evaluate every rule against the form, accumulating errors in rule
/// order. Rules never abort the pass.
pub fn validate(form: &FormData, rules: &[Rule]) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for rule in rules {
        let value = form.first(rule.field);
        let ok = match rule.check {
            Check::Required => !value.trim().is_empty(),
            Check::MaxLength(max) => value.chars().count() <= max,
            Check::OptionalDate => {
                let value = value.trim();
                value.is_empty() || NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
            }
        };
        if !ok {
            errors.push(FieldError {
                field: rule.field.to_string(),
                message: rule.message.to_string(),
            });
        }
    }
    errors
}

/// Which fields a sanitizer applies to
#[derive(Debug, Clone, Copy)]
pub enum Target {
    /// Every submitted field
    All,
    Field(&'static str),
}

/// A single in-place value transform
#[derive(Debug, Clone, Copy)]
pub enum Transform {
    /// Strip surrounding whitespace
    Trim,
    /// Escape markup-significant characters
    Escape,
    /// Reformat a parseable date to the canonical form; leave other
    /// values untouched (validation has already flagged them)
    ToDate,
}

/// Declarative sanitization step
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer {
    pub target: Target,
    pub transform: Transform,
}

/// Apply every sanitizer, in order, mutating field values in place.
pub fn sanitize(form: &mut FormData, sanitizers: &[Sanitizer]) {
    for sanitizer in sanitizers {
        match sanitizer.target {
            Target::All => {
                for values in form.fields.values_mut() {
                    for value in values.iter_mut() {
                        apply(value, sanitizer.transform);
                    }
                }
            }
            Target::Field(name) => {
                if let Some(values) = form.values_mut(name) {
                    for value in values.iter_mut() {
                        apply(value, sanitizer.transform);
                    }
                }
            }
        }
    }
}

fn apply(value: &mut String, transform: Transform) {
    match transform {
        Transform::Trim => {
            let trimmed = value.trim().to_string();
            *value = trimmed;
        }
        Transform::Escape => {
            let escaped = escape(value);
            *value = escaped;
        }
        Transform::ToDate => {
            if let Ok(date) = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) {
                *value = date.format(DATE_FORMAT).to_string();
            }
        }
    }
}

/// Escape markup-significant characters the way the form templates
/// expect them back.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}
