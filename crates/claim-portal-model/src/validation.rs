// SPDX-License-Identifier: Apache-2.0

use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub problem: String,
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` {}", self.field, self.problem)
    }
}

/// Every field problem found in one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub subject: String,
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    #[must_use]
    pub fn single(subject: &str, field: &str, problem: impl Into<String>) -> Self {
        Self {
            subject: subject.to_string(),
            issues: vec![FieldIssue {
                field: field.to_string(),
                problem: problem.into(),
            }],
        }
    }

    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: ", self.subject)?;
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Reads typed fields out of a JSON object, recording each problem instead
/// of returning early. Call [`FieldReader::finish`] once all fields are read.
pub struct FieldReader<'a> {
    subject: &'static str,
    object: Option<&'a Map<String, Value>>,
    issues: Vec<FieldIssue>,
}

impl<'a> FieldReader<'a> {
    #[must_use]
    pub fn new(subject: &'static str, value: &'a Value) -> Self {
        let mut issues = Vec::new();
        let object = value.as_object();
        if object.is_none() {
            issues.push(FieldIssue {
                field: "$".to_string(),
                problem: "must be a JSON object".to_string(),
            });
        }
        Self {
            subject,
            object,
            issues,
        }
    }

    #[must_use]
    pub fn object(&self) -> Option<&'a Map<String, Value>> {
        self.object
    }

    pub fn issue(&mut self, field: &str, problem: impl Into<String>) {
        self.issues.push(FieldIssue {
            field: field.to_string(),
            problem: problem.into(),
        });
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.object.and_then(|o| o.get(field))
    }

    pub fn required_str(&mut self, field: &str) -> Option<String> {
        match self.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::String(_)) => {
                self.issue(field, "must not be empty");
                None
            }
            Some(Value::Null) | None => {
                if self.object.is_some() {
                    self.issue(field, "is missing");
                }
                None
            }
            Some(_) => {
                self.issue(field, "must be a string");
                None
            }
        }
    }

    /// Absent and `null` both read as `None`; any other non-string is an issue.
    pub fn optional_str(&mut self, field: &str) -> Option<String> {
        match self.get(field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(_) => {
                self.issue(field, "must be a string or null");
                None
            }
        }
    }

    pub fn required_u64(&mut self, field: &str) -> Option<u64> {
        match self.get(field) {
            Some(v) => match v.as_u64() {
                Some(n) => Some(n),
                None => {
                    self.issue(field, "must be a non-negative integer");
                    None
                }
            },
            None => {
                if self.object.is_some() {
                    self.issue(field, "is missing");
                }
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                subject: self.subject.to_string(),
                issues: self.issues,
            })
        }
    }
}
