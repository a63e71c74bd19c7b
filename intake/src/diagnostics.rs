//! Diagnostics registry for live tuning and feedback.
//!
//! Components expose named getter/setter pairs by registering them into a
//! `DiagnosticsRegistry<T>`, typed over the component. Entries are either
//! tunable (read/write) or feedback (read-only). The registry is built at
//! startup and passed around by value. No global state, no reflection.

use intake_common::hal::driver::HalError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Error types for diagnostics access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagnosticsError {
    /// No entry registered under this name
    #[error("Diagnostic entry not found: {0}")]
    NotFound(String),

    /// Entry is feedback-only
    #[error("Diagnostic entry is read-only: {0}")]
    ReadOnly(String),

    /// Written value has the wrong type
    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Getter touched hardware and the read failed
    #[error(transparent)]
    Hal(#[from] HalError),

    /// Snapshot could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Value exchanged with a diagnostics entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosticValue {
    Bool(bool),
    Number(f64),
    /// Left/right pair, serialized as a two-element array.
    Pair(f64, f64),
}

impl DiagnosticValue {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Pair(..) => "pair",
        }
    }

    /// Extract a boolean.
    pub fn as_bool(&self) -> Result<bool, DiagnosticsError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(DiagnosticsError::TypeMismatch {
                expected: "bool",
                found: other.type_name(),
            }),
        }
    }

    /// Extract a number.
    pub fn as_number(&self) -> Result<f64, DiagnosticsError> {
        match self {
            Self::Number(n) => Ok(*n),
            other => Err(DiagnosticsError::TypeMismatch {
                expected: "number",
                found: other.type_name(),
            }),
        }
    }
}

/// Getter function type.
pub type Getter<T> = fn(&T) -> Result<DiagnosticValue, DiagnosticsError>;

/// Setter function type.
pub type Setter<T> = fn(&mut T, DiagnosticValue) -> Result<(), DiagnosticsError>;

/// Access class of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Readable and writable by tuning tools.
    Tunable,
    /// Read-only.
    Feedback,
}

struct Entry<T> {
    doc: &'static str,
    getter: Getter<T>,
    setter: Option<Setter<T>>,
}

/// One entry of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReading {
    pub name: &'static str,
    pub kind: EntryKind,
    /// Value, absent when the getter failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<DiagnosticValue>,
    /// Getter error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Registry of diagnostics entries for component type `T`.
pub struct DiagnosticsRegistry<T> {
    entries: BTreeMap<&'static str, Entry<T>>,
}

impl<T> DiagnosticsRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a read/write entry.
    ///
    /// # Panics
    /// Panics if an entry with the same name is already registered.
    pub fn register_tunable(
        &mut self,
        name: &'static str,
        doc: &'static str,
        getter: Getter<T>,
        setter: Setter<T>,
    ) {
        self.insert(name, doc, getter, Some(setter));
    }

    /// Register a read-only entry.
    ///
    /// # Panics
    /// Panics if an entry with the same name is already registered.
    pub fn register_feedback(&mut self, name: &'static str, doc: &'static str, getter: Getter<T>) {
        self.insert(name, doc, getter, None);
    }

    fn insert(
        &mut self,
        name: &'static str,
        doc: &'static str,
        getter: Getter<T>,
        setter: Option<Setter<T>>,
    ) {
        if self.entries.contains_key(name) {
            panic!("Diagnostic '{name}' is already registered");
        }
        debug!(
            "Registered diagnostic '{}' ({})",
            name,
            if setter.is_some() { "tunable" } else { "feedback" }
        );
        self.entries.insert(
            name,
            Entry {
                doc,
                getter,
                setter,
            },
        );
    }

    /// Read entry `name` from `target`.
    ///
    /// # Errors
    /// `NotFound` for unknown names, `Hal` when the getter's hardware read fails.
    pub fn read(&self, target: &T, name: &str) -> Result<DiagnosticValue, DiagnosticsError> {
        let entry = self.entry(name)?;
        (entry.getter)(target)
    }

    /// Write `value` to tunable entry `name` on `target`.
    ///
    /// # Errors
    /// `NotFound`, `ReadOnly` for feedback entries, `TypeMismatch` when the
    /// setter rejects the value type.
    pub fn write(
        &self,
        target: &mut T,
        name: &str,
        value: DiagnosticValue,
    ) -> Result<(), DiagnosticsError> {
        let entry = self.entry(name)?;
        let setter = entry
            .setter
            .ok_or_else(|| DiagnosticsError::ReadOnly(name.to_string()))?;
        setter(target, value)?;
        debug!("Diagnostic '{}' set to {:?}", name, value);
        Ok(())
    }

    /// Access class of entry `name`.
    pub fn kind(&self, name: &str) -> Option<EntryKind> {
        self.entries.get(name).map(entry_kind)
    }

    /// Documentation string of entry `name`.
    pub fn doc(&self, name: &str) -> Option<&'static str> {
        self.entries.get(name).map(|e| e.doc)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read every entry. Getter failures are recorded per entry rather than
    /// aborting the snapshot.
    pub fn snapshot(&self, target: &T) -> Vec<DiagnosticReading> {
        self.entries
            .iter()
            .map(|(name, entry)| {
                let (value, error) = match (entry.getter)(target) {
                    Ok(v) => (Some(v), None),
                    Err(e) => (None, Some(e.to_string())),
                };
                DiagnosticReading {
                    name: *name,
                    kind: entry_kind(entry),
                    value,
                    error,
                }
            })
            .collect()
    }

    /// Snapshot encoded as a JSON array.
    pub fn snapshot_json(&self, target: &T) -> Result<String, DiagnosticsError> {
        serde_json::to_string(&self.snapshot(target))
            .map_err(|e| DiagnosticsError::Serialization(e.to_string()))
    }

    fn entry(&self, name: &str) -> Result<&Entry<T>, DiagnosticsError> {
        self.entries
            .get(name)
            .ok_or_else(|| DiagnosticsError::NotFound(name.to_string()))
    }
}

fn entry_kind<T>(entry: &Entry<T>) -> EntryKind {
    if entry.setter.is_some() {
        EntryKind::Tunable
    } else {
        EntryKind::Feedback
    }
}

impl<T> Default for DiagnosticsRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Gauge {
        enabled: bool,
        gain: f64,
        sensor_ok: bool,
    }

    fn registry() -> DiagnosticsRegistry<Gauge> {
        let mut reg = DiagnosticsRegistry::<Gauge>::new();
        reg.register_tunable(
            "gauge/enabled",
            "Gauge enabled",
            |p| Ok(DiagnosticValue::Bool(p.enabled)),
            |p, v| {
                p.enabled = v.as_bool()?;
                Ok(())
            },
        );
        reg.register_tunable(
            "gauge/gain",
            "Gauge gain",
            |p| Ok(DiagnosticValue::Number(p.gain)),
            |p, v| {
                p.gain = v.as_number()?;
                Ok(())
            },
        );
        reg.register_feedback("gauge/reading", "Sensor reading", |p| {
            if p.sensor_ok {
                Ok(DiagnosticValue::Pair(0.1, 0.2))
            } else {
                Err(HalError::Disconnected("gauge sensor".to_string()).into())
            }
        });
        reg
    }

    #[test]
    fn registry_read_and_write() {
        let reg = registry();
        let mut gauge = Gauge::default();

        reg.write(&mut gauge, "gauge/enabled", DiagnosticValue::Bool(true))
            .unwrap();
        assert!(gauge.enabled);
        assert_eq!(
            reg.read(&gauge, "gauge/enabled"),
            Ok(DiagnosticValue::Bool(true))
        );

        reg.write(&mut gauge, "gauge/gain", DiagnosticValue::Number(2.5))
            .unwrap();
        assert_eq!(gauge.gain, 2.5);
    }

    #[test]
    fn registry_not_found() {
        let reg = registry();
        let gauge = Gauge::default();
        assert!(matches!(
            reg.read(&gauge, "gauge/missing"),
            Err(DiagnosticsError::NotFound(_))
        ));
    }

    #[test]
    fn registry_feedback_is_read_only() {
        let reg = registry();
        let mut gauge = Gauge {
            sensor_ok: true,
            ..Gauge::default()
        };
        assert_eq!(reg.kind("gauge/reading"), Some(EntryKind::Feedback));
        assert_eq!(
            reg.write(&mut gauge, "gauge/reading", DiagnosticValue::Bool(true)),
            Err(DiagnosticsError::ReadOnly("gauge/reading".to_string()))
        );
    }

    #[test]
    fn registry_type_mismatch_leaves_target_untouched() {
        let reg = registry();
        let mut gauge = Gauge::default();
        let err = reg
            .write(&mut gauge, "gauge/enabled", DiagnosticValue::Number(1.0))
            .unwrap_err();
        assert_eq!(
            err,
            DiagnosticsError::TypeMismatch {
                expected: "bool",
                found: "number"
            }
        );
        assert!(!gauge.enabled);
    }

    #[test]
    fn registry_hal_error_propagates_from_getter() {
        let reg = registry();
        let gauge = Gauge::default();
        assert!(matches!(
            reg.read(&gauge, "gauge/reading"),
            Err(DiagnosticsError::Hal(HalError::Disconnected(_)))
        ));
    }

    #[test]
    fn registry_snapshot_records_errors() {
        let reg = registry();
        let gauge = Gauge::default();

        let snapshot = reg.snapshot(&gauge);
        assert_eq!(snapshot.len(), 3);
        let reading = snapshot
            .iter()
            .find(|r| r.name == "gauge/reading")
            .unwrap();
        assert!(reading.value.is_none());
        assert!(reading.error.as_deref().unwrap().contains("gauge sensor"));
    }

    #[test]
    fn registry_snapshot_json() {
        let reg = registry();
        let gauge = Gauge {
            enabled: true,
            gain: 0.5,
            sensor_ok: true,
        };

        let json = reg.snapshot_json(&gauge).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["name"], "gauge/enabled");
        assert_eq!(entries[0]["kind"], "tunable");
        assert_eq!(entries[0]["value"], true);
        assert_eq!(entries[2]["value"], serde_json::json!([0.1, 0.2]));
    }

    #[test]
    fn registry_names_sorted() {
        let reg = registry();
        assert_eq!(
            reg.names(),
            vec!["gauge/enabled", "gauge/gain", "gauge/reading"]
        );
        assert_eq!(reg.doc("gauge/gain"), Some("Gauge gain"));
        assert_eq!(reg.len(), 3);
        assert!(!reg.is_empty());
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn registry_duplicate_panics() {
        let mut reg = registry();
        reg.register_feedback("gauge/gain", "dup", |p| Ok(DiagnosticValue::Number(p.gain)));
    }
}
