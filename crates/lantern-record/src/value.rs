//! The keyed record — the flat wire format every persisted entity encodes
//! into.
//!
//! Readers are lenient by policy: a missing key, an explicit nil marker, or
//! a wrong-typed value all resolve to the caller-supplied default. Schema
//! mismatches lose data instead of failing — the client prefers a degraded
//! entity over a hard error on load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single value slot in a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordValue {
    /// Explicit absent marker. Encoders write this for `None` optionals
    /// instead of omitting the key, so a decoder can distinguish "field
    /// absent" from "key unknown to the writer" across schema revisions.
    Nil,
    Int32(i32),
    Int64(i64),
    String(String),
    Bytes(Vec<u8>),
    Record(Record),
    Array(Vec<Record>),
    Int64Array(Vec<i64>),
}

/// Flat, ordered-key map of [`RecordValue`]s.
///
/// Keys are short stable strings chosen by each entity. Booleans are stored
/// as `Int32` 0/1, matching the wire data already on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, RecordValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Write an explicit absent marker for `key`.
    pub fn set_nil(&mut self, key: &str) {
        self.fields.insert(key.to_owned(), RecordValue::Nil);
    }

    pub fn set_i32(&mut self, key: &str, value: i32) {
        self.fields.insert(key.to_owned(), RecordValue::Int32(value));
    }

    pub fn set_i64(&mut self, key: &str, value: i64) {
        self.fields.insert(key.to_owned(), RecordValue::Int64(value));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_i32(key, i32::from(value));
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.fields
            .insert(key.to_owned(), RecordValue::String(value.to_owned()));
    }

    pub fn set_bytes(&mut self, key: &str, value: &[u8]) {
        self.fields
            .insert(key.to_owned(), RecordValue::Bytes(value.to_vec()));
    }

    pub fn set_record(&mut self, key: &str, value: Record) {
        self.fields.insert(key.to_owned(), RecordValue::Record(value));
    }

    pub fn set_array(&mut self, key: &str, value: Vec<Record>) {
        self.fields.insert(key.to_owned(), RecordValue::Array(value));
    }

    pub fn set_i64_array(&mut self, key: &str, value: Vec<i64>) {
        self.fields
            .insert(key.to_owned(), RecordValue::Int64Array(value));
    }

    pub fn set_opt_i32(&mut self, key: &str, value: Option<i32>) {
        match value {
            Some(value) => self.set_i32(key, value),
            None => self.set_nil(key),
        }
    }

    pub fn set_opt_i64(&mut self, key: &str, value: Option<i64>) {
        match value {
            Some(value) => self.set_i64(key, value),
            None => self.set_nil(key),
        }
    }

    pub fn set_opt_string(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(value) => self.set_string(key, value),
            None => self.set_nil(key),
        }
    }

    pub fn set_opt_record(&mut self, key: &str, value: Option<Record>) {
        match value {
            Some(value) => self.set_record(key, value),
            None => self.set_nil(key),
        }
    }

    pub fn get_i32(&self, key: &str, or_else: i32) -> i32 {
        self.opt_i32(key).unwrap_or(or_else)
    }

    pub fn opt_i32(&self, key: &str) -> Option<i32> {
        match self.fields.get(key) {
            Some(RecordValue::Int32(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_i64(&self, key: &str, or_else: i64) -> i64 {
        self.opt_i64(key).unwrap_or(or_else)
    }

    pub fn opt_i64(&self, key: &str) -> Option<i64> {
        match self.fields.get(key) {
            Some(RecordValue::Int64(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str, or_else: bool) -> bool {
        self.opt_i32(key).map_or(or_else, |value| value != 0)
    }

    pub fn get_str(&self, key: &str, or_else: &str) -> String {
        self.opt_str(key).unwrap_or(or_else).to_owned()
    }

    pub fn opt_str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(RecordValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn opt_bytes(&self, key: &str) -> Option<&[u8]> {
        match self.fields.get(key) {
            Some(RecordValue::Bytes(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_record(&self, key: &str) -> Option<&Record> {
        match self.fields.get(key) {
            Some(RecordValue::Record(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_array(&self, key: &str) -> &[Record] {
        match self.fields.get(key) {
            Some(RecordValue::Array(value)) => value,
            _ => &[],
        }
    }

    pub fn get_i64_array(&self, key: &str) -> &[i64] {
        match self.fields.get(key) {
            Some(RecordValue::Int64Array(value)) => value,
            _ => &[],
        }
    }
}
