//! Optional header records carried alongside a map.

use std::fmt;

use serde::{Deserialize, Serialize};
use skymap_pixel::SkyError;

/// Record names written by the serializer itself. User records may not
/// shadow them.
pub const RESERVED_KEYS: [&str; 9] = [
    "PIXTYPE", "NSIDE", "ORDERING", "COORDSYS", "INDXSCHM", "OBJECT", "GRAIN", "FIRSTPIX",
    "LASTPIX",
];

/// One `name = value / comment` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRecord<V> {
    /// Key name; reserved names are rejected on insert.
    pub name: String,
    pub value: V,
    /// Free-text comment; may be empty.
    pub comment: String,
}

/// Ordered string, integer and float records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataKeys {
    strings: Vec<KeyRecord<String>>,
    ints: Vec<KeyRecord<i64>>,
    floats: Vec<KeyRecord<f64>>,
}

fn check_name(name: &str) -> Result<(), SkyError> {
    if name.trim().is_empty() {
        return Err(SkyError::Serialization("empty key name".to_string()));
    }
    if RESERVED_KEYS.iter().any(|r| r.eq_ignore_ascii_case(name.trim())) {
        return Err(SkyError::Serialization(format!("key {name} is reserved")));
    }
    Ok(())
}

impl MetadataKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_str(&mut self, name: &str, value: &str, comment: &str) -> Result<(), SkyError> {
        check_name(name)?;
        self.strings.push(KeyRecord {
            name: name.to_string(),
            value: value.to_string(),
            comment: comment.to_string(),
        });
        Ok(())
    }

    pub fn add_int(&mut self, name: &str, value: i64, comment: &str) -> Result<(), SkyError> {
        check_name(name)?;
        self.ints.push(KeyRecord {
            name: name.to_string(),
            value,
            comment: comment.to_string(),
        });
        Ok(())
    }

    pub fn add_float(&mut self, name: &str, value: f64, comment: &str) -> Result<(), SkyError> {
        check_name(name)?;
        self.floats.push(KeyRecord {
            name: name.to_string(),
            value,
            comment: comment.to_string(),
        });
        Ok(())
    }

    /// Delete every record called `name`, whatever its kind. Returns how many
    /// were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.len();
        self.strings.retain(|r| r.name != name);
        self.ints.retain(|r| r.name != name);
        self.floats.retain(|r| r.name != name);
        before - self.len()
    }

    /// First string record called `name`, as `(value, comment)`.
    #[must_use]
    pub fn find_str(&self, name: &str) -> Option<(&str, &str)> {
        self.strings
            .iter()
            .find(|r| r.name == name)
            .map(|r| (r.value.as_str(), r.comment.as_str()))
    }

    /// First integer record called `name`, as `(value, comment)`.
    #[must_use]
    pub fn find_int(&self, name: &str) -> Option<(i64, &str)> {
        self.ints
            .iter()
            .find(|r| r.name == name)
            .map(|r| (r.value, r.comment.as_str()))
    }

    /// First float record called `name`, as `(value, comment)`.
    #[must_use]
    pub fn find_float(&self, name: &str) -> Option<(f64, &str)> {
        self.floats
            .iter()
            .find(|r| r.name == name)
            .map(|r| (r.value, r.comment.as_str()))
    }

    /// String records in insertion order.
    pub fn strings(&self) -> &[KeyRecord<String>] {
        &self.strings
    }

    /// Integer records in insertion order.
    pub fn ints(&self) -> &[KeyRecord<i64>] {
        &self.ints
    }

    /// Float records in insertion order.
    pub fn floats(&self) -> &[KeyRecord<f64>] {
        &self.floats
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len() + self.ints.len() + self.floats.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.strings.clear();
        self.ints.clear();
        self.floats.clear();
    }
}

impl fmt::Display for MetadataKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {} Optional Keys", self.len())?;
        for r in &self.strings {
            writeln!(f, "# {} = {} / {}", r.name, r.value, r.comment)?;
        }
        for r in &self.ints {
            writeln!(f, "# {} = {} / {}", r.name, r.value, r.comment)?;
        }
        for r in &self.floats {
            writeln!(f, "# {} = {} / {}", r.name, r.value, r.comment)?;
        }
        Ok(())
    }
}
