//! Core types for stringsgen.
//! The `.strings` parser produces these; the context builder consumes them.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::Error, placeholder};

/// The argument type inferred for one printf-style placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaceholderType {
    /// `%@`
    Object,
    /// `%f`, `%e`, `%g`, `%a`
    Float,
    /// `%d`, `%i`, `%o`, `%u`, `%x`
    Int,
    /// `%c`
    Char,
    /// `%s`
    CString,
    /// A position nothing classified: a gap between positional placeholders,
    /// or a conversion such as `%p` without a dedicated type.
    Unknown,
}

impl PlaceholderType {
    /// Infers the ordered argument types of a format string.
    ///
    /// See [`crate::placeholder::placeholders`].
    pub fn placeholders(format: &str) -> Result<Vec<PlaceholderType>, Error> {
        placeholder::placeholders(format)
    }

    /// Classifies a printf conversion character, case-insensitively.
    ///
    /// Returns `None` when `c` does not terminate a conversion at all.
    pub fn from_conversion(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            '@' => Some(PlaceholderType::Object),
            'a' | 'e' | 'f' | 'g' => Some(PlaceholderType::Float),
            'd' | 'i' | 'o' | 'u' | 'x' => Some(PlaceholderType::Int),
            'c' => Some(PlaceholderType::Char),
            's' => Some(PlaceholderType::CString),
            'p' | 'n' => Some(PlaceholderType::Unknown),
            _ => None,
        }
    }

    /// The Swift parameter type generated accessors use for this placeholder.
    pub fn swift_type(&self) -> &'static str {
        match self {
            PlaceholderType::Object => "String",
            PlaceholderType::Float => "Float",
            PlaceholderType::Int => "Int",
            PlaceholderType::Char => "Character",
            PlaceholderType::CString => "UnsafePointer<unichar>",
            PlaceholderType::Unknown => "Any",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            PlaceholderType::Object => "object",
            PlaceholderType::Float => "float",
            PlaceholderType::Int => "int",
            PlaceholderType::Char => "char",
            PlaceholderType::CString => "cString",
            PlaceholderType::Unknown => "unknown",
        }
    }
}

impl Display for PlaceholderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaceholderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OBJECT" => Ok(PlaceholderType::Object),
            "FLOAT" => Ok(PlaceholderType::Float),
            "INT" => Ok(PlaceholderType::Int),
            "CHAR" => Ok(PlaceholderType::Char),
            "CSTRING" | "C_STRING" => Ok(PlaceholderType::CString),
            "UNKNOWN" => Ok(PlaceholderType::Unknown),
            _ => Err(format!("Unknown placeholder type: {}", s)),
        }
    }
}

/// A single key/translation record of a strings table.
///
/// The placeholder types always describe the current translation: they are
/// either supplied explicitly or re-derived whenever the translation changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    translation: String,
    comment: Option<String>,
    types: Vec<PlaceholderType>,
}

impl Entry {
    /// Creates an entry whose placeholder types are inferred from `translation`.
    pub fn new(key: impl Into<String>, translation: impl Into<String>) -> Result<Self, Error> {
        let translation = translation.into();
        let types = PlaceholderType::placeholders(&translation)?;
        Self::with_types(key, translation, types)
    }

    /// Creates an entry with explicit placeholder types; no inference happens.
    pub fn with_types(
        key: impl Into<String>,
        translation: impl Into<String>,
        types: impl IntoIterator<Item = PlaceholderType>,
    ) -> Result<Self, Error> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::InvalidEntry("key must not be empty".to_string()));
        }
        Ok(Entry {
            key,
            translation: translation.into(),
            comment: None,
            types: types.into_iter().collect(),
        })
    }

    /// Attaches a translator comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn types(&self) -> &[PlaceholderType] {
        &self.types
    }

    /// Replaces the translation and re-derives its placeholder types.
    ///
    /// On error the entry is left unchanged.
    pub fn set_translation(&mut self, translation: impl Into<String>) -> Result<(), Error> {
        let translation = translation.into();
        self.types = PlaceholderType::placeholders(&translation)?;
        self.translation = translation;
        Ok(())
    }

    /// Splits the key into its namespace segments.
    pub fn key_segments(&self, delimiter: char) -> impl Iterator<Item = &str> {
        self.key.split(delimiter)
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entry {{ key: {}, translation: {}, types: {:?} }}",
            self.key, self.translation, self.types
        )
    }
}
