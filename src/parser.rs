/// This module provides the `StringsFileParser` struct, which accumulates the
/// entries of one or more `.strings` tables and builds the template context
/// from them.
///
/// Entries keep the order in which their keys were first seen. A key seen
/// again, in the same table or a later one, replaces the earlier entry in
/// place, so the last definition wins.
///
use std::{collections::HashMap, io::Read, path::Path};

use encoding_rs::Encoding;

use crate::{
    context::{ContextOutput, build_context},
    error::Error,
    formats::StringsFormat,
    options::{ContextOptions, DEFAULT_ENUM_NAME},
    traits::Parser,
    types::Entry,
};

/// Accumulates localization entries and turns them into a template context.
#[derive(Debug, Clone, Default)]
pub struct StringsFileParser {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    encoding: Option<&'static Encoding>,
}

impl StringsFileParser {
    /// Creates a new, empty `StringsFileParser`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the encoding used for tables that carry no byte order mark.
    ///
    /// Tables without a BOM are read as UTF-8 unless an encoding is set here,
    /// e.g. `Encoding::for_label(b"windows-1252")`.
    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Adds an entry, replacing any entry with the same key in place.
    pub fn add_entry(&mut self, entry: Entry) {
        match self.index.get(entry.key()) {
            Some(&position) => {
                tracing::debug!(key = entry.key(), "overriding duplicate key");
                self.entries[position] = entry;
            }
            None => {
                self.index.insert(entry.key().to_string(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Parses a `.strings` file and accumulates its entries.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the whole file parsed, or an [`Error::File`] naming the
    /// path otherwise. A failed parse adds nothing.
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let added = StringsFormat::read_from(path, self.encoding)
            .and_then(entries_from)
            .map_err(|err| err.in_file(path))?;

        tracing::debug!(path = %path.display(), entries = added.len(), "parsed strings file");
        self.extend(added);
        Ok(())
    }

    /// Parses `.strings` content from any reader and accumulates its entries.
    pub fn parse_reader<R: Read>(&mut self, reader: R) -> Result<(), Error> {
        let added = entries_from(StringsFormat::from_reader_with_encoding(
            reader,
            self.encoding,
        )?)?;
        self.extend(added);
        Ok(())
    }

    /// Parses in-memory `.strings` content and accumulates its entries.
    pub fn parse_str(&mut self, content: &str) -> Result<(), Error> {
        let added = entries_from(StringsFormat::from_str(content)?)?;
        self.extend(added);
        Ok(())
    }

    /// Moves every entry of `other` into this parser, last definition winning.
    pub fn merge(&mut self, other: StringsFileParser) {
        self.extend(other.entries);
    }

    /// Returns all entries in accumulation order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Finds an entry by its exact key.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&position| &self.entries[position])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds the template context, naming its root `enum_name` or
    /// [`DEFAULT_ENUM_NAME`].
    pub fn stencil_context(&self, enum_name: Option<&str>) -> ContextOutput {
        let options =
            ContextOptions::new().with_enum_name(enum_name.unwrap_or(DEFAULT_ENUM_NAME));
        self.stencil_context_with(&options)
    }

    /// Builds the template context with explicit options.
    ///
    /// The accumulated entries are not modified; calling this repeatedly
    /// yields identical contexts.
    pub fn stencil_context_with(&self, options: &ContextOptions) -> ContextOutput {
        build_context(&self.entries, options)
    }

    fn extend(&mut self, entries: impl IntoIterator<Item = Entry>) {
        for entry in entries {
            self.add_entry(entry);
        }
    }
}

/// Converts every pair of a table, so a bad format string rejects the table
/// as a whole.
fn entries_from(format: StringsFormat) -> Result<Vec<Entry>, Error> {
    format
        .pairs
        .into_iter()
        .map(|pair| {
            let entry = Entry::new(pair.key, pair.value)
                .map_err(|err| Error::parse(pair.line, pair.column, err.to_string()))?;
            Ok(match pair.comment {
                Some(comment) => entry.with_comment(comment),
                None => entry,
            })
        })
        .collect()
}
