//! Traits for reading localization tables in stringsgen.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use encoding_rs::Encoding;

use crate::error::Error;

/// A trait for parsing one localization table from any byte source.
///
/// # Example
///
/// ```rust,no_run
/// use stringsgen::{formats::StringsFormat, traits::Parser};
///
/// let format = StringsFormat::read_from("en.lproj/Localizable.strings", None)?;
/// println!("{} pairs", format.pairs.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    ///
    /// `encoding` is used for content without a byte order mark; `None`
    /// means UTF-8.
    fn from_reader_with_encoding<R: Read>(
        reader: R,
        encoding: Option<&'static Encoding>,
    ) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse already decoded content.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(
        path: P,
        encoding: Option<&'static Encoding>,
    ) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        Self::from_reader_with_encoding(BufReader::new(file), encoding)
    }
}
