//! Support for Apple `.strings` localization tables.
//!
//! Decodes the raw bytes (BOM-aware, UTF-16 included) and tokenizes the
//! old-style property list syntax into ordered key/value [`Pair`]s:
//!
//! ```text
//! /* Title of the alert */
//! "alert.title" = "Warning";
//! "alert.body" = "Line one
//! line two with a \"quote\"";
//! ```

use std::io::Read;

use encoding_rs::{DecoderResult, Encoding, UTF_8};

use crate::{error::Error, traits::Parser};

/// Represents an Apple `.strings` table as written, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format {
    /// All key-value pairs in file order.
    pub pairs: Vec<Pair>,
}

/// A single key-value pair in a `.strings` file, possibly with an associated comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    /// The key, with escapes decoded.
    pub key: String,
    /// The value, with escapes decoded. Embedded newlines are kept.
    pub value: String,
    /// Text of the last comment immediately preceding the pair, markers removed.
    ///
    /// Trailing comments on the same line as a pair belong to the next pair.
    pub comment: Option<String>,
    /// 1-based line of the key.
    pub line: usize,
    /// 1-based column of the key.
    pub column: usize,
}

impl Parser for Format {
    /// Decodes and parses a table, falling back to `encoding` when the
    /// content carries no byte order mark.
    ///
    /// Without a fallback encoding the content must be valid UTF-8. Bytes the
    /// chosen encoding cannot decode are a parse error, never replaced.
    fn from_reader_with_encoding<R: Read>(
        reader: R,
        encoding: Option<&'static Encoding>,
    ) -> Result<Self, Error> {
        let content = decode(reader, encoding)?;
        Self::from_str(&content)
    }

    fn from_str(content: &str) -> Result<Self, Error> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut scanner = Scanner::new(content);
        let mut pairs = Vec::new();

        loop {
            let comment = scanner.skip_trivia()?;
            if scanner.peek().is_none() {
                break;
            }
            pairs.push(scanner.pair(comment)?);
        }

        Ok(Format { pairs })
    }
}

fn decode<R: Read>(mut reader: R, fallback: Option<&'static Encoding>) -> Result<String, Error> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(Error::Io)?;

    // A BOM always wins over the declared encoding
    let (encoding, bom_length) =
        Encoding::for_bom(&bytes).unwrap_or((fallback.unwrap_or(UTF_8), 0));
    let body = &bytes[bom_length..];

    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(body.len())
        .ok_or_else(|| Error::parse(1, 1, "table too large to decode"))?;
    let mut content = String::with_capacity(capacity);
    let (result, _) = decoder.decode_to_string_without_replacement(body, &mut content, true);

    match result {
        DecoderResult::InputEmpty => Ok(content),
        // `content` holds everything before the offending bytes
        DecoderResult::Malformed(..) | DecoderResult::OutputFull => {
            let (line, column) = end_position(&content);
            Err(Error::parse(
                line,
                column,
                format!("invalid {} sequence", encoding.name()),
            ))
        }
    }
}

/// 1-based line and column just past the end of `text`.
fn end_position(text: &str) -> (usize, usize) {
    let line = text.matches('\n').count() + 1;
    let line_start = text.rfind('\n').map_or(0, |pos| pos + 1);
    (line, text[line_start..].chars().count() + 1)
}

fn is_unquoted(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':' | '-')
}

struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    fn new(content: &'a str) -> Self {
        Scanner {
            chars: content.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(self.line, self.column, message)
    }

    /// Skips whitespace and comments, returning the text of the last comment.
    fn skip_trivia(&mut self) -> Result<Option<String>, Error> {
        let mut comment = None;
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => comment = Some(self.comment()?),
                _ => return Ok(comment),
            }
        }
    }

    fn comment(&mut self) -> Result<String, Error> {
        let (line, column) = (self.line, self.column);
        self.bump();

        let mut text = String::new();
        match self.bump() {
            Some('*') => loop {
                match self.bump() {
                    Some('*') if self.peek() == Some('/') => {
                        self.bump();
                        break;
                    }
                    Some(c) => text.push(c),
                    None => return Err(Error::parse(line, column, "unterminated block comment")),
                }
            },
            Some('/') => {
                while let Some(c) = self.peek().filter(|&c| c != '\n') {
                    text.push(c);
                    self.bump();
                }
            }
            _ => return Err(Error::parse(line, column, "unexpected character `/`")),
        }

        Ok(text.trim().to_string())
    }

    fn pair(&mut self, comment: Option<String>) -> Result<Pair, Error> {
        let (line, column) = (self.line, self.column);
        let key = self.string()?;
        if key.is_empty() {
            return Err(Error::parse(line, column, "empty key"));
        }

        self.skip_trivia()?;
        // `"key";` is shorthand for `"key" = "key";`
        let value = if self.peek() == Some('=') {
            self.bump();
            self.skip_trivia()?;
            let value = self.string()?;
            self.skip_trivia()?;
            value
        } else {
            key.clone()
        };
        self.expect(';')?;

        Ok(Pair {
            key,
            value,
            comment,
            line,
            column,
        })
    }

    fn expect(&mut self, expected: char) -> Result<(), Error> {
        let (line, column) = (self.line, self.column);
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(Error::parse(
                line,
                column,
                format!("expected `{expected}`, found `{c}`"),
            )),
            None => Err(Error::parse(
                line,
                column,
                format!("expected `{expected}`, found end of input"),
            )),
        }
    }

    fn string(&mut self) -> Result<String, Error> {
        match self.peek() {
            Some('"') => self.quoted(),
            Some(c) if is_unquoted(c) => Ok(self.unquoted()),
            Some(c) => Err(self.error(format!("expected a string, found `{c}`"))),
            None => Err(self.error("expected a string, found end of input")),
        }
    }

    fn unquoted(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(|&c| is_unquoted(c)) {
            text.push(c);
            self.bump();
        }
        text
    }

    fn quoted(&mut self) -> Result<String, Error> {
        let (line, column) = (self.line, self.column);
        self.bump();

        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(text),
                Some('\\') => {
                    let c = self.escape()?;
                    text.push(c);
                }
                Some(c) => text.push(c),
                None => return Err(Error::parse(line, column, "unterminated string literal")),
            }
        }
    }

    fn escape(&mut self) -> Result<char, Error> {
        // Column of the backslash itself
        let (line, column) = (self.line, self.column - 1);
        let Some(c) = self.bump() else {
            return Err(Error::parse(line, column, "unterminated escape sequence"));
        };

        let decoded = match c {
            '"' | '\\' | '\'' | '\n' => c,
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0'..='7' => {
                let mut value = c.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match self.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            self.bump();
                        }
                        None => break,
                    }
                }
                char::from_u32(value)
                    .ok_or_else(|| Error::parse(line, column, "invalid octal escape"))?
            }
            'u' | 'U' => self.unicode_escape(line, column)?,
            other => {
                return Err(Error::parse(
                    line,
                    column,
                    format!("invalid escape sequence `\\{other}`"),
                ));
            }
        };

        Ok(decoded)
    }

    fn unicode_escape(&mut self, line: usize, column: usize) -> Result<char, Error> {
        let unit = self.hex_unit(line, column)?;
        if !(0xD800..0xDC00).contains(&unit) {
            return char::from_u32(u32::from(unit))
                .ok_or_else(|| Error::parse(line, column, "unpaired surrogate in unicode escape"));
        }

        // A high surrogate must be followed by `\uXXXX` holding the low half
        let has_low = self.bump() == Some('\\') && matches!(self.bump(), Some('u' | 'U'));
        if !has_low {
            return Err(Error::parse(
                line,
                column,
                "unpaired surrogate in unicode escape",
            ));
        }
        let low = self.hex_unit(line, column)?;
        char::decode_utf16([unit, low])
            .next()
            .and_then(Result::ok)
            .ok_or_else(|| Error::parse(line, column, "unpaired surrogate in unicode escape"))
    }

    fn hex_unit(&mut self, line: usize, column: usize) -> Result<u16, Error> {
        let mut value: u32 = 0;
        let mut digits = 0;
        while digits < 4 {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    value = value * 16 + digit;
                    digits += 1;
                    self.bump();
                }
                None => break,
            }
        }
        if digits == 0 {
            return Err(Error::parse(line, column, "missing hex digits in unicode escape"));
        }
        u16::try_from(value).map_err(|_| Error::parse(line, column, "invalid unicode escape"))
    }
}
