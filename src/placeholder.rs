//! Placeholder type inference for printf-style format strings.
//!
//! Each conversion specifier (`%d`, `%2$@`, `%-6.2f`, ...) is classified into a
//! [`PlaceholderType`] and placed at its argument position. Explicit positions
//! (`%<n>$`) and sequential ones share the same numbering; the result is
//! ordered by position and gaps are filled with [`PlaceholderType::Unknown`].

use std::collections::HashSet;

use crate::{error::Error, types::PlaceholderType};

/// Highest argument position honored in a `%<n>$` prefix (POSIX `NL_ARGMAX`).
const MAX_POSITION: usize = 4096;

/// A single placeholder found while scanning a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderToken {
    /// Explicit 1-based position, when written as `%<n>$`.
    pub position: Option<usize>,
    pub kind: PlaceholderType,
}

/// Extracts placeholder tokens in occurrence order, ignoring `%%` escapes.
pub fn extract_placeholders(input: &str) -> Vec<PlaceholderToken> {
    let bytes = input.as_bytes();
    let mut i = 0;
    let mut out = Vec::new();

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        if i + 1 < bytes.len() && bytes[i + 1] == b'%' {
            i += 2;
            continue;
        }

        let mut j = i + 1;

        // Optional positional index: digits followed by '$'
        let mut position = None;
        let start_digits = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j < bytes.len() && j > start_digits && bytes[j] == b'$' {
            position = std::str::from_utf8(&bytes[start_digits..j])
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .or(Some(usize::MAX));
            j += 1;
        } else {
            j = start_digits;
        }

        // Flags, width and precision
        while j < bytes.len()
            && (bytes[j].is_ascii_digit()
                || matches!(bytes[j], b'.' | b'+' | b'-' | b' ' | b'#' | b'\''))
        {
            j += 1;
        }

        // Length modifiers (h, hh, l, ll, q, z, t, j, L)
        while j < bytes.len()
            && matches!(bytes[j], b'h' | b'l' | b'q' | b'z' | b't' | b'j' | b'L')
        {
            j += 1;
        }

        match bytes
            .get(j)
            .and_then(|&b| PlaceholderType::from_conversion(b as char))
        {
            Some(kind) => {
                out.push(PlaceholderToken { position, kind });
                i = j + 1;
            }
            // Not a conversion; the '%' is plain text
            None => i += 1,
        }
    }

    out
}

/// Infers the ordered argument types a format string expects.
///
/// The result has one slot per argument position up to the highest one
/// referenced. Two placeholders claiming the same position with different
/// types make the format string invalid.
///
/// ```
/// use stringsgen::{placeholder::placeholders, PlaceholderType::*};
///
/// assert_eq!(placeholders("%2$d-%4$f-%3$@-%c")?, vec![Char, Int, Object, Float]);
/// assert!(placeholders("100%% sure")?.is_empty());
/// # Ok::<(), stringsgen::Error>(())
/// ```
pub fn placeholders(format: &str) -> Result<Vec<PlaceholderType>, Error> {
    let tokens = extract_placeholders(format);
    let mut claimed = HashSet::new();
    let mut list: Vec<PlaceholderType> = Vec::new();
    let mut next_sequential = 1;

    for token in tokens {
        let position = match token.position {
            Some(position) => {
                claimed.insert(position);
                position
            }
            None => {
                while claimed.contains(&next_sequential) {
                    next_sequential += 1;
                }
                let position = next_sequential;
                next_sequential += 1;
                position
            }
        };

        // `%0$` and absurd indices never reach an argument list
        if position == 0 || position > MAX_POSITION {
            continue;
        }

        if list.len() < position {
            list.resize(position, PlaceholderType::Unknown);
        }
        let previous = list[position - 1];
        if previous != PlaceholderType::Unknown
            && token.kind != PlaceholderType::Unknown
            && previous != token.kind
        {
            return Err(Error::InvalidPlaceholder {
                position,
                previous,
                new: token.kind,
            });
        }
        if token.kind != PlaceholderType::Unknown {
            list[position - 1] = token.kind;
        }
    }

    Ok(list)
}
