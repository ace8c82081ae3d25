//! C declarator tokenizer.
//!
//! Splits the declarator text left after removing a member's type and name
//! (`"const * const*"`, `"[VK_UUID_SIZE]"`, `":24"`) into pointer levels,
//! array extents and a bitfield width.

use vkr_diagnostic::{RegistryError, Result};

/// A declarator split into its parts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Declarator {
    /// One entry per `*`, innermost (next to the type) first; `true` when
    /// the pointee is const.
    pub pointers: Vec<bool>,
    /// Array extents in textual order, which is outermost first.
    pub arrays: Vec<String>,
    /// Const qualifier on the element type.
    pub const_element: bool,
    pub bit_size: Option<u32>,
}

/// Tokenize a declarator; `owner` names the member for diagnostics.
pub(crate) fn parse_declarator(text: &str, owner: &str) -> Result<Declarator> {
    let mut out = Declarator::default();
    let mut pending_const = false;
    let mut rest = text.trim();

    let malformed = |what: &str| {
        RegistryError::parse(0, format!("malformed declarator `{text}` on `{owner}`: {what}"))
    };

    while let Some(c) = rest.chars().next() {
        match c {
            '*' => {
                out.pointers.push(pending_const);
                pending_const = false;
                rest = &rest[1..];
            }
            '[' => {
                let end = rest.find(']').ok_or_else(|| malformed("unclosed `[`"))?;
                out.arrays.push(rest[1..end].trim().to_owned());
                rest = &rest[end + 1..];
            }
            ':' => {
                let digits: String = rest[1..]
                    .trim_start()
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                let bits = digits
                    .parse::<u32>()
                    .map_err(|_| malformed("bitfield width is not a number"))?;
                out.bit_size = Some(bits);
                let consumed = rest[1..].len() - rest[1..].trim_start().len() + digits.len();
                rest = &rest[1 + consumed..];
            }
            _ if rest.starts_with("const") => {
                pending_const = true;
                rest = &rest["const".len()..];
            }
            _ if rest.starts_with("struct") => rest = &rest["struct".len()..],
            _ => return Err(malformed(&format!("unexpected `{c}`"))),
        }
        rest = rest.trim_start();
    }

    if out.pointers.is_empty() {
        out.const_element = pending_const;
    } else if pending_const {
        // `T* const p`: the pointer itself is const, which the model
        // does not track.
        tracing::trace!(owner, "ignoring top-level const");
    }
    if let Some(&first) = out.pointers.first() {
        out.const_element = first;
    }
    Ok(out)
}
