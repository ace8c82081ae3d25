//! Dependency expressions on require blocks.
//!
//! `,` is OR, `+` is AND and binds tighter, parentheses group:
//! `VK_KHR_a+(VK_VERSION_1_1,VK_KHR_b)`.

use rustc_hash::FxHashSet;
use vkr_diagnostic::{RegistryError, Result};
use vkr_xml::RawBlock;

struct Parser<'e, F> {
    text: &'e str,
    pos: usize,
    active: F,
}

impl<F: Fn(&str) -> bool> Parser<'_, F> {
    fn error(&self, what: &str) -> RegistryError {
        RegistryError::parse(
            0,
            format!("dependency expression `{}`: {what} at offset {}", self.text, self.pos),
        )
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_space(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn any(&mut self) -> Result<bool> {
        let mut value = self.all()?;
        while self.peek() == Some(b',') {
            self.pos += 1;
            let rhs = self.all()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn all(&mut self) -> Result<bool> {
        let mut value = self.atom()?;
        while self.peek() == Some(b'+') {
            self.pos += 1;
            let rhs = self.atom()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn atom(&mut self) -> Result<bool> {
        self.skip_space();
        if self.peek() == Some(b'(') {
            self.pos += 1;
            let value = self.any()?;
            self.skip_space();
            if self.peek() != Some(b')') {
                return Err(self.error("expected `)`"));
            }
            self.pos += 1;
            self.skip_space();
            return Ok(value);
        }

        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b':')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a name"));
        }
        let name = &self.text[start..self.pos];
        self.skip_space();
        Ok((self.active)(name))
    }
}

/// Evaluate `expr` with `active` deciding each name.
pub fn evaluate(expr: &str, active: impl Fn(&str) -> bool) -> Result<bool> {
    let mut parser = Parser {
        text: expr,
        pos: 0,
        active,
    };
    let value = parser.any()?;
    if parser.pos != expr.len() {
        return Err(parser.error("unexpected character"));
    }
    Ok(value)
}

/// The blocks whose dependency expression holds for the active names.
pub(crate) fn applicable<'a>(
    blocks: &'a [RawBlock],
    active: &FxHashSet<&str>,
) -> Result<Vec<&'a RawBlock>> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        let holds = match block.depends.as_deref() {
            Some(expr) => evaluate(expr, |name| active.contains(name))?,
            None => true,
        };
        if holds {
            out.push(block);
        } else {
            tracing::trace!(depends = ?block.depends, "block skipped");
        }
    }
    Ok(out)
}
