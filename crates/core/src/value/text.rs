//! Canonical text form of values
//!
//! Used by backup/restore and by migration from string-only schemas.
//! Parsing is whole-string: trailing garbage after a numeric token fails.

use super::{ManagedStr, Value};
use alloc::string::String;
use core::fmt::{self, Write};

/// Literal `true` for booleans
pub const VALUE_TRUE: &str = "true";

/// Literal `false` for booleans
pub const VALUE_FALSE: &str = "false";

/// Text conversion settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormat {
    /// Text written for `true`
    pub true_literal: &'static str,
    /// Text written for `false`
    pub false_literal: &'static str,
    /// Also accept `true/1/on/yes/y` and `false/0/off/no/n` when parsing
    pub extended_bool: bool,
}

impl TextFormat {
    /// Default literals with extended boolean parsing
    pub const DEFAULT: TextFormat = TextFormat {
        true_literal: VALUE_TRUE,
        false_literal: VALUE_FALSE,
        extended_bool: true,
    };

    fn parse_bool(&self, text: &str) -> Option<bool> {
        if text == self.true_literal {
            return Some(true);
        }
        if text == self.false_literal {
            return Some(false);
        }
        if !self.extended_bool {
            return None;
        }
        match text {
            "true" | "1" | "on" | "yes" | "y" => Some(true),
            "false" | "0" | "off" | "no" | "n" => Some(false),
            _ => None,
        }
    }
}

impl Default for TextFormat {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Value {
    /// Write the canonical text form
    pub fn write_text<W: Write + ?Sized>(&self, out: &mut W, format: &TextFormat) -> fmt::Result {
        match self {
            Value::Bool(b) => out.write_str(if *b {
                format.true_literal
            } else {
                format.false_literal
            }),
            Value::I8(v) => write!(out, "{}", v),
            Value::U8(v) => write!(out, "{}", v),
            Value::I16(v) => write!(out, "{}", v),
            Value::U16(v) => write!(out, "{}", v),
            Value::I32(v) => write!(out, "{}", v),
            Value::U32(v) => write!(out, "{}", v),
            Value::I64(v) => write!(out, "{}", v),
            Value::U64(v) => write!(out, "{}", v),
            // Shortest representation that parses back to the same bits
            Value::F32(v) => write!(out, "{}", v),
            Value::F64(v) => write!(out, "{}", v),
            Value::Str(s) => out.write_str(s),
        }
    }

    /// Canonical text form as an owned string
    pub fn to_text(&self, format: &TextFormat) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_text(&mut out, format);
        out
    }

    /// Parse `text` as the alternative held by `template`
    ///
    /// Returns `None` on parse failure. String templates accept any text and
    /// always produce an owned copy.
    pub fn parse(text: &str, template: &Value, format: &TextFormat) -> Option<Value> {
        match template {
            Value::Bool(_) => format.parse_bool(text).map(Value::Bool),
            Value::I8(_) => text.parse().ok().map(Value::I8),
            Value::U8(_) => text.parse().ok().map(Value::U8),
            Value::I16(_) => text.parse().ok().map(Value::I16),
            Value::U16(_) => text.parse().ok().map(Value::U16),
            Value::I32(_) => text.parse().ok().map(Value::I32),
            Value::U32(_) => text.parse().ok().map(Value::U32),
            Value::I64(_) => text.parse().ok().map(Value::I64),
            Value::U64(_) => text.parse().ok().map(Value::U64),
            Value::F32(_) => text.parse().ok().map(Value::F32),
            Value::F64(_) => text.parse().ok().map(Value::F64),
            Value::Str(_) => Some(Value::Str(ManagedStr::owned(text))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_text(f, &TextFormat::DEFAULT)
    }
}
