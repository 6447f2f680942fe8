//! Typed configuration values
//!
//! [`Value`] is the closed set of types a key can hold. The alternative held
//! by a key's default is its permanent type contract: every later write must
//! carry the same alternative.

pub mod managed;
pub mod text;

use crate::error::ConfigError;
use alloc::string::String;
pub use managed::{ManagedStr, NoProgramMemory, ProgramMemory};
pub use text::TextFormat;

/// C `int` convenience alias
pub type Int = i32;

/// C `unsigned int` convenience alias
pub type UInt = u32;

/// Discriminant of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Str,
}

impl ValueKind {
    /// Type name as a static string (usable with defmt on embedded)
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::I8 => "int8",
            ValueKind::U8 => "uint8",
            ValueKind::I16 => "int16",
            ValueKind::U16 => "uint16",
            ValueKind::I32 => "int32",
            ValueKind::U32 => "uint32",
            ValueKind::I64 => "int64",
            ValueKind::U64 => "uint64",
            ValueKind::F32 => "float",
            ValueKind::F64 => "double",
            ValueKind::Str => "string",
        }
    }
}

/// Configuration value (union of supported types)
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(ManagedStr),
}

impl Value {
    /// Get the active alternative
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::I8(_) => ValueKind::I8,
            Value::U8(_) => ValueKind::U8,
            Value::I16(_) => ValueKind::I16,
            Value::U16(_) => ValueKind::U16,
            Value::I32(_) => ValueKind::I32,
            Value::U32(_) => ValueKind::U32,
            Value::I64(_) => ValueKind::I64,
            Value::U64(_) => ValueKind::U64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
            Value::Str(_) => ValueKind::Str,
        }
    }

    /// Get the held value as `T`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TypeMismatch`] if `T` is not the active
    /// alternative. `T = Value` always succeeds, and `ManagedStr` / `String`
    /// succeed whenever a string is held.
    pub fn get<T: FromValue>(&self) -> Result<T, ConfigError> {
        T::from_value(self).ok_or(ConfigError::TypeMismatch)
    }

    /// Borrow the held string without copying
    pub fn as_str(&self) -> Result<&str, ConfigError> {
        match self {
            Value::Str(s) => Ok(s.as_str()),
            _ => Err(ConfigError::TypeMismatch),
        }
    }

    /// Heap bytes owned by this value (owned strings only)
    pub fn heap_usage(&self) -> usize {
        match self {
            Value::Str(s) => s.heap_usage(),
            _ => 0,
        }
    }
}

/// Values compare bitwise per alternative; different alternatives never match
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Extraction of a typed value out of a [`Value`]
pub trait FromValue: Sized {
    /// Returns `None` when the active alternative does not fit `Self`
    fn from_value(value: &Value) -> Option<Self>;
}

/// A type with a dedicated [`Value`] alternative
///
/// Used where the alternative must be known before a value exists, e.g. when
/// loading a raw persisted value under an assumed type.
pub trait ValueType: FromValue + Into<Value> {
    /// Alternative this type maps to
    const KIND: ValueKind;
}

macro_rules! scalar_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }

            impl ValueType for $ty {
                const KIND: ValueKind = ValueKind::$variant;
            }
        )*
    };
}

scalar_value! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl From<ManagedStr> for Value {
    fn from(s: ManagedStr) -> Self {
        Value::Str(s)
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::Str(ManagedStr::from_static(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(ManagedStr::from(s))
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for ManagedStr {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(String::from(s.as_str())),
            _ => None,
        }
    }
}

impl ValueType for ManagedStr {
    const KIND: ValueKind = ValueKind::Str;
}

impl ValueType for String {
    const KIND: ValueKind = ValueKind::Str;
}
