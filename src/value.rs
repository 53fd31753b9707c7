//! Cell values and their text coercion.
//!
//! A [`Value`] is one of a closed set of kinds. Numbers are rendered to their
//! canonical text and stored as-is; text goes through the writer's
//! [`QuotePolicy`]. [`Value::Null`] leaves the slot unset, which renders as an
//! empty field.

use crate::error::TableResult;
use crate::io::csv::{quote_field, QuotePolicy};

/// A single cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value; the column renders empty.
    Null,
    /// An integer, rendered in base 10.
    Int(i64),
    /// A floating-point number, rendered in shortest round-trip form.
    Float(f64),
    /// Free text, quoted according to the writer's policy.
    Text(String),
}

impl Value {
    /// Render this value into the text stored in a row slot.
    ///
    /// Returns `None` for [`Value::Null`].
    ///
    /// # Errors
    /// Only text can fail, see [`quote_field`].
    pub fn render(&self, policy: QuotePolicy) -> TableResult<Option<String>> {
        Ok(match self {
            Value::Null => None,
            Value::Int(i) => Some(i.to_string()),
            // Debug keeps a trailing `.0` on integral floats and switches to
            // exponent form for very large or small magnitudes.
            Value::Float(f) => Some(format!("{f:?}")),
            Value::Text(s) => Some(quote_field(s, policy)?),
        })
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Text(v.to_string()),
        }
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::from(v as u64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_unquoted() {
        let p = QuotePolicy::Necessary;
        assert_eq!(Value::Int(-42).render(p).unwrap().as_deref(), Some("-42"));
        assert_eq!(Value::Float(5.0).render(p).unwrap().as_deref(), Some("5.0"));
        assert_eq!(Value::Float(0.1).render(p).unwrap().as_deref(), Some("0.1"));
        assert_eq!(Value::Float(1e300).render(p).unwrap().as_deref(), Some("1e300"));
        assert_eq!(Value::Float(f64::NAN).render(p).unwrap().as_deref(), Some("NaN"));
    }

    #[test]
    fn float_text_round_trips() {
        let x = 0.1 + 0.2;
        let text = Value::Float(x).render(QuotePolicy::Legacy).unwrap().unwrap();
        assert_eq!(text.parse::<f64>().unwrap(), x);
    }

    #[test]
    fn null_renders_as_unset() {
        assert_eq!(Value::Null.render(QuotePolicy::Legacy).unwrap(), None);
        assert!(Value::from(None::<&str>).is_null());
    }

    #[test]
    fn wide_unsigned_falls_back_to_text() {
        assert_eq!(Value::from(u64::MAX), Value::Text(u64::MAX.to_string()));
        assert_eq!(Value::from(7usize), Value::Int(7));
    }
}
