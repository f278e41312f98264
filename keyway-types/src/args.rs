//! Positional argument decoding.
//!
//! Keywords receive their arguments as an ordered `Vec<Value>`. [`FromArgs`]
//! turns that list into a typed value and reports the [`Arity`] it expects.
//! The free functions below are what generated code calls, one parameter at
//! a time.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::KeywordError;
use crate::types::Arity;

/// Decode a positional argument list into a typed value.
pub trait FromArgs: Sized + Send {
    /// Argument counts this type can be decoded from.
    fn arity() -> Arity;

    /// Decode the list. Implementations check the count themselves.
    fn from_args(args: Vec<Value>) -> Result<Self, KeywordError>;
}

/// The raw argument list, accepted as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Positional(pub Vec<Value>);

impl FromArgs for Positional {
    fn arity() -> Arity {
        Arity::Variadic { min: 0 }
    }

    fn from_args(args: Vec<Value>) -> Result<Self, KeywordError> {
        Ok(Self(args))
    }
}

/// Every argument decoded as `T`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rest<T>(pub Vec<T>);

impl<T: DeserializeOwned + Send> FromArgs for Rest<T> {
    fn arity() -> Arity {
        Arity::Variadic { min: 0 }
    }

    fn from_args(args: Vec<Value>) -> Result<Self, KeywordError> {
        take_rest(&mut args.into_iter(), 0, "args").map(Self)
    }
}

impl FromArgs for () {
    fn arity() -> Arity {
        Arity::Fixed(0)
    }

    fn from_args(args: Vec<Value>) -> Result<Self, KeywordError> {
        ensure_arity(&Self::arity(), args.len())
    }
}

macro_rules! tuple_from_args {
    ($len:expr; $($ty:ident => $index:tt),+) => {
        impl<$($ty),+> FromArgs for ($($ty,)+)
        where
            $($ty: DeserializeOwned + Send),+
        {
            fn arity() -> Arity {
                Arity::Fixed($len)
            }

            fn from_args(args: Vec<Value>) -> Result<Self, KeywordError> {
                ensure_arity(&Self::arity(), args.len())?;
                let mut args = args.into_iter();
                Ok(($(take_arg::<$ty>(&mut args, $index, concat!("arg", stringify!($index)))?,)+))
            }
        }
    };
}

tuple_from_args!(1; A => 0);
tuple_from_args!(2; A => 0, B => 1);
tuple_from_args!(3; A => 0, B => 1, C => 2);
tuple_from_args!(4; A => 0, B => 1, C => 2, D => 3);
tuple_from_args!(5; A => 0, B => 1, C => 2, D => 3, E => 4);
tuple_from_args!(6; A => 0, B => 1, C => 2, D => 3, E => 4, F => 5);

/// Fail with [`KeywordError::Arity`] unless `count` satisfies `arity`.
pub fn ensure_arity(arity: &Arity, count: usize) -> Result<(), KeywordError> {
    if arity.accepts(count) {
        Ok(())
    } else {
        Err(KeywordError::Arity {
            expected: *arity,
            actual: count,
        })
    }
}

/// Decode a single value as the parameter at `index`.
pub fn decode_arg<T: DeserializeOwned>(
    value: Value,
    index: usize,
    name: &str,
) -> Result<T, KeywordError> {
    serde_json::from_value(value).map_err(|source| KeywordError::InvalidArgument {
        index,
        name: name.to_string(),
        source,
    })
}

/// Take and decode the next required argument.
pub fn take_arg<T: DeserializeOwned>(
    args: &mut impl Iterator<Item = Value>,
    index: usize,
    name: &str,
) -> Result<T, KeywordError> {
    match args.next() {
        Some(value) => decode_arg(value, index, name),
        None => Err(KeywordError::MissingArgument {
            index,
            name: name.to_string(),
        }),
    }
}

/// Take and decode the next optional argument. An absent argument is `None`.
pub fn take_optional<T: DeserializeOwned>(
    args: &mut impl Iterator<Item = Value>,
    index: usize,
    name: &str,
) -> Result<Option<T>, KeywordError> {
    args.next()
        .map(|value| decode_arg(value, index, name))
        .transpose()
}

/// Decode every remaining argument. `start` is the position of the first one.
pub fn take_rest<T: DeserializeOwned>(
    args: &mut impl Iterator<Item = Value>,
    start: usize,
    name: &str,
) -> Result<Vec<T>, KeywordError> {
    args.enumerate()
        .map(|(offset, value)| decode_arg(value, start + offset, name))
        .collect()
}

/// Convert a keyword's return value. `()` becomes [`Value::Null`].
pub fn encode_return<T: Serialize>(value: T) -> Result<Value, KeywordError> {
    serde_json::to_value(value).map_err(KeywordError::Encode)
}
