//! Domain ID Types with NewType Pattern
//!
//! Storage assigns integer identifiers to accounts and todo items. Wrapping
//! them keeps an account id from being passed where a todo id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate NewType ID wrappers with all required traits
macro_rules! domain_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

domain_id!(
    /// Identifier of an account; also the subject of every session token
    AccountId
);

domain_id!(
    /// Identifier of a todo item
    TodoId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_integers() {
        let id = AccountId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let parsed: TodoId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, TodoId::new(7));
    }

    #[test]
    fn ids_parse_and_display() {
        let id: AccountId = " 15 ".parse().unwrap();
        assert_eq!(id.get(), 15);
        assert_eq!(id.to_string(), "15");
        assert!("abc".parse::<TodoId>().is_err());
        assert_eq!(i64::from(TodoId::from(3)), 3);
    }
}
