//! Random unique identifiers for orders and products.
//!
//! Order numbers and SKUs are 128 random bits (a v4 UUID) rendered as 32
//! uppercase hexadecimal characters. Uniqueness is probabilistic: nothing
//! retries on collision, the database's unique constraint has the final say.

use uuid::Uuid;

/// Errors that can occur when parsing a stored token.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("{kind} cannot be empty")]
    Empty { kind: &'static str },
    #[error("{kind} must be at most {max} characters")]
    TooLong { kind: &'static str, max: usize },
    #[error("{kind} may only contain ASCII letters and digits")]
    InvalidCharacter { kind: &'static str },
}

/// Generate a fresh 32-character uppercase hexadecimal token.
#[must_use]
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string().to_ascii_uppercase()
}

/// Defines a validated token newtype (`generate`, `parse`, serde, sqlx).
macro_rules! define_token {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum stored length.
            pub const MAX_LENGTH: usize = 32;

            /// Generate a new random value.
            #[must_use]
            pub fn generate() -> Self {
                Self(generate_token())
            }

            /// Parse a previously issued value.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is empty, longer than 32
            /// characters, or contains anything but ASCII letters and digits.
            pub fn parse(s: &str) -> Result<Self, TokenError> {
                let s = s.trim();
                if s.is_empty() {
                    return Err(TokenError::Empty { kind: $kind });
                }
                if s.len() > Self::MAX_LENGTH {
                    return Err(TokenError::TooLong {
                        kind: $kind,
                        max: Self::MAX_LENGTH,
                    });
                }
                if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
                    return Err(TokenError::InvalidCharacter { kind: $kind });
                }
                Ok(Self(s.to_owned()))
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = TokenError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TokenError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(token: $name) -> Self {
                token.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, ::sqlx::error::BoxDynError> {
                let s = <String as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self::parse(&s)?)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <String as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_token!(
    /// Public order reference shown to customers and payment webhooks.
    OrderNumber,
    "order number"
);

define_token!(
    /// Stock-keeping unit identifying a product or catalog record.
    Sku,
    "sku"
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token, token.to_ascii_uppercase());
    }

    #[test]
    fn test_generated_order_numbers_differ() {
        let numbers: HashSet<_> = (0..1000).map(|_| OrderNumber::generate()).collect();
        assert_eq!(numbers.len(), 1000);
    }

    #[test]
    fn test_generated_value_parses_back() {
        let sku = Sku::generate();
        assert_eq!(Sku::parse(sku.as_str()).unwrap(), sku);
    }

    #[test]
    fn test_parse_accepts_legacy_short_sku() {
        let sku = Sku::parse("a1b2c3d4e5f6").unwrap();
        assert_eq!(sku.to_string(), "a1b2c3d4e5f6");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            OrderNumber::parse("  "),
            Err(TokenError::Empty { .. })
        ));
        assert!(matches!(
            OrderNumber::parse(&"A".repeat(33)),
            Err(TokenError::TooLong { max: 32, .. })
        ));
        assert!(matches!(
            OrderNumber::parse("ABC-123"),
            Err(TokenError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn test_serde_validates() {
        let parsed: Result<Sku, _> = serde_json::from_str("\"not valid!\"");
        assert!(parsed.is_err());

        let number = OrderNumber::parse("0F3A").unwrap();
        assert_eq!(serde_json::to_string(&number).unwrap(), "\"0F3A\"");
    }

    proptest! {
        #[test]
        fn prop_alphanumeric_tokens_parse(s in "[A-Za-z0-9]{1,32}") {
            let number = OrderNumber::parse(&s).unwrap();
            prop_assert_eq!(number.as_str(), s.as_str());
        }
    }
}
