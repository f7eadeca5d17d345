//! Newtype IDs for type-safe entity references.
//!
//! The backend hands out two kinds of identifiers: numeric ones for staff
//! accounts and master-data rows, and opaque strings for dormitory users,
//! token prices and purchases. `define_id!` and `define_key!` create wrappers
//! for each so IDs from different entities cannot be mixed up.

/// Macro to define a type-safe numeric ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
///
/// # Example
///
/// ```rust
/// # use asrama_token_core::define_id;
/// define_id!(OperatorId);
/// define_id!(RateId);
///
/// let operator = OperatorId::new(1);
/// let rate = RateId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: OperatorId = rate;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }

            /// Whether the backend would accept this as an existing row ID.
            #[must_use]
            pub const fn is_persisted(&self) -> bool {
                self.0 > 0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Macro to define a type-safe string key wrapper.
///
/// Used for records whose IDs the backend treats as opaque strings.
///
/// # Example
///
/// ```rust
/// # use asrama_token_core::define_key;
/// define_key!(InvoiceKey);
///
/// let key = InvoiceKey::new("inv-001");
/// assert_eq!(key.as_str(), "inv-001");
/// ```
#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new key.
            #[must_use]
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Get the key as a string slice.
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

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Numeric IDs
define_id!(AdminId);
define_id!(MasterDataId);

// Opaque string IDs
define_key!(UserId);
define_key!(TokenPriceId);
define_key!(PurchaseId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_serde_is_transparent() {
        let id: AdminId = serde_json::from_str("7").unwrap();
        assert_eq!(id, AdminId::new(7));
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }

    #[test]
    fn test_numeric_id_from_str_trims() {
        let id: MasterDataId = " 12 ".parse().unwrap();
        assert_eq!(id.as_i32(), 12);
        assert!("abc".parse::<MasterDataId>().is_err());
    }

    #[test]
    fn test_is_persisted() {
        assert!(MasterDataId::new(1).is_persisted());
        assert!(!MasterDataId::new(0).is_persisted());
        assert!(!MasterDataId::new(-3).is_persisted());
    }

    #[test]
    fn test_string_key_serde_is_transparent() {
        let id: PurchaseId = serde_json::from_str("\"TRX-001\"").unwrap();
        assert_eq!(id.as_str(), "TRX-001");
        assert_eq!(id.to_string(), "TRX-001");
    }
}
