//! Newtype keys for type-safe entity references.
//!
//! Use the `define_key!` macro to create type-safe string key wrappers that
//! prevent accidentally mixing product keys with order numbers.

use uuid::Uuid;

/// Macro to define a type-safe string key wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `Display`, `AsRef<str>`, `From<&str>` and `From<String>` implementations
///
/// # Example
///
/// ```rust
/// # use sukkergris_core::define_key;
/// define_key!(CategoryKey);
/// define_key!(CouponCode);
///
/// let category = CategoryKey::new("candy");
/// let coupon = CouponCode::new("candy");
///
/// // These are different types, so this won't compile:
/// // let _: CategoryKey = coupon;
/// # let _ = (category, coupon);
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
            /// Create a new key from anything string-like.
            #[must_use]
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Get the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the key and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }
    };
}

// Normalized product identity used as the cart map key.
define_key!(ProductKey);
define_key!(OrderNumber);
define_key!(ShippingId);

impl OrderNumber {
    /// Prefix shared by every generated order number.
    pub const PREFIX: &'static str = "SG-";

    /// Generate a fresh order number such as `SG-3F09A1C2`.
    #[must_use]
    pub fn generate() -> Self {
        let hex: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect();
        Self(format!("{}{}", Self::PREFIX, hex.to_uppercase()))
    }
}
