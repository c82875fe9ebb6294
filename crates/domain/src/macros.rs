//! Macro for gateway enums that travel as fixed strings
//!
//! The gateway spells its enumerations exactly (`"CustomerPayBillOnline"`,
//! `"Pay Bill"`, `"C2B00011"`), so matching is case-sensitive and the wire
//! string doubles as the serde representation.
//!
//! # Example
//!
//! ```rust
//! use mpesa_domain::impl_wire_string_enum;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum ResponseType {
//!     Completed,
//!     Cancelled,
//! }
//!
//! impl_wire_string_enum!(ResponseType {
//!     Completed => "Completed",
//!     Cancelled => "Cancelled",
//! });
//!
//! assert_eq!(ResponseType::Completed.as_wire_str(), "Completed");
//! ```

/// Implements `as_wire_str`, `Display`, `FromStr`, `Serialize` and
/// `Deserialize` for an enum with one fixed wire string per variant.
#[macro_export]
macro_rules! impl_wire_string_enum {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $enum_name {
            /// The exact string the gateway uses for this variant.
            #[must_use]
            pub const fn as_wire_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_wire_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(::std::format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }

        impl ::serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(self.as_wire_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}
