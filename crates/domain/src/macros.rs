//! Macro for implementing Display and FromStr for status enums
//!
//! The API uses a mix of wire spellings (`REQUESTED`, `in-progress`,
//! `noshow`, `A+`). This macro maps each variant to its exact wire string
//! and parses case-insensitively, so query parameters and log output always
//! use the spelling the server expects.
//!
//! # Example
//!
//! ```rust
//! use hisris_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum StudyStatus {
//!     Pending,
//!     Available,
//! }
//!
//! impl_domain_status_conversions!(StudyStatus {
//!     Pending => "PENDING",
//!     Available => "AVAILABLE",
//! });
//!
//! assert_eq!(StudyStatus::Pending.as_str(), "PENDING");
//! assert_eq!("available".parse::<StudyStatus>(), Ok(StudyStatus::Available));
//! ```

/// Implements `as_str`, Display and FromStr for status enums
///
/// This macro generates:
/// - `as_str()`: the wire spelling of the variant
/// - Display trait: writes the wire spelling
/// - FromStr trait: parses the wire spelling, ignoring ASCII case
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire strings
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire representation used by the API
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
