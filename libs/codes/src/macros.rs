//! Macro for defining typed string identifiers.

/// Macro to define a typed identifier over a validated string.
///
/// This generates a newtype wrapper around `String` with:
/// - A `KIND` constant used in error messages
/// - `parse()` which trims and validates the input
/// - `as_str()` plus `Display`, `FromStr` and `AsRef<str>`
/// - `Serialize` and `Deserialize` as plain strings
/// - `Ord`, `Hash`, and other standard traits
///
/// # Example
///
/// ```ignore
/// define_code!(RoomNo, "room number");
///
/// let room: RoomNo = " 101 ".parse()?;
/// assert_eq!(room.as_str(), "101");
/// ```
#[macro_export]
macro_rules! define_code {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Human readable name of this identifier kind.
            pub const KIND: &'static str = $kind;

            /// Parses an identifier, trimming surrounding whitespace.
            pub fn parse(s: &str) -> Result<Self, $crate::CodeError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err($crate::CodeError::Empty { kind: Self::KIND });
                }

                if let Some(character) = trimmed.chars().find(|c| c.is_control()) {
                    return Err($crate::CodeError::InvalidCharacter {
                        kind: Self::KIND,
                        value: trimmed.to_string(),
                        character,
                    });
                }

                Ok(Self(trimmed.to_string()))
            }

            /// Returns the canonical text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::CodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
