//! Closed string enums.
//!
//! Several request fields only accept a fixed set of strings (application
//! types, sort orders, connection strategies). They are modelled as Rust
//! enums implementing [`StringEnum`]; [`validate`] checks a raw string
//! against the option set and reports the allowed values on failure.
//!
//! Declare new enums with [`string_enum!`](crate::string_enum).

use thiserror::Error;

/// A string value outside an enum's option set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid enum member {value} must be one of [{}]", .options.join(", "))]
pub struct InvalidEnumMember {
    /// The rejected value.
    pub value: String,

    /// Every accepted value.
    pub options: Vec<&'static str>,
}

/// An enum whose variants map one-to-one to wire strings.
pub trait StringEnum: Copy + Sized + 'static {
    /// Every variant, in declaration order.
    const OPTIONS: &'static [Self];

    /// The wire string for this variant.
    fn as_str(&self) -> &'static str;

    /// Every accepted wire string.
    fn option_strs() -> Vec<&'static str> {
        Self::OPTIONS.iter().map(Self::as_str).collect()
    }
}

/// Parse `value` as a member of `E`.
pub fn validate<E: StringEnum>(value: &str) -> Result<E, InvalidEnumMember> {
    E::OPTIONS
        .iter()
        .copied()
        .find(|option| option.as_str() == value)
        .ok_or_else(|| InvalidEnumMember {
            value: value.to_string(),
            options: E::option_strs(),
        })
}

/// Declare a [`StringEnum`] with `Display`, `FromStr` and serde support.
///
/// ```
/// kinde_core::string_enum! {
///     /// Sort order.
///     pub enum Sort {
///         /// Ascending.
///         Asc => "asc",
///         /// Descending.
///         Desc => "desc",
///     }
/// }
///
/// assert_eq!("asc".parse::<Sort>().unwrap(), Sort::Asc);
/// assert!("sideways".parse::<Sort>().is_err());
/// ```
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $crate::enums::StringEnum for $name {
            const OPTIONS: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::enums::StringEnum::as_str(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::enums::InvalidEnumMember;

            fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
                $crate::enums::validate(value)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                serializer.serialize_str($crate::enums::StringEnum::as_str(self))
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let value = <::std::string::String as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                $crate::enums::validate(&value).map_err($crate::__private::serde::de::Error::custom)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::string_enum! {
        enum Flavour {
            Vanilla => "vanilla",
            Mint => "mint_choc",
        }
    }

    #[test]
    fn test_validate_accepts_members() {
        assert_eq!(validate::<Flavour>("mint_choc").unwrap(), Flavour::Mint);
        assert_eq!(Flavour::Vanilla.to_string(), "vanilla");
    }

    #[test]
    fn test_validate_lists_options_on_failure() {
        let err = validate::<Flavour>("Mint").unwrap_err();
        assert_eq!(err.value, "Mint");
        assert_eq!(
            err.to_string(),
            "invalid enum member Mint must be one of [vanilla, mint_choc]"
        );
    }

    #[test]
    fn test_serde_round_trips_wire_string() {
        let json = serde_json::to_string(&Flavour::Mint).unwrap();
        assert_eq!(json, r#""mint_choc""#);

        let err = serde_json::from_str::<Flavour>(r#""rum""#).unwrap_err();
        assert!(err.to_string().contains("must be one of"));
    }
}
