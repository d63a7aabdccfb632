//! Newtype identifiers. Every id serializes as its bare inner value.

/// Display, `inner()` and conversion from the wrapped type. Shared by the
/// public key macros.
#[doc(hidden)]
#[macro_export]
macro_rules! key_conversions {
    ($TypeName: ident, $Inner: ty) => {
        impl $TypeName {
            pub fn inner(&self) -> $Inner {
                self.0.clone()
            }
        }

        impl std::fmt::Display for $TypeName {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$Inner> for $TypeName {
            fn from(value: $Inner) -> Self {
                $TypeName(value)
            }
        }
    };
}

/// An id minted on this side, e.g. `uuid_key!(LocationId)`.
#[macro_export]
macro_rules! uuid_key {
    ($TypeName: ident) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            Default,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $TypeName(uuid::Uuid);

        $crate::key_conversions!($TypeName, uuid::Uuid);

        impl $TypeName {
            pub fn new() -> Self {
                $TypeName(uuid::Uuid::new_v4())
            }
        }

        impl std::str::FromStr for $TypeName {
            type Err = uuid::Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(value.trim()).map($TypeName)
            }
        }
    };
}

/// An opaque string handed out by a remote service, such as a URL.
#[macro_export]
macro_rules! string_key {
    ($TypeName: ident) => {
        #[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $TypeName(String);

        $crate::key_conversions!($TypeName, String);

        impl $TypeName {
            pub fn new(value: String) -> Self {
                $TypeName(value)
            }
        }

        impl From<&str> for $TypeName {
            fn from(value: &str) -> Self {
                $TypeName(value.to_owned())
            }
        }

        impl AsRef<str> for $TypeName {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}
