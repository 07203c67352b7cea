// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A macro for declaring enums that mirror ESDL enumeration literals.

/// Declares a fieldless enum together with its ESDL literal spelling, a
/// `FromStr` implementation that fails with a `DocumentError` for unknown
/// literals, and a `Display` implementation that prints the literal.
///
/// Variants keep their declaration order, so `variant as usize` is the
/// position of the literal in the ESDL enumeration.
macro_rules! esdl_literals {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $literal:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $name {
            /// All values, in the order of the ESDL enumeration.
            #[allow(dead_code)]
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];

            /// Returns the ESDL literal for this value.
            pub fn literal(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $literal,
                    )*
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(
                        $literal => Ok(Self::$variant),
                    )*
                    _ => Err(crate::Error::document_error(format!(
                        "Unknown {} literal: {}",
                        stringify!($name),
                        s
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.literal())
            }
        }
    };
}
