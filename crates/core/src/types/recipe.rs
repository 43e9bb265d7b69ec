//! Enumerations used by recipes and ingredients.
//!
//! Both enums travel over the wire and through the database as their
//! Spanish display tokens, which are part of the public API contract.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a token is not one of an enum's accepted spellings.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enum rejected the token.
    pub kind: &'static str,
    /// The rejected token.
    pub value: String,
}

/// How demanding a recipe is to prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Difficulty {
    #[default]
    Easy,
    Intermediate,
    Hard,
}

impl Difficulty {
    /// Canonical wire tokens, in order of increasing difficulty.
    pub const TOKENS: &'static [&'static str] = &["Fácil", "Intermedio", "Difícil"];

    /// Every token accepted on input, including the unaccented spellings.
    pub const ACCEPTED: &'static [&'static str] =
        &["Fácil", "Intermedio", "Difícil", "Facil", "Dificil"];

    /// The canonical wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Fácil",
            Self::Intermediate => "Intermedio",
            Self::Hard => "Difícil",
        }
    }
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fácil" | "Facil" => Ok(Self::Easy),
            "Intermedio" => Ok(Self::Intermediate),
            "Difícil" | "Dificil" => Ok(Self::Hard),
            other => Err(UnknownVariant {
                kind: "difficulty",
                value: other.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Difficulty> for &'static str {
    fn from(value: Difficulty) -> Self {
        value.as_str()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement unit for an ingredient quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Unit {
    Grams,
    Kilograms,
    Liters,
    Milliliters,
    Cups,
    Tablespoons,
    Teaspoons,
    Pieces,
    Cloves,
    Leaves,
}

impl Unit {
    /// All accepted wire tokens.
    pub const TOKENS: &'static [&'static str] = &[
        "gramos",
        "kilogramos",
        "litros",
        "mililitros",
        "tazas",
        "cucharadas",
        "cucharaditas",
        "piezas",
        "dientes",
        "hojas",
    ];

    /// The wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grams => "gramos",
            Self::Kilograms => "kilogramos",
            Self::Liters => "litros",
            Self::Milliliters => "mililitros",
            Self::Cups => "tazas",
            Self::Tablespoons => "cucharadas",
            Self::Teaspoons => "cucharaditas",
            Self::Pieces => "piezas",
            Self::Cloves => "dientes",
            Self::Leaves => "hojas",
        }
    }
}

impl FromStr for Unit {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "gramos" => Self::Grams,
            "kilogramos" => Self::Kilograms,
            "litros" => Self::Liters,
            "mililitros" => Self::Milliliters,
            "tazas" => Self::Cups,
            "cucharadas" => Self::Tablespoons,
            "cucharaditas" => Self::Teaspoons,
            "piezas" => Self::Pieces,
            "dientes" => Self::Cloves,
            "hojas" => Self::Leaves,
            other => {
                return Err(UnknownVariant {
                    kind: "unit",
                    value: other.to_owned(),
                });
            }
        })
    }
}

impl TryFrom<String> for Unit {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Unit> for &'static str {
    fn from(value: Unit) -> Self {
        value.as_str()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implements text-column `sqlx` support for an enum with `as_str`/`FromStr`.
#[cfg(feature = "postgres")]
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<Self>()?)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

#[cfg(feature = "postgres")]
text_column!(Difficulty);
#[cfg(feature = "postgres")]
text_column!(Unit);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_default_is_easy() {
        assert_eq!(Difficulty::default(), Difficulty::Easy);
    }

    #[test]
    fn test_difficulty_accepts_unaccented_aliases() {
        assert_eq!("Facil".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("Dificil".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn test_difficulty_is_case_sensitive() {
        assert!("fácil".parse::<Difficulty>().is_err());
        assert!("INTERMEDIO".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_difficulty_serializes_canonical_token() {
        let parsed: Difficulty = serde_json::from_str("\"Facil\"").unwrap();
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"Fácil\"");
    }

    #[test]
    fn test_every_unit_token_parses_back() {
        for token in Unit::TOKENS {
            let unit: Unit = token.parse().unwrap();
            assert_eq!(unit.as_str(), *token);
        }
    }

    #[test]
    fn test_unknown_unit_reports_kind() {
        let err = "pizca".parse::<Unit>().unwrap_err();
        assert_eq!(err.kind, "unit");
        assert_eq!(err.value, "pizca");
    }
}
