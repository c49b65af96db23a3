use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

macro_rules! elements {
    ($($symbol:ident = $ordinal:literal),* $(,)?) => {
        /// A chemical element, represented by its atomic number
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum ElementType {
            $($symbol = $ordinal),*
        }

        impl ElementType {
            pub const ALL: &'static [ElementType] = &[$(ElementType::$symbol),*];

            pub fn symbol(self) -> &'static str {
                match self {
                    $(ElementType::$symbol => stringify!($symbol)),*
                }
            }
        }

        impl TryFrom<u32> for ElementType {
            type Error = Error;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                match value {
                    $($ordinal => Ok(ElementType::$symbol),)*
                    other => Err(Error::UnknownElement(other.to_string())),
                }
            }
        }
    };
}

elements! {
    H = 1, He = 2,
    Li = 3, Be = 4, B = 5, C = 6, N = 7, O = 8, F = 9, Ne = 10,
    Na = 11, Mg = 12, Al = 13, Si = 14, P = 15, S = 16, Cl = 17, Ar = 18,
    K = 19, Ca = 20, Sc = 21, Ti = 22, V = 23, Cr = 24, Mn = 25, Fe = 26, Co = 27,
    Ni = 28, Cu = 29, Zn = 30, Ga = 31, Ge = 32, As = 33, Se = 34, Br = 35, Kr = 36,
}

impl ElementType {
    pub fn atomic_number(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ElementType {
    type Err = Error;

    /// Accepts element symbols (case insensitive) and atomic numbers
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<u32>() {
            return ElementType::try_from(ordinal);
        }

        ElementType::ALL
            .iter()
            .copied()
            .find(|element| element.symbol().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownElement(s.to_owned()))
    }
}

impl Serialize for ElementType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for ElementType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ElementVisitor;

        impl de::Visitor<'_> for ElementVisitor {
            type Value = ElementType;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an element symbol or atomic number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                u32::try_from(v)
                    .map_err(E::custom)
                    .and_then(|v| ElementType::try_from(v).map_err(E::custom))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map_err(E::custom)
                    .and_then(|v| self.visit_u64(v))
            }
        }

        deserializer.deserialize_any(ElementVisitor)
    }
}
