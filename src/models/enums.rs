use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid enum value for {field}: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(DoseStatus {
    Missed => "missed",
});

str_enum!(ToastType {
    Success => "success",
    Error => "error",
    Info => "info",
});

str_enum!(DetailLevel {
    Basic => "basic",
    Full => "full",
});

impl Default for DetailLevel {
    fn default() -> Self {
        Self::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_known_values() {
        assert_eq!(ToastType::from_str("error").unwrap(), ToastType::Error);
        assert_eq!(DetailLevel::from_str("basic").unwrap(), DetailLevel::Basic);
        assert_eq!(DoseStatus::from_str("missed").unwrap(), DoseStatus::Missed);
    }

    #[test]
    fn rejects_unknown_value() {
        let err = ToastType::from_str("warning").unwrap_err();
        assert_eq!(err.field, "ToastType");
        assert_eq!(err.value, "warning");
    }

    #[test]
    fn serializes_as_lowercase_string() {
        assert_eq!(serde_json::to_string(&DoseStatus::Missed).unwrap(), r#""missed""#);
        let level: DetailLevel = serde_json::from_str(r#""full""#).unwrap();
        assert_eq!(level, DetailLevel::Full);
    }
}
