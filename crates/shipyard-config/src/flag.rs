//! 真偽値フラグと環境名のパース

use crate::error::{ConfigError, Result};
use std::fmt;
use std::str::FromStr;

/// 真偽値フラグをパース
///
/// 大文字小文字を区別せず `yes/true/t/y/1` を true、
/// `no/false/f/n/0` を false として扱う。
pub fn parse_bool_flag(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBooleanArgument(value.to_string())),
    }
}

/// デプロイ先の環境
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_flag_truthy() {
        for value in ["yes", "true", "t", "y", "1", "YES", "True", "T", "Y"] {
            assert_eq!(parse_bool_flag(value), Ok(true), "value: {}", value);
        }
    }

    #[test]
    fn test_parse_bool_flag_falsy() {
        for value in ["no", "false", "f", "n", "0", "NO", "False", "F", "N"] {
            assert_eq!(parse_bool_flag(value), Ok(false), "value: {}", value);
        }
    }

    #[test]
    fn test_parse_bool_flag_invalid() {
        for value in ["", "2", "maybe", "on", "off", "yess"] {
            assert_eq!(
                parse_bool_flag(value),
                Err(ConfigError::InvalidBooleanArgument(value.to_string()))
            );
        }
    }

    #[test]
    fn test_environment_from_str() {
        assert_eq!("dev".parse::<Environment>(), Ok(Environment::Dev));
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Prod));
        assert_eq!(
            "staging".parse::<Environment>(),
            Err(ConfigError::InvalidEnvironment("staging".to_string()))
        );
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Dev.to_string(), "dev");
        assert_eq!(Environment::Prod.to_string(), "prod");
    }
}
