// src/domain/ward.rs

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const PREFECTURE_CODE_SAITAMA: &str = "11";
pub const PREFECTURE_CODE_CHIBA: &str = "12";
pub const PREFECTURE_CODE_TOKYO: &str = "13";
pub const PREFECTURE_CODE_KANAGAWA: &str = "14";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefecture {
    pub name: String,
    /// Path segment used by the site's area pages, e.g. `tokyo`.
    pub url_path: String,
    pub code: String,
}

impl Prefecture {
    fn new(name: &str, url_path: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            url_path: url_path.to_string(),
            code: code.to_string(),
        }
    }

    /// Looks up one of the supported prefectures by its two-digit code.
    pub fn from_code(code: &str) -> Result<Self, ConfigError> {
        match code {
            PREFECTURE_CODE_SAITAMA => Ok(Self::new("埼玉県", "saitama", code)),
            PREFECTURE_CODE_CHIBA => Ok(Self::new("千葉県", "chiba", code)),
            PREFECTURE_CODE_TOKYO => Ok(Self::new("東京都", "tokyo", code)),
            PREFECTURE_CODE_KANAGAWA => Ok(Self::new("神奈川県", "kanagawa", code)),
            other => Err(ConfigError::UnknownPrefecture(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ward {
    pub name: String,
    /// Site-specific code, used in query strings and output file names.
    pub code: String,
    pub prefecture: Prefecture,
}
