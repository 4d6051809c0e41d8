use serde::{Deserialize, Serialize};

use parley_common::{Error, Result};

/// The supported platforms. Closed set: config naming anything else is a
/// configuration error at construction, before any connection is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Discord,
    FourChan,
    Reddit,
    Snapchat,
    OnlyFans,
}

impl Platform {
    /// Canonical identifier, matching each adapter's `id()`.
    pub fn id(self) -> &'static str {
        match self {
            Self::Discord => "discord",
            Self::FourChan => "fourchan",
            Self::Reddit => "reddit",
            Self::Snapchat => "snapchat",
            Self::OnlyFans => "onlyfans",
        }
    }

    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "discord" => Ok(Self::Discord),
            "fourchan" | "4chan" => Ok(Self::FourChan),
            "reddit" => Ok(Self::Reddit),
            "snapchat" => Ok(Self::Snapchat),
            "onlyfans" => Ok(Self::OnlyFans),
            other => Err(Error::configuration(format!(
                "unsupported platform: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
