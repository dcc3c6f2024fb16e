use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Source platforms the crawler and cookie store know about.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Weibo,
    Xiaohongshu,
    Pinterest,
    Unsplash,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Weibo,
        Platform::Xiaohongshu,
        Platform::Pinterest,
        Platform::Unsplash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Weibo => "weibo",
            Platform::Xiaohongshu => "xiaohongshu",
            Platform::Pinterest => "pinterest",
            Platform::Unsplash => "unsplash",
        }
    }

    /// Crawl modes the backend supports for this platform.
    pub fn crawl_modes(&self) -> &'static [&'static str] {
        match self {
            Platform::Weibo | Platform::Xiaohongshu | Platform::Pinterest => {
                &["keyword", "account"]
            }
            Platform::Unsplash => &["keyword"],
        }
    }

    /// Whether crawling this platform needs a logged-in cookie.
    pub fn requires_cookie(&self) -> bool {
        !matches!(self, Platform::Unsplash)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown platform '{}'", s))
    }
}
