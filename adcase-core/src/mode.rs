use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Which record field a repair run resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairMode {
    /// Replace `outboundUrl` (and refresh `thumbnailUrl` when the accepted
    /// candidate is a video).
    Link,
    /// Replace only `thumbnailUrl`; candidates must serve `image/*` content.
    Thumbnail,
}

impl RepairMode {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Thumbnail => "thumbnail",
        }
    }

    /// Gatherers used when none are configured explicitly.
    pub fn default_gatherers(&self) -> &'static [GathererKind] {
        match self {
            Self::Link => &[
                GathererKind::Direct,
                GathererKind::VideoSearch,
                GathererKind::WebSearch,
                GathererKind::SourcePage,
            ],
            Self::Thumbnail => &[
                GathererKind::Direct,
                GathererKind::VideoSearch,
                GathererKind::SourcePage,
            ],
        }
    }
}

impl std::fmt::Display for RepairMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl std::str::FromStr for RepairMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "link" | "links" | "outbound" | "url" => Ok(Self::Link),
            "thumbnail" | "thumbnails" | "thumb" | "image" => Ok(Self::Thumbnail),
            _ => Err(ParseError::new("repair mode", s)),
        }
    }
}

/// The candidate sources that can be enabled for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GathererKind {
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "video", alias = "video-search", alias = "youtube")]
    VideoSearch,
    #[serde(rename = "web", alias = "web-search", alias = "search")]
    WebSearch,
    #[serde(rename = "sourcepage", alias = "source-page", alias = "source")]
    SourcePage,
}

const ALL_GATHERERS: &[GathererKind] = &[
    GathererKind::Direct,
    GathererKind::VideoSearch,
    GathererKind::WebSearch,
    GathererKind::SourcePage,
];

impl GathererKind {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::VideoSearch => "video",
            Self::WebSearch => "web",
            Self::SourcePage => "sourcepage",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Direct => &["direct", "direct-id", "id"],
            Self::VideoSearch => &["video", "video-search", "youtube"],
            Self::WebSearch => &["web", "web-search", "search"],
            Self::SourcePage => &["sourcepage", "source-page", "source"],
        }
    }

    pub fn all() -> &'static [GathererKind] {
        ALL_GATHERERS
    }

    /// Parse a comma-separated list (e.g. `"direct,video"`), keeping order
    /// and dropping duplicates.
    pub fn parse_list(s: &str) -> Result<Vec<GathererKind>, ParseError> {
        let mut kinds = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let kind: GathererKind = part.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }
}

impl std::fmt::Display for GathererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl std::str::FromStr for GathererKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_GATHERERS
            .iter()
            .copied()
            .find(|k| k.aliases().contains(&lower.as_str()))
            .ok_or_else(|| ParseError::new("gatherer", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parsing() {
        assert_eq!("LINK".parse::<RepairMode>().unwrap(), RepairMode::Link);
        assert_eq!("thumbnails".parse::<RepairMode>().unwrap(), RepairMode::Thumbnail);
        assert!("video".parse::<RepairMode>().is_err());
    }

    #[test]
    fn gatherer_list_parsing() {
        let kinds = GathererKind::parse_list("direct, youtube,web,direct").unwrap();
        assert_eq!(
            kinds,
            vec![GathererKind::Direct, GathererKind::VideoSearch, GathererKind::WebSearch]
        );
        assert!(GathererKind::parse_list("direct,ftp").is_err());
        assert!(GathererKind::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn short_name_is_first_alias() {
        for &kind in GathererKind::all() {
            assert_eq!(kind.short_name(), kind.aliases()[0]);
        }
    }

    #[test]
    fn thumbnail_mode_skips_web_search() {
        assert!(!RepairMode::Thumbnail
            .default_gatherers()
            .contains(&GathererKind::WebSearch));
    }
}
