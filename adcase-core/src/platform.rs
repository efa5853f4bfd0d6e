/// Video hosting platforms the pipeline understands natively.
///
/// This enum centralizes platform identity (short names, display names,
/// ID shape, aliases) so video IDs, watch links, thumbnails and oEmbed
/// endpoints are always derived from the same place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoPlatform {
    YouTube,
    Vimeo,
}

/// All platform variants in preference order (most preferred first).
const ALL_PLATFORMS: &[VideoPlatform] = &[VideoPlatform::YouTube, VideoPlatform::Vimeo];

impl VideoPlatform {
    /// Canonical short name used for CLI arguments, reports and logs.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
            Self::Vimeo => "vimeo",
        }
    }

    /// Full display name for the platform.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Vimeo => "Vimeo",
        }
    }

    /// All accepted names for this platform (case-insensitive matching).
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::YouTube => &["youtube", "yt", "youtu.be"],
            Self::Vimeo => &["vimeo", "vm"],
        }
    }

    /// Hostnames (without `www.`) that serve this platform's pages.
    pub fn hosts(&self) -> &'static [&'static str] {
        match self {
            Self::YouTube => &[
                "youtube.com",
                "m.youtube.com",
                "music.youtube.com",
                "youtu.be",
                "youtube-nocookie.com",
            ],
            Self::Vimeo => &["vimeo.com", "player.vimeo.com"],
        }
    }

    /// Whether `host` (already lowercased, `www.` stripped) belongs to this platform.
    pub fn owns_host(&self, host: &str) -> bool {
        self.hosts().contains(&host)
    }

    /// Whether `id` has the exact shape of an ID on this platform.
    ///
    /// YouTube IDs are 11 characters of `[A-Za-z0-9_-]`; Vimeo IDs are
    /// 6 to 12 ASCII digits.
    pub fn is_valid_id(&self, id: &str) -> bool {
        match self {
            Self::YouTube => {
                id.len() == 11
                    && id
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
            }
            Self::Vimeo => (6..=12).contains(&id.len()) && id.bytes().all(|b| b.is_ascii_digit()),
        }
    }

    /// Lower is better. Used to break score ties between candidates.
    pub fn preference_rank(&self) -> usize {
        ALL_PLATFORMS
            .iter()
            .position(|p| p == self)
            .unwrap_or(ALL_PLATFORMS.len())
    }

    /// Find the platform that owns a host, if any.
    pub fn for_host(host: &str) -> Option<VideoPlatform> {
        ALL_PLATFORMS.iter().copied().find(|p| p.owns_host(host))
    }

    /// All platform variants.
    pub fn all() -> &'static [VideoPlatform] {
        ALL_PLATFORMS
    }
}

impl std::fmt::Display for VideoPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Error returned when a string cannot be parsed into a `VideoPlatform`.
#[derive(Debug, Clone)]
pub struct PlatformParseError(pub String);

impl std::fmt::Display for PlatformParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown video platform: '{}'", self.0)
    }
}

impl std::error::Error for PlatformParseError {}

impl std::str::FromStr for VideoPlatform {
    type Err = PlatformParseError;

    /// Parse a platform from any recognized name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_PLATFORMS
            .iter()
            .copied()
            .find(|p| p.aliases().contains(&lower.as_str()))
            .ok_or_else(|| PlatformParseError(s.to_string()))
    }
}

/// A syntactically valid video ID on a known platform.
///
/// Only constructed through [`VideoRef::new`] or the extractors in
/// [`crate::url`], so the ID always matches the platform's shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct VideoRef {
    pub platform: VideoPlatform,
    pub id: String,
}

impl VideoRef {
    /// Returns `None` if `id` does not have the platform's ID shape.
    pub fn new(platform: VideoPlatform, id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        platform.is_valid_id(&id).then_some(Self { platform, id })
    }

    /// Canonical watch page for this video.
    pub fn watch_url(&self) -> String {
        crate::url::watch_url(self)
    }

    /// Canonical preview image for this video.
    pub fn thumbnail_url(&self) -> String {
        crate::url::thumbnail_url(self)
    }

    /// Public oEmbed metadata endpoint for this video.
    pub fn oembed_url(&self) -> String {
        crate::url::oembed_url(self)
    }
}

impl std::fmt::Display for VideoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.platform.short_name(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for &platform in VideoPlatform::all() {
            let parsed: VideoPlatform = platform.short_name().parse().unwrap();
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert_eq!("YT".parse::<VideoPlatform>().unwrap(), VideoPlatform::YouTube);
        assert_eq!("Vimeo".parse::<VideoPlatform>().unwrap(), VideoPlatform::Vimeo);
        assert!("dailymotion".parse::<VideoPlatform>().is_err());
    }

    #[test]
    fn short_name_is_first_alias() {
        for &platform in VideoPlatform::all() {
            assert_eq!(platform.short_name(), platform.aliases()[0]);
        }
    }

    #[test]
    fn id_shapes() {
        assert!(VideoPlatform::YouTube.is_valid_id("abc12345678"));
        assert!(VideoPlatform::YouTube.is_valid_id("dQw4w9WgXcQ"));
        assert!(!VideoPlatform::YouTube.is_valid_id("abc1234567"));
        assert!(!VideoPlatform::YouTube.is_valid_id("abc1234567$"));
        assert!(VideoPlatform::Vimeo.is_valid_id("123456"));
        assert!(VideoPlatform::Vimeo.is_valid_id("123456789012"));
        assert!(!VideoPlatform::Vimeo.is_valid_id("12345"));
        assert!(!VideoPlatform::Vimeo.is_valid_id("1234567890123"));
        assert!(!VideoPlatform::Vimeo.is_valid_id("12345a"));
    }

    #[test]
    fn video_ref_rejects_bad_ids() {
        assert!(VideoRef::new(VideoPlatform::YouTube, "short").is_none());
        assert!(VideoRef::new(VideoPlatform::Vimeo, "76979871").is_some());
    }

    #[test]
    fn host_lookup() {
        assert_eq!(VideoPlatform::for_host("youtu.be"), Some(VideoPlatform::YouTube));
        assert_eq!(VideoPlatform::for_host("player.vimeo.com"), Some(VideoPlatform::Vimeo));
        assert_eq!(VideoPlatform::for_host("example.com"), None);
    }
}
