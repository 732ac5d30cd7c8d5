use serde::{Deserialize, Serialize};

/// What kind of title a link belongs to. Drives a handful of
/// canonicalization decisions (censorship markers are an anime concern,
/// season/episode only exists for serials).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Movie,
    Serial,
    AnimeMovie,
    AnimeSerial,
}

impl MediaKind {
    pub fn is_serial(self) -> bool {
        matches!(self, Self::Serial | Self::AnimeSerial)
    }

    pub fn is_anime(self) -> bool {
        matches!(self, Self::AnimeMovie | Self::AnimeSerial)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Serial => write!(f, "serial"),
            Self::AnimeMovie => write!(f, "anime-movie"),
            Self::AnimeSerial => write!(f, "anime-serial"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_kebab_case() {
        let json = serde_json::to_string(&MediaKind::AnimeSerial).unwrap();
        assert_eq!(json, "\"anime-serial\"");
        let back: MediaKind = serde_json::from_str("\"movie\"").unwrap();
        assert_eq!(back, MediaKind::Movie);
    }

    #[test]
    fn test_predicates() {
        assert!(MediaKind::AnimeSerial.is_serial());
        assert!(MediaKind::AnimeSerial.is_anime());
        assert!(!MediaKind::Movie.is_serial());
        assert!(!MediaKind::Serial.is_anime());
    }
}
