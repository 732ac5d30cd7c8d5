use phf::phf_map;

/// Resolution tokens ordered worst-first. The index is the comparison rank.
pub const RESOLUTION_LADDER: &[&str] = &[
    "360p", "480p", "576p", "720p", "1080p", "1440p", "2160p",
];

/// Release/distribution types ordered worst-first. The index is the
/// comparison rank used by the quality ranker.
pub const RELEASE_TYPE_LADDER: &[&str] = &[
    "CAM",
    "TeleSync",
    "TeleCine",
    "Screener",
    "DVDScr",
    "R5",
    "KoreanDub",
    "TVRip",
    "SATRip",
    "DVDRip",
    "HDRip",
    "WEB-Rip",
    "HD-TV",
    "BR-Rip",
    "BD-Rip",
    "WEB-DL",
    "BluRay",
    "Remux",
    "IMAX",
    "FIMAX",
    "4K",
    "8K",
];

/// Alias → canonical spelling for release types. Keys are uppercase with all
/// separators removed, matching `normalize_key`.
static RELEASE_TYPE_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "CAM" => "CAM",
    "CAMRIP" => "CAM",
    "HDCAM" => "CAM",
    "TS" => "TeleSync",
    "HDTS" => "TeleSync",
    "TELESYNC" => "TeleSync",
    "TC" => "TeleCine",
    "TELECINE" => "TeleCine",
    "SCR" => "Screener",
    "SCREENER" => "Screener",
    "DVDSCR" => "DVDScr",
    "R5" => "R5",
    "KOREANDUB" => "KoreanDub",
    "TVRIP" => "TVRip",
    "SATRIP" => "SATRip",
    "DVDRIP" => "DVDRip",
    "DVDR" => "DVDRip",
    "HDRIP" => "HDRip",
    "WEBRIP" => "WEB-Rip",
    "WEBR" => "WEB-Rip",
    "HDTV" => "HD-TV",
    "BRRIP" => "BR-Rip",
    "BRIP" => "BR-Rip",
    "BDRIP" => "BD-Rip",
    "WEBDL" => "WEB-DL",
    "WEB" => "WEB-DL",
    "BLURAY" => "BluRay",
    "BLUERAY" => "BluRay",
    "BDREMUX" => "Remux",
    "REMUX" => "Remux",
    "IMAX" => "IMAX",
    "FIMAX" => "FIMAX",
    "4K" => "4K",
    "8K" => "8K",
};

/// Reputable encoders ordered worst-first. The index is the comparison rank.
/// Everything in `ENCODERS` but not here ranks below all of these.
pub const ENCODER_LADDER: &[&str] = &[
    "EVO",
    "CMRG",
    "Ganool",
    "MkvCage",
    "ShAaNiG",
    "Pahe",
    "RMTeam",
    "GalaxyRG",
    "NTG",
    "SPARKS",
    "YIFY",
    "RARBG",
    "PSA",
    "QxR",
];

/// The full closed encoder vocabulary, longest names first so that a greedy
/// scan prefers the most specific match ("MkvCage" before "Mkv").
pub const ENCODERS: &[&str] = &[
    "Judas",
    "LostYears",
    "AnimeRG",
    "DeadFish",
    "HorribleSubs",
    "SubsPlease",
    "Erai-raws",
    "GalaxyRG",
    "GalaxyTV",
    "MinyanSub",
    "ShAaNiG",
    "MkvCage",
    "MkvHub",
    "Mkvking",
    "RMTeam",
    "RMT",
    "SPARKS",
    "GECKOS",
    "AMIABLE",
    "DRONES",
    "MORTENGEL",
    "NITRIP",
    "nitroo",
    "Ganool",
    "PaheDL",
    "Pahe",
    "YIFY",
    "YTS",
    "RARBG",
    "RARBP",
    "CMRG",
    "EVO",
    "NTG",
    "NTb",
    "PSA",
    "QxR",
    "Tigole",
    "FGT",
    "STRiFE",
    "ION10",
    "CM8",
    "MeGusta",
    "TEPES",
    "SiGMA",
    "HDETG",
    "ETRG",
    "JYK",
    "Joy",
    "anoXmous",
    "ShieldBearer",
    "TOMMY",
    "MZABI",
    "LAZY",
    "SARTRE",
    "Vyndros",
    // Site brands that show up in filenames as pseudo release-group tags.
    // `is_site_housekeeping` filters these when competing with a real encoder.
    "Film2Media",
    "DigiMoviez",
    "AvaMovie",
    "Golchindl",
    "Bia2Anime",
];

/// Bonus-content markers recognized with an optional numeric suffix.
pub const BONUS_MARKERS: &[&str] = &["NCED", "NCOP", "OVA", "ONA", "OAD", "SP", "Special", "Redial"];

/// Localized structural tokens translated into their canonical English
/// equivalent before any other processing. Longest needles first.
pub const TRANSLATIONS: &[(&str, &str)] = &[
    ("قسمت ویژه", "Special"),
    ("پشت صحنه", "BehindTheScenes"),
    ("دوبله فارسی", "Dubbed(Farsi)"),
    ("دوبله", "Dubbed"),
    ("سانسور شده", "Censored"),
    ("بدون سانسور", "Uncensored"),
    ("زیرنویس چسبیده", "HardSub"),
    ("پارت", "Part"),
    ("بخش", "Part"),
    ("فصل", "Season"),
    ("قسمت", "Episode"),
];

/// Localized boilerplate stripped outright: download/quality labels that
/// carry no metadata once the structural tokens above are translated.
pub const STRIP_WORDS: &[&str] = &[
    "دانلود",
    "کیفیت",
    "انکودر",
    "لینک",
    "مستقیم",
    "رایگان",
    "نسخه",
    "با",
    "زیرنویس",
    "چسبیده",
    "پخش",
    "آنلاین",
];

/// Housekeeping names sites embed in their own URLs. An encoder match from
/// the address that equals one of these is discarded.
pub const SITE_HOUSEKEEPING: &[&str] = &[
    "Film2Media", "DigiMoviez", "Salamdl", "AvaMovie", "Bia2Anime", "Bia2HD", "Golchindl",
    "MovieBaz", "UpMovies", "TokyoTosho", "Nyaa", "Anime20",
];

/// Uppercase a token and remove separator characters, for alias lookup.
fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

/// Rank of a resolution token (worst-first index), if recognized.
pub fn resolution_rank(token: &str) -> Option<usize> {
    let lower = token.to_lowercase();
    RESOLUTION_LADDER.iter().position(|r| *r == lower)
}

pub fn is_resolution(token: &str) -> bool {
    resolution_rank(token).is_some()
}

/// Canonical spelling of a release type, tolerant to case and separators.
pub fn canonical_release_type(token: &str) -> Option<&'static str> {
    RELEASE_TYPE_ALIASES.get(normalize_key(token).as_str()).copied()
}

/// Rank of a release type on the distribution ladder (worst-first index).
pub fn release_type_rank(token: &str) -> Option<usize> {
    let canonical = canonical_release_type(token)?;
    RELEASE_TYPE_LADDER.iter().position(|r| *r == canonical)
}

/// Exact (case-insensitive) encoder vocabulary membership.
pub fn canonical_encoder(token: &str) -> Option<&'static str> {
    ENCODERS
        .iter()
        .find(|e| e.eq_ignore_ascii_case(token))
        .copied()
}

/// Rank of an encoder on the reputable ladder; unranked encoders get `None`.
pub fn encoder_rank(token: &str) -> Option<usize> {
    let canonical = canonical_encoder(token)?;
    ENCODER_LADDER.iter().position(|e| *e == canonical)
}

/// Find the highest-priority encoder name appearing anywhere in `haystack`.
/// `ENCODERS` is scanned in declaration order, so longer/more specific names
/// must be listed before their prefixes.
pub fn find_encoder(haystack: &str) -> Option<&'static str> {
    let lower = haystack.to_lowercase();
    ENCODERS
        .iter()
        .find(|e| lower.contains(&e.to_lowercase()))
        .copied()
}

/// True when `name` is a site housekeeping token rather than a real encoder.
pub fn is_site_housekeeping(name: &str) -> bool {
    SITE_HOUSEKEEPING
        .iter()
        .any(|s| s.eq_ignore_ascii_case(name))
}

/// Canonical spelling of a bonus-content marker.
pub fn canonical_bonus_marker(token: &str) -> Option<&'static str> {
    BONUS_MARKERS
        .iter()
        .find(|m| m.eq_ignore_ascii_case(token))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_type_aliases() {
        assert_eq!(canonical_release_type("WEB-DL"), Some("WEB-DL"));
        assert_eq!(canonical_release_type("webdl"), Some("WEB-DL"));
        assert_eq!(canonical_release_type("Blu-Ray"), Some("BluRay"));
        assert_eq!(canonical_release_type("BRrip"), Some("BR-Rip"));
        assert_eq!(canonical_release_type("x265"), None);
    }

    #[test]
    fn test_ladder_ordering() {
        let cam = release_type_rank("CAM").unwrap();
        let webdl = release_type_rank("WEB-DL").unwrap();
        let bluray = release_type_rank("BluRay").unwrap();
        assert!(cam < webdl);
        assert!(webdl < bluray);
    }

    #[test]
    fn test_resolution_rank() {
        assert!(resolution_rank("720p").unwrap() < resolution_rank("1080p").unwrap());
        assert_eq!(resolution_rank("144p"), None);
    }

    #[test]
    fn test_encoder_lookup() {
        assert_eq!(canonical_encoder("yify"), Some("YIFY"));
        assert_eq!(find_encoder("the.movie.2020.1080p.web-dl.pahe"), Some("Pahe"));
        assert!(encoder_rank("PSA").unwrap() > encoder_rank("EVO").unwrap());
        assert_eq!(encoder_rank("DeadFish"), None);
    }

    #[test]
    fn test_longest_encoder_wins() {
        // "MkvCage" must be found, not a shorter vocabulary entry.
        assert_eq!(find_encoder("film.720p.mkvcage.mkv"), Some("MkvCage"));
    }

    #[test]
    fn test_housekeeping() {
        assert!(is_site_housekeeping("digimoviez"));
        assert!(!is_site_housekeeping("PSA"));
    }

    #[test]
    fn test_bonus_markers() {
        assert_eq!(canonical_bonus_marker("ova"), Some("OVA"));
        assert_eq!(canonical_bonus_marker("ncop"), Some("NCOP"));
        assert_eq!(canonical_bonus_marker("movie"), None);
    }
}
