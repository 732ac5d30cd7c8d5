pub mod canonical;
pub mod keyword;
pub mod media;
pub mod order;
pub mod season_episode;

pub use canonical::canonicalize;
pub use media::MediaKind;
pub use order::reorder;
pub use season_episode::{resolve, SeasonEpisode};
