pub mod manifest;
pub mod media;
pub mod subtitle;

pub use manifest::Manifest;
pub use media::{MediaIdentifier, MediaType, ResolvedTitle};
pub use subtitle::{ExtractedSubtitle, SubtitleCandidate, SubtitleEntry, SubtitlesResponse};
