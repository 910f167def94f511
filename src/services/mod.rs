pub mod filename_hint;
pub mod resolver;
pub mod subtitle_service;
pub mod subtitle_store;

pub use resolver::{ResolverChain, TitleResolver};
pub use subtitle_service::{PipelineOutcome, SubtitleService};
pub use subtitle_store::{StoredSubtitle, SubtitleStore};
