pub mod error;
pub mod files;
pub mod health;
pub mod manifest;
pub mod subtitles;

use std::sync::Arc;

use crate::models::Manifest;
use crate::services::SubtitleService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SubtitleService>,
    pub manifest: Arc<Manifest>,
}

impl AppState {
    pub fn new(service: SubtitleService) -> Self {
        let manifest = Manifest::for_language(service.language());
        Self {
            service: Arc::new(service),
            manifest: Arc::new(manifest),
        }
    }
}
