// Application state for HTTP handlers
use crate::application::collector_service::CollectorService;
use crate::presentation::frame_store::FrameStore;
use std::sync::Arc;

pub struct AppState {
    pub collector: Option<Arc<CollectorService>>,
    pub frames: Arc<FrameStore>,
}
