use dental_core::analysis::ToothAnalysisClient;
use dental_core::Services;
use std::sync::Arc;

/// Application state shared across REST API handlers
///
/// Holds every core service plus the tooth-analysis client when one is configured.
/// Cloned per request; the services themselves only hold `Arc` handles.
#[derive(Clone, Debug)]
pub struct AppState {
    pub services: Arc<Services>,
    pub analysis: Option<Arc<ToothAnalysisClient>>,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self {
            services: Arc::new(services),
            analysis: None,
        }
    }

    pub fn with_analysis(mut self, client: ToothAnalysisClient) -> Self {
        self.analysis = Some(Arc::new(client));
        self
    }
}
