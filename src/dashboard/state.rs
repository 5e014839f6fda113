//! Dashboard view state
//!
//! View-local state only; the orchestration state lives in
//! [`crate::scan::ScanController`] and the dashboard just reads it.

use crate::api::models::Ingredient;

/// Current view in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardView {
    #[default]
    Scan,
    History,
    Ingredients,
}

impl DashboardView {
    /// Display name for the tab bar
    pub fn name(&self) -> &'static str {
        match self {
            DashboardView::Scan => "Scan",
            DashboardView::History => "History",
            DashboardView::Ingredients => "Ingredients",
        }
    }

    pub const ALL: [DashboardView; 3] = [
        DashboardView::Scan,
        DashboardView::History,
        DashboardView::Ingredients,
    ];
}

/// User intents emitted by the views and executed by the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    StartCamera,
    StopCamera,
    CapturePhoto,
    PickFile,
    StartScan,
    Reset,
    RefreshCatalog,
    RefreshRemoteScans,
}

/// Overall dashboard state
#[derive(Default)]
pub struct DashboardState {
    /// Current active view
    pub current_view: DashboardView,
    /// Scan view state
    pub scan: ScanViewState,
    /// History view state
    pub history: HistoryViewState,
    /// Ingredients view state
    pub ingredients: IngredientsViewState,
    /// Last backend health probe, `None` until the first probe resolves
    pub backend_online: Option<bool>,
}

/// Scan view state
#[derive(Default)]
pub struct ScanViewState {
    /// Texture for the selected-image preview
    pub preview_texture: Option<egui::TextureHandle>,
    /// Preview data URI the texture was built from, to detect changes
    pub preview_src: Option<String>,
    /// Texture for the live viewfinder
    pub viewfinder_texture: Option<egui::TextureHandle>,
}

impl std::fmt::Debug for ScanViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanViewState")
            .field("has_preview", &self.preview_texture.is_some())
            .field("has_viewfinder", &self.viewfinder_texture.is_some())
            .finish()
    }
}

/// History view state
#[derive(Debug, Default)]
pub struct HistoryViewState {
    /// Scan feed fetched from the backend
    pub remote: Vec<crate::api::models::ScanResult>,
    /// Whether a feed fetch is in progress
    pub loading: bool,
    /// Whether a feed fetch has been attempted
    pub fetched_once: bool,
    /// Last fetch error
    pub error: Option<String>,
}

/// Ingredients view state
#[derive(Debug, Default)]
pub struct IngredientsViewState {
    /// Reference catalog fetched from the backend
    pub entries: Vec<Ingredient>,
    /// Whether a fetch is in progress
    pub loading: bool,
    /// Whether a fetch has been attempted
    pub fetched_once: bool,
    /// Last fetch error
    pub error: Option<String>,
    /// Filter text
    pub search: String,
}
