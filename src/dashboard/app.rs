//! Dashboard application entry point
//!
//! The UI thread is the single owner of the [`ScanController`]. Network
//! submissions run on the tokio runtime and hand their outcome back over a
//! channel, so the controller's guards stay free of locks.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Duration;
use tracing::info;

use crate::acquire::camera::{CameraRequest, SystemCamera};
use crate::acquire::load_candidate;
use crate::api::models::{Ingredient, ScanResult};
use crate::api::{AnalysisClient, HttpAnalysisClient, ScanError};
use crate::config::AppConfig;
use crate::dashboard::state::{DashboardState, DashboardView, UiAction};
use crate::dashboard::theme;
use crate::dashboard::views::{render_history_view, render_ingredients_view, render_scan_view};
use crate::scan::ScanController;

type ScanOutcome = Result<ScanResult, ScanError>;
type CatalogOutcome = Result<Vec<Ingredient>, ScanError>;
type FeedOutcome = Result<Vec<ScanResult>, ScanError>;

/// Run the dashboard (blocking).
pub fn run_dashboard(config: AppConfig) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        persist_window: config.general.remember_window_size,
        ..Default::default()
    };

    let app = LabelLensApp::new(config)?;
    eframe::run_native(
        "Label Lens",
        options,
        Box::new(move |_cc| Ok(Box::new(app) as Box<dyn eframe::App>)),
    )
    .map_err(|e| anyhow::anyhow!("Dashboard error: {e}"))
}

/// The main dashboard application
pub struct LabelLensApp {
    controller: ScanController,
    client: HttpAnalysisClient,
    camera: SystemCamera,
    camera_request: CameraRequest,
    state: DashboardState,
    theme_applied: bool,
    runtime: tokio::runtime::Runtime,
    scan_tx: Sender<ScanOutcome>,
    scan_rx: Receiver<ScanOutcome>,
    catalog_tx: Sender<CatalogOutcome>,
    catalog_rx: Receiver<CatalogOutcome>,
    feed_tx: Sender<FeedOutcome>,
    feed_rx: Receiver<FeedOutcome>,
    health_tx: Sender<bool>,
    health_rx: Receiver<bool>,
    health_probed: bool,
}

impl LabelLensApp {
    /// Create the application from loaded configuration.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let client = HttpAnalysisClient::new(
            config.backend.base_url.clone(),
            Duration::from_secs(config.backend.timeout_secs),
        )?;
        info!("Analysis backend: {}", client.base_url());

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        let camera_request = CameraRequest {
            device_index: config.camera.device_index,
            width: config.camera.width,
            height: config.camera.height,
        };

        let (scan_tx, scan_rx) = unbounded();
        let (catalog_tx, catalog_rx) = unbounded();
        let (feed_tx, feed_rx) = unbounded();
        let (health_tx, health_rx) = unbounded();

        Ok(Self {
            controller: ScanController::new(config.camera.jpeg_quality),
            client,
            camera: SystemCamera,
            camera_request,
            state: DashboardState::default(),
            theme_applied: false,
            runtime,
            scan_tx,
            scan_rx,
            catalog_tx,
            catalog_rx,
            feed_tx,
            feed_rx,
            health_tx,
            health_rx,
            health_probed: false,
        })
    }

    /// Apply outcomes delivered by background tasks.
    fn drain_channels(&mut self) {
        while let Ok(outcome) = self.scan_rx.try_recv() {
            self.controller.finish_scan(outcome);
        }

        while let Ok(outcome) = self.catalog_rx.try_recv() {
            let ingredients = &mut self.state.ingredients;
            ingredients.loading = false;
            match outcome {
                Ok(entries) => {
                    ingredients.entries = entries;
                    ingredients.error = None;
                }
                Err(e) => {
                    ingredients.error = Some(format!("Could not load catalog: {e}"));
                }
            }
        }

        while let Ok(outcome) = self.feed_rx.try_recv() {
            let history = &mut self.state.history;
            history.loading = false;
            match outcome {
                Ok(scans) => {
                    history.remote = scans;
                    history.error = None;
                }
                Err(e) => {
                    history.error = Some(format!("Could not load server history: {e}"));
                }
            }
        }

        while let Ok(online) = self.health_rx.try_recv() {
            self.state.backend_online = Some(online);
        }
    }

    /// Probe backend reachability once at startup.
    fn probe_backend(&mut self, ctx: &egui::Context) {
        if self.health_probed {
            return;
        }
        self.health_probed = true;

        let client = self.client.clone();
        let tx = self.health_tx.clone();
        let repaint = ctx.clone();
        self.runtime.spawn(async move {
            let online = client.health_check().await;
            let _ = tx.send(online);
            repaint.request_repaint();
        });
    }

    /// Keep the preview and viewfinder textures in sync with the controller.
    fn update_textures(&mut self, ctx: &egui::Context) {
        // Live viewfinder: one frame per UI tick while the camera is open.
        if self.controller.is_camera_active() {
            if let Some(frame) = self.controller.viewfinder_frame() {
                let size = [frame.width() as usize, frame.height() as usize];
                let image = egui::ColorImage::from_rgb(size, frame.as_raw());
                self.state.scan.viewfinder_texture =
                    Some(ctx.load_texture("viewfinder", image, Default::default()));
            }
            ctx.request_repaint();
        } else {
            self.state.scan.viewfinder_texture = None;
        }

        // Still preview: rebuild only when the selection changes.
        match self.controller.selected_image() {
            Some(selected) => {
                if self.state.scan.preview_src.as_deref() != Some(selected.preview.as_str()) {
                    match image::load_from_memory(&selected.bytes) {
                        Ok(decoded) => {
                            let rgba = decoded.to_rgba8();
                            let size = [rgba.width() as usize, rgba.height() as usize];
                            let image =
                                egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                            self.state.scan.preview_texture =
                                Some(ctx.load_texture("preview", image, Default::default()));
                            self.state.scan.preview_src = Some(selected.preview.clone());
                        }
                        Err(e) => {
                            tracing::warn!("Could not decode preview: {}", e);
                            self.state.scan.preview_texture = None;
                            self.state.scan.preview_src = Some(selected.preview.clone());
                        }
                    }
                }
            }
            None => {
                self.state.scan.preview_texture = None;
                self.state.scan.preview_src = None;
            }
        }
    }

    /// Execute a user action emitted by a view.
    fn execute(&mut self, action: UiAction, ctx: &egui::Context) {
        match action {
            UiAction::StartCamera => {
                self.controller.start_camera(&self.camera, &self.camera_request);
            }
            UiAction::StopCamera => self.controller.stop_camera(),
            UiAction::CapturePhoto => self.controller.capture_photo(),
            UiAction::PickFile => self.pick_file(),
            UiAction::StartScan => self.start_scan(ctx),
            UiAction::Reset => self.controller.reset(),
            UiAction::RefreshCatalog => self.refresh_catalog(ctx),
            UiAction::RefreshRemoteScans => self.refresh_remote_scans(ctx),
        }
    }

    /// Open the native file dialog and feed the chosen file to the
    /// controller. Read failures surface on the error channel like every
    /// other acquisition failure.
    fn pick_file(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter(
                "Images",
                &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"],
            )
            .pick_file();

        if let Some(path) = picked {
            match load_candidate(&path) {
                Ok(candidate) => self.controller.select_file(candidate),
                Err(e) => self.controller.set_error(e.to_string()),
            }
        }
    }

    /// Begin a submission and run it on the runtime. The in-flight guard
    /// lives in the controller; a rejected begin spawns nothing.
    fn start_scan(&mut self, ctx: &egui::Context) {
        let Some(image) = self.controller.begin_scan() else {
            return;
        };

        let client = self.client.clone();
        let tx = self.scan_tx.clone();
        let repaint = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = client.scan_label(&image).await;
            let _ = tx.send(outcome);
            repaint.request_repaint();
        });
    }

    /// Fetch the ingredient reference catalog in the background.
    fn refresh_catalog(&mut self, ctx: &egui::Context) {
        if self.state.ingredients.loading {
            return;
        }
        self.state.ingredients.loading = true;
        self.state.ingredients.fetched_once = true;

        let client = self.client.clone();
        let tx = self.catalog_tx.clone();
        let repaint = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = client.known_ingredients().await;
            let _ = tx.send(outcome);
            repaint.request_repaint();
        });
    }

    /// Fetch the server-side scan feed in the background.
    fn refresh_remote_scans(&mut self, ctx: &egui::Context) {
        if self.state.history.loading {
            return;
        }
        self.state.history.loading = true;
        self.state.history.fetched_once = true;

        let client = self.client.clone();
        let tx = self.feed_tx.clone();
        let repaint = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = client.recent_scans().await;
            let _ = tx.send(outcome);
            repaint.request_repaint();
        });
    }
}

impl eframe::App for LabelLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        self.drain_channels();
        self.probe_backend(ctx);
        self.update_textures(ctx);

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                for view in DashboardView::ALL {
                    let selected = self.state.current_view == view;
                    if ui.selectable_label(selected, view.name()).clicked() {
                        self.state.current_view = view;
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match self.state.backend_online {
                        Some(true) => {
                            ui.colored_label(theme::ThemeColors::ACCENT_PRIMARY, "Online");
                        }
                        Some(false) => {
                            ui.colored_label(theme::ThemeColors::ACCENT_ERROR, "Offline");
                        }
                        None => {
                            ui.colored_label(theme::ThemeColors::TEXT_MUTED, "Connecting...");
                        }
                    }
                });
            });
            ui.add_space(6.0);
        });

        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none().inner_margin(16.0).show(ui, |ui| {
                action = match self.state.current_view {
                    DashboardView::Scan => {
                        render_scan_view(ui, &self.controller, &mut self.state.scan)
                    }
                    DashboardView::History => {
                        render_history_view(ui, self.controller.history(), &mut self.state.history)
                    }
                    DashboardView::Ingredients => {
                        render_ingredients_view(ui, &mut self.state.ingredients)
                    }
                };
            });
        });

        if let Some(action) = action {
            self.execute(action, ctx);
        }
    }
}
