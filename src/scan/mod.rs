//! Scan Orchestration
//!
//! [`ScanController`] owns the whole submission lifecycle: image acquisition
//! (camera or file), validation, single-flight submission to the analysis
//! service, and the bounded result history. The presentation layer only
//! reads this state and invokes the operations here; no failure escapes the
//! operation boundary, every failure lands in the single error message.
//!
//! Concurrency is guard-based, not queue-based: an in-flight flag rejects
//! re-entrant submissions and a session-exists check keeps at most one
//! camera session open. The `begin_scan` / `finish_scan` split keeps those
//! guards synchronous so the network call can run on a background task
//! without locking the controller.

pub mod history;

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::acquire::camera::{encode_jpeg, CameraDevice, CameraRequest, CameraSession};
use crate::acquire::{validate_candidate, FileCandidate, SelectedImage};
use crate::api::models::ScanResult;
use crate::api::{AnalysisClient, ScanError};
use history::ScanHistory;

/// Derived view of the orchestration state machine, for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Nothing acquired, nothing running
    Idle,
    /// A camera session is open
    CameraActive,
    /// An image is selected and ready to submit
    ImageReady,
    /// A submission is in flight
    Scanning,
    /// The latest submission completed
    Complete,
    /// The latest action failed
    Failed,
}

/// Owns the scan lifecycle state and drives its transitions
pub struct ScanController {
    selected_image: Option<SelectedImage>,
    camera: Option<CameraSession>,
    scan_in_flight: bool,
    current_result: Option<ScanResult>,
    history: ScanHistory,
    last_error: Option<String>,
    jpeg_quality: u8,
}

impl ScanController {
    /// Create an idle controller. Captured stills are encoded at the given
    /// JPEG quality (0-100).
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            selected_image: None,
            camera: None,
            scan_in_flight: false,
            current_result: None,
            history: ScanHistory::new(),
            last_error: None,
            jpeg_quality,
        }
    }

    // --- read-only accessors for the presentation layer ---

    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.selected_image.as_ref()
    }

    pub fn current_result(&self) -> Option<&ScanResult> {
        self.current_result.as_ref()
    }

    pub fn history(&self) -> &ScanHistory {
        &self.history
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_camera_active(&self) -> bool {
        self.camera.is_some()
    }

    pub fn is_scan_in_flight(&self) -> bool {
        self.scan_in_flight
    }

    /// Current phase of the informal state machine.
    pub fn phase(&self) -> ScanPhase {
        if self.scan_in_flight {
            ScanPhase::Scanning
        } else if self.camera.is_some() {
            ScanPhase::CameraActive
        } else if self.last_error.is_some() {
            ScanPhase::Failed
        } else if self.current_result.is_some() {
            ScanPhase::Complete
        } else if self.selected_image.is_some() {
            ScanPhase::ImageReady
        } else {
            ScanPhase::Idle
        }
    }

    // --- acquisition ---

    /// Open a camera session. No-op while one is already open; on denial or
    /// hardware failure the error message is set and nothing else changes.
    pub fn start_camera(&mut self, device: &dyn CameraDevice, request: &CameraRequest) {
        self.last_error = None;

        if self.camera.is_some() {
            debug!("Camera already active, ignoring start request");
            return;
        }

        match CameraSession::open(device, request) {
            Ok(session) => {
                self.camera = Some(session);
            }
            Err(e) => {
                warn!("Camera open failed: {}", e);
                self.last_error = Some(format!("{}. You can upload a photo instead.", e));
            }
        }
    }

    /// Release the active camera session. Safe to call with none open.
    pub fn stop_camera(&mut self) {
        if let Some(mut session) = self.camera.take() {
            session.release();
        }
    }

    /// Grab the current frame for the live viewfinder. Read-only with
    /// respect to the orchestration state.
    pub fn viewfinder_frame(&mut self) -> Option<RgbImage> {
        self.camera.as_mut().and_then(|s| s.capture_frame().ok())
    }

    /// Capture a still from the active session and commit it as the
    /// selected image. The session is released on every outcome; capture
    /// always terminates it.
    pub fn capture_photo(&mut self) {
        self.last_error = None;

        let Some(mut session) = self.camera.take() else {
            self.last_error = Some("Camera is not active".to_string());
            return;
        };

        let encoded = session
            .capture_frame()
            .and_then(|frame| encode_jpeg(&frame, self.jpeg_quality));
        session.release();

        match encoded {
            Ok(bytes) => {
                info!("Captured photo ({} bytes)", bytes.len());
                self.commit_selected(SelectedImage::new(bytes, "image/jpeg", "capture.jpg"));
            }
            Err(e) => {
                warn!("Photo capture failed: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    /// Validate a user-chosen file and commit it as the selected image.
    /// Rejection leaves any prior selection untouched.
    pub fn select_file(&mut self, candidate: FileCandidate) {
        self.last_error = None;

        if let Err(e) = validate_candidate(&candidate) {
            debug!("Rejected candidate {:?}: {}", candidate.file_name, e);
            self.last_error = Some(e.to_string());
            return;
        }

        let FileCandidate {
            file_name,
            mime_type,
            bytes,
            ..
        } = candidate;
        self.commit_selected(SelectedImage::new(bytes, mime_type, file_name));
    }

    /// Single commit path for both camera and file acquisitions.
    fn commit_selected(&mut self, image: SelectedImage) {
        debug!(
            "Selected image committed ({} bytes, {})",
            image.len(),
            image.mime_type
        );
        self.selected_image = Some(image);
        self.last_error = None;
    }

    // --- submission ---

    /// Start a submission: sets the in-flight flag, clears the error and the
    /// previous result, and yields the payload to send. Returns `None` (and
    /// issues no request) without a selected image or while a scan is
    /// already in flight.
    pub fn begin_scan(&mut self) -> Option<SelectedImage> {
        if self.scan_in_flight {
            debug!("Scan already in flight, ignoring submission");
            return None;
        }
        let image = self.selected_image.clone()?;

        self.scan_in_flight = true;
        self.last_error = None;
        self.current_result = None;
        info!("Scan started ({} bytes)", image.len());
        Some(image)
    }

    /// Resolve an in-flight submission. Clears the in-flight flag on every
    /// outcome; failures leave the history and prior result untouched.
    pub fn finish_scan(&mut self, outcome: Result<ScanResult, ScanError>) {
        self.scan_in_flight = false;

        match outcome {
            Ok(result) => {
                info!(
                    "Scan {} complete in {:.2}s",
                    result.scan_id, result.processing_time
                );
                self.current_result = Some(result.clone());
                self.history.push(result);
                self.selected_image = None;
            }
            Err(e) => {
                warn!("Scan failed: {:?}", e);
                self.last_error = Some(format!("Scan failed: {}", e));
            }
        }
    }

    /// Submit the selected image and resolve the outcome in one call.
    /// No-op without a selected image or while a scan is in flight.
    pub async fn scan<C: AnalysisClient + Sync>(&mut self, client: &C) {
        let Some(image) = self.begin_scan() else {
            return;
        };
        let outcome = client.scan_label(&image).await;
        self.finish_scan(outcome);
    }

    /// Surface a failure caught at the presentation boundary, e.g. a file
    /// that could not be read before it ever became a candidate.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Clear the selected image, the current result, and the error message.
    /// The history is deliberately kept.
    pub fn reset(&mut self) {
        self.selected_image = None;
        self.current_result = None;
        self.last_error = None;
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        // Component teardown is an exit path too; never leak the camera.
        self.stop_camera();
    }
}

impl std::fmt::Debug for ScanController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanController")
            .field("phase", &self.phase())
            .field("scan_in_flight", &self.scan_in_flight)
            .field("history_len", &self.history.len())
            .field("last_error", &self.last_error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::camera::{CameraError, CameraStream};
    use crate::acquire::MAX_UPLOAD_BYTES;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn result(id: &str) -> ScanResult {
        ScanResult {
            scan_id: id.to_string(),
            processing_time: 1.23,
            ocr_text: "SUGAR, SALT".to_string(),
            parsed_ingredients: Vec::new(),
            nutritional_info: Default::default(),
        }
    }

    fn jpeg_candidate(name: &str, size: usize) -> FileCandidate {
        FileCandidate::from_bytes(name, "image/jpeg", vec![0xAB; size])
    }

    /// Analysis client fake: pops queued outcomes and counts requests.
    struct FakeClient {
        outcomes: Mutex<VecDeque<Result<ScanResult, ScanError>>>,
        requests: AtomicUsize,
    }

    impl FakeClient {
        fn with(outcomes: Vec<Result<ScanResult, ScanError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                requests: AtomicUsize::new(0),
            }
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalysisClient for FakeClient {
        async fn scan_label(&self, _image: &SelectedImage) -> Result<ScanResult, ScanError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ScanError::Transport("no outcome queued".into())))
        }
    }

    /// Camera fakes tracking stream releases.
    struct FakeStream {
        releases: Arc<AtomicUsize>,
        fail_capture: bool,
    }

    impl CameraStream for FakeStream {
        fn capture_frame(&mut self) -> Result<RgbImage, CameraError> {
            if self.fail_capture {
                Err(CameraError::Frame("device wedged".to_string()))
            } else {
                Ok(RgbImage::new(4, 4))
            }
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeDevice {
        releases: Arc<AtomicUsize>,
        opens: AtomicUsize,
        deny: bool,
        fail_capture: bool,
    }

    impl FakeDevice {
        fn working() -> Self {
            Self {
                releases: Arc::new(AtomicUsize::new(0)),
                opens: AtomicUsize::new(0),
                deny: false,
                fail_capture: false,
            }
        }

        fn denying() -> Self {
            Self {
                deny: true,
                ..Self::working()
            }
        }

        fn wedged() -> Self {
            Self {
                fail_capture: true,
                ..Self::working()
            }
        }

        fn release_count(&self) -> usize {
            self.releases.load(Ordering::SeqCst)
        }
    }

    impl CameraDevice for FakeDevice {
        fn open(&self, _request: &CameraRequest) -> Result<Box<dyn CameraStream>, CameraError> {
            if self.deny {
                return Err(CameraError::AccessDenied);
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                releases: self.releases.clone(),
                fail_capture: self.fail_capture,
            }))
        }
    }

    // --- acquisition ---

    #[test]
    fn test_select_file_commits_and_clears_error() {
        let mut ctl = ScanController::new(80);
        ctl.select_file(FileCandidate::from_bytes("junk.txt", "text/plain", vec![0]));
        assert!(ctl.last_error().is_some());

        ctl.select_file(jpeg_candidate("label.jpg", 2 * 1024 * 1024));
        assert!(ctl.last_error().is_none());
        assert_eq!(ctl.selected_image().unwrap().file_name, "label.jpg");
        assert_eq!(ctl.phase(), ScanPhase::ImageReady);
    }

    #[test]
    fn test_oversized_file_rejected_and_prior_selection_kept() {
        let mut ctl = ScanController::new(80);
        ctl.select_file(jpeg_candidate("first.jpg", 100));

        let oversized = FileCandidate {
            file_name: "huge.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size: MAX_UPLOAD_BYTES + 1,
            bytes: Vec::new(),
        };
        ctl.select_file(oversized);

        assert_eq!(ctl.last_error(), Some("File size must be less than 10MB"));
        assert_eq!(ctl.selected_image().unwrap().file_name, "first.jpg");
    }

    #[test]
    fn test_start_camera_denied_sets_error_and_keeps_selection() {
        let mut ctl = ScanController::new(80);
        ctl.select_file(jpeg_candidate("kept.jpg", 10));

        let device = FakeDevice::denying();
        ctl.start_camera(&device, &CameraRequest::default());

        assert!(!ctl.is_camera_active());
        assert!(ctl.last_error().unwrap().contains("denied"));
        assert_eq!(ctl.selected_image().unwrap().file_name, "kept.jpg");
    }

    #[test]
    fn test_second_start_camera_is_no_op() {
        let mut ctl = ScanController::new(80);
        let device = FakeDevice::working();

        ctl.start_camera(&device, &CameraRequest::default());
        ctl.start_camera(&device, &CameraRequest::default());

        assert!(ctl.is_camera_active());
        assert_eq!(device.opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_camera_releases_and_is_safe_when_idle() {
        let mut ctl = ScanController::new(80);
        let device = FakeDevice::working();

        // Redundant stop with no session.
        ctl.stop_camera();

        ctl.start_camera(&device, &CameraRequest::default());
        ctl.stop_camera();
        ctl.stop_camera();

        assert!(!ctl.is_camera_active());
        assert_eq!(device.release_count(), 1);
    }

    #[test]
    fn test_capture_photo_commits_jpeg_and_ends_session() {
        let mut ctl = ScanController::new(80);
        let device = FakeDevice::working();

        ctl.start_camera(&device, &CameraRequest::default());
        ctl.capture_photo();

        assert!(!ctl.is_camera_active());
        assert_eq!(device.release_count(), 1);

        let image = ctl.selected_image().unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(&image.bytes[..2], &[0xFF, 0xD8]);
        assert!(image.preview.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_capture_failure_still_releases_session() {
        let mut ctl = ScanController::new(80);
        let device = FakeDevice::wedged();

        ctl.start_camera(&device, &CameraRequest::default());
        ctl.capture_photo();

        assert!(!ctl.is_camera_active());
        assert_eq!(device.release_count(), 1);
        assert!(ctl.selected_image().is_none());
        assert!(ctl.last_error().unwrap().contains("device wedged"));
    }

    #[test]
    fn test_controller_drop_releases_camera() {
        let device = FakeDevice::working();
        {
            let mut ctl = ScanController::new(80);
            ctl.start_camera(&device, &CameraRequest::default());
        }
        assert_eq!(device.release_count(), 1);
    }

    // --- submission ---

    #[tokio::test]
    async fn test_scan_without_image_is_no_op() {
        let mut ctl = ScanController::new(80);
        let client = FakeClient::with(vec![Ok(result("x"))]);

        ctl.scan(&client).await;

        assert_eq!(client.requests(), 0);
        assert!(ctl.current_result().is_none());
        assert!(!ctl.is_scan_in_flight());
    }

    #[tokio::test]
    async fn test_scan_while_in_flight_issues_no_second_request() {
        let mut ctl = ScanController::new(80);
        ctl.select_file(jpeg_candidate("label.jpg", 10));

        let first = ctl.begin_scan();
        assert!(first.is_some());
        assert!(ctl.is_scan_in_flight());

        // Re-entrant begin is rejected...
        assert!(ctl.begin_scan().is_none());

        // ...and the composed scan() path issues no request either.
        let client = FakeClient::with(vec![Ok(result("x"))]);
        ctl.scan(&client).await;
        assert_eq!(client.requests(), 0);

        // After the outstanding scan resolves, submission is accepted again.
        ctl.finish_scan(Err(ScanError::Transport("boom".into())));
        assert!(!ctl.is_scan_in_flight());
        assert!(ctl.begin_scan().is_some());
    }

    #[tokio::test]
    async fn test_successful_scan_sets_result_and_history() {
        let mut ctl = ScanController::new(80);
        ctl.select_file(jpeg_candidate("label.jpg", 2 * 1024 * 1024));

        let payload: ScanResult = serde_json::from_str(
            r#"{
                "scan_id": "abc12345",
                "processing_time": 1.23,
                "ocr_text": "SUGAR, SALT",
                "parsed_ingredients": [
                    {"name": "Sugar", "risk_level": "caution", "confidence": 0.9,
                     "banned_in": {}, "sources": []}
                ],
                "nutritional_info": {}
            }"#,
        )
        .unwrap();
        let client = FakeClient::with(vec![Ok(payload.clone())]);

        ctl.scan(&client).await;

        assert_eq!(client.requests(), 1);
        assert_eq!(ctl.current_result(), Some(&payload));
        assert_eq!(ctl.history().latest(), Some(&payload));
        assert!(ctl.selected_image().is_none());
        assert!(ctl.last_error().is_none());
        assert_eq!(ctl.phase(), ScanPhase::Complete);
    }

    #[tokio::test]
    async fn test_failed_scan_leaves_result_and_history_unchanged() {
        let mut ctl = ScanController::new(80);

        // One success to establish prior state.
        ctl.select_file(jpeg_candidate("a.jpg", 10));
        let client = FakeClient::with(vec![Ok(result("prior"))]);
        ctl.scan(&client).await;

        let prior_result = ctl.current_result().cloned();
        let prior_history: Vec<ScanResult> = ctl.history().entries().to_vec();

        // Backend rejects the next submission.
        ctl.select_file(jpeg_candidate("b.jpg", 10));
        let client = FakeClient::with(vec![Err(ScanError::Submission {
            status: 422,
            detail: "unreadable image".to_string(),
        })]);
        ctl.scan(&client).await;

        assert_eq!(ctl.last_error(), Some("Scan failed: unreadable image"));
        // begin_scan cleared the previous result before submitting; the
        // failure itself added nothing and the history is untouched.
        assert!(ctl.current_result().is_none());
        assert_eq!(ctl.history().entries(), prior_history.as_slice());
        assert_eq!(prior_result.unwrap().scan_id, "prior");
        assert!(!ctl.is_scan_in_flight());
        assert!(ctl.begin_scan().is_some());
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_generic_message() {
        let mut ctl = ScanController::new(80);
        ctl.select_file(jpeg_candidate("a.jpg", 10));

        let client = FakeClient::with(vec![Err(ScanError::Transport(
            "connection refused".to_string(),
        ))]);
        ctl.scan(&client).await;

        assert_eq!(
            ctl.last_error(),
            Some("Scan failed: could not reach the analysis service")
        );
        assert!(!ctl.is_scan_in_flight());
    }

    #[tokio::test]
    async fn test_history_keeps_five_most_recent_of_seven() {
        let mut ctl = ScanController::new(80);

        for i in 0..7 {
            ctl.select_file(jpeg_candidate(&format!("{i}.jpg"), 10));
            let client = FakeClient::with(vec![Ok(result(&format!("scan-{i}")))]);
            ctl.scan(&client).await;
        }

        let ids: Vec<_> = ctl.history().iter().map(|r| r.scan_id.as_str()).collect();
        assert_eq!(ids, ["scan-6", "scan-5", "scan-4", "scan-3", "scan-2"]);
    }

    // --- reset / error channel ---

    #[tokio::test]
    async fn test_reset_clears_state_but_not_history() {
        let mut ctl = ScanController::new(80);
        ctl.select_file(jpeg_candidate("a.jpg", 10));
        let client = FakeClient::with(vec![Ok(result("kept"))]);
        ctl.scan(&client).await;

        ctl.select_file(jpeg_candidate("b.jpg", 10));
        ctl.reset();

        assert!(ctl.selected_image().is_none());
        assert!(ctl.current_result().is_none());
        assert!(ctl.last_error().is_none());
        assert_eq!(ctl.history().len(), 1);
        assert_eq!(ctl.phase(), ScanPhase::Idle);
    }

    #[test]
    fn test_new_action_clears_previous_error() {
        let mut ctl = ScanController::new(80);
        ctl.select_file(FileCandidate::from_bytes("junk.txt", "text/plain", vec![0]));
        assert!(ctl.last_error().is_some());

        let device = FakeDevice::working();
        ctl.start_camera(&device, &CameraRequest::default());
        assert!(ctl.last_error().is_none());
    }
}
