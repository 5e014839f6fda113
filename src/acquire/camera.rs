//! Camera Capture
//!
//! The camera is a scoped hardware resource: every open session must be
//! released on capture, cancel, error, and teardown. [`CameraSession`] wraps
//! the device stream and guarantees release on drop; the scan controller
//! never holds more than one session at a time.
//!
//! The actual device sits behind the [`CameraDevice`] / [`CameraStream`]
//! capability traits so the orchestration core can be exercised without
//! hardware. [`SystemCamera`] is the nokhwa-backed implementation.

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Camera acquisition errors
#[derive(Debug, Error)]
pub enum CameraError {
    /// The user or OS refused camera access
    #[error("Camera access was denied")]
    AccessDenied,

    /// No usable capture device
    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    /// A frame could not be read or decoded
    #[error("Could not read a frame from the camera: {0}")]
    Frame(String),

    /// A captured frame could not be encoded
    #[error("Could not encode the captured photo: {0}")]
    Encode(String),
}

/// Requested capture parameters (1280x720 preferred)
#[derive(Debug, Clone)]
pub struct CameraRequest {
    /// Capture device index
    pub device_index: u32,
    /// Preferred frame width
    pub width: u32,
    /// Preferred frame height
    pub height: u32,
}

impl Default for CameraRequest {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 1280,
            height: 720,
        }
    }
}

/// A capture device that can open a stream
pub trait CameraDevice {
    /// Open a stream with the requested parameters.
    fn open(&self, request: &CameraRequest) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// An open device stream
pub trait CameraStream {
    /// Grab and decode the current frame.
    fn capture_frame(&mut self) -> Result<RgbImage, CameraError>;

    /// Release the underlying hardware. Must be idempotent.
    fn release(&mut self);
}

/// Scoped wrapper around an open stream.
///
/// Release happens exactly once, either through [`CameraSession::release`]
/// or on drop, so no exit path can leak an open camera.
pub struct CameraSession {
    stream: Box<dyn CameraStream>,
    released: bool,
}

impl CameraSession {
    /// Open a session on the given device.
    pub fn open(device: &dyn CameraDevice, request: &CameraRequest) -> Result<Self, CameraError> {
        let stream = device.open(request)?;
        info!(
            "Camera session opened (device {}, {}x{} preferred)",
            request.device_index, request.width, request.height
        );
        Ok(Self {
            stream,
            released: false,
        })
    }

    /// Grab the current frame.
    pub fn capture_frame(&mut self) -> Result<RgbImage, CameraError> {
        self.stream.capture_frame()
    }

    /// Stop the stream and release the hardware.
    pub fn release(&mut self) {
        if !self.released {
            self.stream.release();
            self.released = true;
            debug!("Camera session released");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("released", &self.released)
            .finish()
    }
}

/// Encode a captured frame as JPEG at the given quality (0-100).
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, CameraError> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode_image(frame)
        .map_err(|e| CameraError::Encode(e.to_string()))?;
    Ok(buf)
}

/// System camera backed by nokhwa
pub struct SystemCamera;

impl CameraDevice for SystemCamera {
    fn open(&self, request: &CameraRequest) -> Result<Box<dyn CameraStream>, CameraError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{
            CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
            Resolution,
        };

        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(request.width, request.height),
                FrameFormat::MJPEG,
                30,
            ),
        ));

        let mut camera = nokhwa::Camera::new(CameraIndex::Index(request.device_index), format)
            .map_err(map_open_error)?;
        camera.open_stream().map_err(map_open_error)?;

        Ok(Box::new(NokhwaStream {
            camera,
            open: true,
        }))
    }
}

struct NokhwaStream {
    camera: nokhwa::Camera,
    open: bool,
}

impl CameraStream for NokhwaStream {
    fn capture_frame(&mut self) -> Result<RgbImage, CameraError> {
        use nokhwa::pixel_format::RgbFormat;

        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::Frame(e.to_string()))?;
        buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::Frame(e.to_string()))
    }

    fn release(&mut self) {
        if self.open {
            if let Err(e) = self.camera.stop_stream() {
                warn!("Failed to stop camera stream: {}", e);
            }
            self.open = false;
        }
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.release();
    }
}

fn map_open_error(err: nokhwa::NokhwaError) -> CameraError {
    let text = err.to_string();
    let lowered = text.to_ascii_lowercase();
    if lowered.contains("denied") || lowered.contains("permission") {
        CameraError::AccessDenied
    } else {
        CameraError::Unavailable(text)
    }
}
