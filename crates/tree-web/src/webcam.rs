//! Browser camera as a [`FrameSource`].
//!
//! The stream plays into a detached `<video>`; each read draws the current
//! video frame scaled onto a small offscreen canvas and copies its RGBA pixels.

use js_sys::{Object, Reflect};
use tree_core::{CaptureError, FrameSource, ReleaseGuard};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

pub struct WebcamSource {
    width: u32,
    height: u32,
    stream: web::MediaStream,
    video: web::HtmlVideoElement,
    ctx: web::CanvasRenderingContext2d,
    last_time: f64,
    released: bool,
}

impl WebcamSource {
    /// Ask for the user camera and start playback. Frames come out at
    /// `width x height` regardless of the camera's native resolution.
    pub async fn open(
        document: &web::Document,
        width: u32,
        height: u32,
    ) -> Result<Self, CaptureError> {
        let window = web::window().ok_or(CaptureError::NoDevice)?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|_| CaptureError::NoDevice)?;

        let video_constraints = Object::new();
        set_prop(&video_constraints, "width", &JsValue::from(640))?;
        set_prop(&video_constraints, "height", &JsValue::from(480))?;
        set_prop(&video_constraints, "facingMode", &JsValue::from_str("user"))?;
        let constraints = web::MediaStreamConstraints::new();
        constraints.set_video(&video_constraints);
        constraints.set_audio(&JsValue::FALSE);

        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(classify)?;
        let stream: web::MediaStream = JsFuture::from(promise)
            .await
            .map_err(classify)?
            .dyn_into()
            .map_err(|_| CaptureError::Backend("getUserMedia returned no stream".into()))?;
        // the camera is live from here; any early return below must stop it
        let mut stream = ReleaseGuard::new(stream, stop_tracks);

        let video: web::HtmlVideoElement = document
            .create_element("video")
            .map_err(classify)?
            .dyn_into()
            .map_err(|_| CaptureError::Backend("video element".into()))?;
        video.set_muted(true);
        video.set_autoplay(true);
        let _ = video.set_attribute("playsinline", "");
        video.set_src_object(Some(stream.value()));
        if let Ok(play) = video.play() {
            // autoplay policies can reject play(); frames still arrive once allowed
            if let Err(e) = JsFuture::from(play).await {
                log::warn!("[capture] video.play() rejected: {:?}", e);
            }
        }

        let canvas: web::HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(classify)?
            .dyn_into()
            .map_err(|_| CaptureError::Backend("canvas element".into()))?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx: web::CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(classify)?
            .ok_or_else(|| CaptureError::Backend("no 2d context".into()))?
            .dyn_into()
            .map_err(|_| CaptureError::Backend("2d context".into()))?;

        stream.disarm();
        log::info!("[capture] webcam opened, sampling at {}x{}", width, height);
        Ok(Self {
            width,
            height,
            stream: stream.value().clone(),
            video,
            ctx,
            last_time: -1.0,
            released: false,
        })
    }

    fn track_ended(&self) -> bool {
        let tracks = self.stream.get_video_tracks();
        if tracks.length() == 0 {
            return true;
        }
        tracks.iter().all(|t| {
            t.dyn_into::<web::MediaStreamTrack>()
                .map(|track| track.ready_state() == web::MediaStreamTrackState::Ended)
                .unwrap_or(true)
        })
    }
}

impl FrameSource for WebcamSource {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_available(&mut self) -> bool {
        if self.released {
            return false;
        }
        if self.track_ended() {
            // let read_frame report the disconnect
            return true;
        }
        // HAVE_CURRENT_DATA
        self.video.ready_state() >= 2 && self.video.current_time() != self.last_time
    }

    fn read_frame(&mut self, dst: &mut [u8]) -> Result<(), CaptureError> {
        if self.track_ended() {
            return Err(CaptureError::Disconnected);
        }
        let (w, h) = (self.width as f64, self.height as f64);
        self.ctx
            .draw_image_with_html_video_element_and_dw_and_dh(&self.video, 0.0, 0.0, w, h)
            .map_err(classify)?;
        let image = self.ctx.get_image_data(0.0, 0.0, w, h).map_err(classify)?;
        let data = image.data();
        if data.len() != dst.len() {
            return Err(CaptureError::FrameSize {
                expected: dst.len(),
                actual: data.len(),
            });
        }
        dst.copy_from_slice(&data);
        self.last_time = self.video.current_time();
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        stop_tracks(&self.stream);
        self.video.set_src_object(None);
        log::info!("[capture] webcam released");
    }
}

impl Drop for WebcamSource {
    fn drop(&mut self) {
        self.release();
    }
}

fn stop_tracks(stream: &web::MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<web::MediaStreamTrack>() {
            track.stop();
        }
    }
}

fn set_prop(target: &Object, key: &str, value: &JsValue) -> Result<(), CaptureError> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(classify)
}

/// Map a rejected getUserMedia / DOM call onto the capture taxonomy.
fn classify(err: JsValue) -> CaptureError {
    match err.dyn_ref::<web::DomException>().map(|e| e.name()) {
        Some(name) if name == "NotAllowedError" || name == "SecurityError" => {
            CaptureError::PermissionDenied
        }
        Some(name) if name == "NotFoundError" || name == "OverconstrainedError" => {
            CaptureError::NoDevice
        }
        Some(name) if name == "NotReadableError" || name == "AbortError" => {
            CaptureError::Disconnected
        }
        Some(name) => CaptureError::Backend(name),
        None => CaptureError::Backend(format!("{:?}", err)),
    }
}
