//! One editing session: open, annotate, save or cancel.
//!
//! The session owns the display buffers, the history and the tool state.
//! Pointer input is mapped from viewport coordinates into the display
//! buffer; saving hands an owned [`ExportRequest`] to a blocking worker so
//! the live buffers are never touched off-thread. While an export is in
//! flight every editing input is ignored.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec2;
use image::{RgbaImage, imageops};
use redline_config::{EditorConfig, ExportStrategy};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::annotations::AnnotationLog;
use crate::compositor::{ExportRequest, ExportedImage, compose, filter_type};
use crate::error::{ErrorKind, ExportError, SessionError};
use crate::mapping::{ClientRect, ViewportScale, client_to_buffer};
use crate::pipeline::AnnotationPipeline;
use crate::source::SourceImage;
use crate::types::{PointerPhase, Tool, ToolConfig, WidthClass};

/// Notifications delivered to registered listeners
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Undo/redo availability after a committed change
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// Export finished; the session stays open
    Saved(ExportedImage),
    /// Recoverable failure with a human-readable reason
    Error { kind: ErrorKind, message: String },
    /// Session ended without saving
    Closed,
}

type EventListener = Box<dyn Fn(SessionEvent) + Send + Sync>;

/// Holds a session's export slot; releases it when dropped.
#[derive(Debug)]
struct ExportGuard(Arc<AtomicBool>);

impl ExportGuard {
    /// Claim the slot, or `None` if an export already holds it
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Self(flag.clone()))
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
enum SaveState {
    Running(JoinHandle<Result<ExportedImage, ExportError>>),
    Ready(Result<ExportedImage, ExportError>),
}

/// Export running (or already finished) for a session.
///
/// The session stays locked for editing while this exists. Dropping it
/// discards the result and unlocks the session; a running worker finishes
/// on its own and releases its buffers.
#[derive(Debug)]
pub struct PendingSave {
    state: SaveState,
    guard: ExportGuard,
}

impl PendingSave {
    /// Wait for the export outcome
    pub async fn wait(self) -> Result<ExportedImage, ExportError> {
        let PendingSave { state, guard } = self;
        let outcome = match state {
            SaveState::Running(handle) => handle
                .await
                .map_err(|e| ExportError::Worker(e.to_string()))
                .and_then(|result| result),
            SaveState::Ready(result) => result,
        };
        drop(guard);
        outcome
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            SaveState::Running(handle) => handle.is_finished(),
            SaveState::Ready(_) => true,
        }
    }
}

pub struct Session {
    source: SourceImage,
    scale: ViewportScale,
    config: EditorConfig,
    pipeline: AnnotationPipeline,
    layout: ClientRect,
    /// Set while an export holds the session
    exporting: Arc<AtomicBool>,
    listeners: Vec<EventListener>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("scale", &self.scale)
            .field("layout", &self.layout)
            .field("exporting", &self.is_exporting())
            .field("annotations", &self.pipeline.annotations().len())
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl Session {
    /// Decode a photo and set up the display buffer.
    ///
    /// The display buffer is the photo reduced to fit the configured caps
    /// (never enlarged). The full-resolution bitmap is released once the
    /// display copy exists.
    pub fn open(
        bytes: impl Into<Arc<[u8]>>,
        mime_type: Option<&str>,
        file_name: Option<&str>,
        config: EditorConfig,
    ) -> Result<Self, SessionError> {
        let source = SourceImage::new(bytes, mime_type, file_name)?;
        let decoded = source
            .decode()
            .map_err(|e| SessionError::Decode(e.to_string()))?
            .to_rgba8();
        let (natural_width, natural_height) = decoded.dimensions();
        if natural_width == 0 || natural_height == 0 {
            return Err(SessionError::EmptyImage {
                width: natural_width,
                height: natural_height,
            });
        }

        let scale = ViewportScale::compute(
            natural_width,
            natural_height,
            config.max_display_width,
            config.max_display_height,
        );
        let base = display_base(decoded, &scale, &config);
        let (display_width, display_height) = scale.display_size();
        info!(
            "Opened {} ({}x{}) at {}x{}, scale {:.4}",
            source.base_name(),
            natural_width,
            natural_height,
            display_width,
            display_height,
            scale.scale()
        );

        let pipeline = AnnotationPipeline::new(
            base,
            config.effective_history_limit(),
            config.stroke_widths.clone(),
        );
        Ok(Self {
            source,
            scale,
            config,
            pipeline,
            layout: ClientRect::default(),
            exporting: Arc::new(AtomicBool::new(false)),
            listeners: Vec::new(),
        })
    }

    /// Register a listener for session events
    pub fn add_event_listener<F>(&mut self, listener: F)
    where
        F: Fn(SessionEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&self, event: SessionEvent) {
        for listener in &self.listeners {
            listener(event.clone());
        }
    }

    fn emit_history(&self) {
        self.emit(SessionEvent::HistoryChanged {
            can_undo: self.pipeline.can_undo(),
            can_redo: self.pipeline.can_redo(),
        });
    }

    /// Record the element's rendered box used for pointer mapping
    pub fn set_layout(&mut self, rect: ClientRect) {
        self.layout = rect;
    }

    pub fn layout(&self) -> ClientRect {
        self.layout
    }

    /// Feed one pointer event in viewport coordinates.
    ///
    /// Events that cannot be mapped (element not laid out) are dropped.
    /// Release and cancel need no position and always end the gesture.
    pub fn pointer(&mut self, phase: PointerPhase, client: Vec2) {
        if self.is_exporting() {
            debug!("pointer: export in flight, ignoring {:?}", phase);
            return;
        }

        match phase {
            PointerPhase::Up | PointerPhase::Cancel => {
                let ended = if phase == PointerPhase::Up {
                    self.pipeline.release()
                } else {
                    self.pipeline.cancel()
                };
                if ended {
                    self.emit_history();
                }
            }
            PointerPhase::Down | PointerPhase::Move => {
                let (width, height) = self.scale.display_size();
                let point = match client_to_buffer(client, &self.layout, width, height) {
                    Ok(point) => point,
                    Err(e) => {
                        debug!("pointer: dropping {:?}: {}", phase, e);
                        return;
                    }
                };
                if phase == PointerPhase::Down {
                    self.pipeline.press(point);
                } else {
                    self.pipeline.drag(point);
                }
            }
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.pipeline.set_tool(tool);
    }

    pub fn set_width(&mut self, width: WidthClass) {
        self.pipeline.set_width(width);
    }

    pub fn set_color(&mut self, color: [f32; 4]) {
        self.pipeline.set_color(color);
    }

    pub fn tool_config(&self) -> ToolConfig {
        self.pipeline.tool_config()
    }

    /// Undo the last change; false if nothing to undo or an export is running
    pub fn undo(&mut self) -> bool {
        if self.is_exporting() {
            debug!("undo: export in flight, ignoring");
            return false;
        }
        let done = self.pipeline.undo();
        if done {
            self.emit_history();
        }
        done
    }

    /// Redo the last undone change; false if nothing to redo or an export is running
    pub fn redo(&mut self) -> bool {
        if self.is_exporting() {
            debug!("redo: export in flight, ignoring");
            return false;
        }
        let done = self.pipeline.redo();
        if done {
            self.emit_history();
        }
        done
    }

    /// Remove all annotations as one undoable step
    pub fn clear(&mut self) -> bool {
        if self.is_exporting() {
            debug!("clear: export in flight, ignoring");
            return false;
        }
        self.pipeline.clear_all();
        self.emit_history();
        true
    }

    fn export_request(&self, format: Option<&str>) -> ExportRequest {
        let export = &self.config.export;
        let layer = match export.strategy {
            ExportStrategy::Resample => Some(self.pipeline.annotation_layer().clone()),
            ExportStrategy::Replay => None,
        };
        ExportRequest {
            source: self.source.clone(),
            scale: self.scale,
            annotations: self.pipeline.annotations().snapshot(),
            layer,
            strategy: export.strategy,
            filter: export.resample,
            format: format.map(str::to_string).or_else(|| export.format.clone()),
            jpeg_quality: export.jpeg_quality,
        }
    }

    /// Start an export.
    ///
    /// Runs on a tokio blocking worker when called inside a runtime, and
    /// inline otherwise. Only one export may be in flight; pass the outcome
    /// of [`PendingSave::wait`] to [`Session::finish_save`].
    pub fn begin_save(&mut self, format: Option<&str>) -> Result<PendingSave, SessionError> {
        if self.is_exporting() {
            return Err(SessionError::ExportInProgress);
        }
        if self.pipeline.release() {
            self.emit_history();
        }

        let request = self.export_request(format);
        let guard = ExportGuard::acquire(&self.exporting).ok_or(SessionError::ExportInProgress)?;
        debug!(
            "begin_save: {} records, strategy {:?}",
            request.annotations.len(),
            request.strategy
        );

        let state = match tokio::runtime::Handle::try_current() {
            Ok(handle) => SaveState::Running(handle.spawn_blocking(move || compose(request))),
            Err(_) => SaveState::Ready(compose(request)),
        };
        Ok(PendingSave { state, guard })
    }

    /// Complete an export started with [`Session::begin_save`].
    ///
    /// Notifies listeners. The session was unlocked when the
    /// [`PendingSave`] was consumed; on failure it stays editable and the
    /// save may be retried.
    pub fn finish_save(
        &mut self,
        outcome: Result<ExportedImage, ExportError>,
    ) -> Result<ExportedImage, SessionError> {
        match outcome {
            Ok(image) => {
                self.pipeline.clear_modified();
                self.emit(SessionEvent::Saved(image.clone()));
                Ok(image)
            }
            Err(e) => {
                warn!("Export failed: {}", e);
                self.emit(SessionEvent::Error {
                    kind: ErrorKind::ExportFailure,
                    message: e.to_string(),
                });
                Err(SessionError::Export(e))
            }
        }
    }

    /// Export on a blocking worker and wait for the result.
    ///
    /// Dropping the future before it completes discards the export and
    /// leaves the session editable.
    pub async fn save(&mut self, format: Option<&str>) -> Result<ExportedImage, SessionError> {
        let pending = self.begin_save(format)?;
        let outcome = pending.wait().await;
        self.finish_save(outcome)
    }

    /// Export on the calling thread
    pub fn export_now(&mut self, format: Option<&str>) -> Result<ExportedImage, SessionError> {
        if self.is_exporting() {
            return Err(SessionError::ExportInProgress);
        }
        if self.pipeline.release() {
            self.emit_history();
        }
        let outcome = compose(self.export_request(format));
        self.finish_save(outcome)
    }

    /// End the session without saving; listeners get [`SessionEvent::Closed`]
    pub fn cancel(self) {
        info!("Session cancelled");
        self.log_discarded_export();
        self.emit(SessionEvent::Closed);
    }

    /// End the session after saving.
    ///
    /// Emits nothing: the host already saw `Saved`, and `Closed` is reserved
    /// for sessions that end without saving.
    pub fn close(self) {
        info!("Session closed");
        self.log_discarded_export();
    }

    fn log_discarded_export(&self) {
        if self.is_exporting() {
            debug!("Session ended with an export in flight; its result is discarded");
        }
    }

    pub fn can_undo(&self) -> bool {
        self.pipeline.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.pipeline.can_redo()
    }

    /// Whether anything changed since opening or the last successful save
    pub fn is_dirty(&self) -> bool {
        self.pipeline.is_modified()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    pub fn is_drawing(&self) -> bool {
        self.pipeline.is_drawing()
    }

    pub fn display_size(&self) -> (u32, u32) {
        self.scale.display_size()
    }

    pub fn natural_size(&self) -> (u32, u32) {
        self.scale.natural_size()
    }

    pub fn scale(&self) -> ViewportScale {
        self.scale
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn annotations(&self) -> &AnnotationLog {
        self.pipeline.annotations()
    }

    /// Display-resolution photo with annotations, for rendering
    pub fn composite_display(&self) -> RgbaImage {
        self.pipeline.composite_display()
    }

    pub fn pipeline(&self) -> &AnnotationPipeline {
        &self.pipeline
    }
}

fn display_base(decoded: RgbaImage, scale: &ViewportScale, config: &EditorConfig) -> RgbaImage {
    if !scale.is_downscaled() {
        return decoded;
    }
    let (width, height) = scale.display_size();
    imageops::resize(&decoded, width, height, filter_type(config.display_filter))
}
