//! IPC bridge between a UI host and the annotation session.
//!
//! Applies [`UiToEditor`] messages to the open [`Session`] and collects the
//! resulting [`EditorToUi`] messages. Session events are queued in an
//! outbox by a listener and drained after every dispatch.

use std::sync::{Arc, Mutex};

use glam::Vec2;
use redline_config::EditorConfig;
use redline_ipc::{
    EditCommand, EditorToUi, ElementRect, PointerEvent, ToolCommand, ToolKind, UiToEditor,
};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::mapping::ClientRect;
use crate::session::{Session, SessionEvent};
use crate::types::{PointerPhase, Tool, WidthClass};

pub struct EditorBridge {
    config: EditorConfig,
    session: Option<Session>,
    outbox: Arc<Mutex<Vec<EditorToUi>>>,
}

impl EditorBridge {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            session: None,
            outbox: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Open a photo, replacing any open session.
    ///
    /// Returns `Opened` with the buffer sizes, or `Error` on decode failure.
    pub fn open(
        &mut self,
        bytes: impl Into<Arc<[u8]>>,
        mime_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Vec<EditorToUi> {
        if let Some(previous) = self.session.take() {
            previous.cancel();
        }

        match Session::open(bytes, mime_type, file_name, self.config.clone()) {
            Ok(mut session) => {
                let sink = self.outbox.clone();
                session.add_event_listener(move |event| {
                    if let Ok(mut outbox) = sink.lock() {
                        outbox.push(to_message(event));
                    }
                });
                let (natural_width, natural_height) = session.natural_size();
                let (display_width, display_height) = session.display_size();
                self.session = Some(session);
                self.push(EditorToUi::Opened {
                    natural_width,
                    natural_height,
                    display_width,
                    display_height,
                });
            }
            Err(e) => {
                warn!("Failed to open image: {}", e);
                self.push_error(&e);
            }
        }
        self.drain()
    }

    /// Apply one UI message and return every message it produced
    pub async fn dispatch(&mut self, message: UiToEditor) -> Vec<EditorToUi> {
        let Some(session) = self.session.as_mut() else {
            debug!("dispatch: no open session, rejecting {:?}", message);
            self.push_error(&SessionError::Closed);
            return self.drain();
        };

        match message {
            UiToEditor::Pointer(event) => {
                session.pointer(phase(&event), Vec2::new(event.client_x, event.client_y));
            }
            UiToEditor::Layout(rect) => session.set_layout(client_rect(rect)),
            UiToEditor::ToolCommand(command) => match command {
                ToolCommand::SetTool { tool } => session.set_tool(self::tool(tool)),
                ToolCommand::SetStrokeWidth { width } => session.set_width(width_class(width)),
                ToolCommand::SetColor { color } => session.set_color(color),
            },
            UiToEditor::EditCommand(command) => match command {
                EditCommand::Undo => {
                    session.undo();
                }
                EditCommand::Redo => {
                    session.redo();
                }
                EditCommand::Clear => {
                    session.clear();
                }
                EditCommand::Save { format } => {
                    let result = session.save(format.as_deref()).await;
                    match result {
                        // Export outcomes reach the outbox through the listener
                        Ok(_) | Err(SessionError::Export(_)) => {}
                        Err(e) => self.push_error(&e),
                    }
                }
                EditCommand::Cancel => {
                    if let Some(session) = self.session.take() {
                        info!("Session cancelled by UI");
                        session.cancel();
                    }
                }
            },
        }
        self.drain()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn push(&self, message: EditorToUi) {
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(message);
        }
    }

    fn push_error(&self, error: &SessionError) {
        self.push(EditorToUi::Error {
            code: error.kind().code().to_string(),
            message: error.to_string(),
        });
    }

    fn drain(&self) -> Vec<EditorToUi> {
        match self.outbox.lock() {
            Ok(mut outbox) => std::mem::take(&mut *outbox),
            Err(_) => Vec::new(),
        }
    }
}

fn to_message(event: SessionEvent) -> EditorToUi {
    match event {
        SessionEvent::HistoryChanged { can_undo, can_redo } => {
            EditorToUi::HistoryChanged { can_undo, can_redo }
        }
        SessionEvent::Saved(image) => EditorToUi::Saved {
            mime_type: image.mime_type,
            file_name: image.file_name,
            data: image.data.to_vec(),
        },
        SessionEvent::Error { kind, message } => EditorToUi::Error {
            code: kind.code().to_string(),
            message,
        },
        SessionEvent::Closed => EditorToUi::Closed,
    }
}

fn phase(event: &PointerEvent) -> PointerPhase {
    match event.phase {
        redline_ipc::PointerPhase::Down => PointerPhase::Down,
        redline_ipc::PointerPhase::Move => PointerPhase::Move,
        redline_ipc::PointerPhase::Up => PointerPhase::Up,
        redline_ipc::PointerPhase::Cancel => PointerPhase::Cancel,
    }
}

fn tool(kind: ToolKind) -> Tool {
    match kind {
        ToolKind::Brush => Tool::Brush,
        ToolKind::Eraser => Tool::Eraser,
        ToolKind::Rectangle => Tool::Rectangle,
    }
}

fn width_class(width: redline_ipc::WidthClass) -> WidthClass {
    match width {
        redline_ipc::WidthClass::Thin => WidthClass::Thin,
        redline_ipc::WidthClass::Medium => WidthClass::Medium,
        redline_ipc::WidthClass::Thick => WidthClass::Thick,
    }
}

fn client_rect(rect: ElementRect) -> ClientRect {
    ClientRect::new(rect.left, rect.top, rect.width, rect.height)
}
