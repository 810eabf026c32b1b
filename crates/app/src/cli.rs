//! Headless session runner: open a photo, replay a gesture script, export.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use image::ImageFormat;
use markup::EditorBridge;
use redline_ipc::{EditCommand, EditorToUi, ElementRect, UiToEditor, parse_script};
use tracing::{debug, info, warn};

use crate::config::{self, Overrides};

/// Mark up a photo from a recorded gesture script and export it at full resolution.
#[derive(Parser, Debug)]
#[command(
    name = "redline",
    about = "Replay annotation gestures on a photo and export the result",
    long_about = "Opens a photo in a Redline session, replays a JSON array of UI\n\
                  messages (layout, tool, pointer, undo/redo/clear/save) and writes\n\
                  <name>-edited.<ext> at the photo's original resolution.\n\n\
                  Pointer coordinates are viewport coordinates; without a Layout\n\
                  message the canvas is assumed to sit at the origin at display size.\n\n\
                  Example:\n  \
                  redline --input photo.jpg --script gestures.json --output-dir out/"
)]
pub struct CliArgs {
    /// Photo to annotate (PNG, JPEG, WEBP, ...)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// JSON array of UI messages to replay
    #[arg(short, long, value_name = "SCRIPT.json")]
    pub script: Option<PathBuf>,

    /// Directory for the exported file (default: current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Editor config file (JSON); falls back to $REDLINE_CONFIG
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Display buffer width cap
    #[arg(long, value_name = "PX")]
    pub max_width: Option<u32>,

    /// Display buffer height cap
    #[arg(long, value_name = "PX")]
    pub max_height: Option<u32>,

    /// Output format (png, jpeg, webp, ...); defaults to the input format
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1-100)
    #[arg(short, long, value_name = "1-100")]
    pub quality: Option<u8>,
}

impl CliArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            max_width: self.max_width,
            max_height: self.max_height,
            format: self.format.clone(),
            quality: self.quality,
        }
    }
}

/// What a run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files written, in order
    pub written: Vec<PathBuf>,
    /// Errors reported by the session (code, message)
    pub errors: Vec<(String, String)>,
}

/// Run one session end to end
pub fn run(args: &CliArgs) -> anyhow::Result<RunSummary> {
    let config_path = config::config_path(args.config.as_deref());
    let config = config::apply(config::load(config_path.as_deref())?, &args.overrides());

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("could not read input '{}'", args.input.display()))?;
    let mime_type = ImageFormat::from_path(&args.input)
        .ok()
        .map(|f| f.to_mime_type());
    let file_name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);

    let script = match &args.script {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("could not read script '{}'", path.display()))?;
            parse_script(&text).with_context(|| format!("invalid script '{}'", path.display()))?
        }
        None => Vec::new(),
    };

    let output_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("could not create '{}'", output_dir.display()))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("could not start async runtime")?;

    let mut summary = RunSummary::default();
    let mut bridge = EditorBridge::new(config);

    let opened = bridge.open(bytes, mime_type, file_name.as_deref());
    let display = opened.iter().find_map(|m| match m {
        EditorToUi::Opened {
            display_width,
            display_height,
            ..
        } => Some((*display_width, *display_height)),
        _ => None,
    });
    handle_messages(opened, &output_dir, &mut summary)?;
    let Some((display_width, display_height)) = display else {
        bail!("could not open '{}'", args.input.display());
    };

    // Canvas at the origin at display size until the script says otherwise
    let layout = UiToEditor::Layout(ElementRect::new(
        0.0,
        0.0,
        display_width as f32,
        display_height as f32,
    ));
    let mut messages = vec![layout];
    messages.extend(script);

    // A failed save is reported once; only scripts that never save get the final one
    let mut save_requested = false;
    for message in messages {
        if !bridge.is_open() {
            debug!("Session closed, skipping remaining script messages");
            break;
        }
        save_requested |= matches!(
            message,
            UiToEditor::EditCommand(EditCommand::Save { .. })
        );
        let produced = runtime.block_on(bridge.dispatch(message));
        handle_messages(produced, &output_dir, &mut summary)?;
    }

    if !save_requested && bridge.is_open() {
        let produced = runtime.block_on(
            bridge.dispatch(UiToEditor::EditCommand(EditCommand::Save { format: None })),
        );
        handle_messages(produced, &output_dir, &mut summary)?;
    }

    info!(
        "Done: {} file(s) written, {} error(s)",
        summary.written.len(),
        summary.errors.len()
    );
    Ok(summary)
}

fn handle_messages(
    messages: Vec<EditorToUi>,
    output_dir: &Path,
    summary: &mut RunSummary,
) -> anyhow::Result<()> {
    for message in messages {
        match message {
            EditorToUi::Opened {
                natural_width,
                natural_height,
                display_width,
                display_height,
            } => info!(
                "Opened {}x{} photo, display {}x{}",
                natural_width, natural_height, display_width, display_height
            ),
            EditorToUi::HistoryChanged { can_undo, can_redo } => {
                debug!("History: undo={} redo={}", can_undo, can_redo);
            }
            EditorToUi::Saved {
                mime_type,
                file_name,
                data,
            } => {
                let path = output_dir.join(&file_name);
                std::fs::write(&path, &data)
                    .with_context(|| format!("could not write '{}'", path.display()))?;
                info!("Wrote {} ({}, {} bytes)", path.display(), mime_type, data.len());
                summary.written.push(path);
            }
            EditorToUi::Error { code, message } => {
                warn!("{}: {}", code, message);
                summary.errors.push((code, message));
            }
            EditorToUi::Closed => info!("Session closed"),
        }
    }
    Ok(())
}
