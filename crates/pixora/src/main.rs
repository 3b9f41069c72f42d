//! pixora: command-line photobooth.
//!
//! Mirrors the three pages of the web app against a JSON session file:
//!
//! ```text
//! pixora layout --poses 3
//! pixora import me1.jpg me2.jpg me3.png
//! pixora compose -o strip.png --background pink --sticker '★@40,60:48'
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

#![allow(clippy::print_stderr)]

mod store;
mod sticker_arg;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pixora_strip::{
    DataUrlLoader, Fonts, ImageRef, LayoutConfig, SessionStore, SlotOutcome, StripEditor,
    StripStyle, Typeface,
};
use tracing_subscriber::EnvFilter;

use crate::store::FileStore;
use crate::sticker_arg::{StickerArg, parse_sticker};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "pixora=info,pixora_strip=info";

/// Compose photobooth strips with backgrounds and emoji stickers.
#[derive(Parser)]
#[command(name = "pixora", version)]
struct Cli {
    /// Session file shared by all subcommands.
    #[arg(long, global = true, default_value = "pixora-session.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Choose how many photos the strip holds. Forgets imported photos.
    Layout {
        /// Number of poses (photo slots).
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        poses: u32,
    },

    /// Store photos for the strip, replacing any imported earlier.
    Import {
        /// Image files (PNG, JPEG, BMP, WebP).
        files: Vec<PathBuf>,
    },

    /// Render the strip to a PNG file.
    Compose {
        /// Output PNG path.
        #[arg(short, long, default_value = pixora_export::STRIP_FILENAME)]
        output: PathBuf,

        /// Background color (CSS name, `#rgb`, `#rrggbb`, `rgb()`, `rgba()`).
        #[arg(long)]
        background: Option<String>,

        /// Sticker as `SYMBOL@X,Y[:SIZE]`. Repeat for more; later ones
        /// paint on top.
        #[arg(long = "sticker", value_name = "SYMBOL@X,Y[:SIZE]", value_parser = parse_sticker)]
        stickers: Vec<StickerArg>,

        /// TrueType/OpenType font used to draw stickers (e.g. a
        /// monochrome emoji font). Symbols it lacks fall back to the
        /// bundled DejaVu Sans.
        #[arg(long, value_name = "PATH")]
        sticker_font: Option<PathBuf>,

        /// Full or partial `StripStyle` as JSON; missing fields keep
        /// their defaults.
        #[arg(long, value_name = "JSON")]
        style_json: Option<String>,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = SessionStore::new(FileStore::open(&cli.store)?);
    match cli.command {
        Command::Layout { poses } => {
            if !LayoutConfig::with_photo_count(poses).fits_surface() {
                return Err(format!("{poses} poses make a strip too tall to render").into());
            }
            session.choose_layout(poses)?;
            eprintln!("Layout: {poses} poses ({})", cli.store.display());
        }
        Command::Import { files } => import(&mut session, &files)?,
        Command::Compose {
            output,
            background,
            stickers,
            sticker_font,
            style_json,
        } => {
            let style: StripStyle = match style_json {
                Some(json) => serde_json::from_str(&json)
                    .map_err(|e| format!("invalid --style-json: {e}"))?,
                None => StripStyle::default(),
            };
            let mut fonts = Fonts::embedded()?;
            if let Some(path) = sticker_font {
                let bytes = std::fs::read(&path)
                    .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
                fonts = fonts.with_sticker_face(Typeface::from_bytes(&bytes)?);
            }

            let mut editor = StripEditor::from_session(&session.load()?, style, fonts);
            if let Some(color) = background {
                let _ = editor.set_background(&color)?;
            }
            for sticker in &stickers {
                let _ = editor.add_sticker_at(&sticker.symbol, sticker.origin, sticker.size);
            }
            compose(&editor, &output)?;
        }
    }
    Ok(())
}

fn import(
    session: &mut SessionStore<FileStore>,
    files: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    if files.is_empty() {
        return Err("Please capture or upload at least one photo!".into());
    }
    let photos = files
        .iter()
        .map(|path| -> Result<ImageRef, Box<dyn std::error::Error>> {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let bytes = std::fs::read(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            Ok(ImageRef::from_upload(&name, &bytes)?)
        })
        .collect::<Result<Vec<_>, _>>()?;
    session.save_photos(&photos)?;
    eprintln!("Imported {} photo(s)", photos.len());
    Ok(())
}

fn compose(editor: &StripEditor, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = futures::executor::block_on(editor.compositor().render(
        &DataUrlLoader,
        editor.images(),
        &editor.snapshot(),
    ))?;
    let png = pixora_export::encode_png(&rendered.pixmap)?;
    std::fs::write(output, &png).map_err(|e| format!("cannot write {}: {e}", output.display()))?;

    let count = |outcome: SlotOutcome| rendered.slots.iter().filter(|&&s| s == outcome).count();
    eprintln!(
        "Composed {}x{} strip: {} photo(s), {} placeholder(s), {} skipped, {} sticker(s)",
        rendered.pixmap.width(),
        rendered.pixmap.height(),
        count(SlotOutcome::Photo),
        count(SlotOutcome::Placeholder),
        count(SlotOutcome::Skipped),
        editor.state().stickers.len(),
    );
    eprintln!("PNG written to {} ({} bytes)", output.display(), png.len());
    Ok(())
}
