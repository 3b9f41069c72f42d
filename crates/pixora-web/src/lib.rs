//! WebAssembly entry points for the pixora photobooth pages.
//!
//! The strip page constructs one [`StripEditorHandle`] around its
//! `<canvas>` and forwards button and pointer events to it. Every edit
//! that changes the strip schedules a render with `spawn_local`; renders
//! finish in any order and [`StripSurface`] keeps the newest one on
//! screen.
//!
//! The layout and capture pages only need [`choose_layout`],
//! [`import_file`] and [`save_photos`] to hand their results to the
//! strip page through `localStorage`.

use std::cell::RefCell;
use std::rc::Rc;

use pixora_export::{ExportError, SharePayload, encode_png};
use pixora_io::{LocalStorage, ShareOutcome, StorageError};
use pixora_strip::{
    Compositor, CompositeState, DataUrlLoader, Fonts, ImageRef, Point, Redraw, SessionSnapshot,
    SessionStore, StripEditor, StripError, StripStyle, StripSurface, Typeface,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise, spawn_local};

/// Shown when a strip cannot be turned into a file.
const EXPORT_FAILED: &str = "Could not generate image.";

/// Shown when the capture page is left without any photo.
const NO_PHOTOS: &str = "Please capture or upload at least one photo!";

/// Install the panic hook and route `tracing` events to the browser
/// console.
///
/// Called automatically when the WASM module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if tracing_wasm::try_set_as_global_default().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Errors surfaced while producing an exportable file.
#[derive(Debug, thiserror::Error)]
enum ExportFailure {
    #[error(transparent)]
    Render(#[from] StripError),
    #[error(transparent)]
    Encode(#[from] ExportError),
}

struct Inner {
    editor: StripEditor,
    surface: StripSurface,
    canvas: web_sys::HtmlCanvasElement,
}

/// Strip page controller bound to one canvas.
#[wasm_bindgen]
pub struct StripEditorHandle {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl StripEditorHandle {
    /// Read the session from `localStorage`, size `canvas` for the
    /// strip and draw it.
    ///
    /// # Errors
    ///
    /// Fails if the bundled fonts cannot be parsed.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: web_sys::HtmlCanvasElement) -> Result<Self, JsError> {
        let session = load_session();
        let fonts = Fonts::embedded()?;
        let editor = StripEditor::from_session(&session, StripStyle::default(), fonts);

        let dims = editor.layout().dimensions();
        canvas.set_width(dims.width);
        canvas.set_height(dims.height);
        tracing::debug!(
            slots = editor.layout().photo_count,
            photos = editor.images().len(),
            "strip editor ready"
        );

        let handle = Self {
            inner: Rc::new(RefCell::new(Inner {
                editor,
                surface: StripSurface::new(),
                canvas,
            })),
        };
        handle.redraw();
        Ok(handle)
    }

    /// Change the background fill (any CSS color the editor understands).
    ///
    /// # Errors
    ///
    /// Fails on an unrecognised color; the strip is left unchanged.
    #[wasm_bindgen(js_name = setBackground)]
    pub fn set_background(&self, color: &str) -> Result<(), JsError> {
        let redraw = self.inner.borrow_mut().editor.set_background(color)?;
        self.apply(redraw);
        Ok(())
    }

    /// Draw stickers with the given TrueType/OpenType font (for example a
    /// monochrome emoji font fetched by the page). Characters the font
    /// lacks keep using the bundled face.
    ///
    /// # Errors
    ///
    /// Fails if `bytes` is not a usable font; the strip is left unchanged.
    #[wasm_bindgen(js_name = setStickerFont)]
    pub fn set_sticker_font(&self, bytes: &[u8]) -> Result<(), JsError> {
        let face = Typeface::from_bytes(bytes)?;
        let redraw = self.inner.borrow_mut().editor.set_sticker_face(face);
        self.apply(redraw);
        Ok(())
    }

    /// Place a new sticker at the default position.
    #[wasm_bindgen(js_name = addSticker)]
    pub fn add_sticker(&self, symbol: &str) {
        let redraw = self.inner.borrow_mut().editor.add_sticker(symbol);
        self.apply(redraw);
    }

    /// `mousedown` at canvas coordinates.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, x: f32, y: f32) {
        let redraw = self.inner.borrow_mut().editor.press(Point::new(x, y));
        self.apply(redraw);
    }

    /// `mousemove` at canvas coordinates.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f32, y: f32) {
        let redraw = self.inner.borrow_mut().editor.drag_to(Point::new(x, y));
        self.apply(redraw);
    }

    /// `mouseup` anywhere.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self) {
        let redraw = self.inner.borrow_mut().editor.release();
        self.apply(redraw);
    }

    /// `dblclick` at canvas coordinates.
    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&self, x: f32, y: f32) {
        let redraw = self.inner.borrow_mut().editor.remove_at(Point::new(x, y));
        self.apply(redraw);
    }

    /// White background, no stickers.
    pub fn reset(&self) {
        let redraw = self.inner.borrow_mut().editor.reset();
        self.apply(redraw);
    }

    /// Schedule a render of the current state.
    pub fn redraw(&self) {
        let (ticket, job) = {
            let mut inner = self.inner.borrow_mut();
            (inner.surface.begin(), RenderJob::capture(&inner.editor))
        };
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            match job.run().await {
                Ok(pixmap) => {
                    let mut inner = inner.borrow_mut();
                    if inner.surface.commit(ticket, pixmap)
                        && let Some(shown) = inner.surface.pixmap()
                        && let Err(e) = pixora_io::blit(&inner.canvas, shown)
                    {
                        tracing::error!(error = %e, "failed to present strip");
                    }
                }
                Err(e) => tracing::error!(error = %e, "strip render failed"),
            }
        });
    }

    /// Render the strip and download it as `photo-strip.png`.
    ///
    /// The promise resolves to `true` on success; failures are reported
    /// with an alert and resolve to `false`.
    pub fn download(&self) -> js_sys::Promise {
        let job = RenderJob::capture(&self.inner.borrow().editor);
        future_to_promise(async move {
            let Some(png) = export_png(job).await else {
                return Ok(JsValue::FALSE);
            };
            if let Err(e) = pixora_io::trigger_download(
                &png,
                pixora_export::STRIP_FILENAME,
                pixora_export::PNG_MIME,
            ) {
                tracing::error!(error = %e, "download failed");
                report(EXPORT_FAILED);
                return Ok(JsValue::FALSE);
            }
            Ok(JsValue::TRUE)
        })
    }

    /// Render the strip and offer it to the system share sheet,
    /// downloading it where file sharing is unsupported.
    ///
    /// The promise resolves to `"shared"`, `"cancelled"`, `"downloaded"`
    /// or `"failed"`.
    pub fn share(&self) -> js_sys::Promise {
        let job = RenderJob::capture(&self.inner.borrow().editor);
        future_to_promise(async move {
            let Some(png) = export_png(job).await else {
                return Ok(JsValue::from_str("failed"));
            };
            let outcome = match pixora_io::share_or_download(&png, &SharePayload::default()).await
            {
                Ok(ShareOutcome::Shared) => "shared",
                Ok(ShareOutcome::Cancelled) => "cancelled",
                Ok(ShareOutcome::Downloaded) => "downloaded",
                Err(e) => {
                    tracing::error!(error = %e, "share failed");
                    report(EXPORT_FAILED);
                    "failed"
                }
            };
            Ok(JsValue::from_str(outcome))
        })
    }
}

impl StripEditorHandle {
    fn apply(&self, redraw: Redraw) {
        if redraw.is_requested() {
            self.redraw();
        }
    }
}

/// Everything one render needs, detached from the editor.
struct RenderJob {
    compositor: Compositor,
    images: Vec<ImageRef>,
    state: CompositeState,
}

impl RenderJob {
    fn capture(editor: &StripEditor) -> Self {
        Self {
            compositor: editor.compositor(),
            images: editor.images().to_vec(),
            state: editor.snapshot(),
        }
    }

    async fn run(self) -> Result<pixora_strip::Pixmap, StripError> {
        let rendered = self
            .compositor
            .render(&DataUrlLoader, &self.images, &self.state)
            .await?;
        Ok(rendered.pixmap)
    }
}

/// Render and encode; alerts and returns `None` on failure.
async fn export_png(job: RenderJob) -> Option<Vec<u8>> {
    let result: Result<Vec<u8>, ExportFailure> = async {
        let pixmap = job.run().await?;
        Ok(encode_png(&pixmap)?)
    }
    .await;
    match result {
        Ok(png) => Some(png),
        Err(e) => {
            tracing::error!(error = %e, "could not generate strip image");
            report(EXPORT_FAILED);
            None
        }
    }
}

fn report(message: &str) {
    if let Err(e) = pixora_io::notify(message) {
        tracing::warn!(error = %e, message, "could not show alert");
    }
}

fn open_session() -> Result<SessionStore<LocalStorage>, StorageError> {
    LocalStorage::open().map(SessionStore::new)
}

fn load_session() -> SessionSnapshot {
    match open_session().and_then(|store| store.load()) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "session unavailable, starting empty");
            SessionSnapshot::default()
        }
    }
}

/// Symbols for the sticker palette buttons.
#[wasm_bindgen(js_name = stickerPalette)]
#[must_use]
pub fn sticker_palette() -> Vec<String> {
    pixora_strip::PALETTE.iter().map(|&s| s.to_owned()).collect()
}

/// Record the layout choice (layout page) and forget earlier photos.
///
/// # Errors
///
/// Fails if `localStorage` is unavailable or full.
#[wasm_bindgen(js_name = chooseLayout)]
pub fn choose_layout(poses: u32) -> Result<(), JsError> {
    open_session()?.choose_layout(poses)?;
    Ok(())
}

/// Read an uploaded file into a data URL.
///
/// The promise rejects for unsupported file types.
#[wasm_bindgen(js_name = importFile)]
pub fn import_file(file: web_sys::File) -> js_sys::Promise {
    future_to_promise(async move {
        let buffer = JsFuture::from(file.array_buffer()).await?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        let image = ImageRef::from_upload(&file.name(), &bytes)
            .map_err(|e| JsValue::from(JsError::from(e)))?;
        Ok(JsValue::from_str(image.as_str()))
    })
}

/// Store the captured or uploaded photos for the strip page.
///
/// Returns `false` (after alerting the user) when `photos` is empty.
///
/// # Errors
///
/// Fails if `localStorage` is unavailable or full.
#[wasm_bindgen(js_name = savePhotos)]
pub fn save_photos(photos: Vec<String>) -> Result<bool, JsError> {
    if photos.is_empty() {
        report(NO_PHOTOS);
        return Ok(false);
    }
    let photos: Vec<ImageRef> = photos.into_iter().map(ImageRef::new).collect();
    open_session()?.save_photos(&photos)?;
    Ok(true)
}
