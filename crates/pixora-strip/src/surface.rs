//! The displayed strip.
//!
//! Renders may finish out of order (photo loads resolve whenever they
//! resolve). Every render takes a ticket before it starts, and a
//! finished render is only shown if no newer render has already been
//! shown.

use tiny_skia::Pixmap;

/// Proof that a render was requested, ordered by request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderTicket(u64);

impl RenderTicket {
    /// Request sequence number, starting at 1.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Holds the most recently requested strip that has finished drawing.
#[derive(Debug, Default)]
pub struct StripSurface {
    issued: u64,
    committed: u64,
    pixmap: Option<Pixmap>,
}

impl StripSurface {
    /// An empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new render request.
    pub const fn begin(&mut self) -> RenderTicket {
        self.issued += 1;
        RenderTicket(self.issued)
    }

    /// Offer a finished render.
    ///
    /// Returns `true` if `pixmap` became the displayed strip, `false` if
    /// a newer request has already been displayed.
    pub fn commit(&mut self, ticket: RenderTicket, pixmap: Pixmap) -> bool {
        if ticket.0 < self.committed {
            tracing::debug!(
                ticket = ticket.0,
                committed = self.committed,
                "discarding stale render"
            );
            return false;
        }
        self.committed = ticket.0;
        self.pixmap = Some(pixmap);
        true
    }

    /// The displayed strip, if any render has been committed.
    #[must_use]
    pub const fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Whether renders were requested that have not been shown yet.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.issued > self.committed
    }
}
