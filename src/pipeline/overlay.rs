use super::cancel::CancelToken;
use crate::cam::ActivationGrid;
use crate::error::{XRayError, XrResult};
use crate::imaging::{blend, generate_color_map};
use image::{Rgba, RgbaImage};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Claim on the surface for one visualization.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    cancel: CancelToken,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

struct SurfaceState {
    generation: u64,
    in_flight: Option<CancelToken>,
    shown: Option<Arc<RgbaImage>>,
}

/// One display surface showing an X-ray with at most one CAM overlay.
///
/// Starting a visualization cancels the one in flight. Only the newest
/// generation may publish, so a late result from a superseded request is
/// discarded rather than overwriting a newer overlay.
pub struct OverlaySurface {
    background: Arc<RgbaImage>,
    exp_base: f32,
    state: Mutex<SurfaceState>,
}

impl OverlaySurface {
    pub fn new(background: RgbaImage, exp_base: f32) -> Self {
        Self {
            background: Arc::new(background),
            exp_base,
            state: Mutex::new(SurfaceState {
                generation: 0,
                in_flight: None,
                shown: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        // Guarded data stays consistent across every critical section.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn background(&self) -> &Arc<RgbaImage> {
        &self.background
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// What the surface currently displays: the overlay or the original.
    pub fn current(&self) -> Arc<RgbaImage> {
        self.lock()
            .shown
            .clone()
            .unwrap_or_else(|| self.background.clone())
    }

    /// Supersedes any in-flight visualization and hands out a new ticket.
    pub fn begin(&self) -> Ticket {
        let mut state = self.lock();
        if let Some(prev) = state.in_flight.take() {
            prev.cancel();
            debug!("Cancelled overlay generation {}", state.generation);
        }
        state.generation += 1;
        let cancel = CancelToken::new();
        state.in_flight = Some(cancel.clone());
        Ticket {
            generation: state.generation,
            cancel,
        }
    }

    /// Publishes `image` if `ticket` is still the newest claim.
    pub fn commit(&self, ticket: &Ticket, image: RgbaImage) -> XrResult<Arc<RgbaImage>> {
        let mut state = self.lock();
        if ticket.cancel.is_cancelled() || ticket.generation != state.generation {
            debug!(
                "Discarding stale overlay (generation {}, current {})",
                ticket.generation, state.generation
            );
            return Err(XRayError::Cancelled);
        }
        let shown = Arc::new(image);
        state.shown = Some(shown.clone());
        state.in_flight = None;
        Ok(shown)
    }

    /// Colours `cam`, blends it onto the background and displays it.
    pub fn visualize(&self, cam: &ActivationGrid, color: Rgba<u8>) -> XrResult<Arc<RgbaImage>> {
        let ticket = self.begin();
        let image = self.render(&ticket, cam, color)?;
        self.commit(&ticket, image)
    }

    /// The expensive part of `visualize`, checked for cancellation between steps.
    pub fn render(&self, ticket: &Ticket, cam: &ActivationGrid, color: Rgba<u8>) -> XrResult<RgbaImage> {
        let cancel = &ticket.cancel;
        cancel.check()?;

        let (width, height) = self.background.dimensions();
        let color_map = generate_color_map(cam, color, width, height, self.exp_base)?;
        cancel.check()?;
        debug!("CAM colour map generated");

        let blended = blend(&self.background, &color_map)?;
        cancel.check()?;
        debug!("CAM image overlaid");

        Ok(blended)
    }

    /// Cancels any in-flight overlay and reverts to the original image.
    pub fn clear(&self) {
        let mut state = self.lock();
        if let Some(prev) = state.in_flight.take() {
            prev.cancel();
        }
        state.generation += 1;
        state.shown = None;
    }
}
