//! The projected raster.

use std::fmt;

use skymap_map::NULL_F64;
use skymap_pixel::{SharedHandler, SkyError, default_handler, report};

use crate::kind::ProjectionKind;
use crate::plate;
use crate::window::Window;

/// An `nx` × `ny` grid of `f64` samples over a [`Window`].
///
/// Cells start out null. Changing the projection kind or window invalidates
/// the samples, so both setters null the grid again.
#[derive(Debug, Clone)]
pub struct Projection {
    nx: usize,
    ny: usize,
    kind: ProjectionKind,
    window: Window,
    data: Vec<f64>,
    handler: SharedHandler,
}

fn null_grid(nx: usize, ny: usize) -> Result<Vec<f64>, SkyError> {
    if nx == 0 || ny == 0 {
        return Err(SkyError::OutOfRange(format!(
            "raster size {nx} x {ny} must be non-zero"
        )));
    }
    let len = nx
        .checked_mul(ny)
        .ok_or_else(|| SkyError::Allocation(format!("{nx} x {ny} raster")))?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| SkyError::Allocation(format!("{nx} x {ny} raster")))?;
    data.resize(len, NULL_F64);
    Ok(data)
}

impl Projection {
    #[track_caller]
    pub fn new(
        nx: usize,
        ny: usize,
        kind: ProjectionKind,
        window: Window,
    ) -> Result<Self, SkyError> {
        let handler = default_handler();
        let result = window.validate().and_then(|()| null_grid(nx, ny));
        let data = report(&*handler, result)?;
        Ok(Self {
            nx,
            ny,
            kind,
            window,
            data,
            handler,
        })
    }

    #[must_use]
    pub fn with_error_handler(mut self, handler: SharedHandler) -> Self {
        self.handler = handler;
        self
    }

    #[must_use]
    pub fn error_handler(&self) -> &SharedHandler {
        &self.handler
    }

    #[must_use]
    pub fn nx(&self) -> usize {
        self.nx
    }

    #[must_use]
    pub fn ny(&self) -> usize {
        self.ny
    }

    #[must_use]
    pub fn kind(&self) -> ProjectionKind {
        self.kind
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Raw samples, indexed `x * ny + y`.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn set_kind(&mut self, kind: ProjectionKind) {
        self.kind = kind;
        self.data.fill(NULL_F64);
    }

    /// Replace the window. The old window and samples are kept on error.
    #[track_caller]
    pub fn set_window(&mut self, window: Window) -> Result<(), SkyError> {
        report(&*self.handler, window.validate())?;
        self.window = window;
        self.data.fill(NULL_F64);
        Ok(())
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, SkyError> {
        if x >= self.nx || y >= self.ny {
            return Err(SkyError::OutOfRange(format!(
                "raster cell ({x}, {y}) outside {} x {}",
                self.nx, self.ny
            )));
        }
        Ok(x * self.ny + y)
    }

    #[track_caller]
    pub fn get(&self, x: usize, y: usize) -> Result<f64, SkyError> {
        let result = self.index(x, y).map(|i| self.data[i]);
        report(&*self.handler, result)
    }

    #[track_caller]
    pub fn set(&mut self, x: usize, y: usize, value: f64) -> Result<(), SkyError> {
        let index = report(&*self.handler, self.index(x, y))?;
        self.data[index] = value;
        Ok(())
    }

    pub fn set_all(&mut self, value: f64) {
        self.data.fill(value);
    }

    pub(crate) fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// [`plate::forward`] with this raster's geometry.
    #[track_caller]
    pub fn forward(&self, theta: f64, phi: f64) -> Result<Option<(f64, f64)>, SkyError> {
        report(&*self.handler, self.forward_unreported(theta, phi))
    }

    /// [`plate::reverse`] with this raster's geometry.
    #[track_caller]
    pub fn reverse(&self, x: f64, y: f64) -> Result<Option<(f64, f64)>, SkyError> {
        report(&*self.handler, self.reverse_unreported(x, y))
    }

    pub(crate) fn forward_unreported(
        &self,
        theta: f64,
        phi: f64,
    ) -> Result<Option<(f64, f64)>, SkyError> {
        plate::forward(&self.window, self.nx, self.ny, self.kind, theta, phi)
    }

    pub(crate) fn reverse_unreported(&self, x: f64, y: f64) -> Result<Option<(f64, f64)>, SkyError> {
        plate::reverse(&self.window, self.nx, self.ny, self.kind, x, y)
    }

    /// Multi-line summary; also available through `Display`.
    #[must_use]
    pub fn info(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.data.first().copied().unwrap_or(NULL_F64);
        let last = self.data.last().copied().unwrap_or(NULL_F64);
        writeln!(f, "  {} projection, size {} x {}", self.kind, self.nx, self.ny)?;
        writeln!(
            f,
            "  theta = {} ... {}",
            self.window.min_theta(),
            self.window.max_theta()
        )?;
        writeln!(
            f,
            "  phi = {} ... {}",
            self.window.min_phi(),
            self.window.max_phi()
        )?;
        write!(f, "  data = {first} ... {last}")
    }
}
