//! Display area and orientation of the video layer.

use std::fmt;
use std::sync::Arc;

use bridge_traits::{NativeEngine, Orientation, Rect};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, UnsupportedFeature};

/// Picture proportion requested by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Proportion {
    #[default]
    Auto,
    Keep,
    /// A fixed `width:height` ratio such as 16:9.
    Custom { width: u32, height: u32 },
}

/// How the picture is fitted into the area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transferring {
    #[default]
    Auto,
    Keep,
    Stretch,
    Crop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AspectRatio {
    pub proportion: Proportion,
    pub transferring: Transferring,
}

impl AspectRatio {
    pub fn new(proportion: Proportion, transferring: Transferring) -> Self {
        Self {
            proportion,
            transferring,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.proportion {
            Proportion::Custom { width, height } => write!(f, "{}:{}", width, height)?,
            other => write!(f, "{:?}", other)?,
        }
        write!(f, "/{:?}", self.transferring)
    }
}

#[derive(Debug)]
struct ViewportState {
    area: Rect,
    orientation: Orientation,
    aspect_ratio: AspectRatio,
}

/// Forwards area and orientation to the engine.
///
/// The engine does no diffing, so every change re-sends both values.
pub struct Viewport {
    engine: Arc<dyn NativeEngine>,
    state: Mutex<ViewportState>,
}

impl Viewport {
    pub fn new(engine: Arc<dyn NativeEngine>, area: Rect) -> Self {
        Self {
            engine,
            state: Mutex::new(ViewportState {
                area,
                orientation: Orientation::default(),
                aspect_ratio: AspectRatio::default(),
            }),
        }
    }

    pub fn area(&self) -> Rect {
        self.state.lock().area
    }

    pub fn orientation(&self) -> Orientation {
        self.state.lock().orientation
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.state.lock().aspect_ratio
    }

    pub fn has_area_change_feature(&self) -> bool {
        true
    }

    pub fn has_aspect_ratio_feature(&self) -> bool {
        true
    }

    /// Only automatic or preserved proportion and transfer are supported.
    pub fn is_aspect_ratio_supported(&self, ratio: &AspectRatio) -> bool {
        matches!(ratio.proportion, Proportion::Auto | Proportion::Keep)
            && matches!(ratio.transferring, Transferring::Auto | Transferring::Keep)
    }

    pub fn set_area(&self, area: Rect) -> Result<()> {
        self.state.lock().area = area;
        self.update()
    }

    /// Rotates the video inside the area. Rotation on a surface that cannot
    /// rotate is still forwarded, with a warning.
    pub fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        if !orientation.is_landscape() && !self.engine.video_type().supports_rotation() {
            warn!(%orientation, "SurfaceView does not support rotation");
        }
        self.state.lock().orientation = orientation;
        self.update()
    }

    pub fn set_aspect_ratio(&self, ratio: AspectRatio) -> Result<()> {
        if !self.is_aspect_ratio_supported(&ratio) {
            return Err(UnsupportedFeature::new(format!("Aspect ratio {}", ratio)).into());
        }
        self.state.lock().aspect_ratio = ratio;
        self.update()
    }

    /// Pushes the full area and orientation to the engine.
    pub fn update(&self) -> Result<()> {
        let (area, orientation) = {
            let state = self.state.lock();
            (state.area, state.orientation)
        };
        debug!(?area, %orientation, "Updating viewport");

        self.engine.set_area(area)?;
        self.engine.set_orientation(orientation)?;
        Ok(())
    }
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("state", &*self.state.lock())
            .finish()
    }
}
