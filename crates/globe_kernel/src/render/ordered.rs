//! # Ordered renderables
//!
//! Transparent draw items must be submitted back-to-front for alpha
//! blending. During traversal they are accumulated in the per-frame
//! [`FrameContext`]; once traversal ends the buffer is sorted by descending
//! eye distance and handed to the renderer.
//!
//! ## Frame phases
//!
//! `begin_frame` → `add_ordered_renderable`* → `sorted_ordered_renderables`
//!
//! Adding after the sort, or sorting twice, is a [`FrameError::PhaseViolation`].
//! The buffer keeps its allocation across frames.

use thiserror::Error;

use crate::config::KernelConfig;

slotmap::new_key_type! {
    /// Handle to a mesh owned by the renderer
    pub struct MeshKey;
}

/// Errors raised by the per-frame renderable buffer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Operation called in the wrong frame phase
    #[error("Frame phase violation: {0}")]
    PhaseViolation(&'static str),

    /// Distance cannot be ordered
    #[error("Invalid eye distance: {0}")]
    InvalidDistance(f64),
}

/// Transparent draw item awaiting depth ordering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedRenderable {
    /// Mesh to draw
    pub mesh: MeshKey,

    /// Distance from the eye, sort key
    pub distance_from_eye: f64,
}

impl OrderedRenderable {
    /// Create an ordered renderable
    pub fn new(mesh: MeshKey, distance_from_eye: f64) -> Self {
        Self { mesh, distance_from_eye }
    }
}

/// Phase of the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// Traversal is adding renderables
    Accumulating,
    /// The buffer has been sorted and handed out
    Sorted,
}

/// Per-frame state for ordered (transparent) rendering
#[derive(Debug)]
pub struct FrameContext {
    renderables: Vec<OrderedRenderable>,
    phase: FramePhase,
    frame_number: u64,
}

impl FrameContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a context with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            renderables: Vec::with_capacity(capacity),
            phase: FramePhase::Accumulating,
            frame_number: 0,
        }
    }

    /// Create a context sized by the kernel configuration
    pub fn from_config(config: &KernelConfig) -> Self {
        Self::with_capacity(config.ordered_renderable_capacity)
    }

    /// Start a new frame, clearing last frame's renderables
    pub fn begin_frame(&mut self) {
        self.renderables.clear();
        self.phase = FramePhase::Accumulating;
        self.frame_number += 1;
        log::trace!("Frame {} started", self.frame_number);
    }

    /// Queue a renderable for this frame
    pub fn add_ordered_renderable(&mut self, renderable: OrderedRenderable) -> Result<(), FrameError> {
        if self.phase != FramePhase::Accumulating {
            log::warn!("Rejected ordered renderable added after the frame was sorted");
            return Err(FrameError::PhaseViolation("add_ordered_renderable after sort"));
        }
        if renderable.distance_from_eye.is_nan() {
            log::warn!("Rejected ordered renderable with NaN eye distance");
            return Err(FrameError::InvalidDistance(renderable.distance_from_eye));
        }

        self.renderables.push(renderable);
        Ok(())
    }

    /// Sort this frame's renderables farthest first and return them
    ///
    /// Callable once per frame. Equal distances keep no particular order.
    pub fn sorted_ordered_renderables(&mut self) -> Result<&[OrderedRenderable], FrameError> {
        if self.phase != FramePhase::Accumulating {
            return Err(FrameError::PhaseViolation("sorted_ordered_renderables called twice"));
        }

        self.renderables
            .sort_unstable_by(|a, b| b.distance_from_eye.total_cmp(&a.distance_from_eye));
        self.phase = FramePhase::Sorted;

        log::debug!(
            "Frame {}: sorted {} ordered renderables",
            self.frame_number,
            self.renderables.len()
        );
        Ok(&self.renderables)
    }

    /// Current frame phase
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Frames started so far
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Renderables queued this frame
    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    /// Allocated buffer capacity
    pub fn capacity(&self) -> usize {
        self.renderables.capacity()
    }
}

impl Default for FrameContext {
    fn default() -> Self {
        Self::new()
    }
}
