use crate::{
    error::FrostResult,
    params::{ParamUpdate, RenderParams},
    render::{FrameRgba, Renderer},
};

/// Single-slot pending cell for the cancel-and-reschedule debounce: scheduling
/// a snapshot replaces any snapshot still waiting, so within one scheduling
/// quantum only the most recent change survives.
#[derive(Debug, Default)]
pub struct UpdateCoalescer {
    pending: Option<RenderParams>,
}

impl UpdateCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot, discarding any previously pending one. Returns true
    /// if an earlier snapshot was cancelled.
    pub fn schedule(&mut self, params: RenderParams) -> bool {
        self.pending.replace(params).is_some()
    }

    pub fn take(&mut self) -> Option<RenderParams> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The snapshot the next tick will render, if any.
    pub fn peek(&self) -> Option<&RenderParams> {
        self.pending.as_ref()
    }
}

/// Ties the immutable parameter store, the coalescer and the renderer into
/// the Idle -> Rendering -> Idle loop: controls submit updates, the embedder
/// calls [`RenderSession::tick`] once per display frame.
pub struct RenderSession {
    renderer: Renderer,
    current: RenderParams,
    coalescer: UpdateCoalescer,
    last_frame: Option<FrameRgba>,
}

impl RenderSession {
    pub fn new(renderer: Renderer, params: RenderParams) -> Self {
        let mut coalescer = UpdateCoalescer::new();
        // The initial snapshot renders on the first tick.
        coalescer.schedule(params.clone());
        Self {
            renderer,
            current: params,
            coalescer,
            last_frame: None,
        }
    }

    /// Apply one control change through the pure reducer and schedule the
    /// resulting snapshot. Updates submitted between ticks stack onto the
    /// latest pending snapshot, so none of them is lost to coalescing.
    /// Only intermediate whole snapshots are discarded.
    pub fn submit(&mut self, update: ParamUpdate) {
        let base = self.coalescer.peek().unwrap_or(&self.current);
        let next = base.with_update(update);
        self.coalescer.schedule(next);
    }

    /// Render the most recent pending snapshot, if any. On error the previous
    /// frame stays visible and the error is surfaced to the caller.
    pub fn tick(&mut self) -> FrostResult<Option<&FrameRgba>> {
        let Some(params) = self.coalescer.take() else {
            return Ok(None);
        };
        let frame = self.renderer.render(&params)?;
        self.current = params;
        self.last_frame = Some(frame);
        Ok(self.last_frame.as_ref())
    }

    pub fn params(&self) -> &RenderParams {
        &self.current
    }

    pub fn frame(&self) -> Option<&FrameRgba> {
        self.last_frame.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }
}
