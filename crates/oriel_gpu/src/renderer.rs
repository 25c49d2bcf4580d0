//! Renderer: OpenGL context and render-target lifecycle
//!
//! The renderer owns the toolkit's single shared GL context and drives it
//! against a stack of render targets. Activating a target pushes it onto the
//! stack, lazily creating the context on first use; deactivating pops the
//! stack and restores the prior target's binding. Targets that are not
//! visible surfaces borrow a hidden window from the offscreen pool to host
//! the context.
//!
//! The renderer also pumps the native event queue and dispatches events to
//! attached surfaces by native-handle lookup.

use std::cell::Cell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use std::time::{Duration, Instant};

use oriel_platform::{
    Event, NativeHandle, NativePlatform, PlatformError, RenderTarget, RenderTargetType,
    RenderingBackend, Surface, SurfaceManager, TargetId, WindowEvent,
};

use crate::offscreen::{OffscreenId, OffscreenWindowPool};
use crate::shader::StandardShaderProgram;

/// Error type for renderer operations
#[derive(Debug)]
pub enum RendererError {
    /// The requested rendering backend is not supported
    UnsupportedBackend(RenderingBackend),
    /// Native platform failure (context or window creation/activation)
    Platform(PlatformError),
}

impl fmt::Display for RendererError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererError::UnsupportedBackend(backend) => {
                write!(f, "unsupported rendering backend: {:?}", backend)
            }
            RendererError::Platform(e) => write!(f, "platform error: {}", e),
        }
    }
}

impl std::error::Error for RendererError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RendererError::Platform(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PlatformError> for RendererError {
    fn from(e: PlatformError) -> Self {
        RendererError::Platform(e)
    }
}

/// Configuration for creating a renderer
#[derive(Clone, Debug)]
pub struct RendererConfig {
    pub backend: RenderingBackend,
    /// Whether window contexts are created double-buffered. Affects context
    /// creation attributes only.
    pub double_buffering: bool,
    /// Optional render-loop rate limit (frames per second)
    pub max_frame_rate: Option<u32>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: RenderingBackend::OpenGl,
            double_buffering: true,
            max_frame_rate: None,
        }
    }
}

/// Render-loop rate limiter: `should_render` answers false when called more
/// often than the configured maximum rate.
#[derive(Debug)]
pub struct FrameRateLimiter {
    min_interval: Duration,
    last_frame: Option<Instant>,
}

impl FrameRateLimiter {
    pub fn new(max_fps: u32) -> Self {
        Self {
            min_interval: Duration::from_secs(1) / max_fps.max(1),
            last_frame: None,
        }
    }

    pub fn should_render(&mut self, now: Instant) -> bool {
        match self.last_frame {
            Some(last) if now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_frame = Some(now);
                true
            }
        }
    }
}

/// OpenGL context & render-target lifecycle manager.
///
/// Single-threaded: all activation, event pumping and cache access happen on
/// the one rendering thread. One instance owns one shared context.
pub struct Renderer<P: NativePlatform> {
    platform: P,
    config: RendererConfig,
    context_created: bool,
    initialized: bool,
    creating_window: Cell<u32>,
    target_stack: Vec<Rc<dyn RenderTarget>>,
    pool: OffscreenWindowPool<P::OffscreenWindow>,
    default_offscreen: Option<OffscreenId>,
    program: StandardShaderProgram,
    frame_limiter: Option<FrameRateLimiter>,
}

impl<P: NativePlatform> Renderer<P> {
    /// Only [`RenderingBackend::OpenGl`] is supported; anything else fails
    /// here, before any native resource is touched.
    pub fn new(platform: P, config: RendererConfig) -> Result<Self, RendererError> {
        if config.backend != RenderingBackend::OpenGl {
            return Err(RendererError::UnsupportedBackend(config.backend));
        }
        let frame_limiter = config.max_frame_rate.map(FrameRateLimiter::new);
        Ok(Self {
            platform,
            config,
            context_created: false,
            initialized: false,
            creating_window: Cell::new(0),
            target_stack: Vec::new(),
            pool: OffscreenWindowPool::new(),
            default_offscreen: None,
            program: StandardShaderProgram::new(),
            frame_limiter,
        })
    }

    pub fn double_buffering(&self) -> bool {
        self.config.double_buffering
    }

    /// The currently active render target, if any
    pub fn active_target(&self) -> Option<&Rc<dyn RenderTarget>> {
        self.target_stack.last()
    }

    pub fn target_stack_depth(&self) -> usize {
        self.target_stack.len()
    }

    pub fn has_context(&self) -> bool {
        self.context_created
    }

    /// Number of hidden windows currently pooled
    pub fn offscreen_pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn shader_program(&self) -> &StandardShaderProgram {
        &self.program
    }

    pub fn shader_program_mut(&mut self) -> &mut StandardShaderProgram {
        &mut self.program
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Activate `target`: push it onto the target stack, create the shared
    /// context if it does not exist yet, make the context current against
    /// the resolved native handle, and disable vertical sync.
    ///
    /// Every activation must be paired with exactly one
    /// [`deactivate_context`](Self::deactivate_context); nesting is legal.
    /// Prefer [`activate`](Self::activate), which pairs them for you.
    pub fn activate_context(&mut self, target: Rc<dyn RenderTarget>) -> Result<(), RendererError> {
        if !self.context_created {
            let handle = self.resolve_handle(&target)?;
            self.platform
                .create_context(handle, self.config.double_buffering)?;
            self.context_created = true;
            tracing::debug!(?handle, "created OpenGL context");
        }
        self.target_stack.push(target);
        if !self.initialized {
            self.initialize()?;
        }
        self.activate_current_target()?;
        Ok(())
    }

    /// Deactivate the current target: release its offscreen association,
    /// pop the stack, and restore the prior target's binding. With the
    /// stack emptied the context stays bound to whatever it was bound to
    /// until the next activation.
    ///
    /// # Panics
    ///
    /// Panics when called with an empty stack: an unmatched deactivation is
    /// a caller bug that would corrupt restoration order, not a recoverable
    /// condition.
    pub fn deactivate_context(&mut self) -> Result<(), RendererError> {
        let Some(top) = self.target_stack.pop() else {
            panic!("deactivate_context called with no active render target");
        };
        self.pool.deallocate(top.target_id());
        if !self.target_stack.is_empty() {
            self.activate_current_target()?;
        }
        Ok(())
    }

    /// Scoped activation: the returned guard deactivates on drop, on every
    /// exit path.
    pub fn activate(
        &mut self,
        target: Rc<dyn RenderTarget>,
    ) -> Result<ActiveTargetGuard<'_, P>, RendererError> {
        self.activate_context(target)?;
        Ok(ActiveTargetGuard { renderer: self })
    }

    /// One-time setup, run on first activation: allocate the default
    /// offscreen context host, make the context current against it, and
    /// load the GL function pointers.
    fn initialize(&mut self) -> Result<(), RendererError> {
        let default = self.allocate_offscreen(None)?;
        self.default_offscreen = Some(default);
        if !self.context_created {
            self.platform
                .create_context(self.pool.handle(default), self.config.double_buffering)?;
            self.context_created = true;
        }
        self.platform.make_current(self.pool.handle(default))?;
        self.platform.load_gl()?;
        self.initialized = true;
        tracing::debug!("renderer initialized");
        Ok(())
    }

    /// Destroy the shared context. The next activation recreates it.
    pub fn destroy_context(&mut self) {
        if self.context_created {
            self.platform.destroy_context();
            self.context_created = false;
            tracing::debug!("destroyed OpenGL context");
        }
    }

    /// Tear down the renderer: park the context on its default host, release
    /// the gradient cache, destroy the context, and destroy every pooled
    /// offscreen window. Runs at most once per initialization; also invoked
    /// from `Drop`.
    pub fn cleanup(&mut self) {
        if !self.initialized {
            return;
        }
        if self.context_created {
            if let Some(default) = self.default_offscreen {
                if let Err(e) = self.platform.make_current(self.pool.handle(default)) {
                    tracing::warn!("failed to bind context for teardown: {}", e);
                }
            }
            self.platform.destroy_context();
            self.context_created = false;
        }
        self.program.gradient_shader_mut().clear_cache();
        for window in self.pool.drain() {
            self.platform.destroy_offscreen_window(window);
        }
        self.default_offscreen = None;
        self.initialized = false;
        tracing::debug!("renderer cleaned up");
    }

    fn allocate_offscreen(&mut self, target: Option<TargetId>) -> Result<OffscreenId, PlatformError> {
        let platform = &mut self.platform;
        self.pool
            .allocate(target, || platform.create_offscreen_window())
    }

    /// Native handle the context binds to for `target`: the surface's own
    /// handle, or a pooled hidden window for offscreen targets.
    fn resolve_handle(&mut self, target: &Rc<dyn RenderTarget>) -> Result<NativeHandle, PlatformError> {
        match target.target_type() {
            RenderTargetType::Surface => Ok(target.target_handle()),
            RenderTargetType::Offscreen => {
                let id = self.allocate_offscreen(Some(target.target_id()))?;
                Ok(self.pool.handle(id))
            }
        }
    }

    fn activate_current_target(&mut self) -> Result<(), RendererError> {
        let Some(target) = self.target_stack.last().cloned() else {
            return Ok(());
        };
        let handle = self.resolve_handle(&target)?;
        self.platform.make_current(handle)?;
        self.platform.set_swap_interval_immediate()?;
        Ok(())
    }

    /// Whether a native window is currently being constructed somewhere up
    /// the call stack (used by event handling to suppress re-entrancy)
    pub fn creating_window(&self) -> bool {
        self.creating_window.get() != 0
    }

    /// Scope marking native window construction; the guard decrements on
    /// drop
    pub fn window_creation_scope(&self) -> WindowCreationScope<'_> {
        self.creating_window.set(self.creating_window.get() + 1);
        WindowCreationScope {
            counter: &self.creating_window,
        }
    }

    /// Whether the frame-rate limiter permits rendering this tick. Always
    /// true when no limit is configured.
    pub fn should_render(&mut self) -> bool {
        match &mut self.frame_limiter {
            Some(limiter) => limiter.should_render(Instant::now()),
            None => true,
        }
    }

    /// Drain the native event queue and dispatch to attached surfaces.
    ///
    /// Returns whether a render pass is warranted this tick: true when any
    /// native event was observed or any surface already had queued work.
    pub fn process_events(&mut self, surfaces: &mut dyn SurfaceManager) -> bool {
        let mut queued = false;
        for index in 0..surfaces.surface_count() {
            if surfaces.surface(index).has_queued_work() {
                queued = true;
                break;
            }
        }
        let observed = self.pump_events(surfaces);
        observed || queued
    }

    fn pump_events(&mut self, surfaces: &mut dyn SurfaceManager) -> bool {
        let mut observed = false;
        while let Some(mut event) = self.platform.poll_event() {
            observed = true;
            dispatch_event(&mut event, surfaces);
        }
        observed
    }
}

impl<P: NativePlatform> Drop for Renderer<P> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Route one pumped event to its attached surface. Events tagged with a
/// handle outside the attached set are dropped: the native queue can carry
/// events for foreign windows or windows already torn down.
fn dispatch_event(event: &mut Event, surfaces: &mut dyn SurfaceManager) {
    let handle = event.window_handle();
    if !surfaces.is_surface_attached(handle) {
        tracing::trace!(?handle, "dropping event for unattached window");
        return;
    }
    if let Some(surface) = surfaces.attached_surface(handle) {
        enrich_event(event, &*surface);
        surface.process_event(&*event);
    }
}

/// Pre-dispatch enrichment hook. Enter notifications carry no pointer
/// position on this side of the platform boundary; fill in the surface's
/// last known position. The hook mutates the event in place and never
/// consumes it.
fn enrich_event(event: &mut Event, surface: &dyn Surface) {
    if let Event::Window {
        event: WindowEvent::PointerEntered { x, y },
        ..
    } = event
    {
        let (px, py) = surface.pointer_position();
        *x = px;
        *y = py;
    }
}

/// RAII guard for a scoped render-target activation
pub struct ActiveTargetGuard<'r, P: NativePlatform> {
    renderer: &'r mut Renderer<P>,
}

impl<P: NativePlatform> Deref for ActiveTargetGuard<'_, P> {
    type Target = Renderer<P>;

    fn deref(&self) -> &Self::Target {
        self.renderer
    }
}

impl<P: NativePlatform> DerefMut for ActiveTargetGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.renderer
    }
}

impl<P: NativePlatform> Drop for ActiveTargetGuard<'_, P> {
    fn drop(&mut self) {
        if let Err(e) = self.renderer.deactivate_context() {
            tracing::error!("failed to restore render target on deactivate: {}", e);
        }
    }
}

/// Guard for [`Renderer::window_creation_scope`]
pub struct WindowCreationScope<'r> {
    counter: &'r Cell<u32>,
}

impl Drop for WindowCreationScope<'_> {
    fn drop(&mut self) {
        self.counter.set(self.counter.get().saturating_sub(1));
    }
}
