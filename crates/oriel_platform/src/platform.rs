//! Native platform trait
//!
//! The operations the renderer needs from the OS: hidden context-host
//! windows, the shared GL context, and a non-blocking event poll. The
//! desktop backend implements this with a real windowing system; tests use
//! in-memory fakes.

use crate::error::Result;
use crate::events::Event;
use crate::target::NativeHandle;

/// Which rendering API the renderer should drive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderingBackend {
    OpenGl,
    Vulkan,
    Software,
}

/// A pooled hidden native window used only to host the GL context
pub trait OffscreenWindow {
    fn handle(&self) -> NativeHandle;
}

/// Native windowing/GL operations consumed by the renderer.
///
/// The platform owns the underlying context object (context APIs are
/// typestate-heavy); the renderer drives every lifecycle transition and
/// tracks whether a context exists.
pub trait NativePlatform {
    type OffscreenWindow: OffscreenWindow;

    /// Create a hidden window suitable for hosting the GL context.
    /// Failure is a fatal initialization error.
    fn create_offscreen_window(&mut self) -> Result<Self::OffscreenWindow>;

    /// Destroy a pooled window previously created by
    /// [`create_offscreen_window`](Self::create_offscreen_window).
    fn destroy_offscreen_window(&mut self, window: Self::OffscreenWindow);

    /// Create the shared GL context against `handle`. `double_buffering`
    /// only affects context creation attributes.
    fn create_context(&mut self, handle: NativeHandle, double_buffering: bool) -> Result<()>;

    /// Destroy the shared context if one exists
    fn destroy_context(&mut self);

    /// Make the shared context current against `handle`
    fn make_current(&mut self, handle: NativeHandle) -> Result<()>;

    /// Disable vertical sync for the currently bound window
    fn set_swap_interval_immediate(&mut self) -> Result<()>;

    /// Load GL function pointers. Called once, with the context current.
    fn load_gl(&mut self) -> Result<()>;

    /// Non-blocking poll of the native event queue
    fn poll_event(&mut self) -> Option<Event>;
}
