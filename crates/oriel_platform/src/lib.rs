//! Oriel Platform Abstraction
//!
//! The seam between the renderer and the operating system:
//!
//! - **Render targets**: destinations for drawing (window surfaces or
//!   offscreen buffers), identified by opaque native handles
//! - **Surfaces**: attached native windows that receive dispatched events
//! - **Native platform**: offscreen window creation, GL context lifecycle,
//!   and non-blocking event polling
//!
//! Concrete backends live in extension crates; the renderer is generic over
//! [`NativePlatform`] so core logic tests against in-memory fakes.

pub mod error;
pub mod events;
pub mod platform;
pub mod surface;
pub mod target;

pub use error::{PlatformError, Result};
pub use events::{Event, InputEvent, Key, PointerButton, WindowEvent};
pub use platform::{NativePlatform, OffscreenWindow, RenderingBackend};
pub use surface::{Surface, SurfaceManager};
pub use target::{Extent, NativeHandle, RenderTarget, RenderTargetType, TargetId};
