//! Oriel Desktop Platform Backend
//!
//! Implements [`oriel_platform::NativePlatform`] for desktop operating
//! systems: winit windows (including the hidden 1x1 windows the renderer
//! pools as context hosts), glutin-managed OpenGL contexts, glow function
//! loading, and a pump-style drain of the winit event queue converted into
//! platform events keyed by native window id.

mod input;
mod platform;

pub use platform::{DesktopOffscreenWindow, DesktopPlatform};
