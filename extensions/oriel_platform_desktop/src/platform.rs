//! Desktop native platform: winit windows + glutin GL contexts
//!
//! The platform owns the winit event loop, the glutin display, and every
//! native window it hands out (visible surfaces and pooled hidden context
//! hosts alike), all keyed by native window id. The renderer drives the
//! context lifecycle through [`oriel_platform::NativePlatform`]; glutin's
//! not-current/current typestate is folded into an internal enum so the
//! shared context survives repeated rebinding.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::time::Duration;

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentContext, NotCurrentGlContext,
    PossiblyCurrentContext, PossiblyCurrentGlContext, Version,
};
use glutin::display::{Display, DisplayApiPreference, GlDisplay};
use glutin::surface::{
    GlSurface, Surface as GlWindowSurface, SurfaceAttributesBuilder, SwapInterval, WindowSurface,
};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use rustc_hash::FxHashMap;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent as WinitWindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::{Window, WindowAttributes, WindowId};

use oriel_platform::{Event, NativeHandle, NativePlatform, OffscreenWindow, PlatformError, Result};

use crate::input;

/// Token for a pooled hidden window. The winit window itself stays in the
/// platform's registry so the GL machinery can resolve it by handle.
pub struct DesktopOffscreenWindow {
    handle: NativeHandle,
}

impl OffscreenWindow for DesktopOffscreenWindow {
    fn handle(&self) -> NativeHandle {
        self.handle
    }
}

/// The shared context, in whichever currency state glutin last left it
enum GlContextState {
    NotCurrent(NotCurrentContext),
    Current(PossiblyCurrentContext),
}

struct WindowData {
    window: Window,
    gl_surface: Option<GlWindowSurface<WindowSurface>>,
}

/// Collects winit events during a pump into a queue the renderer drains
#[derive(Default)]
struct EventCollector {
    pending: VecDeque<Event>,
}

impl ApplicationHandler for EventCollector {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WinitWindowEvent,
    ) {
        let handle = NativeHandle(u64::from(window_id));
        if let Some(converted) = input::convert_window_event(handle, &event) {
            self.pending.push_back(converted);
        }
    }
}

/// Desktop implementation of [`NativePlatform`]
pub struct DesktopPlatform {
    event_loop: EventLoop<()>,
    collector: EventCollector,
    gl_display: Display,
    gl_config: Option<Config>,
    context: Option<GlContextState>,
    current: Option<NativeHandle>,
    gl: Option<glow::Context>,
    windows: FxHashMap<NativeHandle, WindowData>,
}

impl DesktopPlatform {
    /// One-time native subsystem initialization: event loop plus GL display.
    /// At most one platform may exist per process.
    pub fn new() -> Result<Self> {
        let event_loop =
            EventLoop::new().map_err(|e| PlatformError::InitFailed(e.to_string()))?;
        let raw_display = event_loop
            .display_handle()
            .map_err(|e| PlatformError::InitFailed(e.to_string()))?
            .as_raw();
        // SAFETY: the display handle is valid for the lifetime of the event
        // loop, which this platform owns alongside the GL display.
        let gl_display = unsafe { Display::new(raw_display, display_api_preference()) }
            .map_err(|e| PlatformError::InitFailed(e.to_string()))?;
        tracing::debug!("desktop platform initialized");
        Ok(Self {
            event_loop,
            collector: EventCollector::default(),
            gl_display,
            gl_config: None,
            context: None,
            current: None,
            gl: None,
            windows: FxHashMap::default(),
        })
    }

    /// Create a visible window surface and register it for event dispatch
    /// and context binding.
    pub fn create_surface_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<NativeHandle> {
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height));
        self.register_window(attributes)
            .map_err(PlatformError::WindowCreation)
    }

    /// Close a window created by
    /// [`create_surface_window`](Self::create_surface_window).
    pub fn destroy_surface_window(&mut self, handle: NativeHandle) {
        self.forget_window(handle);
    }

    /// Loaded GL API, once [`NativePlatform::load_gl`] has run
    pub fn gl(&self) -> Option<&glow::Context> {
        self.gl.as_ref()
    }

    pub fn window(&self, handle: NativeHandle) -> Option<&Window> {
        self.windows.get(&handle).map(|data| &data.window)
    }

    pub fn request_redraw(&self, handle: NativeHandle) {
        if let Some(data) = self.windows.get(&handle) {
            data.window.request_redraw();
        }
    }

    /// Present the back buffer of `handle`'s window. The context must be
    /// current against that window.
    pub fn swap_buffers(&mut self, handle: NativeHandle) -> Result<()> {
        let data = self
            .windows
            .get(&handle)
            .ok_or_else(|| unknown_window(handle))?;
        let surface = data.gl_surface.as_ref().ok_or(PlatformError::NoContext)?;
        match &self.context {
            Some(GlContextState::Current(context)) => surface
                .swap_buffers(context)
                .map_err(|e| PlatformError::ContextActivation(e.to_string())),
            _ => Err(PlatformError::NoContext),
        }
    }

    fn register_window(
        &mut self,
        attributes: WindowAttributes,
    ) -> std::result::Result<NativeHandle, String> {
        // winit wants windows created from inside the event loop; pump-style
        // drivers use the migration helper instead
        #[allow(deprecated)]
        let window = self
            .event_loop
            .create_window(attributes)
            .map_err(|e| e.to_string())?;
        let handle = NativeHandle(u64::from(window.id()));
        self.windows.insert(
            handle,
            WindowData {
                window,
                gl_surface: None,
            },
        );
        Ok(handle)
    }

    fn forget_window(&mut self, handle: NativeHandle) {
        self.windows.remove(&handle);
        if self.current == Some(handle) {
            self.current = None;
        }
    }

    /// Create the window's GL surface if it does not exist yet. Requires a
    /// chosen config, i.e. a created context.
    fn ensure_gl_surface(&mut self, handle: NativeHandle) -> Result<()> {
        let config = match &self.gl_config {
            Some(config) => config.clone(),
            None => return Err(PlatformError::NoContext),
        };
        let data = self
            .windows
            .get_mut(&handle)
            .ok_or_else(|| unknown_window(handle))?;
        if data.gl_surface.is_some() {
            return Ok(());
        }
        let raw_window = data
            .window
            .window_handle()
            .map_err(|e| PlatformError::ContextActivation(e.to_string()))?
            .as_raw();
        let size = data.window.inner_size();
        let width = NonZeroU32::new(size.width).unwrap_or(NonZeroU32::MIN);
        let height = NonZeroU32::new(size.height).unwrap_or(NonZeroU32::MIN);
        let attributes =
            SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_window, width, height);
        // SAFETY: the window outlives its surface; both live in this
        // registry and are dropped together.
        let surface = unsafe {
            self.gl_display
                .create_window_surface(&config, &attributes)
        }
        .map_err(|e| PlatformError::ContextActivation(e.to_string()))?;
        data.gl_surface = Some(surface);
        Ok(())
    }
}

impl NativePlatform for DesktopPlatform {
    type OffscreenWindow = DesktopOffscreenWindow;

    fn create_offscreen_window(&mut self) -> Result<DesktopOffscreenWindow> {
        let attributes = Window::default_attributes()
            .with_title("oriel-offscreen")
            .with_visible(false)
            .with_decorations(false)
            .with_inner_size(PhysicalSize::new(1u32, 1u32));
        let handle = self
            .register_window(attributes)
            .map_err(PlatformError::OffscreenWindowCreation)?;
        tracing::debug!(?handle, "created hidden offscreen window");
        Ok(DesktopOffscreenWindow { handle })
    }

    fn destroy_offscreen_window(&mut self, window: DesktopOffscreenWindow) {
        self.forget_window(window.handle);
    }

    fn create_context(&mut self, handle: NativeHandle, double_buffering: bool) -> Result<()> {
        let data = self
            .windows
            .get(&handle)
            .ok_or_else(|| PlatformError::ContextCreation(format!("unknown window handle {:?}", handle)))?;
        let raw_window = data
            .window
            .window_handle()
            .map_err(|e| PlatformError::ContextCreation(e.to_string()))?
            .as_raw();

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_single_buffering(!double_buffering)
            .compatible_with_native_window(raw_window)
            .build();
        // SAFETY: the native window is alive for the duration of config
        // selection and context creation.
        let mut configs = unsafe { self.gl_display.find_configs(template) }
            .map_err(|e| PlatformError::ContextCreation(e.to_string()))?;
        let config = configs
            .next()
            .ok_or_else(|| PlatformError::ContextCreation("no matching GL config".into()))?;
        drop(configs);

        let attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 0))))
            .build(Some(raw_window));
        // SAFETY: as above.
        let context = match unsafe { self.gl_display.create_context(&config, &attributes) } {
            Ok(context) => context,
            Err(_) => {
                // fall back to whatever version the driver offers
                let fallback = ContextAttributesBuilder::new().build(Some(raw_window));
                // SAFETY: as above.
                unsafe { self.gl_display.create_context(&config, &fallback) }
                    .map_err(|e| PlatformError::ContextCreation(e.to_string()))?
            }
        };

        self.gl_config = Some(config);
        self.context = Some(GlContextState::NotCurrent(context));
        self.current = None;
        tracing::debug!(?handle, double_buffering, "created OpenGL context");
        Ok(())
    }

    fn destroy_context(&mut self) {
        if self.context.take().is_some() {
            tracing::debug!("destroyed OpenGL context");
        }
        // window surfaces were created against the destroyed context's
        // config; recreate them lazily under the next context
        for data in self.windows.values_mut() {
            data.gl_surface = None;
        }
        self.gl_config = None;
        self.gl = None;
        self.current = None;
    }

    fn make_current(&mut self, handle: NativeHandle) -> Result<()> {
        self.ensure_gl_surface(handle)?;
        let data = self
            .windows
            .get(&handle)
            .ok_or_else(|| unknown_window(handle))?;
        let surface = data.gl_surface.as_ref().ok_or(PlatformError::NoContext)?;
        match self.context.take() {
            None => Err(PlatformError::NoContext),
            Some(GlContextState::NotCurrent(context)) => {
                // a failed first bind consumes the context; the renderer
                // recreates it on the next activation
                let current = context
                    .make_current(surface)
                    .map_err(|e| PlatformError::ContextActivation(e.to_string()))?;
                self.context = Some(GlContextState::Current(current));
                self.current = Some(handle);
                Ok(())
            }
            Some(GlContextState::Current(context)) => {
                let result = context.make_current(surface);
                self.context = Some(GlContextState::Current(context));
                result.map_err(|e| PlatformError::ContextActivation(e.to_string()))?;
                self.current = Some(handle);
                Ok(())
            }
        }
    }

    fn set_swap_interval_immediate(&mut self) -> Result<()> {
        let handle = self.current.ok_or(PlatformError::NoContext)?;
        let data = self
            .windows
            .get(&handle)
            .ok_or_else(|| unknown_window(handle))?;
        let surface = data.gl_surface.as_ref().ok_or(PlatformError::NoContext)?;
        match &self.context {
            Some(GlContextState::Current(context)) => surface
                .set_swap_interval(context, SwapInterval::DontWait)
                .map_err(|e| PlatformError::ContextActivation(e.to_string())),
            _ => Err(PlatformError::NoContext),
        }
    }

    fn load_gl(&mut self) -> Result<()> {
        if self.gl.is_none() {
            let display = &self.gl_display;
            // SAFETY: called with the context current; the loaded pointers
            // stay valid for the display's lifetime.
            let gl = unsafe {
                glow::Context::from_loader_function_cstr(|symbol| {
                    display.get_proc_address(symbol).cast()
                })
            };
            self.gl = Some(gl);
            tracing::debug!("loaded OpenGL function pointers");
        }
        Ok(())
    }

    fn poll_event(&mut self) -> Option<Event> {
        if self.collector.pending.is_empty() {
            let _status = self
                .event_loop
                .pump_app_events(Some(Duration::ZERO), &mut self.collector);
        }
        self.collector.pending.pop_front()
    }
}

fn unknown_window(handle: NativeHandle) -> PlatformError {
    PlatformError::ContextActivation(format!("unknown window handle {:?}", handle))
}

fn display_api_preference() -> DisplayApiPreference {
    #[cfg(target_os = "macos")]
    return DisplayApiPreference::Cgl;
    #[cfg(target_os = "windows")]
    return DisplayApiPreference::WglThenEgl(None);
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    DisplayApiPreference::Egl
}
