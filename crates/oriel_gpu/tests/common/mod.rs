//! In-memory fakes of the platform seam, shared by the integration suites

use std::collections::VecDeque;
use std::rc::Rc;

use oriel_platform::{
    Event, Extent, NativeHandle, NativePlatform, OffscreenWindow, PlatformError, RenderTarget,
    RenderTargetType, Surface, SurfaceManager, TargetId,
};

pub struct FakeOffscreenWindow {
    handle: NativeHandle,
}

impl OffscreenWindow for FakeOffscreenWindow {
    fn handle(&self) -> NativeHandle {
        self.handle
    }
}

/// Records every native call the renderer makes
#[derive(Default)]
pub struct FakePlatform {
    next_window: u64,
    pub created_windows: u32,
    pub destroyed_windows: u32,
    pub contexts_created: u32,
    pub contexts_destroyed: u32,
    pub context_alive: bool,
    pub double_buffering_seen: Option<bool>,
    pub gl_loaded: bool,
    pub current: Option<NativeHandle>,
    pub made_current: Vec<NativeHandle>,
    pub swap_interval_calls: u32,
    pub events: VecDeque<Event>,
    pub fail_context_creation: bool,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            // offscreen window handles start high so they never collide
            // with the surface handles tests hand out
            next_window: 1000,
            ..Self::default()
        }
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push_back(event);
    }
}

impl NativePlatform for FakePlatform {
    type OffscreenWindow = FakeOffscreenWindow;

    fn create_offscreen_window(&mut self) -> Result<FakeOffscreenWindow, PlatformError> {
        self.next_window += 1;
        self.created_windows += 1;
        Ok(FakeOffscreenWindow {
            handle: NativeHandle(self.next_window),
        })
    }

    fn destroy_offscreen_window(&mut self, _window: FakeOffscreenWindow) {
        self.destroyed_windows += 1;
    }

    fn create_context(
        &mut self,
        _handle: NativeHandle,
        double_buffering: bool,
    ) -> Result<(), PlatformError> {
        if self.fail_context_creation {
            return Err(PlatformError::ContextCreation("fake failure".into()));
        }
        self.contexts_created += 1;
        self.context_alive = true;
        self.double_buffering_seen = Some(double_buffering);
        Ok(())
    }

    fn destroy_context(&mut self) {
        if self.context_alive {
            self.contexts_destroyed += 1;
            self.context_alive = false;
        }
    }

    fn make_current(&mut self, handle: NativeHandle) -> Result<(), PlatformError> {
        if !self.context_alive {
            return Err(PlatformError::NoContext);
        }
        self.current = Some(handle);
        self.made_current.push(handle);
        Ok(())
    }

    fn set_swap_interval_immediate(&mut self) -> Result<(), PlatformError> {
        self.swap_interval_calls += 1;
        Ok(())
    }

    fn load_gl(&mut self) -> Result<(), PlatformError> {
        self.gl_loaded = true;
        Ok(())
    }

    fn poll_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }
}

pub struct FakeTarget {
    id: TargetId,
    target_type: RenderTargetType,
    handle: NativeHandle,
}

impl RenderTarget for FakeTarget {
    fn target_type(&self) -> RenderTargetType {
        self.target_type
    }

    fn target_handle(&self) -> NativeHandle {
        self.handle
    }

    fn target_extents(&self) -> Extent {
        Extent::new(800, 600)
    }

    fn target_id(&self) -> TargetId {
        self.id
    }
}

pub fn surface_target(id: u64, handle: u64) -> Rc<dyn RenderTarget> {
    Rc::new(FakeTarget {
        id: TargetId(id),
        target_type: RenderTargetType::Surface,
        handle: NativeHandle(handle),
    })
}

pub fn offscreen_target(id: u64) -> Rc<dyn RenderTarget> {
    Rc::new(FakeTarget {
        id: TargetId(id),
        target_type: RenderTargetType::Offscreen,
        handle: NativeHandle(0),
    })
}

pub struct FakeSurface {
    pub handle: NativeHandle,
    pub pointer: (f32, f32),
    pub queued_work: bool,
    pub received: Vec<Event>,
}

impl FakeSurface {
    pub fn new(handle: u64) -> Self {
        Self {
            handle: NativeHandle(handle),
            pointer: (0.0, 0.0),
            queued_work: false,
            received: Vec::new(),
        }
    }
}

impl Surface for FakeSurface {
    fn native_handle(&self) -> NativeHandle {
        self.handle
    }

    fn process_event(&mut self, event: &Event) {
        self.received.push(event.clone());
    }

    fn pointer_position(&self) -> (f32, f32) {
        self.pointer
    }

    fn has_queued_work(&self) -> bool {
        self.queued_work
    }
}

#[derive(Default)]
pub struct FakeSurfaceManager {
    pub surfaces: Vec<FakeSurface>,
}

impl SurfaceManager for FakeSurfaceManager {
    fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    fn surface(&self, index: usize) -> &dyn Surface {
        &self.surfaces[index]
    }

    fn is_surface_attached(&self, handle: NativeHandle) -> bool {
        self.surfaces.iter().any(|s| s.handle == handle)
    }

    fn attached_surface(&mut self, handle: NativeHandle) -> Option<&mut dyn Surface> {
        self.surfaces
            .iter_mut()
            .find(|s| s.handle == handle)
            .map(|s| s as &mut dyn Surface)
    }
}
