//! Event pump & dispatch integration tests

mod common;

use common::{FakePlatform, FakeSurface, FakeSurfaceManager};
use oriel_gpu::{Renderer, RendererConfig};
use oriel_platform::{Event, InputEvent, NativeHandle, WindowEvent};

fn renderer_with_events(events: Vec<Event>) -> Renderer<FakePlatform> {
    let mut platform = FakePlatform::new();
    for event in events {
        platform.push_event(event);
    }
    Renderer::new(platform, RendererConfig::default()).expect("OpenGL backend is supported")
}

#[test]
fn events_are_routed_to_their_surface_by_native_handle() {
    let mut renderer = renderer_with_events(vec![
        Event::Input {
            handle: NativeHandle(1),
            event: InputEvent::PointerMoved { x: 5.0, y: 6.0 },
        },
        Event::Window {
            handle: NativeHandle(2),
            event: WindowEvent::CloseRequested,
        },
    ]);
    let mut surfaces = FakeSurfaceManager::default();
    surfaces.surfaces.push(FakeSurface::new(1));
    surfaces.surfaces.push(FakeSurface::new(2));

    assert!(renderer.process_events(&mut surfaces));
    assert_eq!(surfaces.surfaces[0].received.len(), 1);
    assert_eq!(surfaces.surfaces[1].received.len(), 1);
    assert_eq!(
        surfaces.surfaces[1].received[0],
        Event::Window {
            handle: NativeHandle(2),
            event: WindowEvent::CloseRequested,
        }
    );
}

#[test]
fn events_for_unattached_windows_are_dropped_silently() {
    let mut renderer = renderer_with_events(vec![Event::Input {
        handle: NativeHandle(99),
        event: InputEvent::Scroll { dx: 0.0, dy: -3.0 },
    }]);
    let mut surfaces = FakeSurfaceManager::default();
    surfaces.surfaces.push(FakeSurface::new(1));

    // the event was observed but nobody received it, and nothing failed
    assert!(renderer.process_events(&mut surfaces));
    assert!(surfaces.surfaces[0].received.is_empty());
}

#[test]
fn idle_ticks_report_no_work() {
    let mut renderer = renderer_with_events(Vec::new());
    let mut surfaces = FakeSurfaceManager::default();
    surfaces.surfaces.push(FakeSurface::new(1));

    assert!(!renderer.process_events(&mut surfaces));
}

#[test]
fn queued_surface_work_requests_a_render_pass_without_events() {
    let mut renderer = renderer_with_events(Vec::new());
    let mut surfaces = FakeSurfaceManager::default();
    let mut surface = FakeSurface::new(1);
    surface.queued_work = true;
    surfaces.surfaces.push(surface);

    assert!(renderer.process_events(&mut surfaces));
}

#[test]
fn pointer_enter_is_enriched_with_the_last_known_position() {
    let mut renderer = renderer_with_events(vec![Event::Window {
        handle: NativeHandle(1),
        event: WindowEvent::PointerEntered { x: 0.0, y: 0.0 },
    }]);
    let mut surfaces = FakeSurfaceManager::default();
    let mut surface = FakeSurface::new(1);
    surface.pointer = (120.0, 48.0);
    surfaces.surfaces.push(surface);

    assert!(renderer.process_events(&mut surfaces));
    assert_eq!(
        surfaces.surfaces[0].received,
        vec![Event::Window {
            handle: NativeHandle(1),
            event: WindowEvent::PointerEntered { x: 120.0, y: 48.0 },
        }]
    );
}

#[test]
fn the_whole_queue_is_drained_in_one_pump() {
    let events: Vec<Event> = (0..10)
        .map(|i| Event::Input {
            handle: NativeHandle(1),
            event: InputEvent::PointerMoved {
                x: i as f32,
                y: 0.0,
            },
        })
        .collect();
    let mut renderer = renderer_with_events(events);
    let mut surfaces = FakeSurfaceManager::default();
    surfaces.surfaces.push(FakeSurface::new(1));

    assert!(renderer.process_events(&mut surfaces));
    assert_eq!(surfaces.surfaces[0].received.len(), 10);
    // queue is empty now
    assert!(!renderer.process_events(&mut surfaces));
}
