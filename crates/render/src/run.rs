use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::event::{DeviceEvent, ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::state::{State, ViewerOptions};

/// Open the viewer window and run the event loop until exit.
///
/// `reload_rx`, when present, carries paths of changed shader files from
/// the watcher; it is drained once per frame.
pub fn run(options: ViewerOptions, reload_rx: Option<Receiver<PathBuf>>) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Mandelbulb")
            .with_inner_size(winit::dpi::LogicalSize::new(options.width, options.height))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut state = pollster::block_on(State::new(window.clone(), options))?;
    let mut last_frame = Instant::now();

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == state.window().id() => {
                if !state.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                                    state: ElementState::Pressed,
                                    ..
                                },
                            ..
                        } => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            state.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let now = Instant::now();
                            // Clamp dt so a stall does not teleport the camera.
                            let dt = (now - last_frame).as_secs_f32().min(0.1);
                            last_frame = now;
                            state.update(dt);
                            match state.render() {
                                Ok(_) => {}
                                // Reconfigure the surface if lost
                                Err(wgpu::SurfaceError::Lost) => {
                                    state.resize(state.window.inner_size())
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("surface out of memory, exiting");
                                    elwt.exit();
                                }
                                // Outdated and Timeout resolve on the next frame
                                Err(e) => tracing::warn!("dropped frame: {e:?}"),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                state.mouse_look(delta.0, delta.1);
            }
            Event::AboutToWait => {
                if let Some(rx) = &reload_rx {
                    // A single save can produce several events; only the
                    // last one matters.
                    let mut pending = None;
                    while let Ok(path) = rx.try_recv() {
                        pending = Some(path);
                    }
                    if let Some(path) = pending {
                        if let Err(e) = state.reload_shader(&path) {
                            tracing::warn!("shader reload failed: {e:#}");
                        }
                    }
                }
                state.window().request_redraw();
            }
            _ => {}
        }
    })?;
    Ok(())
}
