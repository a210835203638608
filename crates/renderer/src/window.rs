use std::sync::Arc;
use std::time::Instant;

use caustics::{InputTracker, Theme, ThemeSource, ViewportState};
use tracing::{debug, error, info, warn};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::{CancellationToken, FrameScheduler, RenderLoop, SystemTimeSource};
use crate::types::{RenderOutcome, RendererConfig, RendererError};

/// Window, GPU resources and the per-frame input they are driven by.
///
/// `gpu` is declared before `window` so the surface is dropped first.
struct WindowState {
    gpu: GpuState,
    window: Arc<Window>,
    input: InputTracker,
    render_loop: RenderLoop,
    scheduler: FrameScheduler,
    theme: Box<dyn ThemeSource>,
    config: RendererConfig,
}

impl WindowState {
    fn new(
        window: Arc<Window>,
        config: RendererConfig,
        mut theme: Box<dyn ThemeSource>,
    ) -> Result<Self, RendererError> {
        if let Some(system) = window.theme() {
            theme.system_theme_changed(system_theme(system));
        }

        let mut input = InputTracker::new(config.viewport);
        let viewport = update_viewport(&mut input, &window, window.inner_size())
            .unwrap_or(ViewportState {
                width: 1,
                height: 1,
            });
        let gpu = GpuState::new(window.as_ref(), window.inner_size(), viewport)?;

        let state = Self {
            gpu,
            window,
            input,
            render_loop: RenderLoop::new(Box::new(SystemTimeSource::new()), config.smoothing),
            scheduler: FrameScheduler::new(config.target_fps),
            theme,
            config,
        };
        state.refresh_title();
        Ok(state)
    }

    fn refresh_title(&self) {
        self.window
            .set_title(&self.config.window_title(self.theme.theme()));
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize_surface(new_size);
        if let Some(viewport) = update_viewport(&mut self.input, &self.window, new_size) {
            self.gpu.resize_viewport(viewport);
        }
    }

    fn handle_touch(&mut self, touch: Touch) {
        let size = self.window.inner_size();
        let (width, height) = (f64::from(size.width), f64::from(size.height));
        let (x, y) = (touch.location.x, touch.location.y);
        match touch.phase {
            TouchPhase::Started => {
                self.input.touch_started(touch.id);
                self.input.touch_moved(touch.id, x, y, width, height);
            }
            TouchPhase::Moved => self.input.touch_moved(touch.id, x, y, width, height),
            TouchPhase::Ended | TouchPhase::Cancelled => self.input.touch_ended(touch.id),
        }
    }

    fn toggle_theme(&mut self) {
        let theme = self.theme.toggle();
        info!(theme = %theme, "theme toggled");
        self.refresh_title();
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let viewport = self.input.viewport().unwrap_or(ViewportState {
            width: 1,
            height: 1,
        });
        let params = self
            .render_loop
            .next_frame(self.input.pointer(), viewport, self.theme.theme());
        self.gpu.render(&params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Exit,
    ToggleTheme,
}

fn key_action(key: &Key) -> Option<KeyAction> {
    match key {
        Key::Named(NamedKey::Escape) => Some(KeyAction::Exit),
        Key::Character(value) if value.eq_ignore_ascii_case("t") => Some(KeyAction::ToggleTheme),
        _ => None,
    }
}

fn system_theme(theme: winit::window::Theme) -> Theme {
    match theme {
        winit::window::Theme::Light => Theme::Light,
        winit::window::Theme::Dark => Theme::Dark,
    }
}

fn update_viewport(
    input: &mut InputTracker,
    window: &Window,
    physical: PhysicalSize<u32>,
) -> Option<ViewportState> {
    let scale_factor = window.scale_factor();
    let logical: LogicalSize<f64> = physical.to_logical(scale_factor);
    input.resized(logical.width, logical.height, scale_factor)
}

/// Opens the window and renders until it closes or `token` is cancelled.
pub(crate) fn run_window(
    config: RendererConfig,
    theme: Box<dyn ThemeSource>,
    token: CancellationToken,
) -> Result<RenderOutcome, RendererError> {
    let event_loop = EventLoopBuilder::new()
        .build()
        .map_err(|err| RendererError::EventLoop(err.to_string()))?;

    let (width, height) = config.window_size;
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(LogicalSize::new(width, height))
        .build(&event_loop)
        .map_err(|err| RendererError::EventLoop(format!("failed to create window: {err}")))?;
    let window = Arc::new(window);

    let mut state = match WindowState::new(window, config, theme) {
        Ok(state) => state,
        Err(err) => return disable(err),
    };

    let mut disabled: Option<String> = None;
    let disabled_slot = &mut disabled;
    state.window.request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window.id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
                    WindowEvent::KeyboardInput { event, .. } => {
                        if event.state != ElementState::Pressed || event.repeat {
                            return;
                        }
                        match key_action(&event.logical_key) {
                            Some(KeyAction::Exit) => elwt.exit(),
                            Some(KeyAction::ToggleTheme) => state.toggle_theme(),
                            None => {}
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let size = state.window.inner_size();
                        state.input.pointer_moved(
                            position.x,
                            position.y,
                            f64::from(size.width),
                            f64::from(size.height),
                        );
                    }
                    WindowEvent::Touch(touch) => state.handle_touch(touch),
                    WindowEvent::Resized(new_size) => state.handle_resize(new_size),
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = state.window.inner_size();
                        state.handle_resize(size);
                    }
                    WindowEvent::ThemeChanged(system) => {
                        state.theme.system_theme_changed(system_theme(system));
                        state.refresh_title();
                    }
                    WindowEvent::RedrawRequested => {
                        if token.is_cancelled() {
                            elwt.exit();
                            return;
                        }
                        match state.render_frame() {
                            Ok(()) => state.scheduler.mark_rendered(Instant::now()),
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                debug!("surface lost or outdated; reconfiguring");
                                state.gpu.reconfigure();
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                debug!("surface timeout; skipping frame");
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                error!("surface out of memory; disabling caustics");
                                *disabled_slot = Some("surface out of memory".into());
                                elwt.exit();
                            }
                            Err(other) => {
                                warn!(error = %other, "surface error; retrying next frame");
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                if token.is_cancelled() {
                    elwt.exit();
                    return;
                }
                let now = Instant::now();
                if state.scheduler.ready_for_frame(now) {
                    state.window.request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = state.scheduler.next_deadline() {
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| RendererError::EventLoop(err.to_string()))?;

    Ok(match disabled {
        Some(reason) => RenderOutcome::Disabled { reason },
        None => RenderOutcome::Completed,
    })
}

/// Environment and shader failures switch the effect off instead of failing.
fn disable(err: RendererError) -> Result<RenderOutcome, RendererError> {
    match err {
        RendererError::ShaderCompile { .. } => error!(error = %err, "disabling caustics"),
        RendererError::Unsupported(_) => debug!(error = %err, "disabling caustics"),
        RendererError::EventLoop(_) => return Err(err),
    }
    Ok(RenderOutcome::Disabled {
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_exits_and_t_toggles() {
        assert_eq!(
            key_action(&Key::Named(NamedKey::Escape)),
            Some(KeyAction::Exit)
        );
        assert_eq!(
            key_action(&Key::Character("t".into())),
            Some(KeyAction::ToggleTheme)
        );
        assert_eq!(
            key_action(&Key::Character("T".into())),
            Some(KeyAction::ToggleTheme)
        );
        assert_eq!(key_action(&Key::Character("x".into())), None);
    }

    #[test]
    fn system_scheme_maps_onto_themes() {
        assert_eq!(system_theme(winit::window::Theme::Dark), Theme::Dark);
        assert_eq!(system_theme(winit::window::Theme::Light), Theme::Light);
    }

    #[test]
    fn unsupported_environment_disables_quietly() {
        let outcome = disable(RendererError::Unsupported("no adapter".into()))
            .expect("unsupported disables");
        assert!(matches!(outcome, RenderOutcome::Disabled { .. }));
    }

    #[test]
    fn event_loop_failures_propagate() {
        assert!(disable(RendererError::EventLoop("gone".into())).is_err());
    }
}
