use anyhow::Result;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;

use crate::error::window_error;
use crate::hot_reload::{ControllerState, ReloadController};
use crate::window::WinitWindow;
use crate::ShellConfig;

/// Open the window and run the update loop until the window is closed.
///
/// Every redraw is one controller tick; presenting is vsync bound, which
/// paces the loop. Window creation failures are returned to the caller.
pub fn run_app(config: ShellConfig) -> Result<()> {
    log::info!("[app::run_app] Watching {}", config.config_root.display());

    let event_loop = EventLoop::new().map_err(window_error)?;
    let mut controller = ReloadController::with_config(config);

    let window = WinitWindow::new(&event_loop, controller.live())?;
    let handle = window.handle();
    controller.attach_window(Box::new(window));
    let shutdown = controller.shutdown_signal();

    handle.request_redraw();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == handle.id() => match event {
            WindowEvent::CloseRequested => {
                log::info!("[app::run_app] Close requested");
                shutdown.cancel();
            }
            WindowEvent::RedrawRequested => {
                if controller.tick() == ControllerState::Finished {
                    elwt.exit();
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            if shutdown.is_cancelled() {
                controller.tick();
                elwt.exit();
            } else {
                handle.request_redraw();
            }
        }
        _ => {}
    })?;

    log::info!("[app::run_app] Event loop exited");
    Ok(())
}
