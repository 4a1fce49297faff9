#![allow(clippy::too_many_arguments, clippy::unnecessary_wraps)]

mod render;

use std::process;

use anyhow::Result;
use log::error;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::render::Renderer;

fn main() -> Result<()> {
    pretty_env_logger::init();

    // Window

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Lumen Engine")
        .with_inner_size(LogicalSize::new(1024, 768))
        .build(&event_loop)?;

    // Renderer

    let mut renderer = unsafe { Renderer::create(&window)? };
    let mut destroying: bool = false;
    let mut minimized: bool = false;
    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            // Render a frame if the renderer is not being destroyed and the
            // window has a nonzero extent.
            Event::MainEventsCleared if !destroying && !minimized => {
                if let Err(e) = unsafe { renderer.render(&window) } {
                    error!("Fatal rendering error: {:?}", e);
                    process::exit(1);
                }
            }
            Event::WindowEvent { event: WindowEvent::Resized(size), .. } => {
                if size.width == 0 || size.height == 0 {
                    minimized = true;
                } else {
                    minimized = false;
                    renderer.trigger_resize();
                }
            }
            Event::WindowEvent { event: WindowEvent::CloseRequested, .. } => {
                destroying = true;
                *control_flow = ControlFlow::Exit;
                if let Err(e) = unsafe { renderer.device_wait_idle() } {
                    error!("Failed to wait for device idle on shutdown: {:?}", e);
                }
                unsafe { renderer.destroy() };
            }
            _ => {}
        }
    });
}
