/**
 *
 * Vulkan rendering core subsystem
 *
 */

mod command_buffers;
mod config;
mod errors;
mod framebuffer;
mod instance;
mod logical_device;
mod physical_device;
mod pipeline;
mod queue_families;
mod renderer;
mod renderpass;
mod shader;
mod swapchain;
mod sync_objects;
mod validation_layers;
mod window_surface;

pub use self::renderer::Renderer;
