use std::io;

use thiserror::Error;
use vulkanalia::prelude::v1_0::*;

/// A physical device failed one of the hard suitability checks.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SuitabilityError(pub &'static str);

/// Fatal errors raised by the rendering core.
///
/// Transient surface conditions (out-of-date, suboptimal) never surface
/// through this type; they trigger a swapchain rebuild instead.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No physical devices with Vulkan support found.")]
    NoDevice,

    #[error("No physical device is suitable for rendering.")]
    UnsuitableDevice,

    #[error("No queue family supports {0}.")]
    MissingQueueFamily(&'static str),

    #[error("The surface does not offer the preferred format and color space.")]
    NoSurfaceFormat,

    #[error("Failed to load shader bytecode from `{path}`: {source}")]
    ShaderLoad {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create the graphics pipeline: {0}.")]
    PipelineCreation(vk::ErrorCode),

    #[error("Failed to acquire a swapchain image: {0}.")]
    SurfaceAcquire(vk::ErrorCode),

    #[error("Failed to present a swapchain image: {0}.")]
    SurfacePresent(vk::ErrorCode),
}
