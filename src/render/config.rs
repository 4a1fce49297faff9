use vulkanalia::prelude::v1_0::*;
use vulkanalia::Version;

use super::swapchain::{FramebufferingPriority, PresentPriority};

pub const VALIDATION_ENABLED: bool = cfg!(debug_assertions);
pub const VALIDATION_LAYER: vk::ExtensionName =
    vk::ExtensionName::from_bytes(b"VK_LAYER_KHRONOS_validation");
pub const PORTABILITY_MACOS_VERSION: Version = Version::new(1, 3, 216);
pub const DEVICE_EXTENSIONS: &[vk::ExtensionName] = &[vk::KHR_SWAPCHAIN_EXTENSION.name];
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// What the swapchain negotiation should optimize for when the surface
/// offers a choice.
pub const PRESENT_PRIORITY: PresentPriority = PresentPriority::MinimalLatency;
pub const FRAMEBUFFERING_PRIORITY: FramebufferingPriority = FramebufferingPriority::Triple;

// Compiled with `shaders/compile.sh` (requires glslc).
pub const VERTEX_SHADER_PATH: &str = "shaders/triangle.vert.spv";
pub const FRAGMENT_SHADER_PATH: &str = "shaders/triangle.frag.spv";
