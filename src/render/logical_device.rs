use anyhow::Result;
use log::*;
use std::collections::HashSet;
use vulkanalia::prelude::v1_0::*;

use super::config::{
    DEVICE_EXTENSIONS, PORTABILITY_MACOS_VERSION, VALIDATION_ENABLED, VALIDATION_LAYER,
};
use super::queue_families::QueueFamilyIndices;

pub unsafe fn create_logical_device(
    entry: &Entry,
    instance: &Instance,
    window_surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
) -> Result<(Device, vk::Queue, vk::Queue)> {
    let indices = QueueFamilyIndices::get(instance, window_surface, physical_device)?;

    // One queue per distinct family; graphics and present may coincide.
    let mut unique_indices = HashSet::new();
    unique_indices.insert(indices.graphics);
    unique_indices.insert(indices.present);

    let queue_priorities = &[1.0];
    let queue_infos = unique_indices
        .iter()
        .map(|i| {
            vk::DeviceQueueCreateInfo::builder()
                .queue_family_index(*i)
                .queue_priorities(queue_priorities)
                .build()
        })
        .collect::<Vec<_>>();

    let layers = if VALIDATION_ENABLED {
        vec![VALIDATION_LAYER.as_ptr()]
    } else {
        Vec::new()
    };

    let mut extensions = DEVICE_EXTENSIONS
        .iter()
        .map(|n| n.as_ptr())
        .collect::<Vec<_>>();

    // Required by the Vulkan SDK on macOS since 1.3.216.
    if cfg!(target_os = "macos") && entry.version()? >= PORTABILITY_MACOS_VERSION {
        extensions.push(vk::KHR_PORTABILITY_SUBSET_EXTENSION.name.as_ptr());
    }

    let features = vk::PhysicalDeviceFeatures::builder();

    let info = vk::DeviceCreateInfo::builder()
        .queue_create_infos(&queue_infos)
        .enabled_layer_names(&layers)
        .enabled_extension_names(&extensions)
        .enabled_features(&features);

    let device = instance.create_device(physical_device, &info, None)?;

    let graphics_queue = device.get_device_queue(indices.graphics, 0);
    let present_queue = device.get_device_queue(indices.present, 0);

    if indices.are_separate() {
        debug!(
            "Graphics (family {}) and presentation (family {}) run on separate queues.",
            indices.graphics, indices.present
        );
    }

    Ok((device, graphics_queue, present_queue))
}

pub unsafe fn destroy_logical_device(device: &Device) {
    device.destroy_device(None);
}
