use anyhow::{anyhow, Result};
use log::*;
use std::collections::HashSet;
use vulkanalia::prelude::v1_0::*;

use super::config::DEVICE_EXTENSIONS;
use super::errors::{RenderError, SuitabilityError};
use super::queue_families::QueueFamilyIndices;
use super::swapchain::SwapchainSupport;

/// Devices that pass the hard checks are ranked by image dimension; a
/// discrete GPU outranks any integrated one regardless of that metric.
const DISCRETE_GPU_BONUS: u32 = 10_000;

pub unsafe fn pick_physical_device(
    instance: &Instance,
    window_surface: vk::SurfaceKHR,
) -> Result<vk::PhysicalDevice> {
    let physical_devices = instance.enumerate_physical_devices()?;
    if physical_devices.is_empty() {
        return Err(anyhow!(RenderError::NoDevice));
    }

    let mut best: Option<(vk::PhysicalDevice, u32)> = None;
    for physical_device in physical_devices {
        let properties = instance.get_physical_device_properties(physical_device);

        if let Err(error) = check_physical_device(instance, window_surface, physical_device) {
            warn!(
                "Skipping physical device (`{}`): {}",
                properties.device_name, error
            );
            continue;
        }

        let score = rate_physical_device(&properties);
        debug!(
            "Physical device (`{}`) scored {}.",
            properties.device_name, score
        );

        // Ties go to the earliest device in enumeration order.
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((physical_device, score));
        }
    }

    match best {
        Some((physical_device, score)) if score > 0 => {
            let properties = instance.get_physical_device_properties(physical_device);
            info!("Selected physical device (`{}`).", properties.device_name);
            Ok(physical_device)
        }
        _ => Err(anyhow!(RenderError::UnsuitableDevice)),
    }
}

fn rate_physical_device(properties: &vk::PhysicalDeviceProperties) -> u32 {
    let mut score = properties.limits.max_image_dimension_2d;
    if properties.device_type == vk::PhysicalDeviceType::DISCRETE_GPU {
        score += DISCRETE_GPU_BONUS;
    }
    score
}

/// Check a physical device to see if it supports everything we need.
unsafe fn check_physical_device(
    instance: &Instance,
    window_surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
) -> Result<()> {
    QueueFamilyIndices::get(instance, window_surface, physical_device)?;
    check_physical_device_extensions(instance, physical_device)?;

    let support = SwapchainSupport::get(instance, window_surface, physical_device)?;
    if support.formats.is_empty() || support.present_modes.is_empty() {
        return Err(anyhow!(SuitabilityError("Insufficient swapchain support.")));
    }

    Ok(())
}

unsafe fn check_physical_device_extensions(
    instance: &Instance,
    physical_device: vk::PhysicalDevice,
) -> Result<()> {
    let extensions = instance
        .enumerate_device_extension_properties(physical_device, None)?
        .iter()
        .map(|e| e.extension_name)
        .collect::<HashSet<_>>();

    if DEVICE_EXTENSIONS.iter().all(|e| extensions.contains(e)) {
        Ok(())
    } else {
        Err(anyhow!(SuitabilityError(
            "Missing required device extensions."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties(
        device_type: vk::PhysicalDeviceType,
        max_image_dimension_2d: u32,
    ) -> vk::PhysicalDeviceProperties {
        vk::PhysicalDeviceProperties {
            device_type,
            limits: vk::PhysicalDeviceLimits {
                max_image_dimension_2d,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn discrete_bonus_dominates_image_dimension() {
        let integrated = properties(vk::PhysicalDeviceType::INTEGRATED_GPU, 16384);
        let discrete = properties(vk::PhysicalDeviceType::DISCRETE_GPU, 4096);
        assert!(rate_physical_device(&discrete) > rate_physical_device(&integrated));
    }

    #[test]
    fn image_dimension_breaks_ties_within_a_type() {
        let small = properties(vk::PhysicalDeviceType::DISCRETE_GPU, 4096);
        let large = properties(vk::PhysicalDeviceType::DISCRETE_GPU, 16384);
        assert!(rate_physical_device(&large) > rate_physical_device(&small));
    }

    #[test]
    fn score_is_positive_for_any_usable_device() {
        let cpu = properties(vk::PhysicalDeviceType::CPU, 1);
        assert!(rate_physical_device(&cpu) > 0);
    }
}
