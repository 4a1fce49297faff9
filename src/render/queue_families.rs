use anyhow::{anyhow, Result};
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::KhrSurfaceExtension;

use super::errors::RenderError;

/// Queue family indices chosen for a (physical device, surface) pair.
///
/// Both indices are guaranteed to exist once this struct is constructed;
/// they may or may not refer to the same family.
#[derive(Copy, Clone, Debug)]
pub struct QueueFamilyIndices {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilyIndices {
    pub unsafe fn get(
        instance: &Instance,
        window_surface: vk::SurfaceKHR,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Self> {
        let properties = instance.get_physical_device_queue_family_properties(physical_device);

        let mut support = Vec::with_capacity(properties.len());
        for (index, family) in properties.iter().enumerate() {
            let supports_graphics = family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
            let supports_present = instance.get_physical_device_surface_support_khr(
                physical_device,
                index as u32,
                window_surface,
            )?;
            support.push((supports_graphics, supports_present));
        }

        Self::select(&support)
    }

    /// Scans families in index order, taking the first one that covers both
    /// graphics and present. Failing that, falls back to the first family
    /// found for each capability alone.
    fn select(support: &[(bool, bool)]) -> Result<Self> {
        let mut graphics = None;
        let mut present = None;

        for (index, &(supports_graphics, supports_present)) in support.iter().enumerate() {
            let index = index as u32;
            if supports_graphics && supports_present {
                return Ok(Self {
                    graphics: index,
                    present: index,
                });
            }
            if supports_graphics && graphics.is_none() {
                graphics = Some(index);
            }
            if supports_present && present.is_none() {
                present = Some(index);
            }
        }

        match (graphics, present) {
            (Some(graphics), Some(present)) => Ok(Self { graphics, present }),
            (None, _) => Err(anyhow!(RenderError::MissingQueueFamily("graphics"))),
            (_, None) => Err(anyhow!(RenderError::MissingQueueFamily("presentation"))),
        }
    }

    pub fn are_separate(&self) -> bool {
        self.graphics != self.present
    }
}

#[cfg(test)]
mod tests {
    use super::QueueFamilyIndices;

    #[test]
    fn prefers_a_family_with_both_capabilities() {
        let indices =
            QueueFamilyIndices::select(&[(true, false), (false, true), (true, true)]).unwrap();
        assert_eq!(indices.graphics, 2);
        assert_eq!(indices.present, 2);
        assert!(!indices.are_separate());
    }

    #[test]
    fn takes_the_first_combined_family() {
        let indices = QueueFamilyIndices::select(&[(true, true), (true, true)]).unwrap();
        assert_eq!(indices.graphics, 0);
        assert_eq!(indices.present, 0);
    }

    #[test]
    fn falls_back_to_separate_families() {
        let indices = QueueFamilyIndices::select(&[(true, false), (false, true)]).unwrap();
        assert_eq!(indices.graphics, 0);
        assert_eq!(indices.present, 1);
        assert!(indices.are_separate());
    }

    #[test]
    fn errors_when_presentation_is_unsupported() {
        assert!(QueueFamilyIndices::select(&[(true, false), (true, false)]).is_err());
    }

    #[test]
    fn errors_when_graphics_is_unsupported() {
        assert!(QueueFamilyIndices::select(&[(false, true), (false, false)]).is_err());
    }

    #[test]
    fn errors_when_no_families_exist() {
        assert!(QueueFamilyIndices::select(&[]).is_err());
    }
}
