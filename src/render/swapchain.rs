use anyhow::{anyhow, Result};
use log::*;
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::KhrSurfaceExtension;
use vulkanalia::vk::KhrSwapchainExtension;
use winit::window::Window;

use super::config::{FRAMEBUFFERING_PRIORITY, PRESENT_PRIORITY};
use super::errors::RenderError;
use super::queue_families::QueueFamilyIndices;

const PREFERRED_FORMAT: vk::Format = vk::Format::B8G8R8A8_SRGB;
const PREFERRED_COLOR_SPACE: vk::ColorSpaceKHR = vk::ColorSpaceKHR::SRGB_NONLINEAR;

/// What the presentation engine should optimize for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PresentPriority {
    MinimalLatency,
    MinimalStuttering,
    MinimalPower,
}

impl PresentPriority {
    fn ideal_present_mode(self) -> vk::PresentModeKHR {
        match self {
            Self::MinimalLatency => vk::PresentModeKHR::MAILBOX,
            Self::MinimalStuttering => vk::PresentModeKHR::FIFO_RELAXED,
            Self::MinimalPower => vk::PresentModeKHR::FIFO,
        }
    }
}

/// How many images the swapchain should aim to cycle through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FramebufferingPriority {
    Single,
    Double,
    Triple,
}

impl FramebufferingPriority {
    fn ideal_image_count(self) -> u32 {
        match self {
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

pub struct Swapchain {
    chain: vk::SwapchainKHR,
    format: vk::Format,
    extent: vk::Extent2D,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
}

impl Swapchain {
    pub unsafe fn new(
        window: &Window,
        instance: &Instance,
        device: &Device,
        window_surface: vk::SurfaceKHR,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Self> {
        let (chain, images, format, extent) =
            create_swapchain(window, instance, device, window_surface, physical_device)?;
        let image_views = create_swapchain_image_views(device, &images, format)?;
        Ok(Self {
            chain,
            format,
            extent,
            images,
            image_views,
        })
    }

    pub fn get_chain(&self) -> vk::SwapchainKHR {
        self.chain
    }
    pub fn get_format(&self) -> vk::Format {
        self.format
    }
    pub fn get_extent(&self) -> vk::Extent2D {
        self.extent
    }
    pub fn get_image_views(&self) -> &[vk::ImageView] {
        &self.image_views
    }
    pub fn get_length(&self) -> usize {
        self.images.len()
    }

    /// ## Note:
    /// Must run before the surface and logical device are destroyed.
    pub unsafe fn destroy(&mut self, device: &Device) {
        self.image_views
            .iter()
            .for_each(|v| device.destroy_image_view(*v, None));
        device.destroy_swapchain_khr(self.chain, None);
    }
}

#[derive(Clone, Debug)]
pub struct SwapchainSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupport {
    pub unsafe fn get(
        instance: &Instance,
        window_surface: vk::SurfaceKHR,
        physical_device: vk::PhysicalDevice,
    ) -> Result<Self> {
        Ok(Self {
            capabilities: instance
                .get_physical_device_surface_capabilities_khr(physical_device, window_surface)?,
            formats: instance
                .get_physical_device_surface_formats_khr(physical_device, window_surface)?,
            present_modes: instance
                .get_physical_device_surface_present_modes_khr(physical_device, window_surface)?,
        })
    }
}

/// Requires an exact match on the preferred (format, color space) pair.
/// Negotiating a fallback format is deliberately not done here.
fn get_swapchain_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Result<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .cloned()
        .find(|f| f.format == PREFERRED_FORMAT && f.color_space == PREFERRED_COLOR_SPACE)
        .ok_or_else(|| anyhow!(RenderError::NoSurfaceFormat))
}

fn get_swapchain_present_mode(
    present_modes: &[vk::PresentModeKHR],
    priority: PresentPriority,
) -> vk::PresentModeKHR {
    let ideal = priority.ideal_present_mode();
    if present_modes.contains(&ideal) {
        ideal
    } else {
        // FIFO is the one mode every surface must support.
        warn!(
            "Present mode {:?} not supported by the surface, falling back to FIFO.",
            ideal
        );
        vk::PresentModeKHR::FIFO
    }
}

/// A current extent of u32::MAX means the surface leaves the size up to the
/// swapchain; anything else must be used verbatim.
fn get_swapchain_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    window_size: (u32, u32),
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        let (width, height) = window_size;
        let clamp = |min: u32, max: u32, v: u32| min.max(max.min(v));
        vk::Extent2D::builder()
            .width(clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
                width,
            ))
            .height(clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
                height,
            ))
            .build()
    }
}

/// A max image count of zero means the surface places no upper bound.
fn get_swapchain_image_count(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    priority: FramebufferingPriority,
) -> u32 {
    let ideal = priority.ideal_image_count().max(capabilities.min_image_count);
    if capabilities.max_image_count == 0 {
        ideal
    } else {
        ideal.min(capabilities.max_image_count)
    }
}

pub unsafe fn create_swapchain(
    window: &Window,
    instance: &Instance,
    device: &Device,
    window_surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
) -> Result<(vk::SwapchainKHR, Vec<vk::Image>, vk::Format, vk::Extent2D)> {
    let indices = QueueFamilyIndices::get(instance, window_surface, physical_device)?;
    let support = SwapchainSupport::get(instance, window_surface, physical_device)?;

    let surface_format = get_swapchain_surface_format(&support.formats)?;
    let present_mode = get_swapchain_present_mode(&support.present_modes, PRESENT_PRIORITY);
    let size = window.inner_size();
    let extent = get_swapchain_extent(&support.capabilities, (size.width, size.height));
    let image_count = get_swapchain_image_count(&support.capabilities, FRAMEBUFFERING_PRIORITY);

    let mut queue_family_indices = vec![];
    let image_sharing_mode = if indices.are_separate() {
        queue_family_indices.push(indices.graphics);
        queue_family_indices.push(indices.present);
        vk::SharingMode::CONCURRENT
    } else {
        vk::SharingMode::EXCLUSIVE
    };

    let info = vk::SwapchainCreateInfoKHR::builder()
        .surface(window_surface)
        .min_image_count(image_count)
        .image_format(surface_format.format)
        .image_color_space(surface_format.color_space)
        .image_extent(extent)
        .image_array_layers(1)
        .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
        .image_sharing_mode(image_sharing_mode)
        .queue_family_indices(&queue_family_indices)
        .pre_transform(support.capabilities.current_transform)
        .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
        .present_mode(present_mode)
        .clipped(true)
        .old_swapchain(vk::SwapchainKHR::null());

    let swapchain = device.create_swapchain_khr(&info, None)?;
    let swapchain_images = device.get_swapchain_images_khr(swapchain)?;

    info!(
        "Created swapchain with {} images at {}x{} in {:?} mode.",
        swapchain_images.len(),
        extent.width,
        extent.height,
        present_mode
    );

    Ok((swapchain, swapchain_images, surface_format.format, extent))
}

unsafe fn create_swapchain_image_views(
    device: &Device,
    swapchain_images: &[vk::Image],
    swapchain_format: vk::Format,
) -> Result<Vec<vk::ImageView>> {
    let swapchain_image_views = swapchain_images
        .iter()
        .map(|i| create_image_view(device, *i, swapchain_format))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(swapchain_image_views)
}

unsafe fn create_image_view(
    device: &Device,
    image: vk::Image,
    format: vk::Format,
) -> Result<vk::ImageView> {
    let components = vk::ComponentMapping::builder()
        .r(vk::ComponentSwizzle::IDENTITY)
        .g(vk::ComponentSwizzle::IDENTITY)
        .b(vk::ComponentSwizzle::IDENTITY)
        .a(vk::ComponentSwizzle::IDENTITY);

    let subresource_range = vk::ImageSubresourceRange::builder()
        .aspect_mask(vk::ImageAspectFlags::COLOR)
        .base_mip_level(0)
        .level_count(1)
        .base_array_layer(0)
        .layer_count(1);

    let info = vk::ImageViewCreateInfo::builder()
        .image(image)
        .view_type(vk::ImageViewType::_2D)
        .format(format)
        .components(components)
        .subresource_range(subresource_range);

    Ok(device.create_image_view(&info, None)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_capabilities(min_image_count: u32, max_image_count: u32) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count,
            max_image_count,
            ..Default::default()
        }
    }

    fn undefined_extent_capabilities() -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: vk::Extent2D {
                width: 1,
                height: 1,
            },
            max_image_extent: vk::Extent2D {
                width: 4096,
                height: 4096,
            },
            ..Default::default()
        }
    }

    #[test]
    fn surface_format_requires_the_preferred_pair() {
        let formats = [
            vk::SurfaceFormatKHR {
                format: vk::Format::R8G8B8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
            vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
        ];

        let selected = get_swapchain_surface_format(&formats).unwrap();
        assert_eq!(selected.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!(selected.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);

        assert!(get_swapchain_surface_format(&formats[..1]).is_err());
        assert!(get_swapchain_surface_format(&[]).is_err());
    }

    #[test]
    fn present_mode_matches_the_requested_priority() {
        let modes = [
            vk::PresentModeKHR::FIFO,
            vk::PresentModeKHR::FIFO_RELAXED,
            vk::PresentModeKHR::MAILBOX,
        ];
        assert_eq!(
            get_swapchain_present_mode(&modes, PresentPriority::MinimalLatency),
            vk::PresentModeKHR::MAILBOX
        );
        assert_eq!(
            get_swapchain_present_mode(&modes, PresentPriority::MinimalStuttering),
            vk::PresentModeKHR::FIFO_RELAXED
        );
        assert_eq!(
            get_swapchain_present_mode(&modes, PresentPriority::MinimalPower),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn present_mode_falls_back_to_fifo() {
        let modes = [vk::PresentModeKHR::FIFO];
        assert_eq!(
            get_swapchain_present_mode(&modes, PresentPriority::MinimalLatency),
            vk::PresentModeKHR::FIFO
        );
        assert_eq!(
            get_swapchain_present_mode(&modes, PresentPriority::MinimalStuttering),
            vk::PresentModeKHR::FIFO
        );
    }

    #[test]
    fn extent_uses_the_window_size_when_the_surface_reports_none() {
        let extent = get_swapchain_extent(&undefined_extent_capabilities(), (800, 600));
        assert_eq!(extent.width, 800);
        assert_eq!(extent.height, 600);
    }

    #[test]
    fn extent_clamps_the_window_size() {
        let mut capabilities = undefined_extent_capabilities();
        capabilities.max_image_extent = vk::Extent2D {
            width: 640,
            height: 480,
        };

        let extent = get_swapchain_extent(&capabilities, (800, 600));
        assert_eq!(extent.width, 640);
        assert_eq!(extent.height, 480);

        let extent = get_swapchain_extent(&capabilities, (0, 0));
        assert_eq!(extent.width, 1);
        assert_eq!(extent.height, 1);
    }

    #[test]
    fn extent_uses_the_reported_extent_verbatim() {
        let capabilities = vk::SurfaceCapabilitiesKHR {
            current_extent: vk::Extent2D {
                width: 1024,
                height: 768,
            },
            ..Default::default()
        };

        let extent = get_swapchain_extent(&capabilities, (1, 1));
        assert_eq!(extent.width, 1024);
        assert_eq!(extent.height, 768);
    }

    #[test]
    fn extent_selection_is_idempotent() {
        let capabilities = undefined_extent_capabilities();
        let first = get_swapchain_extent(&capabilities, (800, 600));
        let second = get_swapchain_extent(&capabilities, (800, 600));
        assert_eq!(first.width, second.width);
        assert_eq!(first.height, second.height);
    }

    #[test]
    fn image_count_is_unclamped_above_when_the_surface_is_unbounded() {
        let capabilities = count_capabilities(2, 0);
        assert_eq!(
            get_swapchain_image_count(&capabilities, FramebufferingPriority::Triple),
            3
        );
        assert_eq!(
            get_swapchain_image_count(&capabilities, FramebufferingPriority::Single),
            2
        );
    }

    #[test]
    fn image_count_stays_within_surface_bounds() {
        assert_eq!(
            get_swapchain_image_count(&count_capabilities(2, 2), FramebufferingPriority::Triple),
            2
        );
        assert_eq!(
            get_swapchain_image_count(&count_capabilities(2, 4), FramebufferingPriority::Triple),
            3
        );
        assert_eq!(
            get_swapchain_image_count(&count_capabilities(2, 4), FramebufferingPriority::Single),
            2
        );

        for min in 1..5u32 {
            for max in min..6u32 {
                let count = get_swapchain_image_count(
                    &count_capabilities(min, max),
                    FramebufferingPriority::Double,
                );
                assert!(min <= count && count <= max);
            }
        }
    }
}
