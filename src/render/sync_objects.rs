use anyhow::{anyhow, Result};
use vulkanalia::prelude::v1_0::*;

use super::config::MAX_FRAMES_IN_FLIGHT;

/// Synchronization primitives for the acquire/submit/present cycle.
///
/// Semaphores and fences come in one set per frame slot; the fences start
/// signaled so the first wait on each slot passes immediately. The
/// `images_in_flight` entries mirror the swapchain images and point at the
/// frame-slot fence that last submitted work against each image.
pub struct FrameSync {
    image_available_semaphores: Vec<vk::Semaphore>,
    render_finished_semaphores: Vec<vk::Semaphore>,
    in_flight_fences: Vec<vk::Fence>,
    images_in_flight: Vec<vk::Fence>,
}

impl FrameSync {
    pub fn new(device: &Device, swapchain_image_count: usize) -> Result<Self> {
        let semaphore_info = vk::SemaphoreCreateInfo::builder();
        let fence_info = vk::FenceCreateInfo::builder().flags(vk::FenceCreateFlags::SIGNALED);

        let image_available_semaphores = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| unsafe { device.create_semaphore(&semaphore_info, None) })
            .collect::<Result<Vec<_>, _>>()?;

        let render_finished_semaphores = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| unsafe { device.create_semaphore(&semaphore_info, None) })
            .collect::<Result<Vec<_>, _>>()?;

        let in_flight_fences = (0..MAX_FRAMES_IN_FLIGHT)
            .map(|_| unsafe { device.create_fence(&fence_info, None) })
            .collect::<Result<Vec<_>, _>>()?;

        let images_in_flight = vec![vk::Fence::null(); swapchain_image_count];

        Ok(Self {
            image_available_semaphores,
            render_finished_semaphores,
            in_flight_fences,
            images_in_flight,
        })
    }

    /// Blocks until the slot's previous submission has retired, so its
    /// semaphores and command buffer are safe to reuse.
    pub fn wait_for_in_flight_fence(&self, device: &Device, frame_index: usize) -> Result<()> {
        match self.in_flight_fences.get(frame_index) {
            Some(in_flight_fence) => unsafe {
                device.wait_for_fences(&[*in_flight_fence], true, u64::MAX)?;
            },
            None => {
                return Err(anyhow!(
                    "Frame index {} > number of in flight fences {}",
                    frame_index,
                    self.in_flight_fences.len()
                ));
            }
        }
        Ok(())
    }

    /// Blocks if an earlier frame still has GPU work queued against the
    /// acquired image.
    pub fn wait_for_image_in_flight(&self, device: &Device, image_index: usize) -> Result<()> {
        match self.images_in_flight.get(image_index) {
            Some(image_in_flight) => {
                if !image_in_flight.is_null() {
                    unsafe {
                        device.wait_for_fences(&[*image_in_flight], true, u64::MAX)?;
                    }
                }
            }
            None => {
                return Err(anyhow!(
                    "Image index {} > number of images in flight {}",
                    image_index,
                    self.images_in_flight.len()
                ));
            }
        }
        Ok(())
    }

    /// Marks the image as owned by the given frame slot's fence.
    pub fn assign_image_in_flight(&mut self, frame_index: usize, image_index: usize) {
        if frame_index >= self.in_flight_fences.len()
            || image_index >= self.images_in_flight.len()
        {
            return;
        }
        self.images_in_flight[image_index] = self.in_flight_fences[frame_index];
    }

    pub fn image_available_semaphore(&self, frame_index: usize) -> vk::Semaphore {
        self.image_available_semaphores[frame_index]
    }

    pub fn render_finished_semaphore(&self, frame_index: usize) -> vk::Semaphore {
        self.render_finished_semaphores[frame_index]
    }

    pub fn in_flight_fence(&self, frame_index: usize) -> vk::Fence {
        self.in_flight_fences[frame_index]
    }

    /// After a swapchain rebuild the old per-image fence references are
    /// stale; the image count may also have changed.
    pub fn reset_images_in_flight(&mut self, swapchain_image_count: usize) {
        self.images_in_flight.clear();
        self.images_in_flight
            .resize(swapchain_image_count, vk::Fence::null());
    }

    pub fn destroy(&self, device: &Device) {
        unsafe {
            destroy_semaphores(device, &self.render_finished_semaphores);
            destroy_semaphores(device, &self.image_available_semaphores);
            destroy_fences(device, &self.in_flight_fences);
        }
    }
}

pub unsafe fn destroy_semaphores(device: &Device, semaphores: &[vk::Semaphore]) {
    semaphores
        .iter()
        .for_each(|s| device.destroy_semaphore(*s, None));
}

pub unsafe fn destroy_fences(device: &Device, fences: &[vk::Fence]) {
    fences.iter().for_each(|f| device.destroy_fence(*f, None));
}
