use anyhow::{anyhow, Result};
use log::*;
use vulkanalia::loader::{LibloadingLoader, LIBRARY};
use vulkanalia::prelude::v1_0::*;
use vulkanalia::vk::KhrSwapchainExtension;
use winit::window::Window;

use super::config::MAX_FRAMES_IN_FLIGHT;
use super::errors::RenderError;
use super::swapchain::Swapchain;
use super::sync_objects::FrameSync;
use super::{
    command_buffers, framebuffer, instance, logical_device, physical_device, pipeline, renderpass,
    validation_layers, window_surface,
};

/// Owns every Vulkan handle in the scaffold and drives the per-frame
/// acquire/submit/present cycle.
///
/// Teardown runs in strict reverse creation order: the swapchain-dependent
/// state first, then sync objects, the command pool, the device, the
/// surface, and finally the instance.
pub struct Renderer {
    // Keeps the dynamically loaded Vulkan library alive.
    #[allow(dead_code)]
    entry: Entry,
    instance: Instance,
    device: Device,

    messenger: Option<vk::DebugUtilsMessengerEXT>,
    surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    command_pool: vk::CommandPool,
    frame_sync: FrameSync,

    // rebuilt with the swapchain
    swapchain: Swapchain,
    render_pass: vk::RenderPass,
    pipeline_layout: vk::PipelineLayout,
    pipeline: vk::Pipeline,
    framebuffers: Vec<vk::Framebuffer>,
    command_buffers: Vec<vk::CommandBuffer>,

    current_frame: usize,
    resized: bool,
}

impl Renderer {
    pub unsafe fn create(window: &Window) -> Result<Self> {
        let loader = LibloadingLoader::new(LIBRARY)?;
        let entry = Entry::new(loader).map_err(|b| anyhow!("{}", b))?;

        let (instance, messenger) = instance::create_instance(window, &entry)?;
        let surface = window_surface::create_window_surface(&instance, window)?;
        let physical_device = physical_device::pick_physical_device(&instance, surface)?;
        let (device, graphics_queue, present_queue) =
            logical_device::create_logical_device(&entry, &instance, surface, physical_device)?;

        let swapchain = Swapchain::new(window, &instance, &device, surface, physical_device)?;
        let render_pass = renderpass::create_render_pass(&device, swapchain.get_format())?;
        let (pipeline_layout, pipeline) =
            pipeline::create_pipeline(&device, swapchain.get_extent(), render_pass)?;
        let framebuffers = framebuffer::create_framebuffers(
            &device,
            swapchain.get_image_views(),
            render_pass,
            swapchain.get_extent(),
        )?;

        let command_pool =
            command_buffers::create_command_pool(&instance, &device, surface, physical_device)?;
        let command_buffers = command_buffers::allocate_command_buffers(
            &device,
            command_pool,
            swapchain.get_length() as u32,
        )?;
        command_buffers::record_command_buffers(
            &device,
            &command_buffers,
            swapchain.get_extent(),
            render_pass,
            pipeline,
            &framebuffers,
        )?;

        let frame_sync = FrameSync::new(&device, swapchain.get_length())?;

        Ok(Self {
            entry,
            instance,
            device,
            messenger,
            surface,
            physical_device,
            graphics_queue,
            present_queue,
            command_pool,
            frame_sync,
            swapchain,
            render_pass,
            pipeline_layout,
            pipeline,
            framebuffers,
            command_buffers,
            current_frame: 0,
            resized: false,
        })
    }

    /// Renders and presents one frame. A frame whose surface turned out to
    /// be out of date is skipped entirely; the swapchain is rebuilt and the
    /// next loop iteration retries.
    pub unsafe fn render(&mut self, window: &Window) -> Result<()> {
        self.frame_sync
            .wait_for_in_flight_fence(&self.device, self.current_frame)?;

        let result = self.device.acquire_next_image_khr(
            self.swapchain.get_chain(),
            u64::MAX,
            self.frame_sync.image_available_semaphore(self.current_frame),
            vk::Fence::null(),
        );

        let (image_index, suboptimal_acquire) = match result {
            Ok((image_index, success)) => (
                image_index as usize,
                success == vk::SuccessCode::SUBOPTIMAL_KHR,
            ),
            Err(vk::ErrorCode::OUT_OF_DATE_KHR) => return self.recreate_swapchain(window),
            Err(e) => return Err(anyhow!(RenderError::SurfaceAcquire(e))),
        };

        self.frame_sync
            .wait_for_image_in_flight(&self.device, image_index)?;
        self.frame_sync
            .assign_image_in_flight(self.current_frame, image_index);

        let wait_semaphores = &[self.frame_sync.image_available_semaphore(self.current_frame)];
        let wait_stages = &[vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = &[self.command_buffers[image_index]];
        let signal_semaphores = &[self.frame_sync.render_finished_semaphore(self.current_frame)];
        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(wait_semaphores)
            .wait_dst_stage_mask(wait_stages)
            .command_buffers(command_buffers)
            .signal_semaphores(signal_semaphores);

        let in_flight_fence = self.frame_sync.in_flight_fence(self.current_frame);
        self.device.reset_fences(&[in_flight_fence])?;
        self.device
            .queue_submit(self.graphics_queue, &[submit_info], in_flight_fence)?;

        let swapchains = &[self.swapchain.get_chain()];
        let image_indices = &[image_index as u32];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(signal_semaphores)
            .swapchains(swapchains)
            .image_indices(image_indices);

        let result = self
            .device
            .queue_present_khr(self.present_queue, &present_info);
        let surface_changed = result == Ok(vk::SuccessCode::SUBOPTIMAL_KHR)
            || result == Err(vk::ErrorCode::OUT_OF_DATE_KHR);

        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;

        if self.resized || surface_changed || suboptimal_acquire {
            self.resized = false;
            self.recreate_swapchain(window)?;
        } else if let Err(e) = result {
            return Err(anyhow!(RenderError::SurfacePresent(e)));
        }

        Ok(())
    }

    pub fn trigger_resize(&mut self) {
        self.resized = true;
    }

    pub unsafe fn device_wait_idle(&self) -> Result<()> {
        self.device.device_wait_idle()?;
        Ok(())
    }

    pub unsafe fn recreate_swapchain(&mut self, window: &Window) -> Result<()> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            // Nothing to rebuild against. The event loop stops rendering
            // while minimized; keep the flag so the rebuild happens once
            // the window regains a nonzero extent.
            self.resized = true;
            return Ok(());
        }

        debug!("Recreating swapchain at {}x{}.", size.width, size.height);

        self.device.device_wait_idle()?;
        self.destroy_swapchain();

        self.swapchain = Swapchain::new(
            window,
            &self.instance,
            &self.device,
            self.surface,
            self.physical_device,
        )?;
        self.render_pass = renderpass::create_render_pass(&self.device, self.swapchain.get_format())?;
        (self.pipeline_layout, self.pipeline) = pipeline::create_pipeline(
            &self.device,
            self.swapchain.get_extent(),
            self.render_pass,
        )?;
        self.framebuffers = framebuffer::create_framebuffers(
            &self.device,
            self.swapchain.get_image_views(),
            self.render_pass,
            self.swapchain.get_extent(),
        )?;
        self.command_buffers = command_buffers::allocate_command_buffers(
            &self.device,
            self.command_pool,
            self.swapchain.get_length() as u32,
        )?;
        command_buffers::record_command_buffers(
            &self.device,
            &self.command_buffers,
            self.swapchain.get_extent(),
            self.render_pass,
            self.pipeline,
            &self.framebuffers,
        )?;

        self.frame_sync
            .reset_images_in_flight(self.swapchain.get_length());

        Ok(())
    }

    /// Tears down everything rebuilt alongside the swapchain, newest first.
    unsafe fn destroy_swapchain(&mut self) {
        command_buffers::free_command_buffers(
            &self.device,
            self.command_pool,
            &self.command_buffers,
        );
        framebuffer::destroy_framebuffers(&self.device, &self.framebuffers);
        pipeline::destroy_pipeline(&self.device, self.pipeline, self.pipeline_layout);
        renderpass::destroy_render_pass(&self.device, self.render_pass);
        self.swapchain.destroy(&self.device);
    }

    /// ## Note:
    /// The device must be idle before this runs.
    pub unsafe fn destroy(&mut self) {
        self.destroy_swapchain();

        self.frame_sync.destroy(&self.device);
        command_buffers::destroy_command_pool(&self.device, self.command_pool);

        logical_device::destroy_logical_device(&self.device);
        window_surface::destroy_window_surface(&self.instance, self.surface);

        if let Some(messenger) = self.messenger.take() {
            validation_layers::destroy_debug_messenger(&self.instance, messenger);
        }
        instance::destroy_instance(&self.instance);
    }
}
