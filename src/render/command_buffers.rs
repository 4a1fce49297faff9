use anyhow::Result;
use vulkanalia::prelude::v1_0::*;

use super::queue_families::QueueFamilyIndices;

/// The vertex shader synthesizes the triangle from `gl_VertexIndex`.
const TRIANGLE_VERTEX_COUNT: u32 = 3;

pub unsafe fn create_command_pool(
    instance: &Instance,
    device: &Device,
    window_surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
) -> Result<vk::CommandPool> {
    let indices = QueueFamilyIndices::get(instance, window_surface, physical_device)?;

    let info = vk::CommandPoolCreateInfo::builder()
        .flags(vk::CommandPoolCreateFlags::empty())
        .queue_family_index(indices.graphics);

    let command_pool = device.create_command_pool(&info, None)?;

    Ok(command_pool)
}

/// One primary command buffer per swapchain image.
pub unsafe fn allocate_command_buffers(
    device: &Device,
    command_pool: vk::CommandPool,
    number_of_buffers: u32,
) -> Result<Vec<vk::CommandBuffer>> {
    let allocate_info = vk::CommandBufferAllocateInfo::builder()
        .command_pool(command_pool)
        .level(vk::CommandBufferLevel::PRIMARY)
        .command_buffer_count(number_of_buffers);

    let command_buffers = device.allocate_command_buffers(&allocate_info)?;

    Ok(command_buffers)
}

pub unsafe fn record_command_buffers(
    device: &Device,
    command_buffers: &[vk::CommandBuffer],
    swapchain_extent: vk::Extent2D,
    render_pass: vk::RenderPass,
    pipeline: vk::Pipeline,
    framebuffers: &[vk::Framebuffer],
) -> Result<()> {
    for (i, command_buffer) in command_buffers.iter().enumerate() {
        let info = vk::CommandBufferBeginInfo::builder();

        device.begin_command_buffer(*command_buffer, &info)?;

        let render_area = vk::Rect2D::builder()
            .offset(vk::Offset2D::default())
            .extent(swapchain_extent);

        let color_clear_value = vk::ClearValue {
            color: vk::ClearColorValue {
                float32: [0.0, 0.0, 0.0, 1.0],
            },
        };

        let clear_values = &[color_clear_value];
        let info = vk::RenderPassBeginInfo::builder()
            .render_pass(render_pass)
            .framebuffer(framebuffers[i])
            .render_area(render_area)
            .clear_values(clear_values);

        device.cmd_begin_render_pass(*command_buffer, &info, vk::SubpassContents::INLINE);
        device.cmd_bind_pipeline(*command_buffer, vk::PipelineBindPoint::GRAPHICS, pipeline);
        device.cmd_draw(*command_buffer, TRIANGLE_VERTEX_COUNT, 1, 0, 0);
        device.cmd_end_render_pass(*command_buffer);

        device.end_command_buffer(*command_buffer)?;
    }

    Ok(())
}

pub unsafe fn free_command_buffers(
    device: &Device,
    command_pool: vk::CommandPool,
    command_buffers: &[vk::CommandBuffer],
) {
    device.free_command_buffers(command_pool, command_buffers);
}

pub unsafe fn destroy_command_pool(device: &Device, command_pool: vk::CommandPool) {
    device.destroy_command_pool(command_pool, None);
}
