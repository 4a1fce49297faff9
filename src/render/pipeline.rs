use anyhow::{anyhow, Result};
use vulkanalia::prelude::v1_0::*;

use super::config::{FRAGMENT_SHADER_PATH, VERTEX_SHADER_PATH};
use super::errors::RenderError;
use super::shader;

/// Assembles the one fixed-function pipeline this scaffold draws with. The
/// triangle is generated in the vertex shader, so there is no vertex input
/// state to describe. Depth/stencil testing is not wired up yet.
pub unsafe fn create_pipeline(
    device: &Device,
    swapchain_extent: vk::Extent2D,
    render_pass: vk::RenderPass,
) -> Result<(vk::PipelineLayout, vk::Pipeline)> {
    let vert = shader::load_bytecode(VERTEX_SHADER_PATH)?;
    let frag = shader::load_bytecode(FRAGMENT_SHADER_PATH)?;

    let vert_shader_module = shader::create_shader_module(device, &vert)?;
    let frag_shader_module = shader::create_shader_module(device, &frag)?;

    let vert_stage = vk::PipelineShaderStageCreateInfo::builder()
        .stage(vk::ShaderStageFlags::VERTEX)
        .module(vert_shader_module)
        .name(b"main\0");

    let frag_stage = vk::PipelineShaderStageCreateInfo::builder()
        .stage(vk::ShaderStageFlags::FRAGMENT)
        .module(frag_shader_module)
        .name(b"main\0");

    let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::builder();

    let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::builder()
        .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
        .primitive_restart_enable(false);

    let viewport = vk::Viewport::builder()
        .x(0.0)
        .y(0.0)
        .width(swapchain_extent.width as f32)
        .height(swapchain_extent.height as f32)
        .min_depth(0.0)
        .max_depth(1.0);

    let scissor = vk::Rect2D::builder()
        .offset(vk::Offset2D { x: 0, y: 0 })
        .extent(swapchain_extent);

    let viewports = &[viewport];
    let scissors = &[scissor];
    let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
        .viewports(viewports)
        .scissors(scissors);

    let rasterization_state = vk::PipelineRasterizationStateCreateInfo::builder()
        .depth_clamp_enable(false)
        .rasterizer_discard_enable(false)
        .polygon_mode(vk::PolygonMode::FILL)
        .line_width(1.0)
        .cull_mode(vk::CullModeFlags::BACK)
        .front_face(vk::FrontFace::CLOCKWISE)
        .depth_bias_enable(false);

    let multisample_state = vk::PipelineMultisampleStateCreateInfo::builder()
        .sample_shading_enable(false)
        .rasterization_samples(vk::SampleCountFlags::_1);

    // Blending stays off; the fragment shader output passes through.
    let attachment = vk::PipelineColorBlendAttachmentState::builder()
        .color_write_mask(vk::ColorComponentFlags::all())
        .blend_enable(false);

    let attachments = &[attachment];
    let color_blend_state = vk::PipelineColorBlendStateCreateInfo::builder()
        .logic_op_enable(false)
        .logic_op(vk::LogicOp::COPY)
        .attachments(attachments)
        .blend_constants([0.0, 0.0, 0.0, 0.0]);

    let layout_info = vk::PipelineLayoutCreateInfo::builder();
    let pipeline_layout = device.create_pipeline_layout(&layout_info, None)?;

    let stages = &[vert_stage, frag_stage];
    let info = vk::GraphicsPipelineCreateInfo::builder()
        .stages(stages)
        .vertex_input_state(&vertex_input_state)
        .input_assembly_state(&input_assembly_state)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterization_state)
        .multisample_state(&multisample_state)
        .color_blend_state(&color_blend_state)
        .layout(pipeline_layout)
        .render_pass(render_pass)
        .subpass(0)
        .base_pipeline_handle(vk::Pipeline::null())
        .base_pipeline_index(-1);

    let result = device.create_graphics_pipelines(vk::PipelineCache::null(), &[info], None);

    // The modules are only needed during pipeline creation.
    shader::destroy_shader_module(device, vert_shader_module);
    shader::destroy_shader_module(device, frag_shader_module);

    let pipeline = result
        .map_err(|e| anyhow!(RenderError::PipelineCreation(e)))?
        .0[0];

    Ok((pipeline_layout, pipeline))
}

pub unsafe fn destroy_pipeline(
    device: &Device,
    pipeline: vk::Pipeline,
    pipeline_layout: vk::PipelineLayout,
) {
    device.destroy_pipeline(pipeline, None);
    device.destroy_pipeline_layout(pipeline_layout, None);
}
