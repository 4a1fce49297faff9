use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use vulkanalia::bytecode::Bytecode;
use vulkanalia::prelude::v1_0::*;

use super::errors::RenderError;

/// Reads a compiled SPIR-V blob from disk. The contents are treated as
/// opaque bytes; no header parsing happens here.
pub fn load_bytecode<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|source| {
        anyhow!(RenderError::ShaderLoad {
            path: path.display().to_string(),
            source,
        })
    })
}

pub unsafe fn create_shader_module(device: &Device, bytecode: &[u8]) -> Result<vk::ShaderModule> {
    let bytecode = Bytecode::new(bytecode)?;
    let info = vk::ShaderModuleCreateInfo::builder()
        .code_size(bytecode.code_size())
        .code(bytecode.code());

    Ok(device.create_shader_module(&info, None)?)
}

pub unsafe fn destroy_shader_module(device: &Device, module: vk::ShaderModule) {
    device.destroy_shader_module(module, None);
}

#[cfg(test)]
mod tests {
    use super::load_bytecode;

    #[test]
    fn missing_bytecode_reports_the_path() {
        let error = load_bytecode("does/not/exist.spv").unwrap_err();
        assert!(error.to_string().contains("does/not/exist.spv"));
    }
}
