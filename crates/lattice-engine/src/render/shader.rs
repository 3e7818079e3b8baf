//! Shader program loading.
//!
//! The WGSL source is read once at engine construction and validated on the
//! CPU with naga before it reaches the device, so a broken program is reported
//! as an `Err` instead of surfacing later as a device validation error.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};

pub const VERTEX_ENTRY: &str = "vertexMain";
pub const FRAGMENT_ENTRY: &str = "fragmentMain";

/// Path of the bundled instancing shader.
pub fn default_shader_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders/instanced.wgsl")
}

/// Validated WGSL program exposing `vertexMain` and `fragmentMain`.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    label: String,
    source: String,
}

impl ShaderProgram {
    /// Reads and validates the program at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read shader source {}", path.display()))?;
        Self::from_source(path.display().to_string(), source)
    }

    /// Validates `source`; `label` names it in diagnostics.
    pub fn from_source(label: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let source = source.into();

        let module = naga::front::wgsl::parse_str(&source)
            .map_err(|e| anyhow!("{}", e.emit_to_string(&source)))
            .with_context(|| format!("failed to parse shader {label}"))?;

        // Device-specific capability limits are enforced when the pipeline is
        // created; here only the program itself is checked.
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| anyhow!("{}", e.emit_to_string(&source)))
        .with_context(|| format!("shader {label} failed validation"))?;

        require_entry(&module, VERTEX_ENTRY, naga::ShaderStage::Vertex, &label)?;
        require_entry(&module, FRAGMENT_ENTRY, naga::ShaderStage::Fragment, &label)?;

        log::debug!("shader {label} validated ({} entry points)", module.entry_points.len());

        Ok(Self { label, source })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lattice instanced shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&self.source)),
        })
    }
}

fn require_entry(
    module: &naga::Module,
    name: &str,
    stage: naga::ShaderStage,
    label: &str,
) -> Result<()> {
    match module.entry_points.iter().find(|ep| ep.name == name) {
        Some(ep) if ep.stage == stage => Ok(()),
        Some(ep) => bail!(
            "shader {label}: entry point `{name}` is a {:?} stage, expected {stage:?}",
            ep.stage
        ),
        None => bail!("shader {label}: missing entry point `{name}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        @vertex
        fn vertexMain(@builtin(vertex_index) i: u32) -> @builtin(position) vec4<f32> {
            return vec4<f32>(f32(i), 0.0, 0.0, 1.0);
        }

        @fragment
        fn fragmentMain() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0);
        }
    "#;

    #[test]
    fn bundled_shader_validates() {
        let program = ShaderProgram::load(&default_shader_path()).unwrap();
        assert!(program.label().ends_with("instanced.wgsl"));
    }

    #[test]
    fn half_float_unpacking_is_accepted() {
        let src = r#"
            struct Packed { rg: u32, b: u32 };
            @group(0) @binding(0) var<uniform> packed: Packed;

            @vertex
            fn vertexMain(@builtin(vertex_index) i: u32) -> @builtin(position) vec4<f32> {
                return vec4<f32>(f32(i), 0.0, 0.0, 1.0);
            }

            @fragment
            fn fragmentMain() -> @location(0) vec4<f32> {
                let rg = unpack2x16float(packed.rg);
                return vec4<f32>(rg, unpack2x16float(packed.b).x, 1.0);
            }
        "#;
        assert!(ShaderProgram::from_source("half", src).is_ok());
    }

    #[test]
    fn minimal_two_entry_program_is_accepted() {
        assert!(ShaderProgram::from_source("minimal", MINIMAL).is_ok());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ShaderProgram::load(Path::new("does/not/exist.wgsl")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read shader source"));
    }

    #[test]
    fn syntax_error_is_an_error() {
        let err = ShaderProgram::from_source("broken", "fn vertexMain( {").unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse shader broken"));
    }

    #[test]
    fn missing_fragment_entry_is_an_error() {
        let src = MINIMAL.replace("fragmentMain", "fragment_main");
        let err = ShaderProgram::from_source("no-frag", src).unwrap_err();
        assert!(format!("{err:#}").contains("missing entry point `fragmentMain`"));
    }

    #[test]
    fn entry_with_wrong_stage_is_an_error() {
        let src = r#"
            @fragment
            fn vertexMain() -> @location(0) vec4<f32> { return vec4<f32>(0.0); }
            @fragment
            fn fragmentMain() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }
        "#;
        assert!(ShaderProgram::from_source("swapped", src).is_err());
    }
}
