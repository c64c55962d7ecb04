use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, Module, Type, TypeInner};

use crate::error::ShaderError;

use super::uniforms::{UniformBlockLayout, UniformMember};
use super::ShaderStage;

/// A parsed and validated WGSL module with an entry point for one stage.
#[derive(Debug)]
pub struct CompiledShader {
    stage: ShaderStage,
    source: String,
    module: Module,
    entry_index: usize,
    entry_point: String,
}

impl CompiledShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    fn entry(&self) -> &naga::EntryPoint {
        &self.module.entry_points[self.entry_index]
    }
}

/// Parses and validates `source`, selecting its first entry point for `stage`.
pub fn compile(source: &str, stage: ShaderStage) -> Result<CompiledShader, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
        stage,
        log: e.emit_to_string(source),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            log: e.emit_to_string(source),
        })?;

    let naga_stage = stage.to_naga();
    let entry_index = module
        .entry_points
        .iter()
        .position(|ep| ep.stage == naga_stage)
        .ok_or_else(|| ShaderError::Compile {
            stage,
            log: format!("no @{stage} entry point in module"),
        })?;
    let entry_point = module.entry_points[entry_index].name.clone();

    log::trace!("compiled {stage} shader, entry point `{entry_point}`");

    Ok(CompiledShader {
        stage,
        source: source.to_owned(),
        module,
        entry_index,
        entry_point,
    })
}

/// A vertex + fragment pair whose interfaces agree.
#[derive(Debug)]
pub struct LinkedProgram {
    pub vertex: CompiledShader,
    pub fragment: CompiledShader,
    pub uniforms: Vec<UniformBlockLayout>,
}

/// Checks that `vertex` and `fragment` form a usable program.
///
/// - every fragment input location is written by the vertex stage with the
///   same type
/// - uniform blocks live in bind group 0
/// - a uniform binding declared by both stages has one size
pub fn link(vertex: CompiledShader, fragment: CompiledShader) -> Result<LinkedProgram, ShaderError> {
    let mut problems = Vec::new();

    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        problems.push(format!(
            "expected a vertex and a fragment shader, got {} and {}",
            vertex.stage, fragment.stage
        ));
        return Err(ShaderError::Link { log: problems.join("\n") });
    }

    let outputs = interface_outputs(&vertex);
    for input in interface_inputs(&fragment) {
        match outputs.iter().find(|o| o.location == input.location) {
            None => problems.push(format!(
                "fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            )),
            Some(out) if out.ty != input.ty => problems.push(format!(
                "location {}: vertex output `{}` and fragment input `{}` have different types",
                input.location, out.name, input.name
            )),
            Some(_) => {}
        }
    }

    let mut uniforms = uniform_blocks(&vertex.module);
    for block in uniform_blocks(&fragment.module) {
        match uniforms
            .iter()
            .find(|b| b.group == block.group && b.binding == block.binding)
        {
            Some(existing) if existing.size != block.size => problems.push(format!(
                "uniform @group({}) @binding({}) is {} bytes in the vertex stage and {} in the fragment stage",
                block.group, block.binding, existing.size, block.size
            )),
            Some(_) => {}
            None => uniforms.push(block),
        }
    }

    for block in &uniforms {
        if block.group != 0 {
            problems.push(format!(
                "uniform `{}` is bound at group {}; program uniforms must use group 0",
                block.name, block.group
            ));
        }
    }

    if !problems.is_empty() {
        return Err(ShaderError::Link { log: problems.join("\n") });
    }

    uniforms.sort_by_key(|b| (b.group, b.binding));

    Ok(LinkedProgram {
        vertex,
        fragment,
        uniforms,
    })
}

// ── reflection ────────────────────────────────────────────────────────────

#[derive(Debug)]
struct InterfaceVar {
    location: u32,
    name: String,
    ty: TypeInner,
}

fn interface_inputs(shader: &CompiledShader) -> Vec<InterfaceVar> {
    let mut vars = Vec::new();
    for arg in &shader.entry().function.arguments {
        collect_located(
            &shader.module,
            arg.name.as_deref(),
            arg.ty,
            arg.binding.as_ref(),
            &mut vars,
        );
    }
    vars
}

fn interface_outputs(shader: &CompiledShader) -> Vec<InterfaceVar> {
    let mut vars = Vec::new();
    if let Some(result) = &shader.entry().function.result {
        collect_located(&shader.module, None, result.ty, result.binding.as_ref(), &mut vars);
    }
    vars
}

/// Flattens `@location` bindings, descending into struct members.
fn collect_located(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<InterfaceVar>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(InterfaceVar {
            location: *location,
            name: name.unwrap_or("<unnamed>").to_owned(),
            ty: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_located(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    );
                }
            }
        }
    }
}

fn uniform_blocks(module: &Module) -> Vec<UniformBlockLayout> {
    let ctx = module.to_ctx();
    module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == AddressSpace::Uniform)
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            let inner = &module.types[var.ty].inner;
            let members = match inner {
                TypeInner::Struct { members, .. } => members
                    .iter()
                    .filter_map(|m| {
                        Some(UniformMember {
                            name: m.name.clone()?,
                            offset: m.offset,
                            size: module.types[m.ty].inner.size(ctx),
                        })
                    })
                    .collect(),
                _ => Vec::new(),
            };
            Some(UniformBlockLayout {
                name: var.name.clone().unwrap_or_default(),
                group: binding.group,
                binding: binding.binding,
                size: inner.size(ctx),
                members,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::primitive::MVP_UNIFORM;
    use crate::render::shader::{UniformLocation, UniformTable};

    const VS: &str = r#"
struct Globals {
    model_view_projection: mat4x4<f32>,
    tint: vec4<f32>,
};
@group(0) @binding(0) var<uniform> globals: Globals;

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.clip = globals.model_view_projection * vec4<f32>(position, 1.0);
    out.color = color * globals.tint.rgb;
    return out;
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(color, 1.0);
}
"#;

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn compiles_valid_stages() {
        let vs = compile(VS, ShaderStage::Vertex).unwrap();
        assert_eq!(vs.entry_point(), "vs_main");
        let fs = compile(FS, ShaderStage::Fragment).unwrap();
        assert_eq!(fs.entry_point(), "fs_main");
    }

    #[test]
    fn syntax_error_carries_diagnostic() {
        let err = compile("fn broken( {", ShaderStage::Vertex).unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.trim().is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_entry_point_is_a_compile_error() {
        let err = compile(FS, ShaderStage::Vertex).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Vertex, .. }));
        assert!(err.to_string().contains("@vertex"));
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn links_matching_interfaces_and_reflects_uniforms() {
        let program = link(
            compile(VS, ShaderStage::Vertex).unwrap(),
            compile(FS, ShaderStage::Fragment).unwrap(),
        )
        .unwrap();

        assert_eq!(program.uniforms.len(), 1);
        let block = &program.uniforms[0];
        assert_eq!(block.name, "globals");
        assert_eq!((block.group, block.binding), (0, 0));
        assert_eq!(block.size, 80);
        let tint = block.members.iter().find(|m| m.name == "tint").unwrap();
        assert_eq!((tint.offset, tint.size), (64, 16));
    }

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let fs = r#"
@fragment
fn fs_main(@location(3) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(uv, 0.0, 1.0);
}
"#;
        let err = link(
            compile(VS, ShaderStage::Vertex).unwrap(),
            compile(fs, ShaderStage::Fragment).unwrap(),
        )
        .unwrap_err();
        match err {
            ShaderError::Link { log } => assert!(log.contains("location 3"), "{log}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn mismatched_location_type_fails_to_link() {
        let fs = r#"
@fragment
fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;
        let err = link(
            compile(VS, ShaderStage::Vertex).unwrap(),
            compile(fs, ShaderStage::Fragment).unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("different types"));
    }

    #[test]
    fn uniforms_outside_group_zero_fail_to_link() {
        let vs = r#"
@group(1) @binding(0) var<uniform> scale: vec4<f32>;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position * scale.x, 1.0);
}
"#;
        let fs = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        let err = link(
            compile(vs, ShaderStage::Vertex).unwrap(),
            compile(fs, ShaderStage::Fragment).unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("group 1"));
    }

    // ── shipped programs ──────────────────────────────────────────────────

    fn link_shipped(source: &str) -> LinkedProgram {
        link(
            compile(source, ShaderStage::Vertex).unwrap(),
            compile(source, ShaderStage::Fragment).unwrap(),
        )
        .unwrap()
    }

    fn assert_mvp_found(linked: &LinkedProgram) {
        let mut table = UniformTable::new(linked.uniforms.clone());
        assert!(matches!(
            table.location(MVP_UNIFORM),
            UniformLocation::Found { size: 64, .. }
        ));
    }

    #[test]
    fn primitive_program_links_and_exposes_mvp() {
        let linked = link_shipped(include_str!("../shaders/primitive.wgsl"));
        assert_eq!(linked.uniforms.len(), 1);
        assert_mvp_found(&linked);
    }

    #[test]
    fn text_program_keeps_atlas_bindings_out_of_uniforms() {
        let linked = link_shipped(include_str!("../shaders/text.wgsl"));
        // The texture and sampler at group 1 are resources, not uniform blocks.
        assert_eq!(linked.uniforms.len(), 1);
        assert_eq!((linked.uniforms[0].group, linked.uniforms[0].binding), (0, 0));
        assert_mvp_found(&linked);
    }
}
