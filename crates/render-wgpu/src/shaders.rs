/// Bind group index of the first texture slot; group 0 holds the uniforms.
pub const TEXTURE_GROUP_BASE: u32 = 1;

/// WGSL shader that displaces the flat grid by the heightmap's red channel.
///
/// Group 0 holds the transforms and height scale, group 1 the heightmap and
/// its sampler. The vertex stage samples with an explicit LOD since implicit
/// derivatives are unavailable there.
pub const TERRAIN_SHADER: &str = r#"
struct Uniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    scale: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var heightmap: texture_2d<f32>;

@group(1) @binding(1)
var heightmap_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) tex_coord: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) height: f32,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let sampled = textureSampleLevel(heightmap, heightmap_sampler, in.tex_coord, 0.0);
    let height = sampled.r;
    let displaced = vec4<f32>(in.position.x, height * uniforms.scale, in.position.z, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.projection * uniforms.view * uniforms.model * displaced;
    out.height = height;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(vec3<f32>(in.height), 1.0);
}
"#;
