use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::types::RendererError;

/// Compiles the pass-through quad vertex shader shared by both pipelines.
pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, RendererError> {
    compile_glsl(device, "quad vertex", QUAD_VERTEX_GLSL, ShaderStage::Vertex)
}

/// Compiles the caustics fragment shader.
pub(crate) fn compile_caustics_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, RendererError> {
    compile_glsl(
        device,
        "caustics fragment",
        CAUSTICS_FRAGMENT_GLSL,
        ShaderStage::Fragment,
    )
}

/// Compiles the upscale blit fragment shader.
pub(crate) fn compile_blit_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, RendererError> {
    compile_glsl(device, "blit fragment", BLIT_FRAGMENT_GLSL, ShaderStage::Fragment)
}

/// Runs `create` inside a validation error scope popped synchronously.
///
/// wgpu reports front-end and validation failures through the device error
/// scope rather than the return value.
pub(crate) fn with_validation<T>(
    device: &wgpu::Device,
    create: impl FnOnce(&wgpu::Device) -> T,
) -> Result<T, String> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create(device);
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(err.to_string()),
        None => Ok(value),
    }
}

/// Creates a GLSL module and surfaces validation failures as errors.
fn compile_glsl(
    device: &wgpu::Device,
    label: &'static str,
    source: &'static str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule, RendererError> {
    with_validation(device, |device| {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(source),
                stage,
                defines: &[],
            },
        })
    })
    .map_err(|message| RendererError::ShaderCompile {
        stage: label,
        message,
    })
}

/// Static quad: two triangles covering clip space.
pub(crate) const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

/// Passes positions through and derives texture coordinates (v = 0 at top).
pub(crate) const QUAD_VERTEX_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;
layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = vec2(a_position.x * 0.5 + 0.5, 0.5 - a_position.y * 0.5);
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// Caustics shader. The uniform block layout must match `CausticsUniforms`.
pub(crate) const CAUSTICS_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(std140, set = 0, binding = 0) uniform FrameUniforms {
    vec2 resolution;
    vec2 pointer;
    float time;
    float dark;
    vec2 _padding;
} frame;

float hash(vec2 cell) {
    return fract(sin(dot(cell, vec2(12.9898, 78.233))) * 43758.5453123);
}

float value_noise(vec2 st) {
    vec2 i = floor(st);
    vec2 f = fract(st);
    float a = hash(i);
    float b = hash(i + vec2(1.0, 0.0));
    float c = hash(i + vec2(0.0, 1.0));
    float d = hash(i + vec2(1.0, 1.0));
    vec2 u = f * f * (vec2(3.0) - f * 2.0);
    return mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y;
}

float height(vec2 p, float t) {
    float h = sin(p.x * 1.8 + t * 0.6) * cos(p.y * 1.4 + t * 0.5) * 0.5;
    h += sin(p.x * 3.5 - t * 0.9 + p.y * 2.0) * 0.25;
    h += cos(p.y * 4.1 + t * 0.7 - p.x * 1.5) * 0.25;
    h += sin(p.x * 7.0 + t * 1.2) * cos(p.y * 6.0 - t * 1.0) * 0.12;
    h += value_noise(p * 3.0 + vec2(t * 0.3)) * 0.3;

    float d = distance(p, frame.pointer * 8.0);
    h += sin(d * 4.0 - t * 3.0) * exp(-d * 0.5) * 0.6;
    return h;
}

const float NORMAL_EPS = 0.05;

vec3 surface_normal(vec2 p, float t) {
    float left = height(p - vec2(NORMAL_EPS, 0.0), t);
    float right = height(p + vec2(NORMAL_EPS, 0.0), t);
    float down = height(p - vec2(0.0, NORMAL_EPS), t);
    float up = height(p + vec2(0.0, NORMAL_EPS), t);
    return normalize(vec3(left - right, down - up, NORMAL_EPS * 4.0));
}

float layer(vec2 p, float t, float sharpness) {
    return pow(max(surface_normal(p, t).z, 0.0), sharpness);
}

void main() {
    vec2 resolution = max(frame.resolution, vec2(1.0));
    vec2 frag = vec2(gl_FragCoord.x, resolution.y - gl_FragCoord.y);
    vec2 uv = frag / resolution;
    vec2 p = uv * 8.0;
    p.x *= resolution.x / resolution.y;
    float t = frame.time;

    vec3 n = surface_normal(p, t);
    vec2 refracted = p + n.xy * 2.0 * 0.5;

    float c = layer(refracted, t, 8.0);
    c += layer(refracted * 1.3 + vec2(2.5), t * 0.8, 8.0);
    c += layer(refracted * 0.7 + vec2(5.0), t * 1.2, 6.0);
    c = pow(c / 3.0, 1.8) * 1.6;

    vec3 light = mix(vec3(0.93, 0.88, 0.78), vec3(1.0, 0.96, 0.85), c);
    vec3 dark = mix(vec3(0.08, 0.09, 0.12), vec3(0.25, 0.45, 0.65), c);
    vec3 color = mix(light, dark, frame.dark);

    float vig = smoothstep(0.0, 0.7, 1.0 - length((uv - vec2(0.5)) * 1.2));
    color *= mix(0.7, 1.0, vig);
    out_color = vec4(color, 1.0);
}
";

/// Samples the low-resolution caustics target across the whole swapchain.
pub(crate) const BLIT_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(set = 0, binding = 0) uniform texture2D source_texture;
layout(set = 0, binding = 1) uniform sampler source_sampler;

void main() {
    out_color = vec4(texture(sampler2D(source_texture, source_sampler), v_uv).rgb, 1.0);
}
";
