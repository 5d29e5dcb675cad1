/// Instanced props. Each instance carries its placement (position + yaw),
/// its extent (scale + emissive) and a base color; the cube is rotated and
/// scaled in the vertex stage so no per-instance matrix is uploaded.
///
/// Distant props fade into the sky color; `sky.a` is the teleport fade and
/// darkens the whole frame toward black.
pub const PROP_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    // xyz = camera eye, w = distance at which fog is total
    eye: vec4<f32>,
    // rgb = sky color, a = teleport fade
    sky: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

struct Corner {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct Placement {
    @location(2) offset_yaw: vec4<f32>,
    @location(3) scale_emissive: vec4<f32>,
    @location(4) color: vec3<f32>,
};

struct Shaded {
    @builtin(position) clip: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) emissive: f32,
    @location(3) distance: f32,
};

fn turn_y(v: vec3<f32>, yaw: f32) -> vec3<f32> {
    let c = cos(yaw);
    let s = sin(yaw);
    return vec3<f32>(v.x * c + v.z * s, v.y, -v.x * s + v.z * c);
}

@vertex
fn vs_main(corner: Corner, prop: Placement) -> Shaded {
    let yaw = prop.offset_yaw.w;
    let local = corner.position * prop.scale_emissive.xyz;
    let world = turn_y(local, yaw) + prop.offset_yaw.xyz;

    var out: Shaded;
    out.clip = frame.view_proj * vec4<f32>(world, 1.0);
    out.normal = turn_y(corner.normal, yaw);
    out.color = prop.color;
    out.emissive = prop.scale_emissive.w;
    out.distance = distance(world, frame.eye.xyz);
    return out;
}

@fragment
fn fs_main(in: Shaded) -> @location(0) vec4<f32> {
    let sun = normalize(vec3<f32>(0.4, 1.0, 0.35));
    let n = normalize(in.normal);
    let sky_fill = 0.45 + 0.2 * n.y;
    let direct = max(dot(n, sun), 0.0) * 0.65;
    let lit = in.color * (sky_fill + direct + in.emissive);

    let fog = smoothstep(frame.eye.w * 0.45, frame.eye.w, in.distance);
    let hazed = mix(lit, frame.sky.rgb, fog);
    return vec4<f32>(hazed * (1.0 - frame.sky.a), 1.0);
}
"#;
