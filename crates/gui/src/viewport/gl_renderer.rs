use std::collections::HashMap;

use glow::HasContext;
use image::RgbaImage;

use super::mesh::{self, MeshData};
use crate::render::{FrameRenderer, RenderError};
use crate::scene::frame::RenderFrame;
use crate::scene::resources::{GeometryId, Released, TextureId};

// ── GPU handles ──────────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

struct GpuLines {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

// ── Main GL renderer ─────────────────────────────────────────

/// Draws a `RenderFrame` with OpenGL.
///
/// Garment meshes and overlay bitmaps are uploaded on first use and kept
/// until the scene reports them released. Overlay planes and outlines
/// share one unit quad and one unit rectangle scaled per draw.
pub struct GlRenderer {
    garment_program: glow::Program,
    overlay_program: glow::Program,
    line_program: glow::Program,
    unit_quad: GpuMesh,
    unit_rect: GpuLines,
    meshes: HashMap<GeometryId, GpuMesh>,
    textures: HashMap<TextureId, glow::Texture>,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let garment_program = compile_program(gl, GARMENT_VERT, GARMENT_FRAG)?;
        let overlay_program = compile_program(gl, OVERLAY_VERT, OVERLAY_FRAG)?;
        let line_program = compile_program(gl, LINE_VERT, LINE_FRAG)?;

        let quad = mesh::plane(1.0, 1.0);
        let unit_quad = upload_interleaved(gl, &quad.vertices, &quad.indices, &[3, 2])?;
        let rect = mesh::rect_outline(1.0, 1.0, [1.0; 4]);
        let unit_rect = upload_lines(gl, &rect.vertices)?;

        Ok(Self {
            garment_program,
            overlay_program,
            line_program,
            unit_quad,
            unit_rect,
            meshes: HashMap::new(),
            textures: HashMap::new(),
        })
    }

    /// Free GPU copies of resources the scene no longer uses
    pub fn release(&mut self, gl: &glow::Context, released: &[Released]) {
        for item in released {
            match item {
                Released::Texture(id) => {
                    if let Some(texture) = self.textures.remove(id) {
                        unsafe { gl.delete_texture(texture) };
                    }
                }
                Released::Geometry(id) => {
                    if let Some(mesh) = self.meshes.remove(id) {
                        delete_mesh(gl, &mesh);
                    }
                }
            }
        }
    }

    /// Upload whatever the frame references that is not on the GPU yet
    fn upload_frame(&mut self, gl: &glow::Context, frame: &RenderFrame) -> Result<(), String> {
        if let Some(garment) = &frame.garment {
            if !self.meshes.contains_key(&garment.geometry) {
                let gpu = upload_mesh(gl, &garment.mesh)?;
                self.meshes.insert(garment.geometry, gpu);
            }
        }
        for overlay in &frame.overlays {
            if !self.textures.contains_key(&overlay.texture) {
                let texture = upload_texture(gl, &overlay.image)?;
                self.textures.insert(overlay.texture, texture);
            }
        }
        Ok(())
    }

    /// Render the frame into the given viewport (x, y from bottom, width, height)
    pub fn paint(&mut self, gl: &glow::Context, frame: &RenderFrame, viewport: [i32; 4]) -> Result<(), String> {
        self.upload_frame(gl, frame)?;
        let [x, y, w, h] = viewport;
        let vp = frame.view_proj;

        unsafe {
            gl.viewport(x, y, w, h);
            gl.scissor(x, y, w, h);
            gl.enable(glow::SCISSOR_TEST);

            let [r, g, b, a] = frame.background;
            gl.clear_color(r, g, b, a);
            gl.depth_mask(true);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
            gl.disable(glow::BLEND);

            // Garment: lit, opaque, backfaces culled
            if let Some(garment) = &frame.garment {
                if let Some(mesh) = self.meshes.get(&garment.geometry) {
                    let p = self.garment_program;
                    gl.enable(glow::CULL_FACE);
                    gl.cull_face(glow::BACK);
                    gl.use_program(Some(p));
                    set_uniform_mat4(gl, p, "u_mvp", &vp);
                    set_uniform_vec3(gl, p, "u_color", garment.color);
                    set_uniform_vec3(gl, p, "u_eye", frame.eye.to_array());
                    set_uniform_vec3(gl, p, "u_light_dir", frame.lighting.direction.to_array());
                    set_uniform_f32(gl, p, "u_ambient", frame.lighting.ambient);
                    set_uniform_f32(gl, p, "u_directional", frame.lighting.directional);
                    set_uniform_f32(gl, p, "u_roughness", garment.material.roughness);
                    set_uniform_f32(gl, p, "u_metalness", garment.material.metalness);
                    draw_mesh(gl, mesh);
                    gl.disable(glow::CULL_FACE);
                }
            }

            // Overlays: unlit, alpha blended, depth tested without writing
            gl.enable(glow::BLEND);
            gl.blend_func_separate(
                glow::SRC_ALPHA,
                glow::ONE_MINUS_SRC_ALPHA,
                glow::ONE,
                glow::ONE_MINUS_SRC_ALPHA,
            );
            gl.depth_mask(false);
            gl.use_program(Some(self.overlay_program));
            gl.active_texture(glow::TEXTURE0);
            set_uniform_i32(gl, self.overlay_program, "u_texture", 0);
            for overlay in &frame.overlays {
                let Some(texture) = self.textures.get(&overlay.texture) else {
                    continue;
                };
                let mvp = vp * overlay.model * glam::Mat4::from_scale(glam::Vec3::new(overlay.width, overlay.height, 1.0));
                set_uniform_mat4(gl, self.overlay_program, "u_mvp", &mvp);
                gl.bind_texture(glow::TEXTURE_2D, Some(*texture));
                draw_mesh(gl, &self.unit_quad);
            }
            gl.bind_texture(glow::TEXTURE_2D, None);

            // Selection outline on top
            if let Some(selected) = frame.selected() {
                gl.disable(glow::DEPTH_TEST);
                gl.use_program(Some(self.line_program));
                let mvp = vp * selected.model * glam::Mat4::from_scale(glam::Vec3::new(selected.width, selected.height, 1.0));
                set_uniform_mat4(gl, self.line_program, "u_mvp", &mvp);
                let [r, g, b, a] = frame.outline_color;
                let loc = gl.get_uniform_location(self.line_program, "u_color");
                gl.uniform_4_f32(loc.as_ref(), r, g, b, a);
                gl.line_width(2.0);
                draw_lines(gl, &self.unit_rect);
                gl.line_width(1.0);
            }

            gl.depth_mask(true);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
        Ok(())
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.garment_program);
            gl.delete_program(self.overlay_program);
            gl.delete_program(self.line_program);
            for (_, texture) in self.textures.drain() {
                gl.delete_texture(texture);
            }
            gl.delete_vertex_array(self.unit_rect.vao);
            gl.delete_buffer(self.unit_rect.vbo);
        }
        delete_mesh(gl, &self.unit_quad);
        for (_, mesh) in self.meshes.drain() {
            delete_mesh(gl, &mesh);
        }
    }
}

// ── Offscreen rendering ──────────────────────────────────────

/// Renders frames into a temporary framebuffer and reads them back
pub struct GlFrameRenderer<'a> {
    gl: &'a glow::Context,
    renderer: &'a mut GlRenderer,
}

impl<'a> GlFrameRenderer<'a> {
    pub fn new(gl: &'a glow::Context, renderer: &'a mut GlRenderer) -> Self {
        Self { gl, renderer }
    }

    fn render_offscreen(&mut self, frame: &RenderFrame) -> Result<RgbaImage, String> {
        let gl = self.gl;
        let (w, h) = (frame.width as i32, frame.height as i32);
        unsafe {
            let fbo = gl.create_framebuffer()?;
            let color = gl.create_renderbuffer()?;
            let depth = gl.create_renderbuffer()?;

            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(color));
            gl.renderbuffer_storage(glow::RENDERBUFFER, glow::RGBA8, w, h);
            gl.bind_renderbuffer(glow::RENDERBUFFER, Some(depth));
            gl.renderbuffer_storage(glow::RENDERBUFFER, glow::DEPTH_COMPONENT24, w, h);
            gl.bind_renderbuffer(glow::RENDERBUFFER, None);

            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
            gl.framebuffer_renderbuffer(glow::FRAMEBUFFER, glow::COLOR_ATTACHMENT0, glow::RENDERBUFFER, Some(color));
            gl.framebuffer_renderbuffer(glow::FRAMEBUFFER, glow::DEPTH_ATTACHMENT, glow::RENDERBUFFER, Some(depth));

            let result = if gl.check_framebuffer_status(glow::FRAMEBUFFER) != glow::FRAMEBUFFER_COMPLETE {
                Err("offscreen framebuffer incomplete".to_string())
            } else {
                self.renderer.paint(gl, frame, [0, 0, w, h]).map(|()| {
                    let mut pixels = vec![0u8; (frame.width * frame.height * 4) as usize];
                    gl.read_pixels(
                        0,
                        0,
                        w,
                        h,
                        glow::RGBA,
                        glow::UNSIGNED_BYTE,
                        glow::PixelPackData::Slice(Some(pixels.as_mut_slice())),
                    );
                    pixels
                })
            };

            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            gl.delete_framebuffer(fbo);
            gl.delete_renderbuffer(color);
            gl.delete_renderbuffer(depth);

            let pixels = result?;
            image_from_gl(frame.width, frame.height, &pixels)
        }
    }
}

impl FrameRenderer for GlFrameRenderer<'_> {
    fn render(&mut self, frame: &RenderFrame) -> Result<RgbaImage, RenderError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(RenderError::EmptyTarget {
                width: frame.width,
                height: frame.height,
            });
        }
        self.render_offscreen(frame).map_err(RenderError::Backend)
    }
}

/// Bottom-up GL rows to a top-down straight-alpha image
fn image_from_gl(width: u32, height: u32, pixels: &[u8]) -> Result<RgbaImage, String> {
    let row = (width * 4) as usize;
    let mut flipped = Vec::with_capacity(pixels.len());
    for y in (0..height as usize).rev() {
        flipped.extend_from_slice(&pixels[y * row..(y + 1) * row]);
    }
    // Color is premultiplied where the background was transparent
    for px in flipped.chunks_exact_mut(4) {
        let a = px[3];
        if a > 0 && a < 255 {
            for c in &mut px[..3] {
                *c = ((*c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
            }
        }
    }
    RgbaImage::from_raw(width, height, flipped).ok_or_else(|| "pixel buffer size mismatch".to_string())
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> Result<GpuMesh, String> {
    // position, normal, color
    upload_interleaved(gl, &data.vertices, &data.indices, &[3, 3, 3])
}

/// Upload an indexed mesh whose vertices interleave attributes of the given sizes
fn upload_interleaved(gl: &glow::Context, vertices: &[f32], indices: &[u32], layout: &[i32]) -> Result<GpuMesh, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck_cast_slice(vertices), glow::STATIC_DRAW);

        let stride = layout.iter().sum::<i32>() * 4;
        let mut offset = 0;
        for (location, size) in layout.iter().enumerate() {
            gl.enable_vertex_attrib_array(location as u32);
            gl.vertex_attrib_pointer_f32(location as u32, *size, glow::FLOAT, false, stride, offset);
            offset += size * 4;
        }

        let ibo = gl.create_buffer()?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, bytemuck_cast_slice(indices), glow::STATIC_DRAW);

        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: indices.len() as i32,
        })
    }
}

fn upload_lines(gl: &glow::Context, vertices: &[f32]) -> Result<GpuLines, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck_cast_slice(vertices), glow::STATIC_DRAW);

        let stride = 7 * 4; // 7 floats * 4 bytes
        // position only; the outline color is a uniform
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);

        gl.bind_vertex_array(None);

        Ok(GpuLines {
            vao,
            vbo,
            vertex_count: (vertices.len() / 7) as i32,
        })
    }
}

fn upload_texture(gl: &glow::Context, image: &RgbaImage) -> Result<glow::Texture, String> {
    unsafe {
        let texture = gl.create_texture()?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA8 as i32,
            image.width() as i32,
            image.height() as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(image.as_raw().as_slice())),
        );
        gl.bind_texture(glow::TEXTURE_2D, None);
        Ok(texture)
    }
}

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh.vbo);
        gl.delete_buffer(mesh.ibo);
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

unsafe fn draw_lines(gl: &glow::Context, lines: &GpuLines) {
    gl.bind_vertex_array(Some(lines.vao));
    gl.draw_arrays(glow::LINES, 0, lines.vertex_count);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program()?;

        let vert = gl.create_shader(glow::VERTEX_SHADER)?;
        gl.shader_source(vert, vert_src);
        gl.compile_shader(vert);
        if !gl.get_shader_compile_status(vert) {
            let log = gl.get_shader_info_log(vert);
            tracing::error!("Vertex shader error: {log}");
        }

        let frag = gl.create_shader(glow::FRAGMENT_SHADER)?;
        gl.shader_source(frag, frag_src);
        gl.compile_shader(frag);
        if !gl.get_shader_compile_status(frag) {
            let log = gl.get_shader_info_log(frag);
            tracing::error!("Fragment shader error: {log}");
        }

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        let linked = gl.get_program_link_status(program);
        if !linked {
            let log = gl.get_program_info_log(program);
            tracing::error!("Program link error: {log}");
        }

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if linked {
            Ok(program)
        } else {
            gl.delete_program(program);
            Err("shader program failed to link".to_string())
        }
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: [f32; 3]) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v[0], v[1], v[2]);
    }
}

fn set_uniform_f32(gl: &glow::Context, program: glow::Program, name: &str, v: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_f32(loc.as_ref(), v);
    }
}

fn set_uniform_i32(gl: &glow::Context, program: glow::Program, name: &str, v: i32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_i32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

// ── Shaders ──────────────────────────────────────────────────

const GARMENT_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

out vec3 v_position;
out vec3 v_normal;
out vec3 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_position = a_position;
    v_normal = a_normal;
    v_color = a_color;
}
"#;

// Same model as scene::lighting::Lighting::shade
const GARMENT_FRAG: &str = r#"#version 330 core
uniform vec3 u_color;
uniform vec3 u_eye;
uniform vec3 u_light_dir;
uniform float u_ambient;
uniform float u_directional;
uniform float u_roughness;
uniform float u_metalness;

in vec3 v_position;
in vec3 v_normal;
in vec3 v_color;

out vec4 frag_color;

void main() {
    vec3 base = u_color * v_color;
    vec3 n = normalize(v_normal);
    vec3 v = normalize(u_eye - v_position);
    vec3 l = u_light_dir;

    float ndl = max(dot(n, l), 0.0);
    float diffuse = (u_ambient + u_directional * ndl) / 3.14159265 * (1.0 - u_metalness);

    vec3 h = normalize(l + v);
    float ndh = max(dot(n, h), 0.0);
    float r = clamp(u_roughness, 0.05, 1.0);
    float shininess = max(2.0 / (r * r * r * r) - 2.0, 1.0);
    float strength = (1.0 - r) * (1.0 - r) * u_directional;
    float lobe = ndl > 0.0 ? pow(ndh, shininess) * strength : 0.0;

    vec3 tint = 0.04 + (base - 0.04) * u_metalness;
    frag_color = vec4(clamp(base * diffuse + tint * lobe, 0.0, 1.0), 1.0);
}
"#;

const OVERLAY_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;

out vec2 v_uv;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_uv = a_uv;
}
"#;

const OVERLAY_FRAG: &str = r#"#version 330 core
uniform sampler2D u_texture;

in vec2 v_uv;
out vec4 frag_color;

void main() {
    vec4 c = texture(u_texture, v_uv);
    if (c.a < 0.004) {
        discard;
    }
    frag_color = c;
}
"#;

const LINE_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
}
"#;

const LINE_FRAG: &str = r#"#version 330 core
uniform vec4 u_color;
out vec4 frag_color;

void main() {
    frag_color = u_color;
}
"#;
