use std::collections::HashMap;
use std::path::PathBuf;

use glow::HasContext;
use shared::ObjectId;

use super::camera::ArcBallCamera;
use super::mesh::{self, LineMeshData, MeshData};
use crate::settings::{AxisSettings, GridSettings};
use crate::viewer::display::TextureProps;
use crate::viewer::material::MaterialProps;
use crate::viewer::{Background, DisplayMode, GradientFill, SelectedParts};

// ── Render parameters ────────────────────────────────────────

/// Per-object snapshot handed to the renderer each frame
pub struct ObjectRender {
    pub id: ObjectId,
    pub mesh: MeshData,
    pub lines: LineMeshData,
    pub alpha: f32,
    pub material: MaterialProps,
    pub texture: Option<TextureProps>,
}

/// Parameters for rendering the viewport
pub struct RenderParams {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    pub display_mode: DisplayMode,
    pub background: Background,
    /// Enable multisampling
    pub msaa: bool,
    pub grid_visible: bool,
    pub axes_visible: bool,
    pub axes_thickness: f32,
    pub select_color: [f32; 3],
    pub hover_color: [f32; 3],
    /// Selection breakdown per object id
    pub selection: HashMap<ObjectId, SelectedParts>,
    pub hovered: Option<ObjectId>,
    /// Dump the painted viewport to this path after drawing
    pub export_path: Option<PathBuf>,
}

// ── GPU handles ──────────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    _vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
    face_ranges: Vec<(u32, u32)>,
}

struct GpuLines {
    vao: glow::VertexArray,
    _vbo: glow::Buffer,
    vertex_count: i32,
    edge_ranges: Vec<(u32, u32)>,
    vertex_ranges: Vec<(u32, u32)>,
}

struct GpuObject {
    id: ObjectId,
    mesh: GpuMesh,
    lines: GpuLines,
    alpha: f32,
    material: MaterialProps,
    texture: Option<TextureProps>,
}

struct GpuTexture {
    tex: glow::Texture,
    width: u32,
    height: u32,
}

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    mesh_program: glow::Program,
    line_program: glow::Program,
    bg_program: glow::Program,
    bg_vbo: glow::Buffer,
    bg_vao: glow::VertexArray,
    grid: Option<GpuLines>,
    axes: Option<GpuLines>,
    /// Cached grid settings to detect changes
    cached_grid_settings: Option<(i32, f32, f32)>,
    /// Cached axes length to detect changes
    cached_axes_length: Option<f32>,
    /// Displayed objects in display order
    scene: Vec<GpuObject>,
    /// Decoded textures keyed by file path
    textures: HashMap<PathBuf, GpuTexture>,
    /// Version counter to detect scene changes
    last_scene_version: u64,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Self {
        let mesh_program = compile_program(gl, MESH_VERT, MESH_FRAG);
        let line_program = compile_program(gl, LINE_VERT, LINE_FRAG);
        let bg_program = compile_program(gl, BG_VERT, BG_FRAG);

        let (bg_vao, bg_vbo) = unsafe {
            let vao = gl.create_vertex_array().unwrap();
            gl.bind_vertex_array(Some(vao));
            let vbo = gl.create_buffer().unwrap();
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            let stride = 8 * 4; // pos(2) + color(4) + uv(2)
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, stride, 2 * 4);
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, 6 * 4);
            gl.bind_vertex_array(None);
            (vao, vbo)
        };

        let grid_data = mesh::grid(5, 1.0, 0.6);
        let grid = Some(upload_lines(gl, &grid_data));

        let axes_data = mesh::axes(1.5);
        let axes = Some(upload_lines(gl, &axes_data));

        Self {
            mesh_program,
            line_program,
            bg_program,
            bg_vbo,
            bg_vao,
            grid,
            axes,
            cached_grid_settings: Some((5, 1.0, 0.6)),
            cached_axes_length: Some(1.5),
            scene: Vec::new(),
            textures: HashMap::new(),
            last_scene_version: 0,
        }
    }

    /// Update grid mesh based on settings
    pub fn update_grid(&mut self, gl: &glow::Context, settings: &GridSettings) {
        let new_settings = (settings.range, settings.size, settings.opacity);
        if self.cached_grid_settings == Some(new_settings) {
            return;
        }

        if let Some(old) = self.grid.take() {
            delete_lines(gl, &old);
        }
        let grid_data = mesh::grid(settings.range, settings.size, settings.opacity);
        self.grid = Some(upload_lines(gl, &grid_data));
        self.cached_grid_settings = Some(new_settings);
    }

    /// Update axes mesh based on settings
    pub fn update_axes(&mut self, gl: &glow::Context, settings: &AxisSettings) {
        if self.cached_axes_length == Some(settings.length) {
            return;
        }

        if let Some(old) = self.axes.take() {
            delete_lines(gl, &old);
        }
        let axes_data = mesh::axes(settings.length);
        self.axes = Some(upload_lines(gl, &axes_data));
        self.cached_axes_length = Some(settings.length);
    }

    /// Upload the displayed objects to the GPU when the scene changed
    pub fn sync_objects(&mut self, gl: &glow::Context, version: u64, objects: &[ObjectRender]) {
        if version == self.last_scene_version {
            return;
        }
        self.last_scene_version = version;

        for obj in self.scene.drain(..) {
            delete_mesh(gl, &obj.mesh);
            delete_lines(gl, &obj.lines);
        }

        for obj in objects {
            self.scene.push(GpuObject {
                id: obj.id.clone(),
                mesh: upload_mesh(gl, &obj.mesh),
                lines: upload_lines(gl, &obj.lines),
                alpha: obj.alpha,
                material: obj.material,
                texture: obj.texture.clone(),
            });
        }
    }

    /// Render the scene
    pub fn paint(&mut self, gl: &glow::Context, camera: &ArcBallCamera, params: &RenderParams) {
        let aspect = params.viewport[2] / params.viewport[3];
        let vp = camera.view_projection(aspect);
        let eye = camera.eye_position();

        unsafe {
            gl.viewport(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.scissor(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.enable(glow::SCISSOR_TEST);

            if params.msaa {
                gl.enable(glow::MULTISAMPLE);
            } else {
                gl.disable(glow::MULTISAMPLE);
            }

            self.draw_background(gl, params);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);

            // Grid and axes
            gl.use_program(Some(self.line_program));
            set_uniform_mat4(gl, self.line_program, "u_mvp", &vp);
            set_override(gl, self.line_program, [0.0; 3], 0.0);

            if params.grid_visible {
                if let Some(ref grid) = self.grid {
                    draw_lines(gl, grid);
                }
            }
            if params.axes_visible {
                if let Some(ref axes) = self.axes {
                    gl.line_width(params.axes_thickness);
                    draw_lines(gl, axes);
                    gl.line_width(1.0);
                }
            }

            match params.display_mode {
                DisplayMode::Shaded => self.paint_shaded(gl, &vp, eye, params),
                DisplayMode::Wireframe => self.paint_wireframe(gl, &vp, params),
                DisplayMode::HiddenLine => self.paint_hidden_line(gl, &vp, params),
            }

            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }

        if let Some(ref path) = params.export_path {
            self.export_framebuffer(gl, params.viewport, path);
        }
    }

    unsafe fn paint_shaded(
        &mut self,
        gl: &glow::Context,
        vp: &glam::Mat4,
        eye: glam::Vec3,
        params: &RenderParams,
    ) {
        gl.use_program(Some(self.mesh_program));
        set_uniform_mat4(gl, self.mesh_program, "u_mvp", vp);
        set_uniform_vec3(gl, self.mesh_program, "u_eye", &eye);
        let light_dir = glam::Vec3::new(0.3, 0.8, 0.5).normalize();
        set_uniform_vec3(gl, self.mesh_program, "u_light_dir", &light_dir);

        gl.enable(glow::BLEND);
        gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);

        // Resolve textures up front to avoid borrowing self inside the loop
        let wanted: Vec<Option<TextureProps>> =
            self.scene.iter().map(|o| o.texture.clone()).collect();
        let texture_handles: Vec<Option<(glow::Texture, bool)>> = wanted
            .into_iter()
            .map(|t| {
                t.and_then(|t| self.texture_for(gl, &t.path).map(|tex| (tex, t.repeat)))
            })
            .collect();

        for (obj, tex) in self.scene.iter().zip(&texture_handles) {
            set_material(gl, self.mesh_program, &obj.material, obj.alpha);
            let tex_props = obj.texture.as_ref();
            match (tex, tex_props) {
                (Some((handle, repeat)), Some(props)) => {
                    gl.active_texture(glow::TEXTURE0);
                    gl.bind_texture(glow::TEXTURE_2D, Some(*handle));
                    let wrap = if *repeat { glow::REPEAT } else { glow::CLAMP_TO_EDGE };
                    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrap as i32);
                    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrap as i32);
                    set_uniform_i32(gl, self.mesh_program, "u_use_texture", 1);
                    set_uniform_i32(gl, self.mesh_program, "u_texture", 0);
                    set_uniform_vec2(gl, self.mesh_program, "u_tex_scale", props.scale);
                    set_uniform_vec2(gl, self.mesh_program, "u_tex_origin", props.origin);
                }
                _ => set_uniform_i32(gl, self.mesh_program, "u_use_texture", 0),
            }

            set_override(gl, self.mesh_program, [0.0; 3], 0.0);
            draw_mesh(gl, &obj.mesh);

            // Highlight passes
            if let Some(parts) = params.selection.get(&obj.id) {
                set_override(gl, self.mesh_program, params.select_color, 0.75);
                if parts.whole {
                    draw_mesh(gl, &obj.mesh);
                } else {
                    for &f in &parts.faces {
                        draw_mesh_range(gl, &obj.mesh, f);
                    }
                }
            } else if params.hovered.as_deref() == Some(obj.id.as_str()) {
                set_override(gl, self.mesh_program, params.hover_color, 0.4);
                draw_mesh(gl, &obj.mesh);
            }
        }

        gl.disable(glow::BLEND);

        // Face boundaries, edge curves and vertex markers
        self.paint_lines(gl, vp, params);
    }

    unsafe fn paint_wireframe(&mut self, gl: &glow::Context, vp: &glam::Mat4, params: &RenderParams) {
        self.paint_lines(gl, vp, params);
    }

    unsafe fn paint_hidden_line(
        &mut self,
        gl: &glow::Context,
        vp: &glam::Mat4,
        params: &RenderParams,
    ) {
        // Depth-only prepass: fill the depth buffer so back edges are
        // occluded, without touching the color buffer.
        gl.use_program(Some(self.mesh_program));
        set_uniform_mat4(gl, self.mesh_program, "u_mvp", vp);
        gl.color_mask(false, false, false, false);
        gl.enable(glow::POLYGON_OFFSET_FILL);
        gl.polygon_offset(1.0, 1.0);
        for obj in &self.scene {
            draw_mesh(gl, &obj.mesh);
        }
        gl.disable(glow::POLYGON_OFFSET_FILL);
        gl.color_mask(true, true, true, true);

        self.paint_lines(gl, vp, params);
    }

    unsafe fn paint_lines(&self, gl: &glow::Context, vp: &glam::Mat4, params: &RenderParams) {
        gl.use_program(Some(self.line_program));
        set_uniform_mat4(gl, self.line_program, "u_mvp", vp);

        for obj in &self.scene {
            set_override(gl, self.line_program, [0.0; 3], 0.0);
            draw_lines(gl, &obj.lines);

            let Some(parts) = params.selection.get(&obj.id) else { continue };
            set_override(gl, self.line_program, params.select_color, 1.0);
            gl.line_width(3.0);
            if parts.whole {
                draw_lines(gl, &obj.lines);
            } else {
                for &e in &parts.edges {
                    draw_lines_range(gl, &obj.lines, obj.lines.edge_ranges.get(e));
                }
                for &v in &parts.vertices {
                    draw_lines_range(gl, &obj.lines, obj.lines.vertex_ranges.get(v));
                }
            }
            gl.line_width(1.0);
        }
        set_override(gl, self.line_program, [0.0; 3], 0.0);
    }

    unsafe fn draw_background(&mut self, gl: &glow::Context, params: &RenderParams) {
        gl.disable(glow::DEPTH_TEST);
        gl.clear_depth_f32(1.0);

        match &params.background {
            Background::Solid(color) => {
                gl.clear_color(color.r, color.g, color.b, 1.0);
                gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            }
            Background::Gradient { first, second, fill } => {
                gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
                let c1 = [first.r, first.g, first.b, 1.0];
                let c2 = [second.r, second.g, second.b, 1.0];
                // Corner colors: top-left, top-right, bottom-left, bottom-right
                let corners = match fill {
                    GradientFill::Vertical => [c1, c1, c2, c2],
                    GradientFill::Horizontal => [c1, c2, c1, c2],
                    GradientFill::Diagonal => [c1, mix4(&c1, &c2), mix4(&c1, &c2), c2],
                };
                self.draw_bg_quad(gl, corners, None, [0.0, 0.0], [1.0, 1.0]);
            }
            Background::Image { path, stretch } => {
                gl.clear_color(0.0, 0.0, 0.0, 1.0);
                gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
                let dims = self
                    .texture_dims(gl, path)
                    .filter(|_| !*stretch);
                let (uv_min, uv_max) = match dims {
                    // Centered at native scale: show the sub-range that
                    // matches the viewport/image size ratio.
                    Some((iw, ih)) => {
                        let rx = params.viewport[2] / iw as f32;
                        let ry = params.viewport[3] / ih as f32;
                        (
                            [0.5 - rx * 0.5, 0.5 - ry * 0.5],
                            [0.5 + rx * 0.5, 0.5 + ry * 0.5],
                        )
                    }
                    None => ([0.0, 0.0], [1.0, 1.0]),
                };
                if let Some(tex) = self.texture_for(gl, path) {
                    self.draw_bg_quad(gl, [[1.0; 4]; 4], Some(tex), uv_min, uv_max);
                }
            }
        }
    }

    unsafe fn draw_bg_quad(
        &self,
        gl: &glow::Context,
        corners: [[f32; 4]; 4],
        texture: Option<glow::Texture>,
        uv_min: [f32; 2],
        uv_max: [f32; 2],
    ) {
        // Two triangles covering NDC, interleaved pos(2) + color(4) + uv(2)
        let v = |x: f32, y: f32, c: &[f32; 4], u: f32, w: f32| {
            [x, y, c[0], c[1], c[2], c[3], u, w]
        };
        let tl = v(-1.0, 1.0, &corners[0], uv_min[0], uv_min[1]);
        let tr = v(1.0, 1.0, &corners[1], uv_max[0], uv_min[1]);
        let bl = v(-1.0, -1.0, &corners[2], uv_min[0], uv_max[1]);
        let br = v(1.0, -1.0, &corners[3], uv_max[0], uv_max[1]);
        let quad: Vec<f32> = [tl, bl, tr, tr, bl, br].concat();

        gl.use_program(Some(self.bg_program));
        gl.bind_vertex_array(Some(self.bg_vao));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.bg_vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, cast_slice(&quad), glow::STREAM_DRAW);

        match texture {
            Some(tex) => {
                gl.active_texture(glow::TEXTURE0);
                gl.bind_texture(glow::TEXTURE_2D, Some(tex));
                set_uniform_i32(gl, self.bg_program, "u_use_texture", 1);
                set_uniform_i32(gl, self.bg_program, "u_texture", 0);
            }
            None => set_uniform_i32(gl, self.bg_program, "u_use_texture", 0),
        }

        gl.draw_arrays(glow::TRIANGLES, 0, 6);
        gl.bind_vertex_array(None);
    }

    /// Load (and cache) a texture from disk; failures are logged once
    fn texture_for(&mut self, gl: &glow::Context, path: &std::path::Path) -> Option<glow::Texture> {
        if let Some(t) = self.textures.get(path) {
            return Some(t.tex);
        }
        match image::open(path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let (width, height) = rgba.dimensions();
                let tex = unsafe {
                    let tex = gl.create_texture().unwrap();
                    gl.bind_texture(glow::TEXTURE_2D, Some(tex));
                    gl.tex_image_2d(
                        glow::TEXTURE_2D,
                        0,
                        glow::RGBA8 as i32,
                        width as i32,
                        height as i32,
                        0,
                        glow::RGBA,
                        glow::UNSIGNED_BYTE,
                        glow::PixelUnpackData::Slice(Some(rgba.as_raw())),
                    );
                    gl.tex_parameter_i32(
                        glow::TEXTURE_2D,
                        glow::TEXTURE_MIN_FILTER,
                        glow::LINEAR as i32,
                    );
                    gl.tex_parameter_i32(
                        glow::TEXTURE_2D,
                        glow::TEXTURE_MAG_FILTER,
                        glow::LINEAR as i32,
                    );
                    tex
                };
                self.textures
                    .insert(path.to_path_buf(), GpuTexture { tex, width, height });
                Some(tex)
            }
            Err(e) => {
                tracing::error!("Failed to load texture {}: {e}", path.display());
                None
            }
        }
    }

    fn texture_dims(&mut self, gl: &glow::Context, path: &std::path::Path) -> Option<(u32, u32)> {
        self.texture_for(gl, path)?;
        self.textures.get(path).map(|t| (t.width, t.height))
    }

    /// Read back the viewport pixels and write them to disk
    fn export_framebuffer(&self, gl: &glow::Context, viewport: [f32; 4], path: &std::path::Path) {
        let (x, y) = (viewport[0] as i32, viewport[1] as i32);
        let (w, h) = (viewport[2] as i32, viewport[3] as i32);
        if w <= 0 || h <= 0 {
            return;
        }

        let mut pixels = vec![0u8; (w * h * 4) as usize];
        unsafe {
            gl.read_pixels(
                x,
                y,
                w,
                h,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelPackData::Slice(Some(&mut pixels)),
            );
        }

        match image::RgbaImage::from_raw(w as u32, h as u32, pixels) {
            Some(img) => {
                // GL rows start at the bottom
                let img = image::imageops::flip_vertical(&img);
                match img.save(path) {
                    Ok(()) => tracing::info!("Exported viewport to {}", path.display()),
                    Err(e) => tracing::error!("Failed to export image: {e}"),
                }
            }
            None => tracing::error!("Framebuffer readback size mismatch"),
        }
    }

    #[allow(dead_code)]
    pub fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.mesh_program);
            gl.delete_program(self.line_program);
            gl.delete_program(self.bg_program);
            gl.delete_vertex_array(self.bg_vao);
            gl.delete_buffer(self.bg_vbo);
            if let Some(ref grid) = self.grid {
                delete_lines(gl, grid);
            }
            if let Some(ref axes) = self.axes {
                delete_lines(gl, axes);
            }
            for obj in &self.scene {
                delete_mesh(gl, &obj.mesh);
                delete_lines(gl, &obj.lines);
            }
            for t in self.textures.values() {
                gl.delete_texture(t.tex);
            }
        }
    }
}

fn mix4(a: &[f32; 4], b: &[f32; 4]) -> [f32; 4] {
    [
        (a[0] + b[0]) * 0.5,
        (a[1] + b[1]) * 0.5,
        (a[2] + b[2]) * 0.5,
        (a[3] + b[3]) * 0.5,
    ]
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> GpuMesh {
    unsafe {
        let vao = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, cast_slice(&data.vertices), glow::STATIC_DRAW);

        let stride = 9 * 4; // 9 floats * 4 bytes
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        // color: location 2
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 3, glow::FLOAT, false, stride, 6 * 4);

        let ibo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            cast_slice(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        GpuMesh {
            vao,
            _vbo: vbo,
            ibo,
            index_count: data.indices.len() as i32,
            face_ranges: data.face_ranges.clone(),
        }
    }
}

fn upload_lines(gl: &glow::Context, data: &LineMeshData) -> GpuLines {
    unsafe {
        let vao = gl.create_vertex_array().unwrap();
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer().unwrap();
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, cast_slice(&data.vertices), glow::STATIC_DRAW);

        let stride = 7 * 4; // 7 floats * 4 bytes
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // color: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, stride, 3 * 4);

        gl.bind_vertex_array(None);

        GpuLines {
            vao,
            _vbo: vbo,
            vertex_count: (data.vertices.len() / 7) as i32,
            edge_ranges: data.edge_ranges.clone(),
            vertex_ranges: data.vertex_ranges.clone(),
        }
    }
}

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh._vbo);
        gl.delete_buffer(mesh.ibo);
    }
}

fn delete_lines(gl: &glow::Context, lines: &GpuLines) {
    unsafe {
        gl.delete_vertex_array(lines.vao);
        gl.delete_buffer(lines._vbo);
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

unsafe fn draw_mesh_range(gl: &glow::Context, mesh: &GpuMesh, face: usize) {
    let Some(&(first, count)) = mesh.face_ranges.get(face) else { return };
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    // Offset is in bytes into the index buffer
    gl.draw_elements(glow::TRIANGLES, count as i32, glow::UNSIGNED_INT, (first * 4) as i32);
    gl.bind_vertex_array(None);
}

unsafe fn draw_lines(gl: &glow::Context, lines: &GpuLines) {
    gl.bind_vertex_array(Some(lines.vao));
    gl.draw_arrays(glow::LINES, 0, lines.vertex_count);
    gl.bind_vertex_array(None);
}

unsafe fn draw_lines_range(gl: &glow::Context, lines: &GpuLines, range: Option<&(u32, u32)>) {
    let Some(&(first, count)) = range else { return };
    gl.bind_vertex_array(Some(lines.vao));
    gl.draw_arrays(glow::LINES, first as i32, count as i32);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> glow::Program {
    unsafe {
        let program = gl.create_program().unwrap();

        let vert = gl.create_shader(glow::VERTEX_SHADER).unwrap();
        gl.shader_source(vert, vert_src);
        gl.compile_shader(vert);
        if !gl.get_shader_compile_status(vert) {
            let log = gl.get_shader_info_log(vert);
            tracing::error!("Vertex shader error: {log}");
        }

        let frag = gl.create_shader(glow::FRAGMENT_SHADER).unwrap();
        gl.shader_source(frag, frag_src);
        gl.compile_shader(frag);
        if !gl.get_shader_compile_status(frag) {
            let log = gl.get_shader_info_log(frag);
            tracing::error!("Fragment shader error: {log}");
        }

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            tracing::error!("Program link error: {log}");
        }

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        program
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &glam::Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_vec2(gl: &glow::Context, program: glow::Program, name: &str, v: [f32; 2]) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_2_f32(loc.as_ref(), v[0], v[1]);
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

fn set_override(gl: &glow::Context, program: glow::Program, color: [f32; 3], amount: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, "u_override_color");
        gl.uniform_3_f32(loc.as_ref(), color[0], color[1], color[2]);
    }
    set_uniform_f32(gl, program, "u_override_mix", amount);
}

fn set_material(gl: &glow::Context, program: glow::Program, m: &MaterialProps, alpha: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, "u_material");
        gl.uniform_4_f32(loc.as_ref(), m.ambient, m.diffuse, m.specular, m.shininess);
    }
    set_uniform_f32(gl, program, "u_alpha", alpha);
}

// ── Byte cast helper ─────────────────────────────────────────

fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice))
    }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

out vec3 v_world;
out vec3 v_normal;
out vec3 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_world = a_position;
    v_normal = a_normal;
    v_color = a_color;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_light_dir;
uniform vec3 u_eye;
uniform vec4 u_material;   // ambient, diffuse, specular, shininess
uniform float u_alpha;
uniform vec3 u_override_color;
uniform float u_override_mix;
uniform bool u_use_texture;
uniform sampler2D u_texture;
uniform vec2 u_tex_scale;
uniform vec2 u_tex_origin;

in vec3 v_world;
in vec3 v_normal;
in vec3 v_color;

out vec4 frag_color;

void main() {
    vec3 base = v_color;
    if (u_use_texture) {
        vec2 uv = v_world.xy * u_tex_scale + u_tex_origin;
        base = texture(u_texture, uv).rgb;
    }
    base = mix(base, u_override_color, u_override_mix);

    vec3 n = normalize(v_normal);
    float diffuse = max(dot(n, u_light_dir), 0.0) * u_material.y;
    vec3 view_dir = normalize(u_eye - v_world);
    vec3 half_dir = normalize(u_light_dir + view_dir);
    float specular = pow(max(dot(n, half_dir), 0.0), u_material.w) * u_material.z;

    vec3 lit = base * (u_material.x + diffuse) + vec3(specular);
    frag_color = vec4(lit, u_alpha);
}
"#;

const LINE_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;

out vec4 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_color = a_color;
}
"#;

const LINE_FRAG: &str = r#"#version 330 core
uniform vec3 u_override_color;
uniform float u_override_mix;

in vec4 v_color;
out vec4 frag_color;

void main() {
    frag_color = vec4(mix(v_color.rgb, u_override_color, u_override_mix), v_color.a);
}
"#;

const BG_VERT: &str = r#"#version 330 core
layout(location = 0) in vec2 a_position;
layout(location = 1) in vec4 a_color;
layout(location = 2) in vec2 a_uv;

out vec4 v_color;
out vec2 v_uv;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
    v_color = a_color;
    v_uv = a_uv;
}
"#;

const BG_FRAG: &str = r#"#version 330 core
uniform bool u_use_texture;
uniform sampler2D u_texture;

in vec4 v_color;
in vec2 v_uv;

out vec4 frag_color;

void main() {
    if (u_use_texture) {
        frag_color = texture(u_texture, v_uv);
    } else {
        frag_color = v_color;
    }
}
"#;
