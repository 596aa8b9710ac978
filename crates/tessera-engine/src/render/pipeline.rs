use std::collections::BTreeSet;
use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use crate::coords::ClipMatrix;

use super::geometry::{GridScale, GridVertex};
use super::{RenderCtx, RenderError, RenderTarget};

pub const TILE_GRID_VS: &str = include_str!("shaders/tile_grid_vs.wgsl");
pub const TILE_GRID_FS: &str = include_str!("shaders/tile_grid_fs.wgsl");

const VS_ENTRY: &str = "vs_main";
const FS_ENTRY: &str = "fs_main";

/// The grid quad as a four-vertex triangle fan.
pub const FAN_INDICES: [u16; 4] = [0, 1, 2, 3];

/// Expands a triangle fan into the equivalent triangle list.
pub fn fan_to_triangle_list(fan: &[u16]) -> Vec<u16> {
    if fan.len() < 3 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity((fan.len() - 2) * 3);
    for pair in fan[1..].windows(2) {
        out.extend_from_slice(&[fan[0], pair[0], pair[1]]);
    }
    out
}

// ── shader checks ─────────────────────────────────────────────────────────

/// Parses and validates one WGSL stage, requiring `entry` with `stage`.
pub fn validate_stage(
    source: &str,
    label: &'static str,
    entry: &str,
    stage: naga::ShaderStage,
) -> Result<naga::Module, RenderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| RenderError::Shader {
        stage: label,
        message: e.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| RenderError::Shader {
        stage: label,
        message: e.emit_to_string(source),
    })?;

    if !module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry && ep.stage == stage)
    {
        return Err(RenderError::Shader {
            stage: label,
            message: format!("missing {stage:?} entry point '{entry}'"),
        });
    }

    Ok(module)
}

fn entry_point<'m>(module: &'m naga::Module, name: &str) -> Option<&'m naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.name == name)
}

/// Locations carried by a binding, or by each member of a struct type.
fn locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        out.insert(*location);
                    }
                }
            }
        }
    }
}

/// Checks that every fragment input is written by the vertex stage.
pub fn link_stages(vs: &naga::Module, fs: &naga::Module) -> Result<(), RenderError> {
    let link_error = |message: String| RenderError::Shader {
        stage: "link",
        message,
    };

    let vs_ep = entry_point(vs, VS_ENTRY)
        .ok_or_else(|| link_error(format!("vertex entry point '{VS_ENTRY}' not found")))?;
    let fs_ep = entry_point(fs, FS_ENTRY)
        .ok_or_else(|| link_error(format!("fragment entry point '{FS_ENTRY}' not found")))?;

    let mut outputs = BTreeSet::new();
    if let Some(result) = &vs_ep.function.result {
        locations(vs, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut inputs = BTreeSet::new();
    for arg in &fs_ep.function.arguments {
        locations(fs, arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let missing: Vec<u32> = inputs.difference(&outputs).copied().collect();
    if !missing.is_empty() {
        return Err(link_error(format!(
            "fragment reads locations {missing:?} that the vertex stage never writes"
        )));
    }
    Ok(())
}

// ── pipeline ──────────────────────────────────────────────────────────────

/// Compiled tile-grid program plus its fixed buffers and uniform bindings.
pub struct ShaderPipeline {
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    uniform_bind_group: wgpu::BindGroup,
    clip_ubo: wgpu::Buffer,
    scale_ubo: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

fn ubo_size<T>() -> Option<NonZeroU64> {
    NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

fn table_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

impl ShaderPipeline {
    /// Validates and links the two stages, then builds the render pipeline.
    ///
    /// Any failure here is fatal; nothing is retried.
    pub fn initialize(
        ctx: &RenderCtx<'_>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, RenderError> {
        let vs_module =
            validate_stage(vertex_source, "vertex", VS_ENTRY, naga::ShaderStage::Vertex)?;
        let fs_module = validate_stage(
            fragment_source,
            "fragment",
            FS_ENTRY,
            naga::ShaderStage::Fragment,
        )?;
        link_stages(&vs_module, &fs_module)?;

        let device = ctx.device;

        let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera tile grid vs"),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera tile grid fs"),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera texture bgl"),
            entries: &[
                table_entry(0), // u_tiles
                table_entry(1), // u_tile_map
                table_entry(2), // u_src_to_origin
                table_entry(3), // u_origin_to_dest
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera uniform bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: ubo_size::<ClipMatrix>(),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: ubo_size::<[f32; 4]>(),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera tile grid pipeline layout"),
            bind_group_layouts: &[&texture_layout, &uniform_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tessera tile grid pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(VS_ENTRY),
                compilation_options: Default::default(),
                buffers: &[GridVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(FS_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let clip_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessera clip matrix ubo"),
            contents: bytemuck::bytes_of(&ClipMatrix::IDENTITY),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let scale_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessera scale ubo"),
            contents: bytemuck::cast_slice(&GridScale::IDENTITY.as_mat2()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera uniform bind group"),
            layout: &uniform_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: clip_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: scale_ubo.as_entire_binding(),
                },
            ],
        });

        let indices = fan_to_triangle_list(&FAN_INDICES);
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessera grid ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!("tile grid pipeline ready for {:?}", ctx.surface_format);

        Ok(Self {
            pipeline,
            texture_layout,
            uniform_bind_group,
            clip_ubo,
            scale_ubo,
            index_buffer,
            index_count: indices.len() as u32,
        })
    }

    /// Binds the four textures in their fixed slots.
    pub(super) fn create_texture_bind_group(
        &self,
        device: &wgpu::Device,
        atlas: &wgpu::TextureView,
        tile_map: &wgpu::TextureView,
        src_to_origin: &wgpu::TextureView,
        origin_to_dest: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera texture bind group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(atlas),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(tile_map),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(src_to_origin),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(origin_to_dest),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Sets the uniforms and records one indexed draw of the grid quad.
    pub(super) fn draw(
        &self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        textures: &wgpu::BindGroup,
        vertex_buffer: &wgpu::Buffer,
        clip_matrix: &ClipMatrix,
        scale: GridScale,
    ) {
        ctx.queue
            .write_buffer(&self.clip_ubo, 0, bytemuck::bytes_of(clip_matrix));
        ctx.queue
            .write_buffer(&self.scale_ubo, 0, bytemuck::cast_slice(&scale.as_mat2()));

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera tile grid pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(target.clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, textures, &[]);
        rpass.set_bind_group(1, &self.uniform_bind_group, &[]);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── indices ──

    #[test]
    fn quad_fan_becomes_two_triangles() {
        assert_eq!(fan_to_triangle_list(&FAN_INDICES), vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn degenerate_fans() {
        assert!(fan_to_triangle_list(&[]).is_empty());
        assert!(fan_to_triangle_list(&[0, 1]).is_empty());
        assert_eq!(fan_to_triangle_list(&[4, 5, 6]), vec![4, 5, 6]);
    }

    // ── shader checks ──

    #[test]
    fn bundled_shaders_validate_and_link() {
        let vs = validate_stage(TILE_GRID_VS, "vertex", VS_ENTRY, naga::ShaderStage::Vertex)
            .unwrap();
        let fs = validate_stage(
            TILE_GRID_FS,
            "fragment",
            FS_ENTRY,
            naga::ShaderStage::Fragment,
        )
        .unwrap();
        link_stages(&vs, &fs).unwrap();
    }

    #[test]
    fn syntax_error_is_reported_with_stage() {
        let err = validate_stage("fn vs_main( {", "vertex", VS_ENTRY, naga::ShaderStage::Vertex)
            .unwrap_err();
        match err {
            RenderError::Shader { stage, message } => {
                assert_eq!(stage, "vertex");
                assert!(!message.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn wrong_entry_point_is_rejected() {
        let err = validate_stage(TILE_GRID_FS, "vertex", VS_ENTRY, naga::ShaderStage::Vertex)
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("vs_main"));
    }

    #[test]
    fn unmatched_fragment_input_fails_link() {
        let fs_src = r#"
            @fragment
            fn fs_main(@location(0) a: vec2<f32>, @location(3) b: f32) -> @location(0) vec4<f32> {
                return vec4<f32>(a, b, 1.0);
            }
        "#;
        let vs = validate_stage(TILE_GRID_VS, "vertex", VS_ENTRY, naga::ShaderStage::Vertex)
            .unwrap();
        let fs = validate_stage(fs_src, "fragment", FS_ENTRY, naga::ShaderStage::Fragment)
            .unwrap();

        let err = link_stages(&vs, &fs).unwrap_err();
        assert!(matches!(err, RenderError::Shader { stage: "link", .. }));
        assert!(err.to_string().contains("[3]"));
    }
}
