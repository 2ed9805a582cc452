use std::mem;
use std::num::NonZeroU64;

use bytemuck::Pod;
use wgpu::util::DeviceExt;

use crate::renderer::uniforms::{SceneUniform, ViewUniform};

const INITIAL_SCENE_SLOTS: u32 = 16;

/// Immutable vertex and 16-bit index buffers.
#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    pub fn new<V: Pod>(device: &wgpu::Device, label: &str, vertices: &[V], indices: &[u16]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}VertexBuffer")),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}IndexBuffer")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// View-projection and camera position, bound at group 0.
pub(crate) struct ViewBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) bind_layout: wgpu::BindGroupLayout,
}

impl ViewBuffer {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let view = ViewUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ViewBuffer"),
            contents: bytemuck::bytes_of(&view),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ViewBindLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(mem::size_of::<ViewUniform>() as u64),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ViewBindGroup"),
            layout: &bind_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            bind_group,
            bind_layout,
        }
    }

    pub(crate) fn update(&self, queue: &wgpu::Queue, view: &ViewUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(view));
    }
}

/// Per-draw object uniforms, bound at group 1 with a dynamic offset.
///
/// Every draw of a frame gets its own aligned slot: writes are queued
/// before the pass is submitted, so a single slot rewritten between draws
/// would leave every draw with the last value.
pub(crate) struct SceneBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) bind_layout: wgpu::BindGroupLayout,
    capacity: u32,
    len: u32,
    stride: u32,
    scratch: Vec<u8>,
}

impl SceneBuffer {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SceneBindLayout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(mem::size_of::<SceneUniform>() as u64),
                },
                count: None,
            }],
        });

        let stride = align_to(
            mem::size_of::<SceneUniform>() as u32,
            device.limits().min_uniform_buffer_offset_alignment,
        );
        let (buffer, bind_group) =
            Self::create_storage(device, &bind_layout, stride, INITIAL_SCENE_SLOTS);

        Self {
            buffer,
            bind_group,
            bind_layout,
            capacity: INITIAL_SCENE_SLOTS,
            len: 0,
            stride,
            scratch: Vec::with_capacity((stride * INITIAL_SCENE_SLOTS) as usize),
        }
    }

    fn create_storage(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u32,
        capacity: u32,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SceneBuffer"),
            size: stride as u64 * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SceneBindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(mem::size_of::<SceneUniform>() as u64),
                }),
            }],
        });

        (buffer, bind_group)
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    pub(crate) fn stride(&self) -> u32 {
        self.stride
    }

    pub(crate) fn begin_frame(&mut self) {
        self.scratch.clear();
        self.len = 0;
    }

    /// Queues `uniform` for this frame and returns its dynamic offset.
    pub(crate) fn push(&mut self, uniform: SceneUniform) -> u32 {
        let offset = slot_offset(self.len, self.stride);
        self.len += 1;
        self.scratch.extend_from_slice(bytemuck::bytes_of(&uniform));
        self.scratch.resize(slot_offset(self.len, self.stride) as usize, 0);
        offset
    }

    pub(crate) fn flush(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if let Some(new_capacity) = grown_capacity(self.capacity, self.len) {
            self.grow(device, new_capacity);
        }

        if !self.scratch.is_empty() {
            queue.write_buffer(&self.buffer, 0, &self.scratch);
        }
    }

    fn grow(&mut self, device: &wgpu::Device, new_capacity: u32) {
        log::info!(
            "Growing scene buffer: {} -> {} slots",
            self.capacity,
            new_capacity
        );

        let (buffer, bind_group) =
            Self::create_storage(device, &self.bind_layout, self.stride, new_capacity);
        self.buffer = buffer;
        self.bind_group = bind_group;
        self.capacity = new_capacity;
    }
}

fn slot_offset(index: u32, stride: u32) -> u32 {
    index * stride
}

/// Slot count after growing to hold `required` slots, doubling at least.
/// `None` when `capacity` already suffices.
fn grown_capacity(capacity: u32, required: u32) -> Option<u32> {
    (required > capacity).then(|| required.max(capacity * 2))
}

pub(crate) fn align_to(size: u32, alignment: u32) -> u32 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}
