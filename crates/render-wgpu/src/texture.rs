use crate::RenderError;
use crate::shaders::TEXTURE_GROUP_BASE;
use heightfield_assets::{AddressMode, Heightmap, TextureUnit, TextureUnitAllocator};

/// Heightmap uploaded to the GPU with its sampler and texture unit.
pub struct HeightmapTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    unit: TextureUnit,
}

fn wgpu_address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
        AddressMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
    }
}

impl HeightmapTexture {
    /// Upload `heightmap` as an `Rgba8Unorm` texture on the next free unit
    /// of `units`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        heightmap: &Heightmap,
        units: &mut TextureUnitAllocator,
        address_mode: AddressMode,
    ) -> Result<Self, RenderError> {
        let limit = device.limits().max_texture_dimension_2d;
        if heightmap.width() > limit || heightmap.height() > limit {
            return Err(RenderError::TextureTooLarge {
                width: heightmap.width(),
                height: heightmap.height(),
                limit,
            });
        }
        let unit = units.allocate()?;

        let size = wgpu::Extent3d {
            width: heightmap.width(),
            height: heightmap.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("heightmap_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            heightmap.rgba(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(heightmap.bytes_per_row()),
                rows_per_image: Some(heightmap.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let address = wgpu_address_mode(address_mode);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("heightmap_sampler"),
            address_mode_u: address,
            address_mode_v: address,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        tracing::debug!(
            "uploaded heightmap {}x{} on texture unit {} ({address_mode})",
            heightmap.width(),
            heightmap.height(),
            unit.index()
        );

        Ok(Self {
            texture,
            view,
            sampler,
            unit,
        })
    }

    pub fn unit(&self) -> TextureUnit {
        self.unit
    }

    /// Bind group slot this texture occupies in the terrain pipeline.
    pub fn bind_group_index(&self) -> u32 {
        TEXTURE_GROUP_BASE + self.unit.index()
    }

    pub fn size(&self) -> wgpu::Extent3d {
        self.texture.size()
    }

    pub(crate) fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("heightmap_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    pub(crate) fn create_bind_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("heightmap_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_modes_map_to_wgpu() {
        assert_eq!(
            wgpu_address_mode(AddressMode::Clamp),
            wgpu::AddressMode::ClampToEdge
        );
        assert_eq!(
            wgpu_address_mode(AddressMode::MirrorRepeat),
            wgpu::AddressMode::MirrorRepeat
        );
    }
}
