//! Surface materials.
//!
//! A material is either a plain set of Phong colors or a set of texture maps.
//! Renderers dispatch on the variant exactly once, in [`Material::binding`].

use glam::Vec3;

/// Texture unit a map is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSlot(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicMaterial {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturedMaterial {
    pub diffuse_map: TextureSlot,
    pub specular_map: TextureSlot,
    /// Glow map added on top of the lit color.
    pub emission_map: Option<TextureSlot>,
    pub shininess: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Basic { name: String, material: BasicMaterial },
    Textured { name: String, material: TexturedMaterial },
}

pub const MATERIAL_KIND_BASIC: u32 = 0;
pub const MATERIAL_KIND_TEXTURED: u32 = 1;

/// Material block as laid out in the scene shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
    pub kind: u32,
    pub has_emission: u32,
    pub _pad: f32,
}

/// Everything the renderer needs to draw with a material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialBinding {
    pub uniform: MaterialUniform,
    /// Diffuse, specular and (optionally) emission, in that order.
    pub textures: Vec<TextureSlot>,
}

impl Material {
    pub fn basic(name: impl Into<String>, material: BasicMaterial) -> Self {
        Material::Basic { name: name.into(), material }
    }

    pub fn textured(name: impl Into<String>, material: TexturedMaterial) -> Self {
        Material::Textured { name: name.into(), material }
    }

    pub fn name(&self) -> &str {
        match self {
            Material::Basic { name, .. } | Material::Textured { name, .. } => name,
        }
    }

    pub fn shininess(&self) -> f32 {
        match self {
            Material::Basic { material, .. } => material.shininess,
            Material::Textured { material, .. } => material.shininess,
        }
    }

    pub fn binding(&self) -> MaterialBinding {
        match self {
            Material::Basic { material, .. } => MaterialBinding {
                uniform: MaterialUniform {
                    ambient: material.ambient.extend(1.0).to_array(),
                    diffuse: material.diffuse.extend(1.0).to_array(),
                    specular: material.specular.extend(1.0).to_array(),
                    shininess: material.shininess,
                    kind: MATERIAL_KIND_BASIC,
                    has_emission: 0,
                    _pad: 0.0,
                },
                textures: Vec::new(),
            },
            Material::Textured { material, .. } => {
                let mut textures = vec![material.diffuse_map, material.specular_map];
                textures.extend(material.emission_map);
                MaterialBinding {
                    uniform: MaterialUniform {
                        ambient: [1.0; 4],
                        diffuse: [1.0; 4],
                        specular: [1.0; 4],
                        shininess: material.shininess,
                        kind: MATERIAL_KIND_TEXTURED,
                        has_emission: u32::from(material.emission_map.is_some()),
                        _pad: 0.0,
                    },
                    textures,
                }
            }
        }
    }
}

const fn rgb(r: f32, g: f32, b: f32) -> Vec3 {
    Vec3::new(r, g, b)
}

const fn phong(ambient: Vec3, diffuse: Vec3, specular: Vec3, shininess: f32) -> BasicMaterial {
    BasicMaterial { ambient, diffuse, specular, shininess }
}

/// Presets list shininess as a fraction of 128.
const SHINY: f32 = 128.0;

impl BasicMaterial {
    pub const EMERALD: Self = phong(rgb(0.0215, 0.1745, 0.0215), rgb(0.07568, 0.61424, 0.07568), rgb(0.633, 0.727811, 0.633), 0.6 * SHINY);
    pub const JADE: Self = phong(rgb(0.135, 0.2225, 0.1575), rgb(0.54, 0.89, 0.63), rgb(0.316228, 0.316228, 0.316228), 0.1 * SHINY);
    pub const OBSIDIAN: Self = phong(rgb(0.05375, 0.05, 0.06625), rgb(0.18275, 0.17, 0.22525), rgb(0.332741, 0.328634, 0.346435), 0.3 * SHINY);
    pub const PEARL: Self = phong(rgb(0.25, 0.20725, 0.20725), rgb(1.0, 0.829, 0.829), rgb(0.296648, 0.296648, 0.296648), 0.088 * SHINY);
    pub const RUBY: Self = phong(rgb(0.1745, 0.01175, 0.01175), rgb(0.61424, 0.04136, 0.04136), rgb(0.727811, 0.626959, 0.626959), 0.6 * SHINY);
    pub const TURQUOISE: Self = phong(rgb(0.1, 0.18725, 0.1745), rgb(0.396, 0.74151, 0.69102), rgb(0.297254, 0.30829, 0.306678), 0.1 * SHINY);
    pub const BRASS: Self = phong(rgb(0.329412, 0.223529, 0.027451), rgb(0.780392, 0.568627, 0.113725), rgb(0.992157, 0.941176, 0.807843), 0.21794872 * SHINY);
    pub const BRONZE: Self = phong(rgb(0.2125, 0.1275, 0.054), rgb(0.714, 0.4284, 0.18144), rgb(0.393548, 0.271906, 0.166721), 0.2 * SHINY);
    pub const CHROME: Self = phong(rgb(0.25, 0.25, 0.25), rgb(0.4, 0.4, 0.4), rgb(0.774597, 0.774597, 0.774597), 0.6 * SHINY);
    pub const COPPER: Self = phong(rgb(0.19125, 0.0735, 0.0225), rgb(0.7038, 0.27048, 0.0828), rgb(0.256777, 0.137622, 0.086014), 0.1 * SHINY);
    pub const GOLD: Self = phong(rgb(0.24725, 0.1995, 0.0745), rgb(0.75164, 0.60648, 0.22648), rgb(0.628281, 0.555802, 0.366065), 0.4 * SHINY);
    pub const SILVER: Self = phong(rgb(0.19225, 0.19225, 0.19225), rgb(0.50754, 0.50754, 0.50754), rgb(0.508273, 0.508273, 0.508273), 0.4 * SHINY);

    pub const PRESETS: [(&'static str, BasicMaterial); 12] = [
        ("emerald", Self::EMERALD),
        ("jade", Self::JADE),
        ("obsidian", Self::OBSIDIAN),
        ("pearl", Self::PEARL),
        ("ruby", Self::RUBY),
        ("turquoise", Self::TURQUOISE),
        ("brass", Self::BRASS),
        ("bronze", Self::BRONZE),
        ("chrome", Self::CHROME),
        ("copper", Self::COPPER),
        ("gold", Self::GOLD),
        ("silver", Self::SILVER),
    ];

    pub fn preset(name: &str) -> Option<BasicMaterial> {
        Self::PRESETS
            .iter()
            .find(|(preset_name, _)| preset_name.eq_ignore_ascii_case(name))
            .map(|(_, material)| *material)
    }
}

/// Wooden container with a steel rim; maps live in slots 0, 1 and 2.
pub const CONTAINER: TexturedMaterial = TexturedMaterial {
    diffuse_map: TextureSlot(0),
    specular_map: TextureSlot(1),
    emission_map: None,
    shininess: 32.0,
};

/// The textured container followed by every Phong preset.
pub fn catalogue(with_emission: bool) -> Vec<Material> {
    let container = TexturedMaterial {
        emission_map: with_emission.then_some(TextureSlot(2)),
        ..CONTAINER
    };
    std::iter::once(Material::textured("container", container))
        .chain(
            BasicMaterial::PRESETS
                .iter()
                .map(|(name, material)| Material::basic(*name, *material)),
        )
        .collect()
}
