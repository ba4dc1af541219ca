//! Materials and the shader-binding descriptor handed to the renderer.
//!
//! Every material reduces to a [`ShaderBinding`]. Its hash is the batching
//! key: two leaves whose bindings hash equal can share a draw call.

use crate::hash::HashKey;
use crate::id::{AssetName, ShaderId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shader used for [`Basic`] materials.
pub const BASIC_SHADER_ID: &str = "easel_basic";

/// Uniform name carrying [`Basic::alpha`].
pub const ALPHA_UNIFORM: &str = "ALPHA";

// ─── Uniform values ──────────────────────────────────────────────────────

/// A numeric or vector uniform value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShaderPrimitive {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl ShaderPrimitive {
    fn components(&self) -> &[f32] {
        match self {
            Self::Float(v) => std::slice::from_ref(v),
            Self::Vec2(v) => v,
            Self::Vec3(v) => v,
            Self::Vec4(v) => v,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::Float(_) => "f",
            Self::Vec2(_) => "v2",
            Self::Vec3(_) => "v3",
            Self::Vec4(_) => "v4",
        }
    }
}

pub type Uniforms = BTreeMap<String, ShaderPrimitive>;

fn hash_uniforms(mut key: HashKey, uniforms: &Uniforms) -> HashKey {
    // BTreeMap iterates in name order, so insertion order never leaks into the key
    for (name, value) in uniforms {
        key = key
            .field("u", name)
            .floats(value.tag(), value.components());
    }
    key
}

// ─── Shader binding ──────────────────────────────────────────────────────

/// Canonical description of what the renderer must bind to draw a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderBinding {
    pub shader_id: ShaderId,
    pub uniforms: Uniforms,
    pub channel0: Option<AssetName>,
    pub channel1: Option<AssetName>,
    pub channel2: Option<AssetName>,
    pub channel3: Option<AssetName>,
}

impl ShaderBinding {
    pub fn new(shader_id: ShaderId) -> Self {
        Self {
            shader_id,
            uniforms: Uniforms::new(),
            channel0: None,
            channel1: None,
            channel2: None,
            channel3: None,
        }
    }

    /// Replace the uniform mapping wholesale.
    #[must_use]
    pub fn with_uniforms<K, I>(self, uniforms: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ShaderPrimitive)>,
    {
        Self {
            uniforms: uniforms.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..self
        }
    }

    /// Overlay onto the existing uniforms. On a name collision the new value wins.
    #[must_use]
    pub fn add_uniforms<K, I>(mut self, uniforms: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ShaderPrimitive)>,
    {
        self.uniforms
            .extend(uniforms.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    #[must_use]
    pub fn with_channel0(self, texture: AssetName) -> Self {
        Self {
            channel0: Some(texture),
            ..self
        }
    }

    #[must_use]
    pub fn with_channel1(self, texture: AssetName) -> Self {
        Self {
            channel1: Some(texture),
            ..self
        }
    }

    #[must_use]
    pub fn with_channel2(self, texture: AssetName) -> Self {
        Self {
            channel2: Some(texture),
            ..self
        }
    }

    #[must_use]
    pub fn with_channel3(self, texture: AssetName) -> Self {
        Self {
            channel3: Some(texture),
            ..self
        }
    }

    /// Unbind channel `index`. Indices past 3 are ignored.
    #[must_use]
    pub fn clear_channel(mut self, index: usize) -> Self {
        match index {
            0 => self.channel0 = None,
            1 => self.channel1 = None,
            2 => self.channel2 = None,
            3 => self.channel3 = None,
            _ => {}
        }
        self
    }

    pub fn channels(&self) -> [Option<AssetName>; 4] {
        [self.channel0, self.channel1, self.channel2, self.channel3]
    }

    pub fn hash(&self) -> String {
        let key = HashKey::new("binding").field("shader", self.shader_id.as_str());
        let key = hash_uniforms(key, &self.uniforms);
        self.channels()
            .iter()
            .zip(["c0", "c1", "c2", "c3"])
            .fold(key, |key, (channel, tag)| {
                key.optional(tag, channel.as_ref().map(AssetName::as_str))
            })
            .finish()
    }
}

// ─── Materials ───────────────────────────────────────────────────────────

/// A single diffuse texture drawn with uniform alpha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basic {
    pub diffuse: AssetName,
    pub alpha: f32,
}

impl Basic {
    pub fn new(diffuse: AssetName) -> Self {
        Self {
            diffuse,
            alpha: 1.0,
        }
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    #[must_use]
    pub fn with_diffuse(self, diffuse: AssetName) -> Self {
        Self { diffuse, ..self }
    }

    pub fn to_shader_binding(&self) -> ShaderBinding {
        ShaderBinding::new(ShaderId::intern(BASIC_SHADER_ID))
            .with_uniforms([(ALPHA_UNIFORM, ShaderPrimitive::Float(self.alpha))])
            .with_channel0(self.diffuse)
    }

    pub fn hash(&self) -> String {
        HashKey::new("basic")
            .field("diffuse", self.diffuse.as_str())
            .float("alpha", self.alpha)
            .finish()
    }
}

/// A custom shader with user-supplied uniforms and up to four texture channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlslShader {
    binding: ShaderBinding,
}

impl GlslShader {
    pub fn new(shader_id: ShaderId) -> Self {
        Self {
            binding: ShaderBinding::new(shader_id),
        }
    }

    pub fn shader_id(&self) -> ShaderId {
        self.binding.shader_id
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.binding.uniforms
    }

    pub fn channels(&self) -> [Option<AssetName>; 4] {
        self.binding.channels()
    }

    #[must_use]
    pub fn with_uniforms<K, I>(self, uniforms: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ShaderPrimitive)>,
    {
        Self {
            binding: self.binding.with_uniforms(uniforms),
        }
    }

    #[must_use]
    pub fn add_uniforms<K, I>(self, uniforms: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ShaderPrimitive)>,
    {
        Self {
            binding: self.binding.add_uniforms(uniforms),
        }
    }

    #[must_use]
    pub fn with_channel0(self, texture: AssetName) -> Self {
        Self {
            binding: self.binding.with_channel0(texture),
        }
    }

    #[must_use]
    pub fn with_channel1(self, texture: AssetName) -> Self {
        Self {
            binding: self.binding.with_channel1(texture),
        }
    }

    #[must_use]
    pub fn with_channel2(self, texture: AssetName) -> Self {
        Self {
            binding: self.binding.with_channel2(texture),
        }
    }

    #[must_use]
    pub fn with_channel3(self, texture: AssetName) -> Self {
        Self {
            binding: self.binding.with_channel3(texture),
        }
    }

    pub fn to_shader_binding(&self) -> ShaderBinding {
        self.binding.clone()
    }

    pub fn hash(&self) -> String {
        self.binding.hash()
    }
}

/// How a renderable leaf's surface is shaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Material {
    Basic(Basic),
    GlslShader(GlslShader),
}

impl Material {
    /// Shorthand for a fully opaque [`Basic`] material.
    pub fn basic(diffuse: &str) -> Self {
        Self::Basic(Basic::new(AssetName::intern(diffuse)))
    }

    pub fn to_shader_binding(&self) -> ShaderBinding {
        match self {
            Self::Basic(m) => m.to_shader_binding(),
            Self::GlslShader(m) => m.to_shader_binding(),
        }
    }

    /// Batching key. Pure, total, and a function of exactly the fields that
    /// affect rendered output.
    ///
    /// The key starts with the variant, so a [`GlslShader`] whose binding
    /// equals a [`Basic`]'s still hashes differently and the two never share
    /// a batch.
    pub fn hash(&self) -> String {
        match self {
            Self::Basic(m) => m.hash(),
            Self::GlslShader(m) => m.hash(),
        }
    }
}

impl From<ShaderBinding> for GlslShader {
    fn from(binding: ShaderBinding) -> Self {
        Self { binding }
    }
}

impl From<Basic> for Material {
    fn from(m: Basic) -> Self {
        Self::Basic(m)
    }
}

impl From<GlslShader> for Material {
    fn from(m: GlslShader) -> Self {
        Self::GlslShader(m)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
