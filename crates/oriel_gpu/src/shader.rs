//! Shader source generation
//!
//! Shader programs are composed from small shader units. Each unit appends
//! its source contribution to the accumulating output; the first unit of its
//! stage within a program additionally emits the stage-entry boilerplate
//! that later units of the same stage extend.
//!
//! Only GLSL is generated. Requesting any other dialect is a hard failure:
//! source accepted by the wrong compiler produces undefined rendering
//! behavior, so there is no silent fallback.

use std::fmt;

use oriel_paint::Gradient;

use crate::gradient::{GradientDataCache, GradientShaderData};

/// Target shading language
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderLanguage {
    Glsl,
    Wgsl,
}

/// Pipeline stage a shader unit contributes to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Shader generation errors
#[derive(Debug)]
pub enum ShaderError {
    /// The requested target language is not supported by this generator
    UnsupportedLanguage(ShaderLanguage),
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::UnsupportedLanguage(language) => {
                write!(f, "unsupported shader language: {:?}", language)
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// A single shader unit within a program
pub trait Shader {
    /// Unique name within the owning program
    fn name(&self) -> &str;

    fn stage(&self) -> ShaderStage;

    /// Append this unit's source contribution to `output`. Nothing is
    /// appended when an error is returned.
    fn generate_code(
        &self,
        program: &dyn ShaderProgram,
        language: ShaderLanguage,
        output: &mut String,
    ) -> Result<(), ShaderError>;
}

/// Program-level queries consumed by shader units during generation
pub trait ShaderProgram {
    /// Whether `shader` is the first unit of its stage in this program (and
    /// therefore responsible for the stage-entry boilerplate)
    fn is_first_in_stage(&self, shader: &dyn Shader) -> bool;
}

const STANDARD_VERTEX_BOILERPLATE: &str = "\
void standard_vertex_shader(inout vec3 coord, inout vec4 color)
{
}
";

const STANDARD_FRAGMENT_BOILERPLATE: &str = "\
void standard_fragment_shader(inout vec4 color)
{
}
";

const GRADIENT_FRAGMENT_CODE: &str = "\
uniform bool uGradientEnabled;
uniform int uGradientDirection;
uniform int uGradientStopCount;
uniform float uGradientSmoothness;
uniform sampler2D uGradientStops;
uniform sampler2D uGradientStopColors;
uniform sampler2D uGradientFilter;
uniform vec4 uGradientBoundingBox;

vec4 gradient_color(float n)
{
    n = clamp(n, 0.0, 1.0);
    int firstStop = 0;
    int lastStop = uGradientStopCount - 1;
    for (int i = 0; i < lastStop; ++i)
    {
        float stopPos = texelFetch(uGradientStops, ivec2(i, 0), 0).r;
        if (stopPos <= n)
            firstStop = i;
    }
    int secondStop = min(firstStop + 1, lastStop);
    float firstPos = texelFetch(uGradientStops, ivec2(firstStop, 0), 0).r;
    float secondPos = texelFetch(uGradientStops, ivec2(secondStop, 0), 0).r;
    vec4 firstColor = texelFetch(uGradientStopColors, ivec2(firstStop, 0), 0);
    vec4 secondColor = texelFetch(uGradientStopColors, ivec2(secondStop, 0), 0);
    float span = secondPos - firstPos;
    float t = span > 0.0 ? (n - firstPos) / span : 0.0;
    return mix(firstColor, secondColor, clamp(t, 0.0, 1.0));
}

float gradient_position(vec2 coord)
{
    vec2 origin = uGradientBoundingBox.xy;
    vec2 extent = uGradientBoundingBox.zw;
    vec2 local = (coord - origin) / max(extent, vec2(1.0));
    if (uGradientDirection == 0)
        return local.x;
    if (uGradientDirection == 1)
        return local.y;
    return length(local - vec2(0.5)) * 2.0;
}

void gradient_shader(inout vec4 color)
{
    if (!uGradientEnabled)
        return;
    color = gradient_color(gradient_position(gl_FragCoord.xy));
}
";

/// Emit the stage-entry boilerplate if `shader` opens its stage
fn emit_stage_entry(
    program: &dyn ShaderProgram,
    shader: &dyn Shader,
    output: &mut String,
) {
    if program.is_first_in_stage(shader) {
        output.push_str(match shader.stage() {
            ShaderStage::Vertex => STANDARD_VERTEX_BOILERPLATE,
            ShaderStage::Fragment => STANDARD_FRAGMENT_BOILERPLATE,
        });
    }
}

/// Standard vertex shader: stage boilerplate only
pub struct StandardVertexShader;

impl Shader for StandardVertexShader {
    fn name(&self) -> &str {
        "standard_vertex_shader"
    }

    fn stage(&self) -> ShaderStage {
        ShaderStage::Vertex
    }

    fn generate_code(
        &self,
        program: &dyn ShaderProgram,
        language: ShaderLanguage,
        output: &mut String,
    ) -> Result<(), ShaderError> {
        if language != ShaderLanguage::Glsl {
            return Err(ShaderError::UnsupportedLanguage(language));
        }
        emit_stage_entry(program, self, output);
        Ok(())
    }
}

/// Standard fragment shader: stage boilerplate only
pub struct StandardFragmentShader;

impl Shader for StandardFragmentShader {
    fn name(&self) -> &str {
        "standard_fragment_shader"
    }

    fn stage(&self) -> ShaderStage {
        ShaderStage::Fragment
    }

    fn generate_code(
        &self,
        program: &dyn ShaderProgram,
        language: ShaderLanguage,
        output: &mut String,
    ) -> Result<(), ShaderError> {
        if language != ShaderLanguage::Glsl {
            return Err(ShaderError::UnsupportedLanguage(language));
        }
        emit_stage_entry(program, self, output);
        Ok(())
    }
}

/// Gradient fragment shader. Owns the gradient data cache and the currently
/// active gradient.
pub struct GradientShader {
    cache: GradientDataCache,
    active: Option<Gradient>,
}

impl GradientShader {
    pub fn new() -> Self {
        Self {
            cache: GradientDataCache::new(),
            active: None,
        }
    }

    /// Activate `gradient` for subsequent fills and return its sampling
    /// data, synthesizing and caching it as needed.
    pub fn set_gradient(&mut self, gradient: &Gradient) -> &GradientShaderData {
        self.active = Some(gradient.clone());
        self.cache.data(gradient)
    }

    /// Deactivate gradient fills
    pub fn clear_gradient(&mut self) {
        self.active = None;
    }

    pub fn active_gradient(&self) -> Option<&Gradient> {
        self.active.as_ref()
    }

    pub fn cache(&self) -> &GradientDataCache {
        &self.cache
    }

    /// Release every cached entry (including the transient overflow slot)
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for GradientShader {
    fn default() -> Self {
        Self::new()
    }
}

impl Shader for GradientShader {
    fn name(&self) -> &str {
        "gradient_shader"
    }

    fn stage(&self) -> ShaderStage {
        ShaderStage::Fragment
    }

    fn generate_code(
        &self,
        program: &dyn ShaderProgram,
        language: ShaderLanguage,
        output: &mut String,
    ) -> Result<(), ShaderError> {
        if language != ShaderLanguage::Glsl {
            return Err(ShaderError::UnsupportedLanguage(language));
        }
        emit_stage_entry(program, self, output);
        output.push_str(GRADIENT_FRAGMENT_CODE);
        Ok(())
    }
}

/// The renderer's standard program: vertex boilerplate, fragment
/// boilerplate, gradient fills.
pub struct StandardShaderProgram {
    vertex: StandardVertexShader,
    fragment: StandardFragmentShader,
    gradient: GradientShader,
}

impl StandardShaderProgram {
    pub fn new() -> Self {
        Self {
            vertex: StandardVertexShader,
            fragment: StandardFragmentShader,
            gradient: GradientShader::new(),
        }
    }

    fn shaders(&self) -> [&dyn Shader; 3] {
        [&self.vertex, &self.fragment, &self.gradient]
    }

    /// Generate the whole program's source for `language`
    pub fn generate(&self, language: ShaderLanguage) -> Result<String, ShaderError> {
        let mut output = String::new();
        for shader in self.shaders() {
            shader.generate_code(self, language, &mut output)?;
        }
        Ok(output)
    }

    pub fn gradient_shader(&self) -> &GradientShader {
        &self.gradient
    }

    pub fn gradient_shader_mut(&mut self) -> &mut GradientShader {
        &mut self.gradient
    }
}

impl Default for StandardShaderProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderProgram for StandardShaderProgram {
    fn is_first_in_stage(&self, shader: &dyn Shader) -> bool {
        self.shaders()
            .iter()
            .find(|unit| unit.stage() == shader.stage())
            .is_some_and(|first| first.name() == shader.name())
    }
}
