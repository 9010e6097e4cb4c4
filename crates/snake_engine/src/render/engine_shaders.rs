//! GLSL sources for the shaders the engine registers at startup

/// Flat colour, `u_Color`
pub const DEFAULT_VERTEX: &str = r"#version 460 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec2 aUV;

uniform mat4 u_Model;
uniform mat4 u_View;
uniform mat4 u_Projection;

void main()
{
    gl_Position = u_Projection * u_View * u_Model * vec4(aPos, 1.0);
}
";

/// Flat colour fragment stage
pub const DEFAULT_FRAGMENT: &str = r"#version 460 core
uniform vec4 u_Color;
out vec4 FragColor;

void main()
{
    FragColor = u_Color;
}
";

/// Textured, sampled from `u_ErrorTexture`; backs the error material
pub const TEXTURED_VERTEX: &str = r"#version 460 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec2 aUV;
out vec2 v_UV;

uniform mat4 u_Model;
uniform mat4 u_View;
uniform mat4 u_Projection;

void main()
{
    gl_Position = u_Projection * u_View * u_Model * vec4(aPos, 1.0);
    v_UV = aUV;
}
";

/// Textured fragment stage
pub const TEXTURED_FRAGMENT: &str = r"#version 460 core
in vec2 v_UV;
out vec4 FragColor;

uniform vec4 u_Color;
uniform sampler2D u_ErrorTexture;

void main()
{
    FragColor = texture(u_ErrorTexture, v_UV) * u_Color;
}
";

/// Text: alpha from the red channel of `u_FontTexture`
pub const TEXT_VERTEX: &str = r"#version 460 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec2 aUV;
out vec2 v_TexCoord;

uniform mat4 u_Model;
uniform mat4 u_View;
uniform mat4 u_Projection;

void main()
{
    v_TexCoord = aUV;
    gl_Position = u_Projection * u_View * u_Model * vec4(aPos, 1.0);
}
";

/// Text fragment stage
pub const TEXT_FRAGMENT: &str = r"#version 460 core
in vec2 v_TexCoord;
out vec4 FragColor;

uniform sampler2D u_FontTexture;
uniform vec4 u_Color;

void main()
{
    float alpha = texture(u_FontTexture, v_TexCoord).r;
    FragColor = vec4(u_Color.rgb, alpha * u_Color.a);
}
";

/// Debug lines: interleaved position and colour, no model matrix
pub const DEBUG_LINE_VERTEX: &str = r"#version 460 core
layout (location = 0) in vec2 aPos;
layout (location = 1) in vec4 aColor;
out vec4 v_Color;

uniform mat4 u_View;
uniform mat4 u_Projection;

void main()
{
    v_Color = aColor;
    gl_Position = u_Projection * u_View * vec4(aPos, 0.0, 1.0);
}
";

/// Debug line fragment stage
pub const DEBUG_LINE_FRAGMENT: &str = r"#version 460 core
in vec4 v_Color;
out vec4 FragColor;

void main()
{
    FragColor = v_Color;
}
";
