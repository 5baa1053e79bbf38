mod code;
mod config;
mod error;
mod escape;
mod latex;
mod parser;
mod render;
mod table;

pub use code::CodeTag;
pub use config::{CodeConfig, Config, ExtensionsConfig, FigureConfig, TableConfig};
pub use error::{Error, Result};
pub use escape::escape_latex;
pub use latex::{LatexRenderer, sectioning_command};
pub use render::{Alignment, AutolinkType, ListType, Render};
pub use table::Cell;

/// Convert markdown to LaTeX using the default config.
pub fn markdown_to_latex(markdown: &str) -> Result<String> {
    markdown_to_latex_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to LaTeX with a custom config.
pub fn markdown_to_latex_with_config(markdown: &str, config: &Config) -> Result<String> {
    let renderer = LatexRenderer::new(config);
    render_with(markdown, &config.extensions, &renderer)
}

/// Render markdown through any [`Render`] implementation.
pub fn render_with<R: Render + ?Sized>(
    markdown: &str,
    extensions: &ExtensionsConfig,
    renderer: &R,
) -> Result<String> {
    parser::render(markdown, extensions, renderer)
}
