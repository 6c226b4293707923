use std::path::PathBuf;

use clap::Parser;

use crate::{
    driver::{Config, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT},
    transcode::Escaping,
};

/// Embeds vertex and fragment shader sources as JavaScript string assignments.
#[derive(Debug, Parser)]
#[command(name = "shader_to_js", version)]
pub struct Cli {
    /// Directory containing the `.vert` and `.frag` sources.
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    /// File to write the generated assignments to.
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Shader base name to embed. Repeat to build the list; replaces the default list.
    #[arg(short, long = "shader", value_name = "NAME")]
    pub shaders: Vec<String>,

    /// Also escape double quotes and backslashes in shader sources.
    #[arg(long)]
    pub strict_escaping: bool,

    /// Keep running and regenerate the output whenever a shader source changes.
    #[arg(short, long)]
    pub watch: bool,
}

impl Cli {
    pub fn config(&self) -> Config {
        let defaults = Config::default();

        Config {
            input_dir: self.input_dir.clone(),
            output: self.output.clone(),
            shaders: if self.shaders.is_empty() {
                defaults.shaders
            } else {
                self.shaders.clone()
            },
            escaping: if self.strict_escaping {
                Escaping::Strict
            } else {
                Escaping::Compatible
            },
        }
    }
}
