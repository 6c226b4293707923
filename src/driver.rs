use std::{io::Write, path::PathBuf};

use anyhow::Context;

use crate::transcode::{self, Escaping, Stage};

/// Shader base names embedded when none are given, in output order.
pub const DEFAULT_SHADERS: [&str; 5] = ["P", "PC", "PNCT", "PNT", "PT"];

pub const DEFAULT_INPUT_DIR: &str = ".";

pub const DEFAULT_OUTPUT: &str = "output.js";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory containing the `<name>.vert` and `<name>.frag` sources.
    pub input_dir: PathBuf,
    /// File the assignments are written to. Replaced on every successful run.
    pub output: PathBuf,
    pub shaders: Vec<String>,
    pub escaping: Escaping,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT),
            shaders: DEFAULT_SHADERS.iter().map(|name| name.to_string()).collect(),
            escaping: Escaping::default(),
        }
    }
}

/// Which stages ended up in the output, per shader.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub shaders: Vec<(String, Vec<Stage>)>,
}

impl Summary {
    pub fn stage_count(&self) -> usize {
        self.shaders.iter().map(|(_, stages)| stages.len()).sum()
    }

    /// Shaders for which neither source existed.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.shaders
            .iter()
            .filter(|(_, stages)| stages.is_empty())
            .map(|(name, _)| name.as_str())
    }
}

/// Transcodes every configured shader into `out`, in list order.
pub fn generate<W: Write + ?Sized>(config: &Config, out: &mut W) -> anyhow::Result<Summary> {
    let mut summary = Summary::default();

    for name in &config.shaders {
        let stages = transcode::transcode(&config.input_dir, name, config.escaping, out)
            .with_context(|| format!("could not transcode shader '{name}'"))?;
        summary.shaders.push((name.clone(), stages));
    }

    Ok(summary)
}

/// Generates the configured shaders and replaces the output file with the result.
///
/// The output is only touched once every shader has been transcoded, so a failed run leaves the
/// previous file in place.
pub fn run(config: &Config) -> anyhow::Result<Summary> {
    let mut out = Vec::new();
    let summary = generate(config, &mut out)?;

    std::fs::write(&config.output, &out)
        .with_context(|| format!("could not write '{}'", config.output.display()))?;

    for name in summary.missing() {
        debug!(name, "no sources found");
    }

    info!(
        output = %config.output.display(),
        shaders = summary.shaders.len(),
        stages = summary.stage_count(),
        "generated shader sources"
    );

    Ok(summary)
}
