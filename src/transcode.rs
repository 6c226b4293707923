use std::{
    fmt, io,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;

/// A shader stage, each with its own source file and output variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    /// Stages in the order they are emitted for a shader.
    pub const ALL: [Stage; 2] = [Stage::Vertex, Stage::Fragment];

    pub fn extension(self) -> &'static str {
        match self {
            Stage::Vertex => "vert",
            Stage::Fragment => "frag",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Stage::Vertex => "src_vertexshader_",
            Stage::Fragment => "src_fragmentshader_",
        }
    }

    /// Closes the string literal. Only fragment assignments are followed by a blank line.
    pub fn terminator(self) -> &'static str {
        match self {
            Stage::Vertex => "\";",
            Stage::Fragment => "\";\n\n",
        }
    }

    pub fn source_path(self, input_dir: &Path, name: &str) -> PathBuf {
        input_dir.join(format!("{name}.{}", self.extension()))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// How shader bytes are turned into string literal content.
///
/// `Compatible` only normalizes line endings: carriage returns are dropped and line feeds become
/// a `\n` escape. Quotes and backslashes are copied through as-is, so a shader containing either
/// yields a broken literal. Existing consumers of the generated file rely on this, so it stays
/// the default. `Strict` also escapes `"` and `\`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escaping {
    #[default]
    Compatible,
    Strict,
}

pub fn escape_into<W: Write + ?Sized>(
    source: &[u8],
    escaping: Escaping,
    out: &mut W,
) -> io::Result<()> {
    // plain bytes are written in runs between replacements
    let mut start = 0;

    for (index, &byte) in source.iter().enumerate() {
        let replacement: &[u8] = match (byte, escaping) {
            (b'\r', _) => b"",
            (b'\n', _) => b"\\n",
            (b'"', Escaping::Strict) => b"\\\"",
            (b'\\', Escaping::Strict) => b"\\\\",
            _ => continue,
        };

        out.write_all(&source[start..index])?;
        out.write_all(replacement)?;
        start = index + 1;
    }

    out.write_all(&source[start..])
}

fn write_assignment<W: Write + ?Sized>(
    stage: Stage,
    name: &str,
    source: &[u8],
    escaping: Escaping,
    out: &mut W,
) -> io::Result<()> {
    write!(out, "\n{}{name}= \"", stage.prefix())?;
    escape_into(source, escaping, out)?;
    out.write_all(stage.terminator().as_bytes())
}

/// Appends the assignments for the vertex and fragment sources of `name` to `out`.
///
/// A stage whose source file does not exist is skipped without emitting anything. Returns the
/// stages that were written.
pub fn transcode<W: Write + ?Sized>(
    input_dir: &Path,
    name: &str,
    escaping: Escaping,
    out: &mut W,
) -> anyhow::Result<Vec<Stage>> {
    let mut emitted = Vec::with_capacity(Stage::ALL.len());

    for stage in Stage::ALL {
        let path = stage.source_path(input_dir, name);

        let source = match std::fs::read(&path) {
            Ok(source) => source,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no {stage} source, skipping");
                continue;
            }
            Err(error) => {
                return Err(error).with_context(|| format!("could not read '{}'", path.display()))
            }
        };

        write_assignment(stage, name, &source, escaping, out)
            .with_context(|| format!("could not write {stage} shader '{name}'"))?;

        debug!(path = %path.display(), bytes = source.len(), "embedded {stage} source");
        emitted.push(stage);
    }

    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(source: &[u8], escaping: Escaping) -> Vec<u8> {
        let mut out = Vec::new();
        escape_into(source, escaping, &mut out).unwrap();
        out
    }

    fn transcode_to_string(dir: &Path, name: &str) -> String {
        let mut out = Vec::new();
        transcode(dir, name, Escaping::Compatible, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn line_feed_becomes_escape() {
        assert_eq!(escape(b"a\nb\n", Escaping::Compatible), b"a\\nb\\n");
    }

    #[test]
    fn carriage_return_is_dropped() {
        assert_eq!(escape(b"a\rb", Escaping::Compatible), b"ab");
        assert_eq!(escape(b"\r\r", Escaping::Compatible), b"");
    }

    #[test]
    fn crlf_collapses_to_single_escape() {
        assert_eq!(
            escape(b"line one\r\nline two\r\n", Escaping::Compatible),
            b"line one\\nline two\\n"
        );
    }

    #[test]
    fn other_bytes_pass_through() {
        let source = "precision mediump float;\tvoid main() { gl_FragColor = vec4(1.0); } // \u{e9}";
        assert_eq!(escape(source.as_bytes(), Escaping::Compatible), source.as_bytes());

        let invalid_utf8 = [0xff, 0x00, 0x80, b'x'];
        assert_eq!(escape(&invalid_utf8, Escaping::Compatible), invalid_utf8);
    }

    #[test]
    fn compatible_keeps_quotes_and_backslashes() {
        assert_eq!(escape(br#"say "hi" \o/"#, Escaping::Compatible), br#"say "hi" \o/"#);
    }

    #[test]
    fn strict_escapes_quotes_and_backslashes() {
        assert_eq!(
            escape(b"say \"hi\" \\o/\r\n", Escaping::Strict),
            b"say \\\"hi\\\" \\\\o/\\n"
        );
    }

    #[test]
    fn emits_vertex_before_fragment() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("PC.vert"), "attribute vec3 aPosition;\r\n").unwrap();
        std::fs::write(dir.path().join("PC.frag"), "void main() {}\n").unwrap();

        let mut out = Vec::new();
        let emitted = transcode(dir.path(), "PC", Escaping::Compatible, &mut out).unwrap();

        assert_eq!(emitted, Stage::ALL);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nsrc_vertexshader_PC= \"attribute vec3 aPosition;\\n\";\
             \nsrc_fragmentshader_PC= \"void main() {}\\n\";\n\n"
        );
    }

    #[test]
    fn vertex_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("P.vert"), "hello\nworld").unwrap();

        let output = transcode_to_string(dir.path(), "P");

        assert_eq!(output, "\nsrc_vertexshader_P= \"hello\\nworld\";");
        assert!(!output.contains("src_fragmentshader_P"));
    }

    #[test]
    fn fragment_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("PT.frag"), "x").unwrap();

        let mut out = Vec::new();
        let emitted = transcode(dir.path(), "PT", Escaping::Compatible, &mut out).unwrap();

        assert_eq!(emitted, [Stage::Fragment]);
        assert_eq!(out, b"\nsrc_fragmentshader_PT= \"x\";\n\n");
    }

    #[test]
    fn missing_shader_emits_nothing() {
        let dir = tempfile::tempdir().unwrap();

        let mut out = Vec::new();
        let emitted = transcode(dir.path(), "PNCT", Escaping::Compatible, &mut out).unwrap();

        assert!(emitted.is_empty());
        assert!(out.is_empty());
    }

    #[test]
    fn empty_source_emits_empty_literal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("P.vert"), "").unwrap();

        assert_eq!(transcode_to_string(dir.path(), "P"), "\nsrc_vertexshader_P= \"\";");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("PNT.vert"), "void main() {}").unwrap();

        let error =
            transcode(dir.path(), "PNT", Escaping::Compatible, &mut BrokenPipe).unwrap_err();

        assert!(format!("{error:#}").contains("could not write vertex shader 'PNT'"));
        let source = error.root_cause().downcast_ref::<io::Error>().unwrap();
        assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn unreadable_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("P.vert")).unwrap();

        let mut out = Vec::new();
        let error = transcode(dir.path(), "P", Escaping::Compatible, &mut out).unwrap_err();

        assert!(format!("{error:#}").contains("P.vert"));
    }
}
