//! Launch command generation.
//!
//! # Responsibilities
//! - Render the mirroring command from the template and current endpoint set
//! - Fall back to a placeholder command when no endpoints exist

use std::fs;
use std::path::Path;

use minijinja::{context, Environment};
use thiserror::Error;

use crate::source::Endpoint;

/// Sentinel emitted by the fallback process.
///
/// The process reaper matches this text literally, so it must stay stable
/// across releases.
pub const FALLBACK_MSG: &str = "No mirror source endpoints found.";

/// Placeholder long-running command used when no valid gor command can be
/// built. The external supervisor keeps the replay process slot filled
/// whether or not we have endpoints; a gap would look like a crash loop.
pub const FALLBACK_COMMAND: &str =
    "/bin/sh -c 'while true; do echo \"No mirror source endpoints found.\"; sleep 10; done'";

/// Errors raised while generating a command.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template file could not be read.
    #[error("failed to read template {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Template substitution failed.
    #[error("failed to render template: {0}")]
    Render(#[from] minijinja::Error),
}

/// Parameters substituted into the command template.
#[derive(Debug)]
pub struct CommandContext<'a> {
    /// Path to the gor binary.
    pub gor_path: &'a Path,

    /// Local ports to mirror.
    pub ports: &'a [u16],

    /// Current mirror destination endpoints.
    pub endpoints: &'a [Endpoint],

    /// Max QPS to mirror to each repeater.
    pub max_qps: u32,
}

/// Generate the gor launch command, or the fallback when no endpoints exist.
pub fn generate_command(
    template_path: &Path,
    ctx: &CommandContext<'_>,
) -> Result<String, RenderError> {
    if ctx.endpoints.is_empty() {
        return Ok(FALLBACK_COMMAND.to_string());
    }
    let raw = fs::read_to_string(template_path).map_err(|source| RenderError::Read {
        path: template_path.display().to_string(),
        source,
    })?;

    let env = Environment::new();
    let template = env.template_from_str(&raw)?;
    let endpoints: Vec<String> = ctx.endpoints.iter().map(ToString::to_string).collect();
    let command = template.render(context! {
        gor_path => ctx.gor_path.display().to_string(),
        ports => ctx.ports,
        endpoints => endpoints,
        max_qps => ctx.max_qps,
    })?;
    Ok(command)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_template(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn sample_context<'a>(endpoints: &'a [Endpoint], ports: &'a [u16]) -> CommandContext<'a> {
        CommandContext {
            gor_path: Path::new("/opt/go/bin/gor"),
            ports,
            endpoints,
            max_qps: 100,
        }
    }

    #[test]
    fn test_empty_endpoint_set_yields_fallback() {
        let ctx = sample_context(&[], &[8080]);
        // Template path is never touched when there is nothing to render.
        let command = generate_command(Path::new("/does/not/exist"), &ctx).unwrap();
        assert_eq!(command, FALLBACK_COMMAND);
    }

    #[test]
    fn test_fallback_embeds_sentinel() {
        assert!(FALLBACK_COMMAND.contains(FALLBACK_MSG));
    }

    #[test]
    fn test_render_substitutes_all_fields() {
        let template = write_template(
            "{{ gor_path }}\
             {% for port in ports %} --input-raw :{{ port }}{% endfor %}\
             {% for endpoint in endpoints %} --output-tcp {{ endpoint }}|{{ max_qps }}{% endfor %}",
        );
        let endpoints = [Endpoint::new("10.0.0.5", 9000)];
        let ports = [8080, 8081];
        let ctx = sample_context(&endpoints, &ports);

        let command = generate_command(template.path(), &ctx).unwrap();
        assert!(command.starts_with("/opt/go/bin/gor"));
        assert!(command.contains("--input-raw :8080"));
        assert!(command.contains("--input-raw :8081"));
        assert!(command.contains("--output-tcp 10.0.0.5:9000|100"));
    }

    #[test]
    fn test_missing_template_is_a_read_error() {
        let endpoints = [Endpoint::new("10.0.0.5", 9000)];
        let ports = [8080];
        let ctx = sample_context(&endpoints, &ports);
        let err = generate_command(Path::new("/does/not/exist"), &ctx).unwrap_err();
        assert!(matches!(err, RenderError::Read { .. }));
    }
}
