use anyhow::{bail, Context};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub scene_paths: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub file_extension: String,
    /// How often the popup re-queries the mesh count.
    pub poll_interval: Duration,
    /// How long the popup waits for the core before giving up on a request.
    pub request_timeout: Duration,
    /// How long non-error status messages stay visible.
    pub status_duration: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scene_paths: Vec::new(),
            output_dir: PathBuf::from("exported_meshes"),
            file_extension: "obj".to_string(),
            poll_interval: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
            status_duration: Duration::from_secs(3),
        }
    }
}

impl ExportConfig {
    pub const USAGE: &'static str =
        "usage: meshgrab [--out DIR] [--poll-ms N] [--timeout-ms N] FILE.gltf...";

    pub fn from_args<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out" => {
                    config.output_dir = args.next().context("--out needs a directory")?.into();
                }
                "--poll-ms" => {
                    config.poll_interval = parse_millis(&arg, args.next())?;
                }
                "--timeout-ms" => {
                    config.request_timeout = parse_millis(&arg, args.next())?;
                }
                flag if flag.starts_with("--") => bail!("Unknown option {flag}\n{}", Self::USAGE),
                _ => config.scene_paths.push(PathBuf::from(&arg)),
            }
        }

        if config.scene_paths.is_empty() {
            bail!("No scene files given\n{}", Self::USAGE);
        }

        Ok(config)
    }
}

fn parse_millis(flag: &str, value: Option<String>) -> anyhow::Result<Duration> {
    let value = value.with_context(|| format!("{flag} needs a value"))?;
    let millis = value
        .parse::<u64>()
        .with_context(|| format!("Invalid value for {flag}: {value}"))?;

    if millis == 0 {
        bail!("{flag} must be greater than zero");
    }

    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_apply_without_flags() {
        let config = ExportConfig::from_args(args(&["scene.gltf"])).unwrap();

        assert_eq!(config.scene_paths, vec![PathBuf::from("scene.gltf")]);
        assert_eq!(config.output_dir, PathBuf::from("exported_meshes"));
        assert_eq!(config.file_extension, "obj");
        assert_eq!(config.poll_interval, Duration::from_secs(3));
    }

    #[test]
    fn flags_override_defaults() {
        let config = ExportConfig::from_args(args(&[
            "--out", "out", "a.gltf", "--poll-ms", "500", "--timeout-ms", "100", "b.glb",
        ]))
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.scene_paths.len(), 2);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_millis(100));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(ExportConfig::from_args(args(&[])).is_err());
        assert!(ExportConfig::from_args(args(&["--out"])).is_err());
        assert!(ExportConfig::from_args(args(&["--poll-ms", "soon", "a.gltf"])).is_err());
        assert!(ExportConfig::from_args(args(&["--poll-ms", "0", "a.gltf"])).is_err());
        assert!(ExportConfig::from_args(args(&["--verbose", "a.gltf"])).is_err());
    }
}
