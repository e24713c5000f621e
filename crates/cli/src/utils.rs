use colored::*;
use kokoro_client::Artifact;
use kokoro_client::config::{MAX_SPEED, MIN_SPEED};
use std::path::{Path, PathBuf};

/// clap value parser for `--speed`
pub fn parse_speed(s: &str) -> Result<f32, String> {
    let speed: f32 = s
        .parse()
        .map_err(|_| format!("speed must be a number, got `{}`", s))?;
    if !speed.is_finite() || !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
        return Err(format!(
            "speed must be between {} and {}, got {}",
            MIN_SPEED, MAX_SPEED, speed
        ));
    }
    Ok(speed)
}

/// Looks for the first of `filenames` under `~/.kokoro`.
pub fn find_config_in_home(filenames: &[&str]) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let home = dirs::home_dir().ok_or("No home directory found")?;
    let config_dir = home.join(".kokoro");

    for filename in filenames {
        let candidate = config_dir.join(filename);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(format!("No config file found in {:?}", config_dir).into())
}

/// Writes an artifact to `path`, or to its conventional file name when no path is given.
pub fn write_artifact(artifact: &Artifact, path: Option<&str>) -> std::io::Result<PathBuf> {
    let target = path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
    std::fs::write(&target, &artifact.bytes)?;
    log::debug!("wrote {} ({})", target.display(), artifact.mime_type);
    Ok(target)
}

/// Prints a success line for a written artifact
pub fn print_saved(kind: &str, path: &Path, artifact: &Artifact) {
    println!(
        "{} {} saved to {} ({} bytes, {})",
        "✓".bright_green(),
        kind,
        path.display().to_string().bold(),
        artifact.len(),
        artifact.mime_type
    );
}

/// Prints a separator line
pub fn print_separator() {
    println!("{}", "─".repeat(50).bright_black());
}

#[cfg(test)]
mod tests {
    use super::*;
    use kokoro_client::AudioFormat;

    #[test]
    fn speed_within_range() {
        assert_eq!(parse_speed("1.0"), Ok(1.0));
        assert_eq!(parse_speed("0.25"), Ok(0.25));
        assert_eq!(parse_speed("4"), Ok(4.0));
    }

    #[test]
    fn speed_out_of_range_or_garbage() {
        assert!(parse_speed("0.1").is_err());
        assert!(parse_speed("4.01").is_err());
        assert!(parse_speed("fast").is_err());
        assert!(parse_speed("NaN").is_err());
    }

    #[test]
    fn artifact_written_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.wav");
        let artifact = Artifact::audio(vec![1, 2, 3, 4], AudioFormat::Wav);

        let written = write_artifact(&artifact, path.to_str()).unwrap();
        assert_eq!(written, path);
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4]);
    }
}
