use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use log::info;

use crate::error::Result;
use crate::types::Trial;

/// Load the trial list from a JSON file (`.gz` files are decompressed).
pub fn load_trials(path: impl AsRef<Path>) -> Result<Vec<Trial>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let trials = if is_gzip(path) {
        parse_trials(GzDecoder::new(file))?
    } else {
        parse_trials(file)?
    };
    info!("Loaded {} trials from {}", trials.len(), path.display());
    Ok(trials)
}

pub fn parse_trials(reader: impl Read) -> Result<Vec<Trial>> {
    Ok(serde_json::from_reader(BufReader::new(reader))?)
}

pub(crate) fn is_gzip(path: &Path) -> bool {
    path.extension().map(|e| e == "gz").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const TRIALS: &str = r#"[
        {"subject": "Subject1", "movement": "Squat1",
         "frames": [], "grf": {"time": [0.0, 0.1]}},
        {"subject": "Subject2", "movement": "SquatJump_1",
         "frames": [], "grf": {"time": []}}
    ]"#;

    #[test]
    fn test_parse_trials() {
        let trials = parse_trials(TRIALS.as_bytes()).unwrap();
        assert_eq!(trials.len(), 2);
        assert_eq!(trials[1].subject, "Subject2");
    }

    #[test]
    fn test_load_gzip() {
        let path = std::env::temp_dir().join(format!("grf_prep_trials_{}.json.gz", std::process::id()));
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(TRIALS.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let trials = load_trials(&path).unwrap();
        assert_eq!(trials.len(), 2);
        assert_eq!(trials[0].grf.time().unwrap().len(), 2);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file() {
        assert!(load_trials("/nonexistent/trials.json").is_err());
    }
}
