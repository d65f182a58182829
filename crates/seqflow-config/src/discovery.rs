use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a desired-state file
pub const ENV_CONFIG_PATH: &str = "SEQFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 4] = ["seq.local.kdl", ".seq.local.kdl", "seq.kdl", ".seq.kdl"];
const PROJECT_DIR: &str = ".seqflow";

/// プロジェクトのseq.kdlファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 SEQFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: seq.local.kdl, .seq.local.kdl, seq.kdl, .seq.kdl
/// 3. ./.seqflow/ ディレクトリ内: 同様の順序
pub fn find_flow_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "{} points to a missing file: {}",
            ENV_CONFIG_PATH,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;
    find_flow_file_from(&current_dir)
}

/// `dir` を起点に設定ファイルを探す（環境変数は見ない）
pub fn find_flow_file_from(dir: &Path) -> Result<PathBuf> {
    let search_dirs = [dir.to_path_buf(), dir.join(PROJECT_DIR)];

    for search_dir in search_dirs.iter().filter(|d| d.is_dir()) {
        for filename in &CANDIDATES {
            let path = search_dir.join(filename);
            if path.exists() {
                tracing::debug!("Found desired-state file: {}", path.display());
                return Ok(path);
            }
        }
    }

    Err(ConfigError::FlowFileNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_find_in_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("seq.kdl"), "// test").unwrap();

        let result = find_flow_file_from(temp_dir.path()).unwrap();
        assert!(result.ends_with("seq.kdl"));
    }

    #[test]
    fn test_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("seq.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join("seq.local.kdl"), "// local").unwrap();

        let result = find_flow_file_from(temp_dir.path()).unwrap();
        assert!(result.ends_with("seq.local.kdl"));
    }

    #[test]
    fn test_hidden_local_beats_visible() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(".seq.local.kdl"), "// hidden local").unwrap();
        fs::write(temp_dir.path().join("seq.kdl"), "// visible").unwrap();

        let result = find_flow_file_from(temp_dir.path()).unwrap();
        assert!(result.ends_with(".seq.local.kdl"));
    }

    #[test]
    fn test_find_in_project_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project_dir = temp_dir.path().join(".seqflow");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join("seq.kdl"), "// in project dir").unwrap();

        let result = find_flow_file_from(temp_dir.path()).unwrap();
        assert!(result.ends_with(".seqflow/seq.kdl"));
    }

    #[test]
    fn test_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();

        let result = find_flow_file_from(temp_dir.path());
        assert!(matches!(result, Err(ConfigError::FlowFileNotFound)));
    }

    #[test]
    #[serial]
    fn test_env_var_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.kdl");
        fs::write(&config_path, "// custom").unwrap();

        temp_env::with_var(ENV_CONFIG_PATH, Some(&config_path), || {
            let result = find_flow_file().unwrap();
            assert_eq!(result, config_path);
        });
    }
}
