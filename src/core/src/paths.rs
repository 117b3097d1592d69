use std::path::PathBuf;

use directories::BaseDirs;

fn env_home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(std::env::var_os)
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn user_home_dir() -> Option<PathBuf> {
    if let Some(base) = BaseDirs::new() {
        return Some(base.home_dir().to_path_buf());
    }
    env_home_dir()
}

/// `$TUTOR_HOME`, or `~/.tutor`, created if missing.
pub fn tutor_home_dir() -> Result<PathBuf, String> {
    if let Some(override_dir) = std::env::var_os("TUTOR_HOME") {
        let path = PathBuf::from(override_dir);
        if path.is_relative() {
            return Err("TUTOR_HOME must be an absolute path".to_string());
        }
        std::fs::create_dir_all(&path)
            .map_err(|e| format!("failed to create TUTOR_HOME directory: {e}"))?;
        return Ok(path);
    }

    let home = user_home_dir().ok_or_else(|| {
        "failed to resolve user home; set TUTOR_HOME or HOME/USERPROFILE".to_string()
    })?;
    let dir = home.join(".tutor");
    std::fs::create_dir_all(&dir).map_err(|e| format!("failed to create ~/.tutor: {e}"))?;
    Ok(dir)
}

pub fn tutor_config_path() -> Result<PathBuf, String> {
    Ok(tutor_home_dir()?.join("config.toml"))
}

pub fn tutor_db_path() -> Result<PathBuf, String> {
    Ok(tutor_home_dir()?.join("store.db"))
}
