use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk locations, all derived from one base directory.
#[derive(Debug, Clone)]
pub struct Paths {
    home: PathBuf,
}

impl Paths {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Use `home_override` when given, otherwise the user's home directory.
    pub fn resolve(home_override: Option<&Path>) -> Result<Self> {
        let home = match home_override {
            Some(path) => path.to_path_buf(),
            None => dirs::home_dir().context("Failed to get home directory")?,
        };
        Ok(Self::new(home))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.home.join(".tforge")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir().join("sessions")
    }

    pub fn journal(&self) -> PathBuf {
        self.data_dir().join("journal.json")
    }

    pub fn tmux_conf(&self) -> PathBuf {
        self.home.join(".tmux.conf")
    }

    pub fn script(&self, save_name: &str) -> Result<PathBuf> {
        validate_save_name(save_name)?;
        Ok(self.sessions_dir().join(format!("{save_name}.sh")))
    }
}

fn validate_save_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("save name must not be empty");
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        bail!("save name {name:?} must not contain path separators");
    }
    Ok(())
}

/// Write `content` to `path` with mode 0755, creating parent directories.
pub fn write_executable(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to make {} executable", path.display()))?;
    }
    Ok(())
}
