use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut cfg = Self::load_from(default_config_path());

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                cfg.inner.insert(k, v);
            }
        }

        cfg
    }

    /// Defaults overlaid with the rc file at `config_path`, without the environment.
    pub fn load_from(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let mut map = default_map();

        if let Some(file_values) = read_rc_file(&config_path) {
            map.extend(file_values);
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    /// Override a value, e.g. from a command-line flag.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(key.to_string(), value.into());
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).filter(|v| !v.is_empty()).map(PathBuf::from)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.get_path("BUGFINDER_LOG_DIR")
            .unwrap_or_else(|| env::temp_dir().join("bugfinder"))
    }
}

fn read_rc_file(path: &Path) -> Option<HashMap<String, String>> {
    let file = fs::File::open(path).ok()?;
    let reader = BufReader::new(file);
    let mut map = HashMap::new();
    for line in reader.lines().map_while(Result::ok) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    Some(map)
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or BUGFINDER_* for forward-compat
    const KEYS: &[&str] = &["PRETTIFY_MARKDOWN"];

    KEYS.contains(&k) || k.starts_with("BUGFINDER_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("bugfinder").join(".bugfinderrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    // Strings
    m.insert("BUGFINDER_PYTHON".into(), "auto".into());
    m.insert("BUGFINDER_LOG".into(), "warn".into());

    // Numbers
    m.insert("BUGFINDER_TIMEOUT".into(), "0".into());
    m.insert("BUGFINDER_BUSY_DELAY_MS".into(), "200".into());

    // Bools as strings
    m.insert("PRETTIFY_MARKDOWN".into(), "false".into());

    m
}
