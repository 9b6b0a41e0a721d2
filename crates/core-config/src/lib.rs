//! Configuration loading and parsing.
//!
//! Parses `chordwise.toml` (or an override path provided by the binary):
//!
//! * `[input]`: buffering timeout, leader chord, mouse selection behaviour.
//! * `[[bindings.<group>]]` / `[[bindings.<group>_nonrecursive]]`: user remaps
//!   for the `insert`, `normal`, `visual`, `command_line` and
//!   `operator_pending` mode groups.
//!
//! Key text is kept raw here; notation normalization and tokenization happen
//! when the remap tables are built. Unknown fields are ignored so the file can
//! evolve without immediate warnings. A missing file or a parse error falls
//! back to defaults.

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "chordwise.toml";

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub bindings: BindingsConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,  // original file string (optional)
    pub file: ConfigFile,     // parsed (or default) data
    pub path: Option<PathBuf>, // where `raw` was read from
}

// -------------------------------------------------------------------------------------------------
// [input]
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_timeout")] // Vim default: enabled
    pub timeout: bool,
    #[serde(default = "InputConfig::default_timeoutlen")] // Vim default usually 1000ms
    pub timeoutlen: u32,
    #[serde(default = "InputConfig::default_leader")]
    pub leader: String,
    #[serde(default = "InputConfig::default_mouse_selection_enters_visual")]
    pub mouse_selection_enters_visual: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timeout: Self::default_timeout(),
            timeoutlen: Self::default_timeoutlen(),
            leader: Self::default_leader(),
            mouse_selection_enters_visual: Self::default_mouse_selection_enters_visual(),
        }
    }
}

impl InputConfig {
    const fn default_timeout() -> bool {
        true
    }
    const fn default_timeoutlen() -> u32 {
        1000
    }
    fn default_leader() -> String {
        "\\".to_string()
    }
    const fn default_mouse_selection_enters_visual() -> bool {
        true
    }

    /// How long buffered keys wait before being flushed; `None` waits forever.
    pub fn flush_after(&self) -> Option<Duration> {
        self.timeout
            .then(|| Duration::from_millis(u64::from(self.timeoutlen)))
    }
}

// -------------------------------------------------------------------------------------------------
// [bindings]
// -------------------------------------------------------------------------------------------------
/// Key text as written by the user: either one string tokenized later
/// (`"jj"`, `"<leader>w"`) or an explicit list of chords (`["j", "j"]`).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum KeySpec {
    List(Vec<String>),
    Text(String),
}

impl KeySpec {
    pub fn is_empty(&self) -> bool {
        match self {
            KeySpec::List(v) => v.is_empty(),
            KeySpec::Text(s) => s.is_empty(),
        }
    }
}

/// A bound command: `":w"` style ex text or a host command with arguments.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CommandSpec {
    Text(String),
    Host {
        command: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BindingEntry {
    pub before: KeySpec,
    #[serde(default)]
    pub after: Option<KeySpec>,
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct BindingsConfig {
    #[serde(default)]
    pub insert: Vec<BindingEntry>,
    #[serde(default)]
    pub insert_nonrecursive: Vec<BindingEntry>,
    #[serde(default)]
    pub normal: Vec<BindingEntry>,
    #[serde(default)]
    pub normal_nonrecursive: Vec<BindingEntry>,
    #[serde(default)]
    pub visual: Vec<BindingEntry>,
    #[serde(default)]
    pub visual_nonrecursive: Vec<BindingEntry>,
    #[serde(default)]
    pub command_line: Vec<BindingEntry>,
    #[serde(default)]
    pub command_line_nonrecursive: Vec<BindingEntry>,
    #[serde(default)]
    pub operator_pending: Vec<BindingEntry>,
    #[serde(default)]
    pub operator_pending_nonrecursive: Vec<BindingEntry>,
}

impl BindingsConfig {
    pub fn total(&self) -> usize {
        [
            &self.insert,
            &self.insert_nonrecursive,
            &self.normal,
            &self.normal_nonrecursive,
            &self.visual,
            &self.visual_nonrecursive,
            &self.command_line,
            &self.command_line_nonrecursive,
            &self.operator_pending,
            &self.operator_pending_nonrecursive,
        ]
        .iter()
        .map(|v| v.len())
        .sum()
    }
}

// -------------------------------------------------------------------------------------------------
// Loading
// -------------------------------------------------------------------------------------------------
/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    // Prefer a local working directory file before the platform config dir.
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("chordwise").join(CONFIG_FILE_NAME);
    }
    // Final fallback relative filename.
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match parse_str(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                bindings = file.bindings.total(),
                "config_loaded"
            );
            Ok(Config {
                raw: Some(content),
                file,
                path: Some(path),
            })
        }
        Err(e) => {
            // On parse error fallback to defaults.
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}

/// Parse TOML text without touching the filesystem.
pub fn parse_str(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str::<ConfigFile>(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn input_defaults_present() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_timeouts__.toml"))).unwrap();
        assert!(cfg.file.input.timeout);
        assert_eq!(cfg.file.input.timeoutlen, 1000);
        assert_eq!(cfg.file.input.leader, "\\");
        assert!(cfg.file.input.mouse_selection_enters_visual);
        assert_eq!(
            cfg.file.input.flush_after(),
            Some(Duration::from_millis(1000))
        );
    }

    #[test]
    fn parses_input_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[input]\ntimeout = false\ntimeoutlen = 250\nleader = \" \"\nmouse_selection_enters_visual = false\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!cfg.file.input.timeout);
        assert_eq!(cfg.file.input.timeoutlen, 250);
        assert_eq!(cfg.file.input.leader, " ");
        assert!(!cfg.file.input.mouse_selection_enters_visual);
        assert_eq!(cfg.file.input.flush_after(), None);
        assert_eq!(cfg.path.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn parses_bindings_in_both_key_forms() {
        let file = parse_str(
            r#"
[[bindings.insert]]
before = ["j", "j"]
after = ["<Esc>"]

[[bindings.normal_nonrecursive]]
before = "<leader>w"
commands = [":w", { command = "editor.fold", args = ["1"] }]
"#,
        )
        .unwrap();
        assert_eq!(
            file.bindings.insert,
            vec![BindingEntry {
                before: KeySpec::List(vec!["j".into(), "j".into()]),
                after: Some(KeySpec::List(vec!["<Esc>".into()])),
                commands: vec![],
            }]
        );
        let entry = &file.bindings.normal_nonrecursive[0];
        assert_eq!(entry.before, KeySpec::Text("<leader>w".into()));
        assert_eq!(entry.after, None);
        assert_eq!(
            entry.commands,
            vec![
                CommandSpec::Text(":w".into()),
                CommandSpec::Host {
                    command: "editor.fold".into(),
                    args: vec!["1".into()],
                },
            ]
        );
        assert_eq!(file.bindings.total(), 2);
    }

    #[test]
    fn host_command_args_default_to_empty() {
        let file = parse_str(
            "[[bindings.visual]]\nbefore = \"<C-a>\"\ncommands = [{ command = \"editor.selectAll\" }]\n",
        )
        .unwrap();
        assert_eq!(
            file.bindings.visual[0].commands,
            vec![CommandSpec::Host {
                command: "editor.selectAll".into(),
                args: vec![],
            }]
        );
    }

    #[test]
    fn parse_error_falls_back_and_logs_with_config_target() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[input\ntimeout = ").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || {
            load_from(Some(tmp.path().to_path_buf())).unwrap()
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed"));
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn discover_falls_back_to_file_name() {
        let p = discover();
        assert!(p.ends_with(CONFIG_FILE_NAME));
    }
}
