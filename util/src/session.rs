//! Session management
//!
//! A session is one run of an executable. It owns a directory under
//! `$ROMI_SW_ROOT/sessions` holding the log file and anything saved during
//! the run.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// Time the first session of this process was started, the zero of every
/// log timestamp.
static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// chrono format of the session directory timestamp.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable (ROMI_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error("Cannot serialise {0}: {1}")]
    SerialiseError(String, serde_json::Error),

    #[error("Cannot write {0}: {1}")]
    WriteError(String, std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session in `$ROMI_SW_ROOT/{sessions_dir}`.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let mut dir = crate::host::get_romi_sw_root().map_err(|_| SessionError::SwRootNotSet)?;
        dir.push(sessions_dir);

        Self::create_in(&dir, exec_name)
    }

    /// Start a new session in the given directory.
    ///
    /// The session directory is named `{exec_name}_{timestamp}`, with a
    /// numeric suffix if a session was already started in the same second.
    pub fn create_in<P: AsRef<Path>>(dir: P, exec_name: &str) -> Result<Self, SessionError> {
        let epoch = SESSION_EPOCH.get_or_init(Utc::now);
        let stem = format!("{}_{}", exec_name, epoch.format(TIMESTAMP_FORMAT));

        let mut session_root = dir.as_ref().join(&stem);
        let mut suffix = 0;
        while session_root.exists() {
            suffix += 1;
            session_root = dir.as_ref().join(format!("{}_{}", stem, suffix));
        }

        fs::create_dir_all(&session_root).map_err(SessionError::CannotCreateDir)?;

        let log_file_path = session_root.join(format!("{}.log", exec_name));

        Ok(Session {
            session_root,
            log_file_path,
        })
    }

    /// Path of a file inside the session directory.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.session_root.join(file_name)
    }

    /// Save `data` as pretty printed JSON into the session directory,
    /// returning the path written.
    pub fn save_json<T: Serialize>(&self, file_name: &str, data: &T) -> Result<PathBuf, SessionError> {
        let s = serde_json::to_string_pretty(data)
            .map_err(|e| SessionError::SerialiseError(file_name.to_string(), e))?;

        let path = self.file_path(file_name);
        fs::write(&path, s).map_err(|e| SessionError::WriteError(file_name.to_string(), e))?;

        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the number of seconds elapsed since the start of the session, or
/// zero if no session has been started.
pub fn get_elapsed_seconds() -> f64 {
    match SESSION_EPOCH.get() {
        Some(e) => time::duration_to_seconds(Utc::now() - *e).unwrap_or(std::f64::NAN),
        None => 0.0,
    }
}

/// Return the session epoch, `None` if no session has been started.
pub fn get_epoch() -> Option<&'static DateTime<Utc>> {
    SESSION_EPOCH.get()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("romi_util_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[derive(Serialize)]
    struct Record {
        runs: u32,
        name: &'static str,
    }

    #[test]
    fn test_create_and_save() {
        let dir = scratch_dir("save");
        let session = Session::create_in(&dir, "test_exec").unwrap();

        assert!(session.session_root.is_dir());
        assert!(session.session_root.starts_with(&dir));
        assert_eq!(session.log_file_path, session.session_root.join("test_exec.log"));
        assert!(get_epoch().is_some());

        let path = session
            .save_json("record.json", &Record { runs: 3, name: "nav" })
            .unwrap();
        let saved = fs::read_to_string(path).unwrap();
        assert!(saved.contains("\"runs\": 3"));
        assert!(saved.contains("\"name\": \"nav\""));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_sessions_in_same_second_do_not_collide() {
        let dir = scratch_dir("collide");
        let a = Session::create_in(&dir, "exec").unwrap();
        let b = Session::create_in(&dir, "exec").unwrap();

        assert_ne!(a.session_root, b.session_root);
        assert!(get_elapsed_seconds() >= 0.0);

        fs::remove_dir_all(&dir).unwrap();
    }
}
