// REFCUE Server Configuration
// Copyright (c) 2026 Xing_The_Creator | REFCUE
//
// Resolution order: built-in defaults < environment (.env included) < CLI flags.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::practice::cursor::EndDetection;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Root of the `<format>/<topic>/<clip>` tree.
    pub content_root: PathBuf,
    /// Static front-end served for every non-API path.
    pub dashboard_dir: PathBuf,
    pub session_ttl: Duration,
    pub end_tolerance: f64,
    pub contact_form_id: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            content_root: PathBuf::from("static"),
            dashboard_dir: PathBuf::from("dashboard"),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            end_tolerance: 0.0,
            contact_form_id: None,
        }
    }
}

impl ServerConfig {
    /// Read `REFCUE_*` and `CONTACT_FORM_ID` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup("REFCUE_CONTENT_ROOT") {
            config.content_root = PathBuf::from(root);
        }
        if let Some(dir) = lookup("REFCUE_DASHBOARD_DIR") {
            config.dashboard_dir = PathBuf::from(dir);
        }
        if let Some(port) = parse_var(&lookup, "REFCUE_PORT") {
            config.port = port;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "REFCUE_SESSION_TTL_SECS") {
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(tolerance) = parse_var(&lookup, "REFCUE_END_TOLERANCE") {
            config.end_tolerance = tolerance;
        }
        config.contact_form_id = lookup("CONTACT_FORM_ID").filter(|id| !id.trim().is_empty());

        config
    }

    pub fn end_detection(&self) -> EndDetection {
        EndDetection::from_tolerance(self.end_tolerance)
    }

    /// Embeddable URL of the contact form, when one is configured.
    pub fn contact_form_url(&self) -> Option<String> {
        self.contact_form_id.as_ref().map(|id| {
            format!(
                "https://docs.google.com/forms/d/e/{}/viewform?embedded=true",
                id
            )
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("[CONFIG] Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
