//! Runtime configuration (rc-style key=value format)
//!
//! Read from `$NETLISTMGR_CONFIG` or `%APPDATA%/netlistmgr/netlistmgrrc`,
//! then overridden by `NETLISTMGR_APARTMENT` and `NETLISTMGR_LOCALE`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::com::abi::LOCALE_USER_DEFAULT;
use crate::error::{Error, Result};

const CONFIG_ENV: &str = "NETLISTMGR_CONFIG";
const APARTMENT_ENV: &str = "NETLISTMGR_APARTMENT";
const LOCALE_ENV: &str = "NETLISTMGR_LOCALE";

/// COM concurrency model requested from `CoInitializeEx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apartment {
    /// Single-threaded apartment (`COINIT_APARTMENTTHREADED`).
    ApartmentThreaded,
    /// Multithreaded apartment (`COINIT_MULTITHREADED`).
    Multithreaded,
}

impl Apartment {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ApartmentThreaded => "sta",
            Self::Multithreaded => "mta",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "sta" | "apartment" | "apartmentthreaded" => Ok(Self::ApartmentThreaded),
            "mta" | "multi" | "multithreaded" => Ok(Self::Multithreaded),
            _ => Err(Error::Config(format!("unknown apartment model {value:?}"))),
        }
    }
}

/// Where activated objects may live (`CLSCTX`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassContext {
    InprocServer,
    LocalServer,
    All,
}

impl ClassContext {
    pub const fn bits(self) -> u32 {
        match self {
            Self::InprocServer => 0x1,
            Self::LocalServer => 0x4,
            Self::All => 0x17,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::InprocServer => "inproc",
            Self::LocalServer => "local",
            Self::All => "all",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "inproc" => Ok(Self::InprocServer),
            "local" => Ok(Self::LocalServer),
            "all" => Ok(Self::All),
            _ => Err(Error::Config(format!("unknown class context {value:?}"))),
        }
    }
}

/// Settings used when the runtime is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub apartment: Apartment,
    pub disable_ole1dde: bool,
    pub class_context: ClassContext,
    /// LCID handed to automation calls.
    pub locale: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            apartment: Apartment::ApartmentThreaded,
            disable_ole1dde: true,
            class_context: ClassContext::All,
            locale: LOCALE_USER_DEFAULT,
        }
    }
}

/// Get the config file path
fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    std::env::var("APPDATA")
        .ok()
        .map(|appdata| PathBuf::from(appdata).join("netlistmgr").join("netlistmgrrc"))
}

fn parse_locale(value: &str) -> Result<u32> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    };
    parsed.map_err(|_| Error::Config(format!("invalid locale {value:?}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(Error::Config(format!("invalid boolean for {key}: {value:?}"))),
    }
}

impl RuntimeConfig {
    /// Parse rc-file content. Blank lines and `#` comments are skipped and
    /// unknown keys ignored.
    pub fn parse(content: &str) -> Result<Self> {
        let mut cfg = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::Config(format!("expected key=value, got {line:?}")));
            };
            let key = key.trim();
            let value = value.trim();
            match key {
                "apartment" => cfg.apartment = Apartment::parse(value)?,
                "disable_ole1dde" => cfg.disable_ole1dde = parse_bool(key, value)?,
                "class_context" => cfg.class_context = ClassContext::parse(value)?,
                "locale" => cfg.locale = parse_locale(value)?,
                _ => {
                    tracing::debug!(key, "ignoring unknown configuration key");
                }
            }
        }

        Ok(cfg)
    }

    /// Load from the rc file, falling back to defaults when it does not
    /// exist, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        cfg.apply_overrides(
            std::env::var(APARTMENT_ENV).ok().as_deref(),
            std::env::var(LOCALE_ENV).ok().as_deref(),
        )?;
        Ok(cfg)
    }

    /// Parse the rc file at `path`. A missing file gives the defaults; any
    /// other read failure is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(Error::Config(format!("cannot read {}: {err}", path.display()))),
        }
    }

    fn apply_overrides(&mut self, apartment: Option<&str>, locale: Option<&str>) -> Result<()> {
        if let Some(value) = apartment {
            self.apartment = Apartment::parse(value)?;
        }
        if let Some(value) = locale {
            self.locale = parse_locale(value)?;
        }
        Ok(())
    }

    /// `COINIT` flags for `CoInitializeEx`.
    pub const fn coinit_flags(&self) -> u32 {
        let model = match self.apartment {
            Apartment::ApartmentThreaded => 0x2,
            Apartment::Multithreaded => 0x0,
        };
        if self.disable_ole1dde { model | 0x4 } else { model }
    }

    /// Render in the format [`RuntimeConfig::parse`] reads.
    pub fn to_rc_string(&self) -> String {
        let b = |v: bool| if v { "1" } else { "0" };
        let lines = [
            "# netlistmgr configuration file".to_string(),
            String::new(),
            format!("apartment={}", self.apartment.label()),
            format!("disable_ole1dde={}", b(self.disable_ole1dde)),
            format!("class_context={}", self.class_context.label()),
            format!("locale=0x{:04X}", self.locale),
        ];
        lines.join("\n") + "\n"
    }
}
