//! The process-wide COM runtime connection.
//!
//! Initialization is explicit: nothing here starts COM lazily. Each
//! successful [`Runtime::initialize`] must be balanced by one
//! [`Runtime::uninitialize`] after the last proxy is released; extra
//! uninitialize calls are no-ops. The counters are atomic, but COM's own
//! per-thread apartment rules are still the caller's to respect.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::OnceLock;

use super::abi::{Guid, HResult, RawPtr};
use super::dispatch;
use super::handle::ComPtr;
use crate::config::RuntimeConfig;
use crate::error::{Error, Result};

/// Outcome of a successful initialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// COM was started by this call (`S_OK`).
    Initialized,
    /// COM was already running on this thread (`S_FALSE`); the call still
    /// needs its own uninitialize.
    AlreadyInitialized,
}

/// The native entry points the runtime needs. Swappable so the binding layer
/// can run against in-process objects.
pub trait ComBackend: Send + Sync {
    fn initialize(&self, coinit: u32) -> HResult;
    fn uninitialize(&self);
    /// Activate `clsid` and return an owned `IUnknown` pointer.
    fn create_instance(&self, clsid: &Guid, context: u32) -> std::result::Result<RawPtr, HResult>;
}

/// `ole32` on Windows; every call reports `E_NOTIMPL` elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBackend;

#[cfg(windows)]
impl ComBackend for SystemBackend {
    fn initialize(&self, coinit: u32) -> HResult {
        use windows::Win32::System::Com::{CoInitializeEx, COINIT};
        // SAFETY: plain FFI call; the reserved argument must be None.
        HResult(unsafe { CoInitializeEx(None, COINIT(coinit as i32)) })
    }

    fn uninitialize(&self) {
        // SAFETY: only called to balance a successful initialize.
        unsafe { windows::Win32::System::Com::CoUninitialize() }
    }

    fn create_instance(&self, clsid: &Guid, context: u32) -> std::result::Result<RawPtr, HResult> {
        use windows::core::{Interface, IUnknown};
        use windows::Win32::System::Com::{CoCreateInstance, CLSCTX};

        // SAFETY: COM is initialized on this thread by the caller.
        let unknown: IUnknown = unsafe { CoCreateInstance(clsid.as_raw(), None, CLSCTX(context)) }
            .map_err(HResult::from)?;
        Ok(unknown.into_raw())
    }
}

#[cfg(not(windows))]
impl ComBackend for SystemBackend {
    fn initialize(&self, _coinit: u32) -> HResult {
        HResult::E_NOTIMPL
    }

    fn uninitialize(&self) {}

    fn create_instance(&self, _clsid: &Guid, _context: u32) -> std::result::Result<RawPtr, HResult> {
        Err(HResult::E_NOTIMPL)
    }
}

/// A COM runtime connection: a backend plus the count of outstanding
/// initializations.
pub struct Runtime {
    backend: Box<dyn ComBackend>,
    outstanding: AtomicUsize,
    class_context: AtomicUsize,
    locale: AtomicU32,
}

impl Runtime {
    pub fn new(backend: Box<dyn ComBackend>) -> Self {
        Self {
            backend,
            outstanding: AtomicUsize::new(0),
            class_context: AtomicUsize::new(RuntimeConfig::default().class_context.bits() as usize),
            locale: AtomicU32::new(RuntimeConfig::default().locale),
        }
    }

    pub fn system() -> Self {
        Self::new(Box::new(SystemBackend))
    }

    /// Start COM with `config`.
    ///
    /// Calling this again without an uninitialize in between is a caller
    /// error; the native answer is passed through, as
    /// [`InitStatus::AlreadyInitialized`] or as [`Error::Runtime`]
    /// (for example `RPC_E_CHANGED_MODE` when the apartment model differs).
    ///
    /// `config.locale` is recorded on this runtime only. The locale used by
    /// named dispatch is process-wide and follows the global runtime, so it
    /// changes only through [`initialize_with`].
    pub fn initialize(&self, config: &RuntimeConfig) -> Result<InitStatus> {
        let hr = self.backend.initialize(config.coinit_flags());
        if hr.is_err() {
            tracing::debug!(code = %hr, apartment = config.apartment.label(), "CoInitializeEx failed");
            return Err(Error::Runtime(hr));
        }
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.class_context.store(config.class_context.bits() as usize, Ordering::SeqCst);
        self.locale.store(config.locale, Ordering::SeqCst);

        let status = if hr == HResult::S_FALSE {
            InitStatus::AlreadyInitialized
        } else {
            InitStatus::Initialized
        };
        tracing::debug!(?status, apartment = config.apartment.label(), "COM runtime initialized");
        Ok(status)
    }

    /// Tear down one initialization. Returns `false`, without touching the
    /// native runtime, when nothing is outstanding.
    pub fn uninitialize(&self) -> bool {
        let released = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if released {
            self.backend.uninitialize();
            tracing::debug!("COM runtime uninitialized");
        } else {
            tracing::debug!("uninitialize without a matching initialize ignored");
        }
        released
    }

    /// Locale from the last successful initialize.
    pub fn locale(&self) -> u32 {
        self.locale.load(Ordering::SeqCst)
    }

    pub fn is_initialized(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst) > 0
    }

    /// Activate a COM class and return its `IUnknown`.
    pub fn create_instance(&self, clsid: &Guid) -> Result<ComPtr> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        let context = self.class_context.load(Ordering::SeqCst) as u32;
        let raw = self
            .backend
            .create_instance(clsid, context)
            .map_err(|code| Error::Activation { clsid: *clsid, code })?;
        tracing::debug!(%clsid, "activated COM class");
        // SAFETY: activation hands us one reference.
        unsafe { ComPtr::from_raw(raw) }.ok_or(Error::Activation { clsid: *clsid, code: HResult::E_POINTER })
    }
}

/// The runtime shared by the whole process.
pub fn global() -> &'static Runtime {
    static GLOBAL: OnceLock<Runtime> = OnceLock::new();
    GLOBAL.get_or_init(Runtime::system)
}

/// Initialize the process-wide runtime with default settings.
pub fn initialize() -> Result<InitStatus> {
    initialize_with(&RuntimeConfig::default())
}

/// Initialize the process-wide runtime with `config` and switch named
/// dispatch to `config.locale`.
pub fn initialize_with(config: &RuntimeConfig) -> Result<InitStatus> {
    let status = global().initialize(config)?;
    dispatch::set_locale(config.locale);
    Ok(status)
}

/// Uninitialize the process-wide runtime; a no-op when not initialized.
pub fn uninitialize() -> bool {
    global().uninitialize()
}
