//! # Attachment Lifecycle
//!
//! The XDP program moves through `Unloaded → Loaded → Attached → Detached`.
//! Each state is its own type, so the transitions can only run in order:
//!
//! - [`Unloaded::load`] consumes the unloaded host and yields [`Loaded`]
//! - [`Loaded::attach`] consumes the loaded host and yields the [`Attached`] guard
//! - [`Attached::detach`] (or dropping the guard) releases the interface
//!
//! Because `attach` consumes its input and [`Attached`] is neither `Clone` nor
//! `Copy`, one lifecycle can bind the program to at most one interface, once.
//! The guard detaches on every exit path, including unwinding; detach errors
//! are logged and swallowed.

use log::{info, warn};

use crate::domain::{AttachError, AttachMode, DetachError, Interface, LoadError};

/// Kernel-facing operations needed to run the program on an interface
///
/// Implemented by [`AyaHost`](super::AyaHost) in production and by fakes in
/// tests.
pub trait ProgramHost {
    /// Load the byte code and resolve `entry` as an XDP program
    ///
    /// # Errors
    /// Returns [`LoadError`] if the program is missing or fails verification
    fn load(&mut self, entry: &str) -> Result<(), LoadError>;

    /// Bind the loaded `entry` program to `iface`
    ///
    /// # Errors
    /// Returns [`AttachError`] if the interface is unknown or the kernel
    /// refuses the binding
    fn attach(&mut self, entry: &str, iface: &Interface, mode: AttachMode)
        -> Result<(), AttachError>;

    /// Remove the binding created by [`attach`](Self::attach)
    ///
    /// # Errors
    /// Returns [`DetachError`] if the kernel refuses to release the binding
    fn detach(&mut self, entry: &str, iface: &Interface) -> Result<(), DetachError>;
}

/// Host with nothing loaded yet
pub struct Unloaded<H> {
    host: H,
}

impl<H: ProgramHost> Unloaded<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Load the program and resolve its entry function
    ///
    /// # Errors
    /// Returns [`LoadError`] from the host; nothing needs cleaning up
    pub fn load(mut self, entry: &str) -> Result<Loaded<H>, LoadError> {
        self.host.load(entry)?;
        info!("✓ Loaded XDP program: {entry}");
        Ok(Loaded { host: self.host, entry: entry.to_string() })
    }
}

/// Program loaded and verified, not yet bound to an interface
pub struct Loaded<H> {
    host: H,
    entry: String,
}

impl<H: ProgramHost> Loaded<H> {
    /// Bind the program to `iface`
    ///
    /// # Errors
    /// Returns [`AttachError`] from the host. No detach is attempted since
    /// nothing was attached.
    pub fn attach(mut self, iface: Interface, mode: AttachMode) -> Result<Attached<H>, AttachError> {
        self.host.attach(&self.entry, &iface, mode)?;
        info!("✓ Attached XDP program {} to {iface} ({mode} mode)", self.entry);
        Ok(Attached { host: self.host, entry: self.entry, iface, detached: false })
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }
}

/// Active binding of the program to one interface
///
/// Detaches exactly once: explicitly through [`detach`](Self::detach) or
/// implicitly when dropped.
pub struct Attached<H: ProgramHost> {
    host: H,
    entry: String,
    iface: Interface,
    detached: bool,
}

impl<H: ProgramHost> Attached<H> {
    pub fn iface(&self) -> &Interface {
        &self.iface
    }

    /// Access the host, e.g. to take event maps out of the loaded object
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Remove the program from the interface
    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;

        match self.host.detach(&self.entry, &self.iface) {
            Ok(()) => info!("✓ Detached XDP program from {}", self.iface),
            Err(e) => warn!("{e}"),
        }
    }
}

impl<H: ProgramHost> Drop for Attached<H> {
    fn drop(&mut self) {
        self.release();
    }
}
