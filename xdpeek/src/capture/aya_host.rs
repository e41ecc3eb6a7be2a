//! # eBPF Program Loading and Attachment
//!
//! Loads the compiled XDP object and binds it to a network interface through
//! aya. This is the production [`ProgramHost`].
//!
//! ## Steps
//!
//! - [`AyaHost::open()`] - Read the object file from disk
//! - [`ProgramHost::load()`] - Parse the object, start the `aya-log` bridge,
//!   load `trace_packet` into the kernel (verifier runs here)
//! - [`ProgramHost::attach()`] - Attach to the interface (`SKB_MODE` by default)
//! - [`AyaHost::take_events()`] - Hand the `EVENTS` perf array to the pump
//! - [`ProgramHost::detach()`] - Release the XDP link

use std::path::{Path, PathBuf};

use aya::{
    maps::{perf::AsyncPerfEventArray, MapData},
    programs::{xdp::XdpLinkId, ProgramError, Xdp, XdpFlags},
    Ebpf,
};
use aya_log::EbpfLogger;
use log::{debug, warn};

use super::ProgramHost;
use crate::domain::{AttachError, AttachMode, DetachError, Interface, LoadError, PumpError};

/// XDP program host backed by `aya::Ebpf`
pub struct AyaHost {
    path: PathBuf,
    object: Vec<u8>,
    bpf: Option<Ebpf>,
    link: Option<XdpLinkId>,
}

impl AyaHost {
    /// Read the program object from `path`
    ///
    /// # Errors
    /// Returns [`LoadError::Read`] if the file cannot be read
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let object =
            std::fs::read(&path).map_err(|source| LoadError::Read { path: path.clone(), source })?;
        debug!("Read {} bytes from {}", object.len(), path.display());

        Ok(Self { path, object, bpf: None, link: None })
    }

    /// Raw bytes of the program object
    pub fn object_bytes(&self) -> &[u8] {
        &self.object
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the perf event array `name` out of the loaded object
    ///
    /// # Errors
    /// Returns [`PumpError`] if nothing is loaded, the map is missing, or it
    /// is not a perf event array
    pub fn take_events(&mut self, name: &str) -> Result<AsyncPerfEventArray<MapData>, PumpError> {
        let map = self
            .bpf
            .as_mut()
            .and_then(|bpf| bpf.take_map(name))
            .ok_or_else(|| PumpError::MissingMap(name.to_string()))?;

        AsyncPerfEventArray::try_from(map)
            .map_err(|e| PumpError::Map { name: name.to_string(), reason: e.to_string() })
    }

    fn xdp_mut(&mut self, entry: &str) -> Result<&mut Xdp, String> {
        let bpf = self.bpf.as_mut().ok_or_else(|| "program not loaded".to_string())?;
        bpf.program_mut(entry)
            .ok_or_else(|| format!("program {entry} not found"))?
            .try_into()
            .map_err(|e: ProgramError| e.to_string())
    }
}

/// Initialize eBPF logger
fn init_ebpf_logger(bpf: &mut Ebpf) {
    if let Err(e) = EbpfLogger::init(bpf) {
        warn!("Failed to initialize eBPF logger: {e}");
    }
}

impl ProgramHost for AyaHost {
    fn load(&mut self, entry: &str) -> Result<(), LoadError> {
        let mut bpf = Ebpf::load(&self.object).map_err(|e| LoadError::Parse(e.to_string()))?;
        init_ebpf_logger(&mut bpf);

        let program: &mut Xdp = bpf
            .program_mut(entry)
            .ok_or_else(|| LoadError::MissingProgram(entry.to_string()))?
            .try_into()
            .map_err(|e: ProgramError| LoadError::WrongProgramType {
                name: entry.to_string(),
                reason: e.to_string(),
            })?;
        program
            .load()
            .map_err(|e| LoadError::Verify { name: entry.to_string(), reason: e.to_string() })?;

        self.bpf = Some(bpf);
        Ok(())
    }

    fn attach(
        &mut self,
        entry: &str,
        iface: &Interface,
        mode: AttachMode,
    ) -> Result<(), AttachError> {
        let flags = match mode {
            AttachMode::Generic => XdpFlags::SKB_MODE,
            AttachMode::Native => XdpFlags::DRV_MODE,
        };

        let program = self
            .xdp_mut(entry)
            .map_err(|reason| AttachError::Rejected { iface: iface.clone(), reason })?;
        let link = program.attach(iface.as_str(), flags).map_err(|e| match e {
            ProgramError::UnknownInterface { .. } => AttachError::UnknownInterface(iface.clone()),
            other => AttachError::Rejected { iface: iface.clone(), reason: other.to_string() },
        })?;

        self.link = Some(link);
        Ok(())
    }

    fn detach(&mut self, entry: &str, iface: &Interface) -> Result<(), DetachError> {
        let Some(link) = self.link.take() else {
            return Ok(());
        };

        let program =
            self.xdp_mut(entry).map_err(|reason| DetachError { iface: iface.clone(), reason })?;
        program
            .detach(link)
            .map_err(|e| DetachError { iface: iface.clone(), reason: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_missing_file() {
        let err = AyaHost::open("/nonexistent/xdpeek.o").err().unwrap();
        assert!(matches!(err, LoadError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/xdpeek.o"));
    }

    #[test]
    fn test_load_rejects_non_elf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not an ELF object").unwrap();

        let mut host = AyaHost::open(file.path()).unwrap();
        assert_eq!(host.object_bytes().len(), 28);
        assert!(matches!(host.load("trace_packet"), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_events_unavailable_before_load() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut host = AyaHost::open(file.path()).unwrap();
        assert!(matches!(host.take_events("EVENTS"), Err(PumpError::MissingMap(_))));
    }
}
