//! Platform detection and the archive table for the bundled shell.
//!
//! The running operating system and CPU architecture are resolved once per
//! process. Each supported pairing maps to a fixed archive name and the name of
//! the executable it contains.

use std::fmt;
use std::sync::OnceLock;

/// Operating-system family the shell archive is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    /// Microsoft Windows.
    Windows,
    /// Apple macOS.
    MacOs,
    /// Any Linux distribution.
    Linux,
    /// An operating system without a published archive.
    Other,
}

impl OsFamily {
    /// Maps a `std::env::consts::OS` style identifier onto a family.
    #[must_use]
    pub fn from_os_str(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }
}

/// CPU architecture the shell archive is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuArch {
    /// 64-bit x86.
    X86_64,
    /// 64-bit ARM.
    Aarch64,
    /// An architecture without a published archive.
    Other,
}

impl CpuArch {
    /// Maps a `std::env::consts::ARCH` style identifier onto an architecture.
    #[must_use]
    pub fn from_arch_str(arch: &str) -> Self {
        match arch {
            "x86_64" => Self::X86_64,
            "aarch64" => Self::Aarch64,
            _ => Self::Other,
        }
    }
}

/// Identifies the operating system and CPU architecture of a host.
///
/// # Examples
/// ```
/// use mongosh_setup::{CpuArch, OsFamily, PlatformDescriptor};
///
/// let linux = PlatformDescriptor::new(OsFamily::Linux, CpuArch::X86_64);
/// let entry = linux.archive_entry().expect("linux x64 is supported");
/// assert_eq!(entry.archive_file_name, "linux-x64.zip");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformDescriptor {
    /// Operating-system family.
    pub os: OsFamily,
    /// CPU architecture.
    pub arch: CpuArch,
}

static CURRENT_PLATFORM: OnceLock<PlatformDescriptor> = OnceLock::new();

impl PlatformDescriptor {
    /// Builds a descriptor from its parts.
    #[must_use]
    pub const fn new(os: OsFamily, arch: CpuArch) -> Self {
        Self { os, arch }
    }

    /// Returns the descriptor of the running process, resolving it on first use.
    #[must_use]
    pub fn current() -> Self {
        *CURRENT_PLATFORM.get_or_init(|| {
            Self::new(
                OsFamily::from_os_str(std::env::consts::OS),
                CpuArch::from_arch_str(std::env::consts::ARCH),
            )
        })
    }

    /// Looks up the archive published for this platform.
    ///
    /// Returns `None` when no archive exists for the pairing.
    #[must_use]
    pub const fn archive_entry(self) -> Option<&'static BinaryArchiveEntry> {
        match (self.os, self.arch) {
            (OsFamily::Windows, CpuArch::X86_64) => Some(&WINDOWS_X64),
            (OsFamily::MacOs, CpuArch::X86_64) => Some(&DARWIN_X64),
            (OsFamily::Linux, CpuArch::X86_64) => Some(&LINUX_X64),
            _ => None,
        }
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{:?}", self.os, self.arch)
    }
}

/// Archive and executable names for one supported platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryArchiveEntry {
    /// File name of the downloadable or bundled archive.
    pub archive_file_name: &'static str,
    /// File name of the executable once the archive is extracted.
    pub binary_file_name: &'static str,
}

const WINDOWS_X64: BinaryArchiveEntry = BinaryArchiveEntry {
    archive_file_name: "win32-x64.zip",
    binary_file_name: "mongosh.exe",
};

const DARWIN_X64: BinaryArchiveEntry = BinaryArchiveEntry {
    archive_file_name: "darwin-x64.zip",
    binary_file_name: "mongosh",
};

const LINUX_X64: BinaryArchiveEntry = BinaryArchiveEntry {
    archive_file_name: "linux-x64.zip",
    binary_file_name: "mongosh",
};

/// Every platform with a published archive.
pub const SUPPORTED_PLATFORMS: [PlatformDescriptor; 3] = [
    PlatformDescriptor::new(OsFamily::Windows, CpuArch::X86_64),
    PlatformDescriptor::new(OsFamily::MacOs, CpuArch::X86_64),
    PlatformDescriptor::new(OsFamily::Linux, CpuArch::X86_64),
];
