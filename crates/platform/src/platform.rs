//! Host platform detection and native artifact naming

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating systems with known link conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
}

impl Platform {
    /// Detect the current platform at compile time
    #[cfg(target_os = "macos")]
    pub const fn host() -> Self {
        Platform::Darwin
    }

    #[cfg(target_os = "windows")]
    pub const fn host() -> Self {
        Platform::Windows
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    pub const fn host() -> Self {
        Platform::Linux
    }

    /// Returns the platform name as used in logs and diagnostics
    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
            Platform::Windows => "windows",
        }
    }

    /// Linker flag that produces a shared library on this platform
    pub const fn shared_library_flag(&self) -> &'static str {
        match self {
            Platform::Linux | Platform::Windows => "-shared",
            Platform::Darwin => "-dynamiclib",
        }
    }

    /// Conventional suffix for static libraries (without the dot)
    pub const fn static_library_suffix(&self) -> &'static str {
        match self {
            Platform::Linux | Platform::Darwin => "a",
            Platform::Windows => "lib",
        }
    }

    /// Conventional suffix for dynamic libraries (without the dot)
    pub const fn dynamic_library_suffix(&self) -> &'static str {
        match self {
            Platform::Linux => "so",
            Platform::Darwin => "dylib",
            Platform::Windows => "dll",
        }
    }

    /// Conventional file name for a static library called `name`
    pub fn static_library_name(&self, name: &str) -> String {
        match self {
            Platform::Windows => format!("{}.{}", name, self.static_library_suffix()),
            _ => format!("lib{}.{}", name, self.static_library_suffix()),
        }
    }

    /// Conventional file name for a dynamic library called `name`
    pub fn dynamic_library_name(&self, name: &str) -> String {
        match self {
            Platform::Windows => format!("{}.{}", name, self.dynamic_library_suffix()),
            _ => format!("lib{}.{}", name, self.dynamic_library_suffix()),
        }
    }

    /// Conventional file name for an executable called `name`
    pub fn executable_name(&self, name: &str) -> String {
        match self {
            Platform::Windows => format!("{}.exe", name),
            _ => name.to_string(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_detection_does_not_panic() {
        let platform = Platform::host();
        assert!(!platform.as_str().is_empty());
    }

    #[test]
    fn shared_library_flags() {
        assert_eq!(Platform::Linux.shared_library_flag(), "-shared");
        assert_eq!(Platform::Darwin.shared_library_flag(), "-dynamiclib");
        assert_eq!(Platform::Windows.shared_library_flag(), "-shared");
    }

    #[test]
    fn static_library_names() {
        assert_eq!(Platform::Linux.static_library_name("demo"), "libdemo.a");
        assert_eq!(Platform::Darwin.static_library_name("demo"), "libdemo.a");
        assert_eq!(Platform::Windows.static_library_name("demo"), "demo.lib");
    }

    #[test]
    fn dynamic_library_names() {
        assert_eq!(Platform::Linux.dynamic_library_name("demo"), "libdemo.so");
        assert_eq!(Platform::Darwin.dynamic_library_name("demo"), "libdemo.dylib");
        assert_eq!(Platform::Windows.dynamic_library_name("demo"), "demo.dll");
    }

    #[test]
    fn executable_names() {
        assert_eq!(Platform::Linux.executable_name("demo"), "demo");
        assert_eq!(Platform::Windows.executable_name("demo"), "demo.exe");
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", Platform::Darwin), "darwin");
    }
}
