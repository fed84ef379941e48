//! Core configuration. A plain struct with sane defaults, overridable by
//! the embedding binary, mirroring the teacher's own `config.rs` pattern
//! rather than reaching for a global.

/// The three tunables the Chunked Seekable Assembler recognizes (§6).
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Bytes kept in memory before spilling to a temp file. Default 1 MiB.
    pub mem_bytes: u64,
    /// Absolute size ceiling for a single literal. Default 1000 MiB.
    pub max_bytes: u64,
    /// Prefix used when creating the spill temp file.
    pub temp_file_prefix: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            mem_bytes: 1024 * 1024,
            max_bytes: 1000 * 1024 * 1024,
            temp_file_prefix: "imap-core-append-".to_string(),
        }
    }
}

/// Top-level core configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub assembler: AssemblerConfig,
    pub bind_addr: Option<std::net::SocketAddr>,
}
