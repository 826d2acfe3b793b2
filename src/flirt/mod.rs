//! Core FLIRT signature reader module

pub mod error;
pub mod models;
mod compression;
mod header;
mod reader;
mod tree;

use log::info;

pub use compression::decompress_gzip;
pub use error::{FlirtError, Result};
use models::{FlirtFunction, FlirtHeader, FlirtModule};
use reader::ParseState;

/// A fully parsed FLIRT signature file.
///
/// Produced by a single call to [`parse`]; thereafter an immutable value
/// with no internal aliasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlirtFile {
    pub header: FlirtHeader,
    /// Human-readable library name from the header, Latin-1 decoded.
    pub library_name: String,
    /// Modules in depth-first, child-in-declaration-order of the tree.
    pub modules: Vec<FlirtModule>,
}

impl FlirtFile {
    /// Flattened view of every public function together with its module
    /// and the module's index, in module order.
    pub fn functions(&self) -> impl Iterator<Item = (usize, &FlirtModule, &FlirtFunction)> {
        self.modules
            .iter()
            .enumerate()
            .flat_map(|(index, module)| {
                module
                    .public_functions
                    .iter()
                    .map(move |function| (index, module, function))
            })
    }
}

/// Probe for the FLIRT magic and a supported version.
///
/// Returns the version byte when `data` starts with `IDASGN` and the
/// version is within the supported range. Cheap enough to run on every
/// candidate file before committing to a full parse.
pub fn is_flirt(data: &[u8]) -> Option<u8> {
    if data.len() < 7 || &data[..6] != header::MAGIC {
        return None;
    }
    let version = data[6];
    (header::VERSION_MIN..=header::VERSION_MAX)
        .contains(&version)
        .then_some(version)
}

/// Parse a `.sig` body into its header and module list.
///
/// The input must be the raw signature bytes; gzip containers are
/// unwrapped separately with [`decompress_gzip`]. Compressed bodies
/// (header feature bit 0x10) are inflated transparently. Trailing bytes
/// after the signature tree are permitted and ignored.
///
/// Parsing is fail-fast: the first failing step returns its error and no
/// partial module list is produced.
pub fn parse(data: &[u8]) -> Result<FlirtFile> {
    let mut st = ParseState::new(data);
    let (hdr, library_name) = header::parse(&mut st)?;
    info!(
        "FLIRT v{} signature file, library {:?}",
        hdr.version, library_name
    );

    if hdr.is_compressed() {
        let inflated = compression::inflate_body(st.remaining(), hdr.version)?;
        st.replace_body(inflated);
    }

    let mut path = Vec::new();
    let mut modules = Vec::new();
    tree::walk(&mut st, &mut path, &mut modules)?;
    info!("parsed {} modules from {:?}", modules.len(), library_name);

    Ok(FlirtFile {
        header: hdr,
        library_name,
        modules,
    })
}
