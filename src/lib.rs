//! FLIRT signature file reader.
//!
//! Parses IDA FLIRT `.sig` files (format versions 5 through 10) and their
//! gzip containers (`.sig.gz`) into an immutable header plus a depth-first
//! list of signature modules. Each module carries its pattern prefix, a
//! CRC over the bytes following the prefix, the module length, its public
//! functions, and optional tail-byte and referenced-function rules.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("libc.sig")?;
//! let file = flirt_reader::parse(&data)?;
//! println!("{}: {} modules", file.library_name, file.modules.len());
//! for (_, module, function) in file.functions() {
//!     println!("{:>6}  {}  {}", function.offset, module.pattern_path_hex(), function.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Writing signature files and matching signatures against binaries are
//! out of scope.

pub mod flirt;

pub use flirt::error::{FlirtError, Result};
pub use flirt::models::{
    FlirtFunction, FlirtHeader, FlirtModule, PatternNode, ReferencedFunction, TailByte,
};
pub use flirt::{decompress_gzip, is_flirt, parse, FlirtFile};
