//! FLIRT header parsing

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;

use super::error::{FlirtError, Result};
use super::models::FlirtHeader;
use super::reader::{latin1, ParseState};

/// Signature file magic, first six bytes of every `.sig`.
pub const MAGIC: &[u8; 6] = b"IDASGN";

/// Lowest and highest supported format versions.
pub const VERSION_MIN: u8 = 5;
pub const VERSION_MAX: u8 = 10;

/// Parse the header at the start of a signature body.
///
/// Layout after the 6-byte magic and the version byte:
///
/// ```text
/// arch(1) file_types(4 LE) os_types(2 LE) app_types(2 LE) features(2 LE)
/// old_n_functions(2 LE) crc16(2 LE) ctype(12) library_name_len(1)
/// ctypes_crc16(2 LE)                                  -- 30-byte v5 tail
/// n_functions(4 LE)                                   -- version >= 6
/// pattern_size(2 BE)                                  -- version >= 8
/// unknown_v10(2 BE)                                   -- version == 10
/// library_name(library_name_len bytes, Latin-1)
/// ```
///
/// Note the endianness switch: the early fields are little-endian while
/// `pattern_size` and `unknown_v10` are big-endian.
///
/// On success the cursor is positioned at the first body byte and the
/// state's `version` field is set for the body decoders.
pub fn parse(st: &mut ParseState<'_>) -> Result<(FlirtHeader, String)> {
    if st.body_len() < 7 {
        return Err(FlirtError::NotFlirt);
    }
    let magic = st.take(6).ok_or(FlirtError::NotFlirt)?;
    if magic != MAGIC {
        return Err(FlirtError::NotFlirt);
    }

    let mut header = FlirtHeader {
        version: st.byte(),
        ..FlirtHeader::default()
    };
    if !(VERSION_MIN..=VERSION_MAX).contains(&header.version) {
        return Err(FlirtError::UnsupportedVersion(header.version));
    }
    st.version = header.version;

    let fixed = st.take(30).ok_or(FlirtError::Truncated {
        section: "v5 header",
    })?;
    header.arch = fixed[0];
    header.file_types = LittleEndian::read_u32(&fixed[1..5]);
    header.os_types = LittleEndian::read_u16(&fixed[5..7]);
    header.app_types = LittleEndian::read_u16(&fixed[7..9]);
    header.features = LittleEndian::read_u16(&fixed[9..11]);
    header.old_n_functions = LittleEndian::read_u16(&fixed[11..13]);
    header.crc16 = LittleEndian::read_u16(&fixed[13..15]);
    header.ctype.copy_from_slice(&fixed[15..27]);
    header.library_name_len = fixed[27];
    header.ctypes_crc16 = LittleEndian::read_u16(&fixed[28..30]);

    if header.version >= 6 {
        let bytes = st.take(4).ok_or(FlirtError::Truncated {
            section: "v6/v7 header",
        })?;
        header.n_functions = LittleEndian::read_u32(bytes);

        if header.version >= 8 {
            let bytes = st.take(2).ok_or(FlirtError::Truncated {
                section: "v8/v9 header",
            })?;
            header.pattern_size = BigEndian::read_u16(bytes);

            if header.version >= 10 {
                let bytes = st.take(2).ok_or(FlirtError::Truncated {
                    section: "v10 header",
                })?;
                header.unknown_v10 = BigEndian::read_u16(bytes);
            }
        }
    }

    let name_bytes = st
        .take(usize::from(header.library_name_len))
        .ok_or(FlirtError::Truncated {
            section: "library name",
        })?;
    let library_name = latin1(name_bytes);

    debug!(
        "header: version={}, arch={}, features={:#06x}, library={:?}",
        header.version, header.arch, header.features, library_name
    );

    Ok((header, library_name))
}
