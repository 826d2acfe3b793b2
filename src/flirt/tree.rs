//! Signature tree decoding: pattern nodes and leaf modules

use log::trace;

use super::error::{FlirtError, Result};
use super::models::{
    FlirtFunction, FlirtModule, PatternNode, ReferencedFunction, TailByte, NAME_MAX,
};
use super::reader::{latin1, ParseState};

// Flag bits in the byte that terminates each public-function name.
const MORE_PUBLIC_NAMES: u8 = 0x01;
const READ_TAIL_BYTES: u8 = 0x02;
const READ_REFERENCED_FUNCTIONS: u8 = 0x04;
const MORE_MODULES_WITH_SAME_CRC: u8 = 0x08;
const MORE_MODULES: u8 = 0x10;

// Attribute bits in a sub-0x20 byte preceding a function name.
const FUNCTION_LOCAL: u8 = 0x02;
const FUNCTION_UNRESOLVED_COLLISION: u8 = 0x08;

// Pattern nodes longer than this do not occur in any known version.
const NODE_LEN_MAX: usize = 63;

/// Walk the signature tree depth-first, appending one module per leaf
/// record to `modules`.
///
/// `path` carries the pattern nodes entered so far; each recursion pushes
/// its node before descending and pops it afterwards, so a leaf sees
/// exactly the root-to-leaf prefix.
pub fn walk(
    st: &mut ParseState<'_>,
    path: &mut Vec<PatternNode>,
    modules: &mut Vec<FlirtModule>,
) -> Result<()> {
    let tree_nodes = st.multi();
    if st.is_short() {
        return Err(FlirtError::UnexpectedEof);
    }
    if tree_nodes == 0 {
        return parse_leaf(st, path, modules);
    }
    for _ in 0..tree_nodes {
        let node = parse_node(st)?;
        path.push(node);
        walk(st, path, modules)?;
        path.pop();
    }
    Ok(())
}

/// Decode one pattern node: length, variant bit-mask, then only the
/// concrete bytes. Variant positions occupy no storage in the stream.
fn parse_node(st: &mut ParseState<'_>) -> Result<PatternNode> {
    let len = usize::from(st.byte());
    if st.is_short() {
        return Err(FlirtError::UnexpectedEof);
    }
    if len == 0 || len > NODE_LEN_MAX {
        return Err(FlirtError::TreeCorrupt);
    }

    // Mask width follows the node length; bit (len - 1) is byte index 0.
    let mask: u64 = if len < 16 {
        u64::from(st.max2())
    } else if len <= 32 {
        u64::from(st.multi())
    } else {
        (u64::from(st.multi()) << 32) | u64::from(st.multi())
    };
    if st.is_short() {
        return Err(FlirtError::UnexpectedEof);
    }

    let mut pattern_bytes = Vec::with_capacity(len);
    let mut variant_mask = Vec::with_capacity(len);
    for i in 0..len {
        if mask & (1u64 << (len - 1 - i)) != 0 {
            pattern_bytes.push(0);
            variant_mask.push(true);
        } else {
            let b = st.byte();
            if st.is_short() {
                return Err(FlirtError::UnexpectedEof);
            }
            pattern_bytes.push(b);
            variant_mask.push(false);
        }
    }
    Ok(PatternNode {
        pattern_bytes,
        variant_mask,
    })
}

/// Decode one leaf: an outer run of CRC blocks, each holding an inner run
/// of modules sharing that CRC. Both runs are driven by continuation bits
/// in the flag byte threaded out of the function decoder.
fn parse_leaf(
    st: &mut ParseState<'_>,
    path: &[PatternNode],
    modules: &mut Vec<FlirtModule>,
) -> Result<()> {
    let mut flags;
    loop {
        let crc_length = st.byte();
        let crc16 = st.u16be();
        if st.is_short() {
            return Err(FlirtError::UnexpectedEof);
        }
        loop {
            let length = read_length_field(st);
            if st.is_short() {
                return Err(FlirtError::UnexpectedEof);
            }
            let mut module = FlirtModule {
                pattern_path: path.to_vec(),
                crc_length,
                crc16,
                length,
                public_functions: Vec::new(),
                tail_bytes: Vec::new(),
                referenced_functions: Vec::new(),
            };

            flags = parse_public_functions(st, &mut module)?;
            if flags & READ_TAIL_BYTES != 0 {
                parse_tail_bytes(st, &mut module)?;
            }
            if flags & READ_REFERENCED_FUNCTIONS != 0 {
                parse_referenced_functions(st, &mut module)?;
            }

            trace!(
                "module at {:?}: {} functions, crc16={:#06x}",
                module.pattern_path_hex(),
                module.public_functions.len(),
                crc16
            );
            modules.push(module);

            if flags & MORE_MODULES_WITH_SAME_CRC == 0 {
                break;
            }
        }
        if flags & MORE_MODULES == 0 {
            break;
        }
    }
    Ok(())
}

// Module lengths and offsets widened from max2 to multi in version 9.
fn read_length_field(st: &mut ParseState<'_>) -> u32 {
    if st.version >= 9 {
        st.multi()
    } else {
        u32::from(st.max2())
    }
}

/// Decode the public-function list of one module.
///
/// The sub-0x20 byte that terminates the last name doubles as the module
/// flag byte, so it is returned to the caller rather than re-read from
/// the stream.
fn parse_public_functions(st: &mut ParseState<'_>, module: &mut FlirtModule) -> Result<u8> {
    // Offsets accumulate across the module's functions; the stream stores
    // deltas only.
    let mut offset: u32 = 0;
    loop {
        let delta = read_length_field(st);
        if st.is_short() {
            return Err(FlirtError::UnexpectedEof);
        }
        offset = offset.wrapping_add(delta);

        let mut is_local = false;
        let mut is_collision = false;
        let mut b = st.byte();
        if st.is_short() {
            return Err(FlirtError::UnexpectedEof);
        }
        if b < 0x20 {
            is_local = b & FUNCTION_LOCAL != 0;
            is_collision = b & FUNCTION_UNRESOLVED_COLLISION != 0;
            b = st.byte();
            if st.is_short() {
                return Err(FlirtError::UnexpectedEof);
            }
        }

        let mut name_bytes = Vec::new();
        while b >= 0x20 && name_bytes.len() < NAME_MAX {
            name_bytes.push(b);
            b = st.byte();
            if st.is_short() {
                return Err(FlirtError::UnexpectedEof);
            }
        }

        module.public_functions.push(FlirtFunction {
            offset,
            name: latin1(&name_bytes),
            is_local,
            is_collision,
        });

        if b & MORE_PUBLIC_NAMES == 0 {
            return Ok(b);
        }
    }
}

/// Tail-byte block: `(offset, value)` pairs. Versions before 8 store a
/// single pair with no count byte.
fn parse_tail_bytes(st: &mut ParseState<'_>, module: &mut FlirtModule) -> Result<()> {
    let count = if st.version >= 8 { st.byte() } else { 1 };
    if st.is_short() {
        return Err(FlirtError::UnexpectedEof);
    }
    for _ in 0..count {
        let offset = read_length_field(st);
        if st.is_short() {
            return Err(FlirtError::UnexpectedEof);
        }
        let value = st.byte();
        if st.is_short() {
            return Err(FlirtError::UnexpectedEof);
        }
        module.tail_bytes.push(TailByte { offset, value });
    }
    Ok(())
}

/// Referenced-function block. A name length of 0 escapes to a `multi`
/// length; a trailing NUL in the name bytes marks a negative offset.
fn parse_referenced_functions(st: &mut ParseState<'_>, module: &mut FlirtModule) -> Result<()> {
    let count = if st.version >= 8 { st.byte() } else { 1 };
    if st.is_short() {
        return Err(FlirtError::UnexpectedEof);
    }
    for _ in 0..count {
        let offset = read_length_field(st);
        if st.is_short() {
            return Err(FlirtError::UnexpectedEof);
        }

        let mut name_len = u32::from(st.byte());
        if st.is_short() {
            return Err(FlirtError::UnexpectedEof);
        }
        if name_len == 0 {
            name_len = st.multi();
            if st.is_short() {
                return Err(FlirtError::UnexpectedEof);
            }
        }
        if name_len as usize >= NAME_MAX {
            return Err(FlirtError::TreeCorrupt);
        }

        let mut name_bytes = Vec::with_capacity(name_len as usize);
        for _ in 0..name_len {
            let b = st.byte();
            if st.is_short() {
                return Err(FlirtError::UnexpectedEof);
            }
            name_bytes.push(b);
        }
        let negative_offset = name_bytes.last() == Some(&0);
        if negative_offset {
            name_bytes.pop();
        }

        module.referenced_functions.push(ReferencedFunction {
            offset,
            name: latin1(&name_bytes),
            negative_offset,
        });
    }
    Ok(())
}
