//! Pointer-chain resolution of the AI flag address.

use crate::layout::chain;
use crate::memory::ProcessMemory;

/// The fixed dereference path from the module base to the AI flag.
///
/// `pointer_offset` is added to the module base to find a 4-byte pointer
/// slot; `address_offset` is added to the little-endian value stored there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerChain {
    pub pointer_offset: u64,
    pub address_offset: u64,
}

impl Default for PointerChain {
    fn default() -> Self {
        Self {
            pointer_offset: chain::POINTER_OFFSET,
            address_offset: chain::ADDRESS_OFFSET,
        }
    }
}

/// Dereference `chain` rooted at `module_base` inside `memory`.
///
/// Returns `None` whenever the pointer slot cannot be read in full; a
/// partial read never produces a garbage address. Arithmetic is unsigned
/// and wrapping; the 32-bit image keeps real addresses far from the ceiling,
/// so wraparound is not specially guarded.
pub fn resolve_patch_address<M: ProcessMemory>(
    memory: &M,
    module_base: u64,
    chain: &PointerChain,
) -> Option<u64> {
    let slot = module_base.wrapping_add(chain.pointer_offset);
    let bytes = memory.read_bytes(slot, crate::layout::chain::POINTER_BYTES)?;
    let raw: [u8; 4] = bytes.as_slice().try_into().ok()?;
    let pointed = u32::from_le_bytes(raw);
    Some(u64::from(pointed).wrapping_add(chain.address_offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemory;

    const BASE: u64 = 0x1000_0000;

    fn chain() -> PointerChain {
        PointerChain::default()
    }

    #[test]
    fn resolves_pointed_value_plus_offset() {
        // Worked example: slot holds 0x28, so the flag lives at
        // 0x28 + 0xd28 = 0xd50.
        let mem = MockMemory::builder()
            .with_bytes(BASE + chain().pointer_offset, &[0x28, 0x00, 0x00, 0x00])
            .build();

        assert_eq!(resolve_patch_address(&mem, BASE, &chain()), Some(0xd50));
    }

    #[test]
    fn resolves_arbitrary_little_endian_values() {
        let chain = PointerChain {
            pointer_offset: 0x40,
            address_offset: 0x10,
        };
        let mem = MockMemory::builder()
            .with_u32_le(BASE + 0x40, 0x0042_abcd)
            .build();

        assert_eq!(
            resolve_patch_address(&mem, BASE, &chain),
            Some(0x0042_abcd + 0x10)
        );
    }

    #[test]
    fn unpopulated_slot_is_unresolved() {
        let mem = MockMemory::builder().build();
        assert_eq!(resolve_patch_address(&mem, BASE, &chain()), None);
    }

    #[test]
    fn failed_read_is_unresolved() {
        let mem = MockMemory::builder()
            .with_bytes(BASE + chain().pointer_offset, &[0x28, 0x00, 0x00, 0x00])
            .build();
        mem.set_fail_reads(true);
        assert_eq!(resolve_patch_address(&mem, BASE, &chain()), None);
    }

    #[test]
    fn short_read_is_unresolved() {
        let mem = MockMemory::builder()
            .with_bytes(BASE + chain().pointer_offset, &[0x28, 0x00, 0x00, 0x00])
            .truncate_reads(3)
            .build();

        assert_eq!(resolve_patch_address(&mem, BASE, &chain()), None);
    }
}
