// Hypertree addresses: eight 32-bit words serialized big-endian, every
// field written through a domain-separated setter. Layout: layer, tree
// (two words), type, keypair, chain/tree-height, hash/tree-index, zero.

pub(crate) const ADDR_TYPE_WOTS: u32 = 0;
pub(crate) const ADDR_TYPE_WOTSPK: u32 = 1;
pub(crate) const ADDR_TYPE_HASHTREE: u32 = 2;
pub(crate) const ADDR_TYPE_FORSTREE: u32 = 3;
pub(crate) const ADDR_TYPE_FORSPK: u32 = 4;


/// One structured 32-byte hash tweak.
#[derive(Clone, Copy, Default)]
pub(crate) struct Adrs([u32; 8]);


impl Adrs {
    pub(crate) fn set_layer(&mut self, layer: u32) { self.0[0] = layer; }

    #[allow(clippy::cast_possible_truncation)] // the split is the encoding
    pub(crate) fn set_tree(&mut self, tree: u64) {
        self.0[1] = (tree >> 32) as u32;
        self.0[2] = tree as u32;
    }

    pub(crate) fn set_type(&mut self, type_: u32) { self.0[3] = type_; }

    /// Copies the layer and tree part of one address into the other.
    pub(crate) fn copy_subtree(&mut self, other: &Adrs) {
        self.0[0] = other.0[0];
        self.0[1] = other.0[1];
        self.0[2] = other.0[2];
    }

    pub(crate) fn set_keypair(&mut self, keypair: u32) { self.0[4] = keypair; }

    /// Copies layer, tree and keypair (for the WOTS-pk and FORS-pk tweaks).
    pub(crate) fn copy_keypair(&mut self, other: &Adrs) {
        self.copy_subtree(other);
        self.0[4] = other.0[4];
    }

    pub(crate) fn set_chain(&mut self, chain: u32) { self.0[5] = chain; }

    pub(crate) fn set_hash(&mut self, hash: u32) { self.0[6] = hash; }

    pub(crate) fn set_tree_height(&mut self, height: u32) { self.0[5] = height; }

    pub(crate) fn set_tree_index(&mut self, index: u32) { self.0[6] = index; }

    pub(crate) fn to_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_separation() {
        let mut a = Adrs::default();
        a.set_layer(7);
        a.set_tree(0x0102_0304_0506_0708);
        a.set_type(ADDR_TYPE_HASHTREE);
        a.set_tree_height(3);
        a.set_tree_index(77);
        let bytes = a.to_bytes();
        assert_eq!(&bytes[0..4], &[0, 0, 0, 7]);
        assert_eq!(&bytes[4..12], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 2]);
        assert_eq!(&bytes[20..24], &[0, 0, 0, 3]);
        assert_eq!(&bytes[24..28], &[0, 0, 0, 77]);

        // chain/hash share words with tree-height/tree-index
        let mut b = Adrs::default();
        b.set_chain(3);
        b.set_hash(77);
        assert_eq!(b.to_bytes()[20..28], bytes[20..28]);
    }
}
