use bitflags::bitflags;

bitflags! {
    /// Per-node bits computed once at construction.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct NodeFlags: u8 {
        /// This node or a descendant carries diagnostics.
        const CONTAINS_DIAGNOSTICS = 1 << 0;
        /// This node carries diagnostics in the side table.
        const HAS_DIAGNOSTICS_DIRECTLY = 1 << 1;
        /// This node or a descendant carries annotations.
        const CONTAINS_ANNOTATIONS = 1 << 2;
        /// This node carries annotations in the side table.
        const HAS_ANNOTATIONS_DIRECTLY = 1 << 3;
        /// Zero-width placeholder for expected but absent syntax.
        const IS_MISSING = 1 << 4;
        /// This node or a descendant is missing.
        const CONTAINS_MISSING = 1 << 5;
        const IS_LIST = 1 << 6;

        /// Bits a parent absorbs from each of its children.
        const INHERITED = Self::CONTAINS_DIAGNOSTICS.bits()
            | Self::CONTAINS_ANNOTATIONS.bits()
            | Self::CONTAINS_MISSING.bits();
    }
}
