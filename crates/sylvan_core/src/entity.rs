/// Namespace of an [`EntityId`], stored in the top byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Namespace {
    /// Terrain blocks: major = column index, minor = row index
    Block = 1,
    /// Tree parts: major = column index, minor = part index
    Tree = 2,
    /// Objects owned by the host (sky, sun, night overlay, avatar)
    Host = 3,
}

/// Stable handle for anything handed to the placement sink or animated by
/// the tween scheduler.
///
/// Ids are derived from grid coordinates rather than allocated, so the same
/// world location always maps to the same id no matter when it was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    const MINOR_MASK: u64 = 0x00FF_FFFF;

    /// Pack a namespace, a signed major coordinate and a 24-bit minor index.
    pub const fn pack(namespace: Namespace, major: i32, minor: u32) -> Self {
        let ns = (namespace as u64) << 56;
        let major = (major as u32 as u64) << 24;
        Self(ns | major | (minor as u64 & Self::MINOR_MASK))
    }

    pub fn namespace(self) -> Option<Namespace> {
        match (self.0 >> 56) as u8 {
            1 => Some(Namespace::Block),
            2 => Some(Namespace::Tree),
            3 => Some(Namespace::Host),
            _ => None,
        }
    }

    pub fn major(self) -> i32 {
        ((self.0 >> 24) & 0xFFFF_FFFF) as u32 as i32
    }

    pub fn minor(self) -> u32 {
        (self.0 & Self::MINOR_MASK) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_unpack() {
        let id = EntityId::pack(Namespace::Tree, -17, 42);
        assert_eq!(id.namespace(), Some(Namespace::Tree));
        assert_eq!(id.major(), -17);
        assert_eq!(id.minor(), 42);
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let block = EntityId::pack(Namespace::Block, 3, 0);
        let tree = EntityId::pack(Namespace::Tree, 3, 0);
        assert_ne!(block, tree);
    }
}
