use crate::AssetError;

/// A texture slot handed out by a [`TextureUnitAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureUnit(u32);

impl TextureUnit {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Hands out sequential texture units, starting at zero.
///
/// Owned by whoever creates textures and passed into each texture
/// constructor, so unit assignment is scoped to that owner.
#[derive(Debug, Clone)]
pub struct TextureUnitAllocator {
    next: u32,
    capacity: u32,
}

impl TextureUnitAllocator {
    pub fn new(capacity: u32) -> Self {
        Self { next: 0, capacity }
    }

    pub fn allocate(&mut self) -> Result<TextureUnit, AssetError> {
        if self.next >= self.capacity {
            return Err(AssetError::TextureUnitsExhausted {
                capacity: self.capacity,
            });
        }
        let unit = TextureUnit(self.next);
        self.next += 1;
        Ok(unit)
    }

    /// Number of units handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_are_sequential() {
        let mut units = TextureUnitAllocator::new(4);
        assert_eq!(units.allocate().unwrap().index(), 0);
        assert_eq!(units.allocate().unwrap().index(), 1);
        assert_eq!(units.allocated(), 2);
    }

    #[test]
    fn exhaustion_is_an_error() {
        let mut units = TextureUnitAllocator::new(1);
        units.allocate().unwrap();
        assert!(matches!(
            units.allocate(),
            Err(AssetError::TextureUnitsExhausted { capacity: 1 })
        ));
        assert_eq!(units.allocated(), 1);
    }

    #[test]
    fn allocators_are_independent() {
        let mut a = TextureUnitAllocator::new(8);
        let mut b = TextureUnitAllocator::new(8);
        a.allocate().unwrap();
        a.allocate().unwrap();
        assert_eq!(b.allocate().unwrap(), TextureUnit(0));
        assert_eq!(b.capacity(), 8);
    }
}
