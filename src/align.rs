/// Rounds `ix` up to the next multiple of `alignment`.
pub(crate) fn align(ix: usize, alignment: usize) -> usize {
    debug_assert!(
        alignment.is_power_of_two(),
        "{} is not power of 2, cannot be used as alignment",
        alignment
    );
    (ix + alignment - 1) & !(alignment - 1)
}

/// Pads `vec` with zero bytes up to `alignment`.
pub(crate) fn pad(vec: &mut Vec<u8>, alignment: usize) {
    vec.resize(align(vec.len(), alignment), 0);
}

#[cfg(test)]
mod tests {
    use super::{align, pad};

    #[test]
    fn alignment() {
        assert_eq!(align(23usize, 4usize), 24usize);
        assert_eq!(align(32usize, 4usize), 32usize);
        assert_eq!(align(31usize, 1usize), 31usize);
        assert_eq!(align(0usize, 8usize), 0usize);
        assert_eq!(align(25usize, 8usize), 32usize);
    }

    #[test]
    fn padding() {
        let mut data = vec![1u8, 2, 3];
        pad(&mut data, 8);
        assert_eq!(data, vec![1, 2, 3, 0, 0, 0, 0, 0]);
        pad(&mut data, 4);
        assert_eq!(data.len(), 8);
    }
}
