//! Border extrapolation shared by the filters.

/// Map a possibly out-of-range coordinate into `0..len` by mirroring
/// around the edge pixels without repeating them (`dcb|abcd|cba`).
///
/// Windows wider than the image reflect repeatedly, so any `i` is valid.
#[inline]
pub(crate) fn reflect_101(mut i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}
