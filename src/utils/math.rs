/// Integer mean of two depths, truncated. Computed in 64 bits so that two values
/// near `u32::MAX` do not wrap.
#[inline]
pub fn mean_of_two(a: u32, b: u32) -> u32 {
    ((a as u64 + b as u64) / 2) as u32
}

/// Sorts `data` in place and returns its median. For an even number of elements
/// the median is the truncated mean of the two central values.
pub fn median_in_place(data: &mut [u32]) -> Option<u32> {
    let size = data.len();
    if size == 0 {
        return None;
    }
    data.sort_unstable();
    let lhs = (size - 1) / 2;
    let rhs = size / 2;
    if lhs == rhs {
        Some(data[lhs])
    } else {
        Some(mean_of_two(data[lhs], data[rhs]))
    }
}
