pub fn divide_rounded_up_u64(value: u64, divisor: u64) -> u64 {
    let rem = value % divisor;
    if rem == 0 {
        value / divisor
    } else {
        value / divisor + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_rounded_up_u64_rounds_to_the_next_integer() {
        assert_eq!(divide_rounded_up_u64(5, 2), 3);
        assert_eq!(divide_rounded_up_u64(4, 2), 2);
        assert_eq!(divide_rounded_up_u64(1, 10), 1);
    }
}
