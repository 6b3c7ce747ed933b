/// Integer truncation, checked in debug mode.
pub trait Truncate<To> {
    fn truncate(self) -> To;
}

macro_rules! impl_truncate {
    ($from:ty => $to:ty) => {
        const _: () = assert!(<$to>::BITS <= <$from>::BITS);

        impl Truncate<$to> for $from {
            fn truncate(self) -> $to {
                debug_assert!(self <= <$to>::MAX as $from);
                #[allow(clippy::cast_possible_truncation)]
                let truncated = self as $to;
                truncated
            }
        }
    };
}

impl_truncate!(u16 => u8);
impl_truncate!(u32 => u16);

/// Rounded integer division.
///
/// Halfway cases round away from zero.
pub trait DivRound {
    fn div_round(self, by: Self) -> Self;
}

macro_rules! impl_divround {
    ($self:ty) => {
        impl DivRound for $self {
            fn div_round(self, by: Self) -> Self {
                (self + by / 2) / by
            }
        }
    };
}

impl_divround!(u32);
impl_divround!(u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_round_rounds_halfway_up() {
        assert_eq!(750_000u32.div_round(32), 23_438); // 23437.5
        assert_eq!(750_000u32.div_round(18), 41_667); // 41666.67
        assert_eq!(750_000u32.div_round(902), 831); // 831.49
        assert_eq!(10u64.div_round(4), 3);
        assert_eq!(9u64.div_round(4), 2);
    }

    #[test]
    fn truncate_keeps_low_bits() {
        let low: u8 = 0x00ab_u16.truncate();
        assert_eq!(low, 0xab);
        let value: u16 = 41_667_u32.truncate();
        assert_eq!(value, 41_667);
    }
}
