/// The parts of a number that plural rules look at.
/// 複數規則所需的數值運算元。
///
/// Only the absolute value matters. An `f64` holding a whole number is
/// treated exactly like the integer, so `1.0` and `1` select the same form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operands {
    n: f64,
    i: u64,
    fraction: bool,
}

impl Operands {
    /// Absolute value.
    pub fn n(&self) -> f64 {
        self.n
    }

    /// Integer digits of the absolute value.
    pub fn i(&self) -> u64 {
        self.i
    }

    /// True when the number has non-zero fraction digits (CLDR `v != 0`).
    /// 數值是否帶有非零小數位。
    pub fn has_fraction(&self) -> bool {
        self.fraction
    }

    /// Whole numbers only; `None` when fraction digits are present.
    pub(crate) fn integer(&self) -> Option<u64> {
        if self.fraction {
            None
        } else {
            Some(self.i)
        }
    }
}

impl From<u64> for Operands {
    fn from(value: u64) -> Self {
        Self {
            n: value as f64,
            i: value,
            fraction: false,
        }
    }
}

impl From<i64> for Operands {
    fn from(value: i64) -> Self {
        Self::from(value.unsigned_abs())
    }
}

impl From<u32> for Operands {
    fn from(value: u32) -> Self {
        Self::from(u64::from(value))
    }
}

impl From<i32> for Operands {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<usize> for Operands {
    fn from(value: usize) -> Self {
        Self::from(value as u64)
    }
}

impl From<f64> for Operands {
    fn from(value: f64) -> Self {
        let n = value.abs();
        let fraction = n.fract() != 0.0;
        Self {
            n,
            // `as` saturates, so infinities stay in range
            i: n.trunc() as u64,
            fraction,
        }
    }
}
