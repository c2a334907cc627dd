use crate::error::{ObscuraError, Result};

/// Occurrence counts over one flattened frame. The alphabet is the 8-bit
/// intensity range, so the table is a fixed 256-slot array rather than a map.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    counts: [u64; 256],
    total: u64,
}

impl FrequencyTable {
    /// Tabulate symbol frequencies in one O(n) pass.
    pub fn build(symbols: &[u8]) -> Result<Self> {
        if symbols.is_empty() {
            return Err(ObscuraError::EmptyInput);
        }
        let mut counts = [0u64; 256];
        for &s in symbols {
            counts[s as usize] += 1;
        }
        Ok(Self { counts, total: symbols.len() as u64 })
    }

    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Sum of all counts; equals the source sequence length.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of symbols with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// (symbol, count) pairs for occurring symbols, in symbol order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(s, &c)| (s as u8, c))
    }
}
