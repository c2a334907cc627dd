//! Run-length codec over flattened 8-bit pixel streams.
//!
//! Tokens are (symbol, run-length) pairs with run >= 1. There is no
//! compression guarantee: alternating symbols yield one token per symbol.

use crate::error::{ObscuraError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunToken {
    pub symbol: u8,
    pub run: u32,
}

/// Scan left to right, emitting a token whenever the symbol changes and one
/// final token for the trailing run.
pub fn encode(symbols: &[u8]) -> Result<Vec<RunToken>> {
    let (&first, rest) = symbols.split_first().ok_or(ObscuraError::EmptyInput)?;

    let mut tokens = Vec::new();
    let mut prev = first;
    let mut run: u32 = 1;
    for &s in rest {
        if s == prev {
            run += 1;
        } else {
            tokens.push(RunToken { symbol: prev, run });
            prev = s;
            run = 1;
        }
    }
    tokens.push(RunToken { symbol: prev, run });
    Ok(tokens)
}

/// Expand each token into `run` repetitions of its symbol, in order.
pub fn decode(tokens: &[RunToken], expected_len: usize) -> Result<Vec<u8>> {
    let mut decoded = Vec::with_capacity(expected_len);
    for token in tokens {
        for _ in 0..token.run {
            decoded.push(token.symbol);
        }
    }
    if decoded.len() != expected_len {
        return Err(ObscuraError::DecodeMismatch(format!(
            "expanded {} symbols, expected {}",
            decoded.len(),
            expected_len
        )));
    }
    Ok(decoded)
}
