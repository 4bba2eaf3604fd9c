use anyhow::{Context, Result, bail};
use std::collections::HashSet;

/// Seed used when the command line names none.
pub const DEFAULT_SEED: u64 = 1337;

/// Largest span a single `start..end` token may expand to.
const MAX_RANGE_LEN: u64 = 10_000;

/// Resolve CLI seed tokens into a de-duplicated, ordered seed list.
///
/// Supports literal integers (negative values use their magnitude) and
/// half-open ranges such as `10..20`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once("..") {
            let start: u64 = start
                .parse()
                .with_context(|| format!("invalid range start in seed token: {token}"))?;
            let end: u64 = end
                .parse()
                .with_context(|| format!("invalid range end in seed token: {token}"))?;
            if end <= start || end - start > MAX_RANGE_LEN {
                bail!("seed range {token} must be non-empty and at most {MAX_RANGE_LEN} long");
            }
            seeds.extend((start..end).filter(|seed| seen.insert(*seed)));
            continue;
        }

        let seed = if let Ok(value) = token.parse::<u64>() {
            value
        } else if let Ok(value) = token.parse::<i64>() {
            value.unsigned_abs()
        } else {
            bail!("Unrecognized seed token: {token}");
        };
        if seen.insert(seed) {
            seeds.push(seed);
        }
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}
