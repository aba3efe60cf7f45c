use std::collections::HashMap;

use xxhash_rust::xxh3::xxh3_64;

use crate::model::{OpSpan, OpTag, Opcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Match {
    a: usize,
    b: usize,
    size: usize,
}

/// Hash each element so alignment compares fixed-width keys.
pub(crate) fn content_keys<S: AsRef<str>>(items: &[S]) -> Vec<u64> {
    items
        .iter()
        .map(|item| xxh3_64(item.as_ref().as_bytes()))
        .collect()
}

/// Align two key sequences and return opcodes that partition both.
///
/// Matching blocks are anchored greedily on the longest common run, then the
/// regions on either side are aligned recursively. No element is ever
/// treated as junk, so the result depends only on the two sequences and
/// never on how often an element occurs.
pub fn compute_opcodes(a: &[u64], b: &[u64]) -> Vec<Opcode> {
    let mut opcodes = Vec::new();
    let mut i = 0usize;
    let mut j = 0usize;

    for block in matching_blocks(a, b) {
        let tag = match (i < block.a, j < block.b) {
            (true, true) => Some(OpTag::Replace),
            (true, false) => Some(OpTag::Delete),
            (false, true) => Some(OpTag::Insert),
            (false, false) => None,
        };
        if let Some(tag) = tag {
            opcodes.push(Opcode {
                tag,
                a: OpSpan::new(i, block.a),
                b: OpSpan::new(j, block.b),
            });
        }

        i = block.a + block.size;
        j = block.b + block.size;
        if block.size > 0 {
            opcodes.push(Opcode {
                tag: OpTag::Equal,
                a: OpSpan::new(block.a, i),
                b: OpSpan::new(block.b, j),
            });
        }
    }

    opcodes
}

/// Ordered, coalesced matching runs terminated by a zero-size sentinel at
/// `(a.len(), b.len())`.
fn matching_blocks(a: &[u64], b: &[u64]) -> Vec<Match> {
    let mut b_index: HashMap<u64, Vec<usize>> = HashMap::new();
    for (j, key) in b.iter().enumerate() {
        b_index.entry(*key).or_default().push(j);
    }

    let mut found = Vec::new();
    let mut pending = vec![(0usize, a.len(), 0usize, b.len())];
    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let best = longest_match(a, &b_index, a_lo, a_hi, b_lo, b_hi);
        if best.size == 0 {
            continue;
        }

        found.push(best);
        if a_lo < best.a && b_lo < best.b {
            pending.push((a_lo, best.a, b_lo, best.b));
        }
        if best.a + best.size < a_hi && best.b + best.size < b_hi {
            pending.push((best.a + best.size, a_hi, best.b + best.size, b_hi));
        }
    }
    found.sort_unstable();

    let mut coalesced: Vec<Match> = Vec::with_capacity(found.len() + 1);
    for block in found {
        if let Some(last) = coalesced.last_mut()
            && last.a + last.size == block.a
            && last.b + last.size == block.b
        {
            last.size += block.size;
            continue;
        }
        coalesced.push(block);
    }
    coalesced.push(Match {
        a: a.len(),
        b: b.len(),
        size: 0,
    });
    coalesced
}

/// Longest common run inside `a[a_lo..a_hi]` and `b[b_lo..b_hi]`.
///
/// Ties resolve to the run that starts earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[u64],
    b_index: &HashMap<u64, Vec<usize>>,
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> Match {
    let mut best = Match {
        a: a_lo,
        b: b_lo,
        size: 0,
    };
    // run_ending_at[j] = length of the common run ending at (i - 1, j).
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for (i, key) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next_runs = HashMap::new();
        if let Some(positions) = b_index.get(key) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let previous = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending_at.get(&prev))
                    .copied()
                    .unwrap_or(0);
                let run = previous + 1;
                next_runs.insert(j, run);
                if run > best.size {
                    best = Match {
                        a: i + 1 - run,
                        b: j + 1 - run,
                        size: run,
                    };
                }
            }
        }
        run_ending_at = next_runs;
    }

    best
}
