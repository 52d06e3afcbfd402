//! Linear-space Myers diff over arbitrary slices.

use std::time::Instant;

use super::SegmentKind;

/// A run of items sharing one edit kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<T> {
    pub kind: SegmentKind,
    pub items: Vec<T>,
}

type Edit<'a, T> = (SegmentKind, &'a [T]);

/// Computes a minimal edit script turning `old` into `new`.
///
/// Once `deadline` passes, the unresolved middle of the current split is
/// reported as one deletion followed by one insertion: still a valid script,
/// just not minimal.
pub fn diff<T: PartialEq + Clone>(old: &[T], new: &[T], deadline: Option<Instant>) -> Vec<Chunk<T>> {
    let mut edits = Vec::new();
    diff_into(old, new, deadline, &mut edits);
    merge(edits)
}

fn diff_into<'a, T: PartialEq>(
    old: &'a [T],
    new: &'a [T],
    deadline: Option<Instant>,
    out: &mut Vec<Edit<'a, T>>,
) {
    let prefix = common_prefix(old, new);
    let (old_rest, new_rest) = (&old[prefix..], &new[prefix..]);
    let suffix = common_suffix(old_rest, new_rest);
    let old_mid = &old_rest[..old_rest.len() - suffix];
    let new_mid = &new_rest[..new_rest.len() - suffix];

    out.push((SegmentKind::Equal, &old[..prefix]));
    compute(old_mid, new_mid, deadline, out);
    out.push((SegmentKind::Equal, &old_rest[old_rest.len() - suffix..]));
}

fn compute<'a, T: PartialEq>(
    old: &'a [T],
    new: &'a [T],
    deadline: Option<Instant>,
    out: &mut Vec<Edit<'a, T>>,
) {
    if old.is_empty() {
        out.push((SegmentKind::Insert, new));
        return;
    }
    if new.is_empty() {
        out.push((SegmentKind::Delete, old));
        return;
    }

    match middle_snake(old, new, deadline) {
        Some((x, y)) => {
            diff_into(&old[..x], &new[..y], deadline, out);
            diff_into(&old[x..], &new[y..], deadline, out);
        }
        None => {
            out.push((SegmentKind::Delete, old));
            out.push((SegmentKind::Insert, new));
        }
    }
}

fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Finds the point where the forward and reverse searches overlap.
///
/// Both inputs are non-empty and share no common prefix or suffix.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn middle_snake<T: PartialEq>(
    old: &[T],
    new: &[T],
    deadline: Option<Instant>,
) -> Option<(usize, usize)> {
    let n = old.len() as isize;
    let m = new.len() as isize;
    let max_d = (n + m + 1) / 2;
    let offset = max_d;
    let width = 2 * max_d + 2;
    let mut forward = vec![-1_isize; width as usize];
    let mut reverse = vec![-1_isize; width as usize];
    forward[(offset + 1) as usize] = 0;
    reverse[(offset + 1) as usize] = 0;

    let delta = n - m;
    // Odd delta: paths overlap while extending forward, otherwise in reverse.
    let front = delta % 2 != 0;
    let (mut k1_start, mut k1_end, mut k2_start, mut k2_end) = (0_isize, 0_isize, 0_isize, 0_isize);

    for d in 0..max_d {
        if deadline.is_some_and(|limit| Instant::now() > limit) {
            return None;
        }

        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let k1_off = (offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && forward[k1_off - 1] < forward[k1_off + 1]) {
                forward[k1_off + 1]
            } else {
                forward[k1_off - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n && y1 < m && old[x1 as usize] == new[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            forward[k1_off] = x1;

            if x1 > n {
                k1_end += 2;
            } else if y1 > m {
                k1_start += 2;
            } else if front {
                let k2_off = offset + delta - k1;
                if (0..width).contains(&k2_off) && reverse[k2_off as usize] != -1 {
                    let x2 = n - reverse[k2_off as usize];
                    if x1 >= x2 {
                        return Some((x1 as usize, y1 as usize));
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let k2_off = (offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && reverse[k2_off - 1] < reverse[k2_off + 1]) {
                reverse[k2_off + 1]
            } else {
                reverse[k2_off - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n && y2 < m && old[(n - x2 - 1) as usize] == new[(m - y2 - 1) as usize] {
                x2 += 1;
                y2 += 1;
            }
            reverse[k2_off] = x2;

            if x2 > n {
                k2_end += 2;
            } else if y2 > m {
                k2_start += 2;
            } else if !front {
                let k1_off = offset + delta - k2;
                if (0..width).contains(&k1_off) && forward[k1_off as usize] != -1 {
                    let x1 = forward[k1_off as usize];
                    let y1 = offset + x1 - k1_off;
                    if x1 >= n - x2 {
                        return Some((x1 as usize, y1 as usize));
                    }
                }
            }
            k2 += 2;
        }
    }
    None
}

/// Drops empty edits, joins neighbouring equal runs and orders every changed
/// stretch as one deletion followed by one insertion.
fn merge<T: Clone>(edits: Vec<Edit<'_, T>>) -> Vec<Chunk<T>> {
    let mut chunks: Vec<Chunk<T>> = Vec::new();
    let mut deleted: Vec<T> = Vec::new();
    let mut inserted: Vec<T> = Vec::new();

    for (kind, items) in edits {
        if items.is_empty() {
            continue;
        }
        match kind {
            SegmentKind::Delete => deleted.extend_from_slice(items),
            SegmentKind::Insert => inserted.extend_from_slice(items),
            SegmentKind::Equal => {
                flush_changes(&mut chunks, &mut deleted, &mut inserted);
                match chunks.last_mut() {
                    Some(last) if last.kind == SegmentKind::Equal => {
                        last.items.extend_from_slice(items);
                    }
                    _ => chunks.push(Chunk {
                        kind: SegmentKind::Equal,
                        items: items.to_vec(),
                    }),
                }
            }
        }
    }
    flush_changes(&mut chunks, &mut deleted, &mut inserted);
    chunks
}

fn flush_changes<T>(chunks: &mut Vec<Chunk<T>>, deleted: &mut Vec<T>, inserted: &mut Vec<T>) {
    if !deleted.is_empty() {
        chunks.push(Chunk {
            kind: SegmentKind::Delete,
            items: std::mem::take(deleted),
        });
    }
    if !inserted.is_empty() {
        chunks.push(Chunk {
            kind: SegmentKind::Insert,
            items: std::mem::take(inserted),
        });
    }
}

#[cfg(test)]
#[path = "myers_tests.rs"]
mod tests;
