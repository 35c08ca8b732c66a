//! Word-level diff of two text blocks.
//!
//! Both inputs are split on whitespace and aligned as token sequences. The
//! default alignment is a longest-matching-block matcher: find the longest
//! run of equal tokens, recurse on the gaps to its left and right, then
//! describe the gaps between matches as edit opcodes. It does not promise a
//! minimal edit script, but every `equal` run is a true common run, every
//! token is covered exactly once, and opcodes never go backwards.
//!
//! Myers and patience alignments from `similar` are available as well. Their
//! adjacent delete/insert runs are fused into `replace` so that all
//! algorithms produce the same opcode vocabulary.

use std::collections::HashMap;

pub use csvview_cli::DiffAlgorithm;

/// Second sequences at least this long enable the popular-token heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffTag {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl DiffTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Replace => "replace",
        }
    }
}

/// `a[a_start..a_end]` maps to `b[b_start..b_end]` via `tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: DiffTag,
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

/// A run of `size` equal tokens at `a[a]` and `b[b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// One rendered segment of a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffToken {
    pub tag: DiffTag,
    pub left_text: String,
    pub right_text: String,
}

impl DiffToken {
    fn new(tag: DiffTag, left_text: String, right_text: String) -> Self {
        Self {
            tag,
            left_text,
            right_text,
        }
    }
}

/// Split on runs of whitespace. Case and punctuation are kept as-is.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Longest-matching-block sequence matcher over two token slices.
pub struct SequenceMatcher<'a, T: AsRef<str>> {
    a: &'a [T],
    b: &'a [T],
    /// token of `b` -> ascending positions in `b`; popular tokens removed
    b2j: HashMap<&'a str, Vec<usize>>,
}

impl<'a, T: AsRef<str>> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (j, token) in b.iter().enumerate() {
            b2j.entry(token.as_ref()).or_default().push(j);
        }

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let threshold = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= threshold);
        }

        Self { a, b, b2j }
    }

    fn eq(&self, i: usize, j: usize) -> bool {
        self.a[i].as_ref() == self.b[j].as_ref()
    }

    /// Longest run of equal tokens within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the run starting earliest in `a`, then earliest in `b`.
    /// Popular tokens cannot start a run but may extend one.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(self.a[i].as_ref()) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        while best_i > alo && best_j > blo && self.eq(best_i - 1, best_j - 1) {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.eq(best_i + best_size, best_j + best_size)
        {
            best_size += 1;
        }

        Match {
            a: best_i,
            b: best_j,
            size: best_size,
        }
    }

    /// Matching runs in increasing order, adjacent runs merged, terminated
    /// by the sentinel `Match { a: len(a), b: len(b), size: 0 }`.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());

        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size > 0 {
                blocks.push(m);
                if alo < m.a && blo < m.b {
                    queue.push((alo, m.a, blo, m.b));
                }
                if m.a + m.size < ahi && m.b + m.size < bhi {
                    queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
                }
            }
        }
        blocks.sort();

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len() + 1);
        for block in blocks {
            match merged.last_mut() {
                Some(last) if last.a + last.size == block.a && last.b + last.size == block.b => {
                    last.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged.push(Match {
            a: la,
            b: lb,
            size: 0,
        });
        merged
    }

    pub fn opcodes(&self) -> Vec<Opcode> {
        let mut opcodes = Vec::new();
        let (mut i, mut j) = (0, 0);
        for m in self.matching_blocks() {
            let tag = match (i < m.a, j < m.b) {
                (true, true) => Some(DiffTag::Replace),
                (true, false) => Some(DiffTag::Delete),
                (false, true) => Some(DiffTag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                opcodes.push(Opcode {
                    tag,
                    a_start: i,
                    a_end: m.a,
                    b_start: j,
                    b_end: m.b,
                });
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                opcodes.push(Opcode {
                    tag: DiffTag::Equal,
                    a_start: m.a,
                    a_end: i,
                    b_start: m.b,
                    b_end: j,
                });
            }
        }
        opcodes
    }

    /// `2 * matched / total`, 1.0 when both sequences are empty.
    pub fn ratio(&self) -> f64 {
        let matched: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        similarity(matched, self.a.len() + self.b.len())
    }
}

fn similarity(matched: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        2.0 * matched as f64 / total as f64
    }
}

/// Opcodes from one of the `similar` algorithms.
fn similar_opcodes(algorithm: similar::Algorithm, a: &[&str], b: &[&str]) -> Vec<Opcode> {
    similar::capture_diff_slices(algorithm, a, b)
        .iter()
        .map(|op| {
            let (tag, old, new) = op.as_tag_tuple();
            let tag = match tag {
                similar::DiffTag::Equal => DiffTag::Equal,
                similar::DiffTag::Delete => DiffTag::Delete,
                similar::DiffTag::Insert => DiffTag::Insert,
                similar::DiffTag::Replace => DiffTag::Replace,
            };
            Opcode {
                tag,
                a_start: old.start,
                a_end: old.end,
                b_start: new.start,
                b_end: new.end,
            }
        })
        .collect()
}

/// Merge each delete directly followed by an insert (or the reverse) into
/// one replace. Opcodes are contiguous, so the pair always spans adjacent
/// ranges on both sides.
pub fn fuse_replacements(opcodes: Vec<Opcode>) -> Vec<Opcode> {
    let mut fused: Vec<Opcode> = Vec::with_capacity(opcodes.len());
    for op in opcodes {
        match fused.last_mut() {
            Some(last)
                if matches!(
                    (last.tag, op.tag),
                    (DiffTag::Delete, DiffTag::Insert)
                        | (DiffTag::Insert, DiffTag::Delete)
                        | (DiffTag::Replace, DiffTag::Insert)
                        | (DiffTag::Replace, DiffTag::Delete)
                ) =>
            {
                last.tag = DiffTag::Replace;
                last.a_end = op.a_end;
                last.b_end = op.b_end;
            }
            _ => fused.push(op),
        }
    }
    fused
}

/// Counts for a finished diff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffSummary {
    pub equal_words: usize,
    pub deleted_words: usize,
    pub inserted_words: usize,
    /// `2 * equal / (left words + right words)`
    pub ratio: f64,
}

impl DiffSummary {
    pub fn from_opcodes(opcodes: &[Opcode]) -> Self {
        let (mut equal, mut deleted, mut inserted) = (0, 0, 0);
        for op in opcodes {
            let (a_len, b_len) = (op.a_end - op.a_start, op.b_end - op.b_start);
            match op.tag {
                DiffTag::Equal => equal += a_len,
                DiffTag::Delete => deleted += a_len,
                DiffTag::Insert => inserted += b_len,
                DiffTag::Replace => {
                    deleted += a_len;
                    inserted += b_len;
                }
            }
        }
        Self {
            equal_words: equal,
            deleted_words: deleted,
            inserted_words: inserted,
            ratio: similarity(equal, 2 * equal + deleted + inserted),
        }
    }

    pub fn is_identical(&self) -> bool {
        self.deleted_words == 0 && self.inserted_words == 0
    }
}

/// Result of comparing two text blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct WordDiff {
    pub tokens: Vec<DiffToken>,
    pub summary: DiffSummary,
}

/// Compares text blocks word by word.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordDiffEngine {
    algorithm: DiffAlgorithm,
}

impl WordDiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(algorithm: DiffAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> DiffAlgorithm {
        self.algorithm
    }

    /// Opcodes over the two token sequences.
    pub fn opcodes(&self, a: &[&str], b: &[&str]) -> Vec<Opcode> {
        match self.algorithm {
            DiffAlgorithm::Matcher => SequenceMatcher::new(a, b).opcodes(),
            DiffAlgorithm::Myers => {
                fuse_replacements(similar_opcodes(similar::Algorithm::Myers, a, b))
            }
            DiffAlgorithm::Patience => {
                fuse_replacements(similar_opcodes(similar::Algorithm::Patience, a, b))
            }
        }
    }

    pub fn diff(&self, text1: &str, text2: &str) -> Vec<DiffToken> {
        self.compare(text1, text2).tokens
    }

    pub fn compare(&self, text1: &str, text2: &str) -> WordDiff {
        let a = tokenize(text1);
        let b = tokenize(text2);
        let opcodes = self.opcodes(&a, &b);
        tracing::trace!(
            algorithm = self.algorithm.as_str(),
            left_words = a.len(),
            right_words = b.len(),
            opcodes = opcodes.len(),
            "word diff"
        );
        WordDiff {
            tokens: tokens_from_opcodes(&a, &b, &opcodes),
            summary: DiffSummary::from_opcodes(&opcodes),
        }
    }
}

/// Map opcodes to display tokens, joining each range with single spaces.
pub fn tokens_from_opcodes(a: &[&str], b: &[&str], opcodes: &[Opcode]) -> Vec<DiffToken> {
    opcodes
        .iter()
        .map(|op| {
            let left = a[op.a_start..op.a_end].join(" ");
            let right = b[op.b_start..op.b_end].join(" ");
            match op.tag {
                DiffTag::Equal => DiffToken::new(DiffTag::Equal, left.clone(), left),
                DiffTag::Delete => DiffToken::new(DiffTag::Delete, left, String::new()),
                DiffTag::Insert => DiffToken::new(DiffTag::Insert, String::new(), right),
                DiffTag::Replace => DiffToken::new(DiffTag::Replace, left, right),
            }
        })
        .collect()
}

/// Diff with the default matcher.
pub fn diff(text1: &str, text2: &str) -> Vec<DiffToken> {
    WordDiffEngine::new().diff(text1, text2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(tokens: &[DiffToken]) -> Vec<DiffTag> {
        tokens.iter().map(|t| t.tag).collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("  a\tb\n\nc  "), vec!["a", "b", "c"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t ").is_empty());
        assert_eq!(tokenize("Hello, World!"), vec!["Hello,", "World!"]);
    }

    #[test]
    fn test_replace_in_the_middle() {
        let tokens = diff("the quick fox", "the slow fox");
        assert_eq!(
            tokens,
            vec![
                DiffToken::new(DiffTag::Equal, "the".into(), "the".into()),
                DiffToken::new(DiffTag::Replace, "quick".into(), "slow".into()),
                DiffToken::new(DiffTag::Equal, "fox".into(), "fox".into()),
            ]
        );
    }

    #[test]
    fn test_insert_only() {
        let tokens = diff("", "hello world");
        assert_eq!(
            tokens,
            vec![DiffToken::new(
                DiffTag::Insert,
                String::new(),
                "hello world".into()
            )]
        );
    }

    #[test]
    fn test_delete_only() {
        let tokens = diff("gone  now", "");
        assert_eq!(
            tokens,
            vec![DiffToken::new(DiffTag::Delete, "gone now".into(), String::new())]
        );
    }

    #[test]
    fn test_both_empty() {
        assert!(diff("", "").is_empty());
        assert!(diff("   ", "\n").is_empty());
    }

    #[test]
    fn test_identity_is_single_equal() {
        let text = "one  two\nthree";
        let tokens = diff(text, text);
        assert_eq!(
            tokens,
            vec![DiffToken::new(
                DiffTag::Equal,
                "one two three".into(),
                "one two three".into()
            )]
        );
    }

    #[test]
    fn test_longest_match_prefers_earliest() {
        let a = ["x", "a", "b", "y", "a", "b"];
        let b = ["a", "b"];
        let m = SequenceMatcher::new(&a, &b).find_longest_match(0, a.len(), 0, b.len());
        assert_eq!(m, Match { a: 1, b: 0, size: 2 });
    }

    #[test]
    fn test_matching_blocks_have_sentinel() {
        let a = ["a", "b", "c", "d"];
        let b = ["a", "x", "c", "d"];
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
        assert_eq!(
            blocks,
            vec![
                Match { a: 0, b: 0, size: 1 },
                Match { a: 2, b: 2, size: 2 },
                Match { a: 4, b: 4, size: 0 },
            ]
        );
    }

    #[test]
    fn test_opcodes_classic_example() {
        // leading delete, replace in the middle, trailing insert
        let a = ["q", "a", "b", "x", "c", "d"];
        let b = ["a", "b", "y", "c", "d", "f"];
        let ops = SequenceMatcher::new(&a, &b).opcodes();
        let shape: Vec<(DiffTag, usize, usize, usize, usize)> = ops
            .iter()
            .map(|o| (o.tag, o.a_start, o.a_end, o.b_start, o.b_end))
            .collect();
        assert_eq!(
            shape,
            vec![
                (DiffTag::Delete, 0, 1, 0, 0),
                (DiffTag::Equal, 1, 3, 0, 2),
                (DiffTag::Replace, 3, 4, 2, 3),
                (DiffTag::Equal, 4, 6, 3, 5),
                (DiffTag::Insert, 6, 6, 5, 6),
            ]
        );
    }

    #[test]
    fn test_popular_tokens_do_not_seed_matches() {
        // "the" appears far more than len/100 + 1 times in b
        let b: Vec<String> = (0..300)
            .map(|i| if i % 2 == 1 { "the".to_string() } else { format!("w{i}") })
            .collect();
        let a = vec!["the".to_string()];
        let matcher = SequenceMatcher::new(&a, &b);
        assert_eq!(matcher.find_longest_match(0, 1, 0, b.len()).size, 0);
    }

    #[test]
    fn test_fuse_replacements() {
        let ops = vec![
            Opcode { tag: DiffTag::Equal, a_start: 0, a_end: 1, b_start: 0, b_end: 1 },
            Opcode { tag: DiffTag::Delete, a_start: 1, a_end: 2, b_start: 1, b_end: 1 },
            Opcode { tag: DiffTag::Insert, a_start: 2, a_end: 2, b_start: 1, b_end: 3 },
            Opcode { tag: DiffTag::Equal, a_start: 2, a_end: 3, b_start: 3, b_end: 4 },
        ];
        let fused = fuse_replacements(ops);
        assert_eq!(fused.len(), 3);
        assert_eq!(
            fused[1],
            Opcode { tag: DiffTag::Replace, a_start: 1, a_end: 2, b_start: 1, b_end: 3 }
        );
    }

    #[test]
    fn test_similar_algorithms_fuse_replace() {
        for algorithm in [DiffAlgorithm::Myers, DiffAlgorithm::Patience] {
            let tokens = WordDiffEngine::with_algorithm(algorithm).diff("the quick fox", "the slow fox");
            assert_eq!(
                tags(&tokens),
                vec![DiffTag::Equal, DiffTag::Replace, DiffTag::Equal],
                "{algorithm:?}"
            );
        }
    }

    #[test]
    fn test_summary() {
        let result = WordDiffEngine::new().compare("a b c d", "a x c d e");
        assert_eq!(result.summary.equal_words, 3);
        assert_eq!(result.summary.deleted_words, 1);
        assert_eq!(result.summary.inserted_words, 2);
        assert!((result.summary.ratio - 6.0 / 9.0).abs() < 1e-12);
        assert!(WordDiffEngine::new().compare("", "").summary.is_identical());
    }

    #[test]
    fn test_ratio_matches_summary() {
        let a = tokenize("alpha beta gamma delta");
        let b = tokenize("alpha gamma delta epsilon");
        let matcher = SequenceMatcher::new(&a, &b);
        let summary = DiffSummary::from_opcodes(&matcher.opcodes());
        assert!((matcher.ratio() - summary.ratio).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let left = "a b a b c a b c d e f a";
        let right = "b a c a b d f e a a b";
        let first = diff(left, right);
        for _ in 0..10 {
            assert_eq!(diff(left, right), first);
        }
    }
}
