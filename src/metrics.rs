use std::time::Duration;

/// Characters per standard word.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Unit-cost edit distance (insert, delete, substitute) over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Edit distance between target and typed text, relative to the target length.
///
/// Case-sensitive, no normalization. An empty target divides by one.
pub fn error_rate(target: &str, typed: &str) -> f64 {
    let target_len = target.chars().count().max(1);
    levenshtein(target, typed) as f64 / target_len as f64
}

/// `(chars / 5) / minutes`; zero when no time has passed.
pub fn words_per_minute(chars: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    (chars as f64 * 60.0) / (CHARS_PER_WORD * secs)
}
