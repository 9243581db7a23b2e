//! Fuzzy answer matching.
//!
//! A guess matches when some fixed-length window of the message is within
//! [`TOLERANCE`] edits of the target name. Windows are padded at both ends so
//! a name typed at the very start or end of a message is not penalised.

/// Maximum edit distance accepted as a correct answer.
pub const TOLERANCE: usize = 2;

/// Whether `candidate` contains something close enough to `target`.
/// Case-insensitive.
pub fn matches(candidate: &str, target: &str) -> bool {
  min_levenshtein(&candidate.to_lowercase(), &target.to_lowercase()) <= TOLERANCE
}

/// The smallest edit distance between `needle` and any window of `haystack`
/// of the same length.
pub fn min_levenshtein(haystack: &str, needle: &str) -> usize {
  let len = needle.chars().count();
  substrings(haystack, len)
    .iter()
    .map(|w| levenshtein(w, needle))
    .min()
    .unwrap_or(len)
}

/// Every window of `len` characters over `s`, including the partial windows
/// that hang off either end. For `1 <= len <= len(s)` the result
/// has `len(s) + min(len(s), len) - 1` entries, repeats included.
pub fn substrings(s: &str, len: usize) -> Vec<String> {
  if len == 0 {
    return vec![String::new()];
  }

  let padding = std::iter::repeat_n(None, len - 1);
  let padded: Vec<Option<char>> = padding
    .clone()
    .chain(s.chars().map(Some))
    .chain(padding)
    .collect();

  let mut windows: Vec<String> = padded
    .windows(len)
    .map(|w| w.iter().flatten().collect())
    .collect();

  if windows.is_empty() {
    windows.push(String::new());
  }
  windows
}

/// Classic Levenshtein distance over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
  let b: Vec<char> = b.chars().collect();
  let mut prev: Vec<usize> = (0..=b.len()).collect();
  let mut curr = vec![0; b.len() + 1];

  for (i, ca) in a.chars().enumerate() {
    curr[0] = i + 1;
    for (j, cb) in b.iter().enumerate() {
      let substitution = prev[j] + usize::from(ca != *cb);
      curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
    }
    std::mem::swap(&mut prev, &mut curr);
  }

  prev[b.len()]
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLES: &[&str] = &[
    "a",
    "ab",
    "hello",
    "aaaa",
    "mr-mime",
    "my dog is named lars",
    "Pokémon évolue",
  ];

  #[test]
  fn substrings_of_hello() {
    assert_eq!(substrings("hello", 3), [
      "h", "he", "hel", "ell", "llo", "lo", "o"
    ]);
  }

  #[test]
  fn substrings_count() {
    for s in SAMPLES {
      let n = s.chars().count();
      for len in 1..=n {
        assert_eq!(
          substrings(s, len).len(),
          n + n.min(len) - 1,
          "s = {s:?}, len = {len}"
        );
      }
    }
  }

  #[test]
  fn repeated_windows_are_kept() {
    assert_eq!(substrings("aaaa", 2), ["a", "aa", "aa", "aa", "a"]);
    assert_eq!(substrings("aab", 1), ["a", "a", "b"]);
  }

  #[test]
  fn levenshtein_basics() {
    assert_eq!(levenshtein("kitten", "sitting"), 3);
    assert_eq!(levenshtein("", "abc"), 3);
    assert_eq!(levenshtein("abc", ""), 3);
    assert_eq!(levenshtein("flaw", "lawn"), 2);
    assert_eq!(levenshtein("same", "same"), 0);
  }

  #[test]
  fn minimum_levenshtein() {
    assert_eq!(min_levenshtein("my dog is named lars", "doggo"), 2);

    let msg = "you think that is cool? i got something cooler";
    assert_eq!(min_levenshtein(msg, "cool"), 0);
    assert_eq!(min_levenshtein(msg, "coolest"), 2);
  }

  #[test]
  fn literal_substring_has_distance_zero() {
    for s in SAMPLES {
      let chars: Vec<char> = s.chars().collect();
      for i in 0..chars.len() {
        for len in 0..=chars.len() - i {
          let needle: String = chars[i..i + len].iter().collect();
          assert_eq!(
            min_levenshtein(s, &needle),
            0,
            "s = {s:?}, needle = {needle:?}"
          );
        }
      }
    }
  }

  #[test]
  fn empty_candidate_costs_full_length() {
    assert_eq!(min_levenshtein("", "pikachu"), 7);
    assert_eq!(min_levenshtein("", ""), 0);
    assert!(!matches("", "pikachu"));
  }

  #[test]
  fn matching_is_case_insensitive() {
    assert!(matches("PIKACHU", "pikachu"));
    assert!(matches("i think it's Pikachu!", "pikachu"));
    assert!(matches("pikchu", "pikachu"));
    assert!(!matches("charmander", "pikachu"));
  }
}
