use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wrapped {
    pub lines: Vec<String>,
    /// Words longer than the wrap width, in input order.
    pub oversized: Vec<String>,
}

/// Greedy word wrap measured in characters.
///
/// Any whitespace (newlines included) separates words and is collapsed to a
/// single space inside a line. A word longer than `width` either fills the
/// rest of the current line and continues on the next ones
/// (`break_long_words`), or is put on a line of its own and left to overflow.
pub fn wrap_text(text: &str, width: usize, break_long_words: bool) -> Wrapped {
    let width = width.max(1);
    let mut pending: VecDeque<String> = text.split_whitespace().map(str::to_string).collect();
    let oversized = pending
        .iter()
        .filter(|word| char_len(word) > width)
        .cloned()
        .collect();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    while let Some(word) = pending.pop_front() {
        let word_len = char_len(&word);
        let needed = if current_len == 0 {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed <= width {
            push_word(&mut current, &mut current_len, &word, word_len);
            continue;
        }

        if word_len <= width {
            flush(&mut lines, &mut current, &mut current_len);
            push_word(&mut current, &mut current_len, &word, word_len);
            continue;
        }

        if !break_long_words {
            flush(&mut lines, &mut current, &mut current_len);
            lines.push(word);
            continue;
        }

        let space_left = if current_len == 0 {
            width
        } else {
            width.saturating_sub(current_len + 1)
        };
        if space_left == 0 {
            flush(&mut lines, &mut current, &mut current_len);
            pending.push_front(word);
            continue;
        }
        let (head, tail) = split_at_char(&word, space_left);
        push_word(&mut current, &mut current_len, head, space_left);
        flush(&mut lines, &mut current, &mut current_len);
        pending.push_front(tail.to_string());
    }
    flush(&mut lines, &mut current, &mut current_len);

    Wrapped { lines, oversized }
}

pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn push_word(current: &mut String, current_len: &mut usize, word: &str, word_len: usize) {
    if *current_len > 0 {
        current.push(' ');
        *current_len += 1;
    }
    current.push_str(word);
    *current_len += word_len;
}

fn flush(lines: &mut Vec<String>, current: &mut String, current_len: &mut usize) {
    if *current_len > 0 {
        lines.push(std::mem::take(current));
        *current_len = 0;
    }
}

fn split_at_char(value: &str, count: usize) -> (&str, &str) {
    match value.char_indices().nth(count) {
        Some((idx, _)) => value.split_at(idx),
        None => (value, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn packs_words_greedily() {
        let wrapped = wrap_text("the quick brown fox jumps over the lazy dog", 10, true);
        assert_snapshot!(wrapped.lines.join("\n"), @r"
        the quick
        brown fox
        jumps over
        the lazy
        dog
        ");
        assert!(wrapped.oversized.is_empty());
    }

    #[test]
    fn collapses_newlines_and_runs_of_whitespace() {
        let wrapped = wrap_text("  hello\n\nworld \t again  ", 60, true);
        assert_eq!(wrapped.lines, vec!["hello world again"]);
    }

    #[test]
    fn empty_and_blank_text_has_no_lines() {
        assert!(wrap_text("", 60, true).lines.is_empty());
        assert!(wrap_text(" \n\t ", 60, false).lines.is_empty());
    }

    #[test]
    fn long_word_is_split_into_full_lines() {
        let text = "x".repeat(120);
        let wrapped = wrap_text(&text, 60, true);
        assert_eq!(wrapped.lines.len(), 2);
        assert!(wrapped.lines.iter().all(|line| char_len(line) == 60));
        assert_eq!(wrapped.oversized, vec![text]);
    }

    #[test]
    fn long_word_fills_the_rest_of_the_current_line() {
        let wrapped = wrap_text("ab cdefghijkl", 6, true);
        assert_eq!(wrapped.lines, vec!["ab cde", "fghijk", "l"]);
    }

    #[test]
    fn long_word_stays_whole_without_breaking() {
        let wrapped = wrap_text("ab cdefghijkl mn", 6, false);
        assert_eq!(wrapped.lines, vec!["ab", "cdefghijkl", "mn"]);
        assert_eq!(char_len(&wrapped.lines[1]), 6 + 4);
        assert_eq!(wrapped.oversized, vec!["cdefghijkl"]);
    }

    #[test]
    fn width_is_measured_in_characters_not_bytes() {
        let wrapped = wrap_text("ನಮಸ್ಕಾರ ಜಗತ್ತು नमस्ते", 8, true);
        for line in &wrapped.lines {
            assert!(char_len(line) <= 8, "{line}");
        }
        assert_eq!(wrapped.lines.concat().replace(' ', ""), "ನಮಸ್ಕಾರಜಗತ್ತುनमस्ते");
    }

    #[test]
    fn lines_respect_width_except_unbroken_long_words() {
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do \
                    eiusmod tempor incididunt ut labore et dolore magna aliqua \
                    pneumonoultramicroscopicsilicovolcanoconiosis end";
        for width in [5usize, 12, 20, 60] {
            let wrapped = wrap_text(text, width, false);
            for line in &wrapped.lines {
                let len = char_len(line);
                if len > width {
                    assert!(!line.contains(' '));
                    assert!(wrapped.oversized.contains(line));
                }
            }
            let broken = wrap_text(text, width, true);
            assert!(broken.lines.iter().all(|line| char_len(line) <= width));
        }
    }

    #[test]
    fn zero_width_behaves_like_one() {
        let wrapped = wrap_text("ab", 0, true);
        assert_eq!(wrapped.lines, vec!["a", "b"]);
    }
}
