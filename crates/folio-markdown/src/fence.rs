//! Fenced code block tracking.
//!
//! Directive markers inside a fenced code block are literal code, so the
//! preprocessor asks the tracker about every line before looking for
//! directives.

/// How a line relates to fenced code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FenceLine {
    /// Ordinary line outside any fence.
    Outside,
    /// Opening fence marker.
    Open,
    /// Line inside a fence.
    Inside,
    /// Closing fence marker.
    Close,
}

impl FenceLine {
    /// Whether the line must be passed through untouched.
    pub(crate) fn is_code(self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// Open fence: marker character and run length.
#[derive(Clone, Copy, Debug)]
struct Fence {
    marker: char,
    len: usize,
}

/// Line-by-line fence state. A closing fence must use the opening
/// character, be at least as long, and carry no info string.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Classify `line` and advance the state.
    pub(crate) fn classify(&mut self, line: &str) -> FenceLine {
        let trimmed = line.trim_start();
        let run = marker_run(trimmed);

        match (self.open, run) {
            (Some(fence), Some((marker, len)))
                if marker == fence.marker
                    && len >= fence.len
                    && trimmed[len..].trim().is_empty() =>
            {
                self.open = None;
                FenceLine::Close
            }
            (Some(_), _) => FenceLine::Inside,
            (None, Some((marker, len))) => {
                // Backtick fences cannot have backticks in the info string
                if marker == '`' && trimmed[len..].contains('`') {
                    return FenceLine::Outside;
                }
                self.open = Some(Fence { marker, len });
                FenceLine::Open
            }
            (None, None) => FenceLine::Outside,
        }
    }
}

/// Leading run of three or more backticks or tildes.
fn marker_run(trimmed: &str) -> Option<(char, usize)> {
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    (len >= 3).then_some((marker, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_all(lines: &[&str]) -> Vec<FenceLine> {
        let mut tracker = FenceTracker::new();
        lines.iter().map(|line| tracker.classify(line)).collect()
    }

    #[test]
    fn test_backtick_fence() {
        assert_eq!(
            classify_all(&["```rust", ":::warning", "```", ":::"]),
            vec![
                FenceLine::Open,
                FenceLine::Inside,
                FenceLine::Close,
                FenceLine::Outside
            ]
        );
    }

    #[test]
    fn test_tilde_fence_ignores_backticks() {
        assert_eq!(
            classify_all(&["~~~", "```", "~~~"]),
            vec![FenceLine::Open, FenceLine::Inside, FenceLine::Close]
        );
    }

    #[test]
    fn test_shorter_fence_does_not_close() {
        assert_eq!(
            classify_all(&["````", "```", "````"]),
            vec![FenceLine::Open, FenceLine::Inside, FenceLine::Close]
        );
    }

    #[test]
    fn test_closing_fence_with_info_string_does_not_close() {
        assert_eq!(
            classify_all(&["```", "```js", "```"]),
            vec![FenceLine::Open, FenceLine::Inside, FenceLine::Close]
        );
    }

    #[test]
    fn test_indented_fence() {
        assert_eq!(
            classify_all(&["   ```", "x", "  ```"]),
            vec![FenceLine::Open, FenceLine::Inside, FenceLine::Close]
        );
    }

    #[test]
    fn test_inline_code_is_not_a_fence() {
        assert_eq!(
            classify_all(&["``code``", "```a`b"]),
            vec![FenceLine::Outside, FenceLine::Outside]
        );
    }

    #[test]
    fn test_is_code() {
        assert!(!FenceLine::Outside.is_code());
        assert!(FenceLine::Open.is_code());
        assert!(FenceLine::Inside.is_code());
        assert!(FenceLine::Close.is_code());
    }
}
