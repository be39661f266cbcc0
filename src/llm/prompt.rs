//! Prompt construction for commit messages and branch names.

use super::TaskKind;

/// Maximum bytes of diff text sent to the model.
pub const MAX_DIFF_LENGTH: usize = 30_000;

/// Conventional commit types the model may choose from.
pub const COMMIT_TYPES: &[&str] = &["feat", "fix", "docs", "style", "refactor", "test", "chore"];

/// Longest branch name the model is asked for.
pub const MAX_BRANCH_NAME_LENGTH: usize = 50;

/// Build the full prompt (instruction followed by the diff) for `task`.
pub fn build_prompt(diff: &str, task: TaskKind) -> String {
    let (sanitized, truncated) = sanitize_diff(diff, MAX_DIFF_LENGTH);

    let truncation_note = if truncated {
        "\n\nNote: The diff was truncated due to size. Focus on the visible changes."
    } else {
        ""
    };

    format!(
        "{instruction}{truncation_note}\n\nCode diffs:\n{sanitized}",
        instruction = instruction(task),
    )
}

fn instruction(task: TaskKind) -> String {
    match task {
        TaskKind::CommitMessage => format!(
            "Generate a concise and meaningful git commit message based on the following code diffs.\n\
             Respond with a single line of the form \"<type>: <message>\" where type is one of: {}.\n\
             Only return the commit message, nothing else.",
            COMMIT_TYPES.join(", ")
        ),
        TaskKind::BranchName => format!(
            "Generate a short, descriptive git branch name based on the following code diffs.\n\
             Use kebab-case format (e.g., \"feature-user-authentication\" or \"fix-login-bug\").\n\
             Maximum {MAX_BRANCH_NAME_LENGTH} characters. Only return the branch name, nothing else."
        ),
    }
}

/// Strip terminal noise from diff text and cap its length.
///
/// Removes ANSI escape sequences and control characters other than newline,
/// carriage return and tab, then truncates to `max_len` bytes on a char
/// boundary. Returns the text and whether it was truncated.
pub fn sanitize_diff(text: &str, max_len: usize) -> (String, bool) {
    let mut result = remove_control_chars(&remove_ansi_escapes(text));

    let truncated = result.len() > max_len;
    if truncated {
        let mut end = max_len;
        while end > 0 && !result.is_char_boundary(end) {
            end -= 1;
        }
        result.truncate(end);
    }

    (result, truncated)
}

/// Remove CSI escape sequences (`ESC [ ... final-byte`).
fn remove_ansi_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // Parameter and intermediate bytes run until a byte in 0x40..=0x7E.
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }

    out
}

fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}
