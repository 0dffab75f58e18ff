//! Component labels derived from log file names.
//!
//! Test components write their logs as either `name-component.ext` or
//! `name.component.ext`. The label is recovered from the name alone, never
//! from file content.

/// Derive the component label from a file's display name.
///
/// - With a `-` in the name: the text after the last `-`, up to the first
///   `.` after it (or the end of the name).
/// - Without a `-`: the text between the second-to-last and the last `.`.
///   A missing bound falls back to the start or end of the name, so
///   `foo.log` yields `foo` and `foo` yields `foo`.
pub fn component_id(name: &str) -> &str {
    if let Some(dash) = name.rfind('-') {
        let start = dash + 1;
        let end = name[start..]
            .find('.')
            .map(|offset| start + offset)
            .unwrap_or(name.len());
        return &name[start..end];
    }

    let last_dot = name.rfind('.');
    let start = last_dot
        .and_then(|last| name[..last].rfind('.'))
        .map(|dot| dot + 1)
        .unwrap_or(0);
    let end = last_dot.unwrap_or(name.len());
    &name[start..end]
}

#[cfg(test)]
mod tests {
    use super::component_id;

    #[test]
    fn dash_convention() {
        assert_eq!(component_id("foo-bar.log"), "bar");
        assert_eq!(component_id("run-1-server.trace.log"), "server");
        assert_eq!(component_id("suite-client"), "client");
    }

    #[test]
    fn dot_convention() {
        assert_eq!(component_id("foo.bar.log"), "bar");
        assert_eq!(component_id("a.b.c.log"), "c");
    }

    #[test]
    fn degenerate_names() {
        assert_eq!(component_id("foo.log"), "foo");
        assert_eq!(component_id("foo"), "foo");
        assert_eq!(component_id(""), "");
        assert_eq!(component_id(".log"), "");
        assert_eq!(component_id("foo-"), "");
        assert_eq!(component_id("foo-.log"), "");
    }

    #[test]
    fn dash_wins_over_dots() {
        assert_eq!(component_id("a.b-c.d.log"), "c");
    }
}
