//! Command-line parsing — the narrow boundary in front of the dispatcher.
//!
//! The dispatcher only needs an argument vector and a background flag; this
//! module produces exactly that. Tokens split on whitespace, single quotes
//! group a token with spaces in it, and a lone trailing `&` requests
//! background execution.

/// Split a raw command line into its argument vector and background flag.
///
/// Blank input yields an empty vector, which the dispatcher ignores.
pub fn parse_line(line: &str) -> (Vec<String>, bool) {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.trim().chars() {
        match c {
            '\'' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }

    let background = args.last().map(|t| t == "&").unwrap_or(false);
    if background {
        args.pop();
    }
    (args, background)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        let (args, bg) = parse_line("ls -l /tmp\n");
        assert_eq!(args, vec!["ls", "-l", "/tmp"]);
        assert!(!bg);
    }

    #[test]
    fn blank_input_yields_empty_vector() {
        assert_eq!(parse_line("").0.len(), 0);
        assert_eq!(parse_line("   \n").0.len(), 0);
    }

    #[test]
    fn trailing_ampersand_requests_background() {
        let (args, bg) = parse_line("sleep 5 &\n");
        assert_eq!(args, vec!["sleep", "5"]);
        assert!(bg);
    }

    #[test]
    fn ampersand_only_counts_as_last_token() {
        // An `&` buried mid-line is an ordinary argument.
        let (args, bg) = parse_line("echo & done\n");
        assert_eq!(args, vec!["echo", "&", "done"]);
        assert!(!bg);
    }

    #[test]
    fn lone_ampersand_is_background_of_nothing() {
        let (args, bg) = parse_line("&\n");
        assert!(args.is_empty());
        assert!(bg);
    }

    #[test]
    fn single_quotes_group_arguments() {
        let (args, bg) = parse_line("echo 'hello world' tail\n");
        assert_eq!(args, vec!["echo", "hello world", "tail"]);
        assert!(!bg);
    }
}
