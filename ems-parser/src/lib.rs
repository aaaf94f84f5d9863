//! Tokenizer for the job-file command format: one command per line,
//! `#`-prefixed and blank lines are comments, `RESERVE` coordinates are
//! written `(row,col)` separated by spaces.
//!
//! This crate stands in for what the specification treats as an external
//! dependency: the rest of the workspace only relies on [`next_command`]
//! returning a fully-parsed [`Command`] per call, reading one line at a
//! time from whatever shared cursor the caller holds locked.

use std::io::BufRead;

/// Upper bound on coordinates accepted by a single `RESERVE`.
pub const MAX_RESERVATION_SIZE: usize = 256;

/// One parsed job-file record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        event_id: u32,
        rows: usize,
        cols: usize,
    },
    Reserve {
        event_id: u32,
        xs: Vec<usize>,
        ys: Vec<usize>,
    },
    Show {
        event_id: u32,
    },
    List,
    Wait {
        delay_ms: u64,
        thread_id: Option<usize>,
    },
    Barrier,
    Help,
    Invalid,
    Empty,
    Eoc,
}

/// Reads and parses the next command from `reader`. Destructive: advances
/// the reader's cursor by exactly one line. Returns [`Command::Eoc`] at
/// end of input.
pub fn next_command(reader: &mut impl BufRead) -> std::io::Result<Command> {
    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line)?;
    if bytes_read == 0 {
        return Ok(Command::Eoc);
    }

    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Command::Empty);
    }

    let mut tokens = trimmed.split_whitespace();
    let keyword = tokens.next().unwrap_or_default().to_ascii_uppercase();
    let rest: Vec<&str> = tokens.collect();

    Ok(match keyword.as_str() {
        "CREATE" => parse_create(&rest),
        "RESERVE" => parse_reserve(trimmed, &rest),
        "SHOW" => parse_show(&rest),
        "LIST" => {
            if rest.is_empty() {
                Command::List
            } else {
                Command::Invalid
            }
        }
        "WAIT" => parse_wait(&rest),
        "BARRIER" => {
            if rest.is_empty() {
                Command::Barrier
            } else {
                Command::Invalid
            }
        }
        "HELP" => {
            if rest.is_empty() {
                Command::Help
            } else {
                Command::Invalid
            }
        }
        _ => Command::Invalid,
    })
}

fn parse_create(rest: &[&str]) -> Command {
    if rest.len() != 3 {
        return Command::Invalid;
    }
    match (
        rest[0].parse::<u32>(),
        rest[1].parse::<usize>(),
        rest[2].parse::<usize>(),
    ) {
        (Ok(event_id), Ok(rows), Ok(cols)) if rows > 0 && cols > 0 => Command::Create {
            event_id,
            rows,
            cols,
        },
        _ => Command::Invalid,
    }
}

fn parse_show(rest: &[&str]) -> Command {
    if rest.len() != 1 {
        return Command::Invalid;
    }
    match rest[0].parse::<u32>() {
        Ok(event_id) => Command::Show { event_id },
        Err(_) => Command::Invalid,
    }
}

fn parse_wait(rest: &[&str]) -> Command {
    match rest.len() {
        1 => match rest[0].parse::<u64>() {
            Ok(delay_ms) => Command::Wait {
                delay_ms,
                thread_id: None,
            },
            Err(_) => Command::Invalid,
        },
        2 => match (rest[0].parse::<u64>(), rest[1].parse::<usize>()) {
            (Ok(delay_ms), Ok(thread_id)) => Command::Wait {
                delay_ms,
                thread_id: Some(thread_id),
            },
            _ => Command::Invalid,
        },
        _ => Command::Invalid,
    }
}

/// `RESERVE <event_id> [(<x1>,<y1>) (<x2>,<y2>) ...]`. A `RESERVE` with
/// zero coordinates is invalid (mirrors the original project's
/// `parse_reserve` returning 0 to mean "invalid command").
fn parse_reserve(trimmed: &str, rest: &[&str]) -> Command {
    if rest.is_empty() {
        return Command::Invalid;
    }

    let Ok(event_id) = rest[0].parse::<u32>() else {
        return Command::Invalid;
    };

    // Re-scan the raw line for the `(x,y)` groups rather than the
    // whitespace-split tokens, since a group may itself contain no
    // internal whitespace (`(1,2)`) or, depending on job-file style,
    // whitespace after the comma.
    let coord_section = match trimmed.splitn(2, char::is_whitespace).nth(1) {
        Some(section) => section,
        None => return Command::Invalid,
    };

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for group in coord_section.split(')') {
        let group = group.trim();
        if group.is_empty() {
            continue;
        }
        let Some(inner) = group.strip_prefix('(') else {
            return Command::Invalid;
        };
        let mut parts = inner.splitn(2, ',');
        let (Some(x_raw), Some(y_raw)) = (parts.next(), parts.next()) else {
            return Command::Invalid;
        };
        let (Ok(x), Ok(y)) = (x_raw.trim().parse::<usize>(), y_raw.trim().parse::<usize>()) else {
            return Command::Invalid;
        };
        xs.push(x);
        ys.push(y);
    }

    if xs.is_empty() || xs.len() > MAX_RESERVATION_SIZE {
        return Command::Invalid;
    }

    Command::Reserve { event_id, xs, ys }
}

/// Drains the rest of `reader` without interpreting it, used by the HELP
/// text renderer in `ems-exec` — kept here since it is part of the
/// parser's surface over the shared reader.
pub fn usage_text() -> &'static str {
    "Available commands:\n\
     \x20 CREATE <event_id> <num_rows> <num_columns>\n\
     \x20 RESERVE <event_id> [(<x1>,<y1>) (<x2>,<y2>) ...]\n\
     \x20 SHOW <event_id>\n\
     \x20 LIST\n\
     \x20 WAIT <delay_ms> [thread_id]\n\
     \x20 BARRIER\n\
     \x20 HELP\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Read;

    /// Reads all remaining bytes, used to assert a parser left the
    /// reader at end of input.
    fn drain(reader: &mut impl Read) -> Vec<u8> {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    }

    fn parse_all(input: &str) -> Vec<Command> {
        let mut cursor = Cursor::new(input.as_bytes().to_vec());
        let mut commands = Vec::new();
        loop {
            let cmd = next_command(&mut cursor).unwrap();
            let done = cmd == Command::Eoc;
            commands.push(cmd);
            if done {
                break;
            }
        }
        commands
    }

    #[test]
    fn parses_create() {
        let cmds = parse_all("CREATE 1 2 3\n");
        assert_eq!(
            cmds[0],
            Command::Create {
                event_id: 1,
                rows: 2,
                cols: 3
            }
        );
    }

    #[test]
    fn parses_reserve_with_multiple_coordinates() {
        let cmds = parse_all("RESERVE 1 (1,1) (1,2) (2,1)\n");
        assert_eq!(
            cmds[0],
            Command::Reserve {
                event_id: 1,
                xs: vec![1, 1, 2],
                ys: vec![1, 2, 1],
            }
        );
    }

    #[test]
    fn reserve_with_zero_coordinates_is_invalid() {
        let cmds = parse_all("RESERVE 1\n");
        assert_eq!(cmds[0], Command::Invalid);
    }

    #[test]
    fn parses_show_list_help_barrier() {
        assert_eq!(parse_all("SHOW 9\n")[0], Command::Show { event_id: 9 });
        assert_eq!(parse_all("LIST\n")[0], Command::List);
        assert_eq!(parse_all("HELP\n")[0], Command::Help);
        assert_eq!(parse_all("BARRIER\n")[0], Command::Barrier);
    }

    #[test]
    fn parses_wait_with_and_without_thread_id() {
        assert_eq!(
            parse_all("WAIT 100\n")[0],
            Command::Wait {
                delay_ms: 100,
                thread_id: None
            }
        );
        assert_eq!(
            parse_all("WAIT 100 2\n")[0],
            Command::Wait {
                delay_ms: 100,
                thread_id: Some(2)
            }
        );
    }

    #[test]
    fn blank_and_comment_lines_are_empty() {
        let cmds = parse_all("\n# a comment\n   \nLIST\n");
        assert_eq!(cmds[0], Command::Empty);
        assert_eq!(cmds[1], Command::Empty);
        assert_eq!(cmds[2], Command::Empty);
        assert_eq!(cmds[3], Command::List);
    }

    #[test]
    fn unknown_keyword_is_invalid() {
        assert_eq!(parse_all("FROBNICATE\n")[0], Command::Invalid);
    }

    #[test]
    fn missing_trailing_newline_still_parses() {
        let cmds = parse_all("LIST");
        assert_eq!(cmds[0], Command::List);
        assert_eq!(cmds[1], Command::Eoc);
    }

    #[test]
    fn sequence_ends_in_eoc() {
        let cmds = parse_all("LIST\n");
        assert_eq!(*cmds.last().unwrap(), Command::Eoc);
    }

    #[test]
    fn reserve_with_malformed_group_is_invalid() {
        assert_eq!(parse_all("RESERVE 1 (1 1)\n")[0], Command::Invalid);
    }

    #[test]
    fn drain_consumes_remaining_bytes() {
        let mut cursor = Cursor::new(b"abc".to_vec());
        assert_eq!(drain(&mut cursor), b"abc");
    }
}
