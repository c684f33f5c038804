use std::io::{self, BufRead, Write};

/// Blocks until a line is entered on stdin and returns its first character,
/// or `None` once stdin is exhausted.
pub fn wait_key() -> io::Result<Option<char>> {
    io::stdout().flush()?;
    read_key(&mut io::stdin().lock())
}

fn read_key(input: &mut impl BufRead) -> io::Result<Option<char>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.chars().next().unwrap_or('\n')))
}
