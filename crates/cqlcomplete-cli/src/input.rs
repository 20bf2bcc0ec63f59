//! Input handling for the statement argument and stdin.

use anyhow::{Context, Result};
use std::io::{self, Read};

/// The statement to complete: the argument if given, otherwise all of stdin.
///
/// One trailing line break from stdin is dropped, so `echo SEL | cqlcomplete`
/// completes `SEL` rather than the empty word after it.
pub fn read_statement(argument: Option<&str>) -> Result<String> {
    match argument {
        Some(statement) => Ok(statement.to_string()),
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read from stdin")?;
            Ok(strip_line_break(content))
        }
    }
}

fn strip_line_break(mut content: String) -> String {
    if content.ends_with('\n') {
        content.pop();
        if content.ends_with('\r') {
            content.pop();
        }
    }
    content
}
