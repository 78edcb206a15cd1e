//! Prompting helpers over any line reader and writer.
//!
//! Every `read_*` re-prompts until the input is acceptable. Input is trimmed.
//! End of input is reported as `io::ErrorKind::UnexpectedEof`.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use usercrud_core::{is_valid_age, is_valid_email_shape, UserId, MAX_AGE, MIN_AGE};

pub const NOT_A_NUMBER: &str = "Please enter a whole number. Try again.";
pub const EMPTY_VALUE: &str = "Value must not be empty.";
pub const BAD_EMAIL: &str = "Invalid email format, expected something like user@example.com.";

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    /// Prints `prompt` and returns the next trimmed line.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        Ok(line.trim().to_string())
    }

    pub fn read_id(&mut self, prompt: &str) -> io::Result<UserId> {
        loop {
            let line = self.read_line(prompt)?;
            match line.parse::<UserId>() {
                Ok(id) => return Ok(id),
                Err(_) => self.say(NOT_A_NUMBER)?,
            }
        }
    }

    pub fn read_non_empty(&mut self, prompt: &str) -> io::Result<String> {
        loop {
            let line = self.read_line(prompt)?;
            if !line.is_empty() {
                return Ok(line);
            }
            self.say(EMPTY_VALUE)?;
        }
    }

    /// Empty input yields `None`.
    pub fn read_optional(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let line = self.read_line(prompt)?;
        Ok((!line.is_empty()).then_some(line))
    }

    pub fn read_email(&mut self, prompt: &str) -> io::Result<String> {
        loop {
            let line = self.read_non_empty(prompt)?;
            if is_valid_email_shape(&line) {
                return Ok(line);
            }
            self.say(BAD_EMAIL)?;
        }
    }

    /// Like `read_email`, but empty input yields `None`.
    pub fn read_optional_email(&mut self, prompt: &str) -> io::Result<Option<String>> {
        loop {
            let line = self.read_line(prompt)?;
            if line.is_empty() {
                return Ok(None);
            }
            if is_valid_email_shape(&line) {
                return Ok(Some(line));
            }
            self.say(BAD_EMAIL)?;
        }
    }

    /// Reads an age in range; empty input yields `None`.
    pub fn read_optional_age(&mut self, prompt: &str) -> io::Result<Option<i32>> {
        loop {
            let line = self.read_line(prompt)?;
            if line.is_empty() {
                return Ok(None);
            }
            match line.parse::<i32>() {
                Ok(age) if is_valid_age(age) => return Ok(Some(age)),
                Ok(_) => self.say(age_range_message())?,
                Err(_) => self.say(NOT_A_NUMBER)?,
            }
        }
    }
}

pub fn age_range_message() -> String {
    format!("Age must be between {MIN_AGE} and {MAX_AGE}.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(console: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn read_line_prints_prompt_and_trims() {
        let mut console = console("  test input \n");
        assert_eq!(console.read_line("Enter text: ").unwrap(), "test input");
        assert!(output(console).contains("Enter text: "));
    }

    #[test]
    fn read_line_reports_eof() {
        let mut console = console("");
        let err = console.read_line("> ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn read_id_retries_until_numeric() {
        let mut console = console("not a number\n\n123\n");
        assert_eq!(console.read_id("ID: ").unwrap(), 123);
        let out = output(console);
        assert_eq!(out.matches(NOT_A_NUMBER).count(), 2);
    }

    #[test]
    fn read_non_empty_retries_on_blank_lines() {
        let mut console = console("\n   \n\nfinally valid\n");
        assert_eq!(console.read_non_empty("Name: ").unwrap(), "finally valid");
        assert_eq!(output(console).matches(EMPTY_VALUE).count(), 3);
    }

    #[test]
    fn read_optional_maps_empty_to_none() {
        let mut console = console("\nvalue\n");
        assert_eq!(console.read_optional("Name: ").unwrap(), None);
        assert_eq!(
            console.read_optional("Name: ").unwrap().as_deref(),
            Some("value")
        );
    }

    #[test]
    fn read_email_rejects_bad_shapes() {
        let mut console = console("bad-email\n\nuser@site.com\n");
        assert_eq!(console.read_email("Email: ").unwrap(), "user@site.com");
        let out = output(console);
        assert!(out.contains(BAD_EMAIL));
        assert!(out.contains(EMPTY_VALUE));
    }

    #[test]
    fn read_optional_email_accepts_empty_or_valid() {
        let mut console = console("\nbad-email\nuser@domain.com\n");
        assert_eq!(console.read_optional_email("Email: ").unwrap(), None);
        assert_eq!(
            console.read_optional_email("Email: ").unwrap().as_deref(),
            Some("user@domain.com")
        );
        assert!(output(console).contains(BAD_EMAIL));
    }

    #[test]
    fn read_optional_age_enforces_range() {
        let mut console = console("abc\n-1\n121\n30\n\n");
        assert_eq!(console.read_optional_age("Age: ").unwrap(), Some(30));
        assert_eq!(console.read_optional_age("Age: ").unwrap(), None);
        let out = output(console);
        assert!(out.contains(NOT_A_NUMBER));
        assert_eq!(out.matches(&age_range_message()).count(), 2);
    }
}
