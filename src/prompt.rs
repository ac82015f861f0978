use std::io::{self, BufRead, ErrorKind, Stdin, StdinLock, Stdout, Write};

use crate::scoring::is_valid_rating;

/// Line-oriented question/answer helper over any reader and writer.
///
/// Every `ask_*` method re-prompts on invalid input. The only error is the
/// input closing (EOF) or an I/O failure.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    /// Prompter over the process stdin/stdout
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the prompter and hand back the writer.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print a line of text.
    pub fn say(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", text.as_ref())
    }

    /// Prompt user with a message and return their trimmed input.
    pub fn ask(&mut self, message: &str) -> io::Result<String> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    /// Prompt until the user types something non-empty.
    pub fn ask_required(&mut self, message: &str) -> io::Result<String> {
        loop {
            let input = self.ask(message)?;
            if !input.is_empty() {
                return Ok(input);
            }
            self.say("  This field is required.")?;
        }
    }

    /// Prompt user with a message and a default value. Returns default if input is empty.
    pub fn ask_with_default(&mut self, message: &str, default: &str) -> io::Result<String> {
        let input = self.ask(&format!("{} [{}]: ", message, default))?;
        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input)
        }
    }

    /// Strict yes/no question with no default.
    pub fn ask_yes_no(&mut self, message: &str) -> io::Result<bool> {
        loop {
            let input = self.ask(&format!("{} (yes/no): ", message))?;
            match parse_yes_no(&input) {
                Some(answer) => return Ok(answer),
                None => self.say("  Please answer yes or no.")?,
            }
        }
    }

    /// Yes/no question where an empty answer picks the default.
    pub fn confirm(&mut self, message: &str, default_yes: bool) -> io::Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        loop {
            let input = self.ask(&format!("{} [{}]: ", message, hint))?;
            if input.is_empty() {
                return Ok(default_yes);
            }
            match parse_yes_no(&input) {
                Some(answer) => return Ok(answer),
                None => self.say("  Please answer y or n.")?,
            }
        }
    }

    /// Ask for a 1-5 rating, re-prompting on anything else.
    pub fn ask_rating(&mut self, question: &str) -> io::Result<u8> {
        loop {
            let input = self.ask(&format!("{} (1-5): ", question))?;
            match parse_rating(&input) {
                Ok(rating) => return Ok(rating),
                Err(reason) => self.say(format!("  Invalid: {}. Try again.", reason))?,
            }
        }
    }

    /// Ask for a number in `1..=max`.
    pub fn ask_choice(&mut self, message: &str, max: usize) -> io::Result<usize> {
        loop {
            let input = self.ask(message)?;
            match input.parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => return Ok(n),
                _ => self.say(format!("  Enter a number from 1 to {}.", max))?,
            }
        }
    }
}

pub fn parse_rating(input: &str) -> Result<u8, String> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole number", input.trim()))?;
    if is_valid_rating(value) {
        Ok(value as u8)
    } else {
        Err(format!("{} is outside 1-5", value))
    }
}

pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
