use std::io::{self, BufRead, IsTerminal, Write};

use dialoguer::Input;
use log::debug;

use crate::{
    display,
    error::{Error, Result},
    models::ModelRecord,
    reconcile::{Decision, Event, Operator},
};

const PROMPT: &str = "  [y]es / [n]o / [o]ther";

/// `y` accepts, `n` stops the run, anything else moves to the next candidate.
pub fn parse_answer(answer: &str) -> Decision {
    match answer.trim().to_lowercase().as_str() {
        "y" => Decision::Accept,
        "n" => Decision::Stop,
        _ => Decision::Reject,
    }
}

/// One line from `reader`, or `None` at end of input.
pub fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Asks on the controlling terminal and prints reconcile progress to stdout.
/// When stderr is not a terminal (`chutes check 2>log`) the prompt goes to
/// stdout and the answer is read as a plain stdin line; end of input stops
/// the run.
#[derive(Debug, Default)]
pub struct TerminalOperator;

impl TerminalOperator {
    pub fn new() -> Self {
        Self
    }

    fn ask(&self) -> Result<Option<String>> {
        if io::stderr().is_terminal() {
            let answer: String = Input::new()
                .with_prompt(PROMPT)
                .allow_empty(true)
                .interact_text()?;
            return Ok(Some(answer));
        }

        print!("{PROMPT}: ");
        io::stdout().flush().map_err(Error::Stdin)?;
        read_answer(&mut io::stdin().lock()).map_err(Error::Stdin)
    }
}

impl Operator for TerminalOperator {
    fn decide(&mut self, dead: &str, candidate: &ModelRecord) -> Result<Decision> {
        println!("{}", display::candidate_line(candidate));
        let decision = match self.ask()? {
            Some(answer) => parse_answer(&answer),
            None => Decision::Stop,
        };
        debug!("{dead}: {} -> {decision:?}", candidate.id);
        Ok(decision)
    }

    fn report(&mut self, event: Event<'_>) {
        println!("{}", display::event_line(event));
    }
}
