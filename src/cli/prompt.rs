use std::io::{self, BufRead, Write};

use crate::spotify::CredentialPrompt;

/// Reads credentials from the terminal.
///
/// The username is the client id of a Spotify developer application, the
/// password its client secret. Input is not masked.
pub struct StdinPrompt;

impl StdinPrompt {
    fn ask(&self, label: &str) -> io::Result<String> {
        print!("{}: ", label);
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed while reading credentials",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl CredentialPrompt for StdinPrompt {
    fn username(&self) -> io::Result<String> {
        self.ask("Username")
    }

    fn password(&self) -> io::Result<String> {
        self.ask("Password")
    }
}
