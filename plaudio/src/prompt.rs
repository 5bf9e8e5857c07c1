//! Interactive prompts for the URL and download range.

use crate::cli::Cli;
use crate::error::RangeError;
use crate::extract::{UrlKind, url_kind};
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use eyre::{Result, ensure};

/// Question-and-answer channel behind [`Prompter`].
pub trait Dialog {
    /// Ask `prompt` and return the trimmed answer. Empty answers are allowed.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Show an informational line.
    fn note(&mut self, message: &str);
}

/// [`Dialog`] on the terminal through `dialoguer`.
#[derive(Default)]
pub struct Terminal {
    theme: ColorfulTheme,
}

impl Dialog for Terminal {
    fn input(&mut self, prompt: &str) -> Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;

        Ok(answer.trim().to_string())
    }

    fn note(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Parse a 1-based index answer; empty means "use the default".
pub fn parse_index(answer: &str) -> Result<Option<usize>, RangeError> {
    let answer = answer.trim();

    if answer.is_empty() {
        return Ok(None);
    }

    answer.parse().map(Some).map_err(|_| RangeError::Parse {
        input: answer.to_string(),
    })
}

pub struct Prompter<D> {
    dialog: D,
}

impl<D: Dialog> Prompter<D> {
    pub fn new(dialog: D) -> Self {
        Self { dialog }
    }

    /// Fill in the URL and, for playlists, the range.
    pub fn complete(&mut self, cli: &mut Cli) -> Result<()> {
        let url = self.dialog.input("Playlist URL")?;
        ensure!(!url.is_empty(), "no playlist URL given");

        match url_kind(&url) {
            UrlKind::Video => self.dialog.note("single video detected"),
            kind => {
                if let UrlKind::Playlist(id) = kind {
                    self.dialog.note(&format!("playlist ID: {id}"));
                }
                cli.start = parse_index(&self.dialog.input("Start at entry (default 1)")?)?;
                cli.end = parse_index(&self.dialog.input("End at entry (default: last)")?)?;
            }
        }

        cli.url = Some(url);
        Ok(())
    }
}
