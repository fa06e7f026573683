//! Interactive archive editor
//!
//! A numbered menu read line by line from any `BufRead`, so the same loop
//! drives a terminal session and scripted input.

use crate::error::Result;
use crate::store::DtxArchive;
use console::style;
use std::io::{BufRead, Write};
use std::path::Path;

/// Menu entries, numbered as shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    Remove,
    Save,
    List,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Add),
            "2" => Some(MenuChoice::Remove),
            "3" => Some(MenuChoice::Save),
            "4" => Some(MenuChoice::List),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Menu loop over an archive
pub struct Editor<R, W> {
    archive: DtxArchive,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Editor<R, W> {
    pub fn new(archive: DtxArchive, input: R, output: W) -> Self {
        Self {
            archive,
            input,
            output,
        }
    }

    /// Run until the operator picks Exit or input ends
    ///
    /// Operation failures are printed and the menu is shown again; only
    /// failures to read input or write output end the loop with an error.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.print_menu()?;

            let Some(choice) = self.prompt("Enter your choice (1/2/3/4/5): ")? else {
                writeln!(self.output)?;
                break;
            };

            let outcome = match MenuChoice::parse(&choice) {
                Some(MenuChoice::Add) => self.add_file(),
                Some(MenuChoice::Remove) => self.remove_file(),
                Some(MenuChoice::Save) => self.save_file(),
                Some(MenuChoice::List) => self.print_files(),
                Some(MenuChoice::Exit) => break,
                None => {
                    writeln!(self.output, "Invalid choice. Please enter a valid option.")?;
                    continue;
                }
            };

            if let Err(e) = outcome {
                tracing::debug!("Menu operation failed: {:?}", e);
                writeln!(self.output, "{} {}", style("Error:").red().bold(), e)?;
            }
        }

        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.output, "\n{}", style("Options:").cyan().bold())?;
        writeln!(self.output, "1. Add File")?;
        writeln!(self.output, "2. Remove File")?;
        writeln!(self.output, "3. Save File")?;
        writeln!(self.output, "4. Print Files")?;
        writeln!(self.output, "5. Exit")?;
        Ok(())
    }

    /// Print `message` and read one trimmed line; `None` at end of input
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt that treats end of input and a blank answer alike
    fn prompt_value(&mut self, message: &str) -> Result<Option<String>> {
        Ok(self.prompt(message)?.filter(|value| !value.is_empty()))
    }

    fn add_file(&mut self) -> Result<()> {
        let Some(path) = self.prompt_value("Enter the path of the file to add: ")? else {
            return Ok(());
        };

        let added = self.archive.add_file(Path::new(&path))?;
        writeln!(
            self.output,
            "File '{}' added successfully with id {}.",
            added.name, added.id
        )?;
        Ok(())
    }

    fn remove_file(&mut self) -> Result<()> {
        let Some(name) = self.prompt_value("Enter the file name to remove (case-sensitive): ")?
        else {
            return Ok(());
        };

        if self.archive.remove(&name)? {
            writeln!(self.output, "File '{}' removed successfully.", name)?;
        } else {
            writeln!(self.output, "File '{}' not found in archive.", name)?;
        }
        Ok(())
    }

    fn save_file(&mut self) -> Result<()> {
        let Some(raw_id) = self.prompt_value("Enter the file ID to save: ")? else {
            return Ok(());
        };
        let Ok(id) = raw_id.parse::<u32>() else {
            writeln!(self.output, "Invalid file ID '{}'.", raw_id)?;
            return Ok(());
        };
        // Ids start at 1; zero counts as no answer
        if id == 0 {
            return Ok(());
        }

        let Some(output) =
            self.prompt_value("Enter the file name to save as (including extension): ")?
        else {
            return Ok(());
        };

        self.archive.save(id, Path::new(&output))?;
        writeln!(self.output, "File saved successfully.")?;
        Ok(())
    }

    fn print_files(&mut self) -> Result<()> {
        let files = self.archive.list()?;
        writeln!(self.output, "\nFiles inside the archive:")?;
        for file in files {
            writeln!(self.output, "{}", file)?;
        }
        Ok(())
    }
}
