//! Print a fragment library's metadata.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use flib_lib::library;
use flib_lib::validation::validate_file_exists;

use crate::commands::command::Command;

/// Print the kind and shape of a fragment library.
#[derive(Debug, Parser)]
#[command(
    name = "view",
    about = "Print a fragment library's kind, bin count, and fragment size"
)]
pub struct View {
    /// Library file to inspect
    pub library: PathBuf,
}

impl Command for View {
    fn execute(&self) -> Result<()> {
        validate_file_exists(&self.library, "Library")?;
        let lib = library::load(&self.library)?;
        println!("name:          {}", lib.name());
        println!("kind:          {}", lib.kind());
        println!("fragments:     {}", lib.size());
        println!("fragment size: {}", lib.fragment_size());
        Ok(())
    }
}
