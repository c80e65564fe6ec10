//! CLI argument parsing with clap.

use std::io::{self, BufRead, Write};

use clap::Parser;

use crate::brand::BrandInput;

/// Brand identity studio: logo concepts and rendered logos from a short brief.
#[derive(Parser, Debug)]
#[command(name = "brandgen", version, about)]
pub struct Cli {
    /// Company name (prompted for if omitted).
    #[arg(short, long)]
    pub company: Option<String>,

    /// What the company does (prompted for if omitted).
    #[arg(short, long)]
    pub description: Option<String>,

    /// Industry; may be left empty (prompted for if omitted).
    #[arg(short, long)]
    pub industry: Option<String>,

    /// Model (or alias) for concept text. Defaults to the config value.
    #[arg(long)]
    pub text_model: Option<String>,

    /// Model (or alias) for logo images. Defaults to the config value.
    #[arg(long)]
    pub image_model: Option<String>,

    /// Aspect ratio for logo images (e.g., 1:1, 4:3). Defaults to the config value.
    #[arg(short, long)]
    pub aspect_ratio: Option<String>,

    /// Save every rendered logo into this directory.
    #[arg(long, value_name = "DIR")]
    pub download: Option<String>,

    /// Print the final session state as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the brand input, prompting on stderr for any field not given
    /// on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if reading stdin fails.
    pub fn resolve_brand(&self) -> Result<BrandInput, io::Error> {
        let stdin = io::stdin();
        self.resolve_brand_from(&mut stdin.lock(), &mut io::stderr())
    }

    fn resolve_brand_from(
        &self,
        input: &mut impl BufRead,
        prompts: &mut impl Write,
    ) -> Result<BrandInput, io::Error> {
        let mut field = |given: Option<&str>, label: &str| -> Result<String, io::Error> {
            if let Some(value) = given {
                return Ok(value.trim().to_string());
            }
            write!(prompts, "{label}: ")?;
            prompts.flush()?;
            let mut line = String::new();
            input.read_line(&mut line)?;
            Ok(line.trim().to_string())
        };
        Ok(BrandInput {
            company_name: field(self.company.as_deref(), "Company name")?,
            description: field(self.description.as_deref(), "Description")?,
            industry: field(self.industry.as_deref(), "Industry (optional)")?,
        })
    }
}
