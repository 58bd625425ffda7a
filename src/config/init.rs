use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, Config};
use crate::grading::{GradeScheme, GradingConfig, WeightFormat};

/// Line-oriented prompts over any reader/writer pair.
struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Prompt user with a message and return their trimmed input.
    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message)?;
        self.output.flush().context("Failed to flush stdout")?;
        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .context("Failed to read input")?;
        Ok(line.trim().to_string())
    }

    /// Prompt user with a message and a default value. Returns default if input is empty.
    fn prompt_with_default(&mut self, message: &str, default: &str) -> Result<String> {
        let input = self.prompt(&format!("{} [{}]: ", message, default))?;
        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input)
        }
    }

    /// Prompt user with a yes/no question. Returns bool based on input and default.
    fn prompt_yes_no(&mut self, message: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        let input = self.prompt(&format!("{} [{}]: ", message, hint))?;
        let input = input.to_lowercase();
        if input.is_empty() {
            Ok(default_yes)
        } else {
            Ok(input == "y" || input == "yes")
        }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }
}

/// Run the interactive init wizard on stdin/stdout.
///
/// If `default_path` is Some, offers that as the config file path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_init_wizard_with(stdin.lock(), stdout.lock(), default_path)
}

/// Wizard body, generic over input and output so it can be driven from tests.
pub fn run_init_wizard_with<R: BufRead, W: Write>(
    input: R,
    output: W,
    default_path: Option<PathBuf>,
) -> Result<()> {
    let mut p = Prompter { input, output };

    p.say("")?;
    p.say("Grade Calculator Configuration")?;
    p.say("==============================")?;
    p.say("")?;

    // 1. Grade scheme
    p.say("Grades can be entered as letters only (A+ .. F), or as letters mixed with numbers (92.5).")?;
    let scheme = loop {
        let input = p.prompt_with_default("Grade scheme (letters/mixed)", "letters")?;
        match input.parse::<GradeScheme>() {
            Ok(s) => break s,
            Err(e) => p.say(&format!("  Invalid: {}. Try again.", e))?,
        }
    };

    // 2. Weight format
    p.say("")?;
    p.say("Weights are either percentages of the course (at most 100 in total) or raw points.")?;
    let weight_format = loop {
        let input = p.prompt_with_default("Weight format (percentage/points)", "percentage")?;
        match input.parse::<WeightFormat>() {
            Ok(w) => break w,
            Err(e) => p.say(&format!("  Invalid: {}. Try again.", e))?,
        }
    };

    // 3. Account
    p.say("")?;
    p.say("Saved calculations are filed under an account name (any label, e.g. your email).")?;
    let account = p.prompt("Account (leave empty to skip): ")?;
    let account = if account.is_empty() { None } else { Some(account) };

    // 4. Config path
    let default_config_path = match default_path {
        Some(path) => path,
        None => get_config_path()?,
    };
    p.say("")?;
    let path_str = p.prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = p.prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            p.say("Aborted.")?;
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        grading: GradingConfig::new(scheme, weight_format),
        account,
        store_path: None,
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    p.say("")?;
    p.say(&format!("Config written to {}", config_path.display()))?;
    p.say("Run `gradecalc calc --entry \"Homework 1:A:5\"` to get started.")?;

    Ok(())
}
