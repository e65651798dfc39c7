use super::error::{ErrorKind, Result};
use super::eval::Bindings;
use super::lexer::Grammar;
use clap::Parser;

/// Flat arithmetic expression calculator.
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Evaluate a single expression and exit
    #[arg(short, long)]
    pub expr: Option<String>,

    /// Pre-bind a variable, e.g. `--var a=5`
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
    pub vars: Vec<(String, f64)>,

    /// Use the legacy operator table, where `-` is not an operator
    #[arg(long)]
    pub legacy_subtract: bool,

    /// Do not print the expression tree
    #[arg(long)]
    pub no_tree: bool,
}

impl Config {
    pub fn grammar(&self) -> Grammar {
        if self.legacy_subtract {
            Grammar::Legacy
        } else {
            Grammar::Standard
        }
    }

    pub fn bindings(&self) -> Bindings {
        self.vars.iter().cloned().collect()
    }
}

fn parse_binding(arg: &str) -> std::result::Result<(String, f64), String> {
    binding(arg).map_err(|e| e.to_string())
}

pub fn binding(arg: &str) -> Result<(String, f64)> {
    let invalid = || ErrorKind::InvalidBinding(arg.to_owned());
    let (name, value) = arg.split_once('=').ok_or_else(invalid)?;
    let value = value.trim().parse::<f64>().map_err(|_| invalid())?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid().into());
    }
    Ok((name.to_owned(), value))
}
