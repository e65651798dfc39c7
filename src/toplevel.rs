use super::config::Config;
use super::error::{Error, ErrorKind, Result};
use super::eval::Bindings;
use super::parser::{ParsedExpression, Parser};
use super::token::Token;
use failure::ResultExt;
use log::info;
use std::io::{BufRead, Write};

/// Reads one line, without its line terminator. `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line).context(ErrorKind::Io)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
    Ok(Some(trimmed.to_owned()))
}

/// Asks for every variable of `parsed` that has no binding yet.
pub fn collect_values<R: BufRead, W: Write>(
    parsed: &ParsedExpression,
    bindings: &mut Bindings,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    for name in parsed.variable_names() {
        if bindings.contains_key(name) {
            continue;
        }
        writeln!(output, "Define the value for {}:", name).context(ErrorKind::Io)?;
        loop {
            let line = read_line(input)?.ok_or(ErrorKind::InputClosed)?;
            match line.trim().parse::<f64>() {
                Ok(value) => {
                    bindings.insert(name.clone(), value);
                    break;
                }
                Err(_) => writeln!(output, "Not a double!").context(ErrorKind::Io)?,
            }
        }
    }
    Ok(())
}

/// Prints the tree one node per line, variables annotated with their values.
pub fn render_tree<W: Write>(token: &Token, bindings: &Bindings, output: &mut W) -> Result<()> {
    let mut stack = vec![(token, 0)];
    while let Some((token, indent)) = stack.pop() {
        let pad = " ".repeat(indent);
        let line = match token {
            Token::Constant(n) => format!("- Constant ({})", n),
            Token::Variable(name) => match bindings.get(name) {
                Some(value) => format!("- Variable ({}: {})", name, value),
                None => format!("- Variable ({}: unbound)", name),
            },
            Token::Add(..) | Token::Subtract(..) | Token::Multiply(..) => match token.as_binary() {
                Some((op, lhs, rhs)) => {
                    stack.push((rhs, indent + 2));
                    stack.push((lhs, indent + 2));
                    format!("+ {}", op.name())
                }
                None => continue,
            },
        };
        writeln!(output, "{}{}", pad, line).context(ErrorKind::Io)?;
    }
    Ok(())
}

/// Explains a parse failure with a caret under the offending offset.
pub fn report_parse_error<W: Write>(expr: &str, err: &Error, output: &mut W) -> Result<()> {
    let position = match err.position() {
        Some(position) => position,
        None => return writeln!(output, "Error: {}", err).context(ErrorKind::Io).map_err(Error::from),
    };
    let message = match err.character() {
        Some(c) => format!("Cannot determine token '{}'", c),
        None => "Unexpected end of expression".to_owned(),
    };
    writeln!(output, "{}", message).context(ErrorKind::Io)?;
    writeln!(output, "{}", expr).context(ErrorKind::Io)?;
    let dashes = expr.len().saturating_sub(position) + 2;
    writeln!(output, "{}^{}", " ".repeat(position), "-".repeat(dashes)).context(ErrorKind::Io)?;
    Ok(())
}

/// Parses, collects values, prints the tree and the result for one expression.
///
/// Parse errors are reported to `output` before being returned.
pub fn run_expression<R: BufRead, W: Write>(
    parser: &Parser,
    config: &Config,
    expr: &str,
    bindings: &mut Bindings,
    input: &mut R,
    output: &mut W,
) -> Result<f64> {
    let parsed = match parser.parse(expr) {
        Ok(parsed) => parsed,
        Err(err) => {
            if err.is_parse_error() {
                info!("rejected {:?}: {}", expr, err);
                report_parse_error(expr, &err, output)?;
            }
            return Err(err);
        }
    };
    info!("parsed {:?}", expr);

    collect_values(&parsed, bindings, input, output)?;
    if !config.no_tree {
        render_tree(parsed.token(), bindings, output)?;
    }
    let value = parsed.evaluate(bindings)?;
    writeln!(output, "Calculated: {} = {}", expr, value).context(ErrorKind::Io)?;
    Ok(value)
}

pub fn main_loop<R: BufRead, W: Write>(config: &Config, input: &mut R, output: &mut W) -> Result<()> {
    let parser = Parser::new(config.grammar());

    if let Some(expr) = &config.expr {
        let mut bindings = config.bindings();
        return run_expression(&parser, config, expr, &mut bindings, input, output).map(|_| ());
    }

    loop {
        write!(output, "Ready> ").context(ErrorKind::Io)?;
        output.flush().context(ErrorKind::Io)?;
        let line = match read_line(input)? {
            Some(line) => line,
            None => break,
        };
        if line.is_empty() {
            writeln!(output, "No token defined!").context(ErrorKind::Io)?;
            continue;
        }
        let mut bindings = config.bindings();
        match run_expression(&parser, config, &line, &mut bindings, input, output) {
            Ok(_) => {}
            Err(ref err) if err.is_parse_error() => {}
            Err(err) => match err.kind() {
                ErrorKind::MissingVariable(_) => {
                    writeln!(output, "Error: {}", err).context(ErrorKind::Io)?
                }
                _ => return Err(err),
            },
        }
    }
    info!("input closed");
    Ok(())
}
