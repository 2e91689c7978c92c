mod diagnostic;

use std::io::{self, IsTerminal as _, Write as _};

use anyhow::{Context as _, bail};
use arbor::{Language, LanguageQueryExt as _, Tree};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Parse source files into syntax trees and run queries over them.
#[derive(Parser)]
#[command(name = "arbor", version)]
struct Options {
    /// Log filter directives. `RUST_LOG` takes precedence when set.
    #[arg(long, global = true, default_value = "warn")]
    log_filter: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the syntax tree of a file as an s-expression.
    Parse {
        path: Utf8PathBuf,
        /// Language name, guessed from the file extension when omitted.
        #[arg(long, short)]
        language: Option<String>,
    },
    /// Print every capture of a query, one per line.
    Query {
        query: Utf8PathBuf,
        path: Utf8PathBuf,
        #[arg(long, short)]
        language: Option<String>,
    },
    /// List the bundled languages.
    Languages,
}

fn main() -> anyhow::Result<()> {
    let options = Options::parse();
    init_logging(&options.log_filter)?;

    let mut stdout = io::stdout().lock();
    match options.command {
        Command::Parse { path, language } => {
            let language = select_language(language.as_deref(), &path)?;
            let text = read_source(&path)?;
            let tree = parse(language, &text)?;
            writeln!(stdout, "{}", tree.root_node().to_sexp())?;
        }
        Command::Query { query, path, language } => {
            let language = select_language(language.as_deref(), &path)?;
            let source = read_query(&query)?;
            let query = match language.query(&source) {
                Ok(query) => query,
                Err(err) => {
                    let renderer = diagnostic::renderer(io::stderr().is_terminal());
                    eprintln!("{}", diagnostic::render(&err, &renderer, query.as_str(), &source));
                    bail!("failed to compile `{query}`");
                }
            };

            let text = read_source(&path)?;
            let tree = parse(language, &text)?;
            for (node, name) in query.captures(tree.root_node()) {
                writeln!(
                    stdout,
                    "{}:{}-{}:{} {name} {}",
                    node.start_point().row,
                    node.start_point().column,
                    node.end_point().row,
                    node.end_point().column,
                    String::from_utf8_lossy(node.text())
                )?;
            }
        }
        Command::Languages => {
            for language in arbor::languages() {
                writeln!(stdout, "{}", language.name())?;
            }
        }
    }

    Ok(())
}

fn init_logging(directives: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install the log subscriber: {err}"))
}

fn select_language(name: Option<&str>, path: &Utf8Path) -> anyhow::Result<&'static Language> {
    let name = match name {
        Some(name) => name,
        None => path
            .extension()
            .with_context(|| format!("cannot guess the language of `{path}`, pass --language"))?,
    };
    arbor::language_for_name(name).with_context(|| format!("unknown language `{name}`"))
}

fn read_query(path: &Utf8Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))
}

/// Source files are parsed as raw bytes and need not be UTF-8.
fn read_source(path: &Utf8Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read `{path}`"))
}

fn parse(language: &Language, text: &[u8]) -> anyhow::Result<Tree> {
    let mut parser = arbor::Parser::new();
    parser.set_language(language)?;
    let tree = parser.parse(text, None)?;
    tracing::debug!(nodes = tree.node_count(), has_error = tree.root_node().has_error(), "parsed");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use arbor::PYTHON;
    use camino::Utf8PathBuf;

    use super::{parse, read_source};

    #[test]
    fn sources_need_not_be_utf8() {
        let bytes = b"x = '\xff\xfe'\n".as_slice();
        let dir = Utf8PathBuf::try_from(std::env::temp_dir()).unwrap();
        let path = dir.join(format!("arbor-cli-latin1-{}.py", std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        let text = read_source(&path);
        std::fs::remove_file(&path).unwrap();

        let text = text.unwrap();
        assert_eq!(text, bytes);
        let tree = parse(&PYTHON, &text).unwrap();
        assert_eq!(tree.root_node().end_byte(), bytes.len());
        assert!(!tree.root_node().has_error(), "{}", tree.root_node().to_sexp());
        assert_eq!(String::from_utf8_lossy(tree.root_node().text()), "x = '\u{fffd}\u{fffd}'\n");
    }
}
