use std::io::IsTerminal as _;
use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser};
use razor_db::{Document, RootDatabase};
use razor_errors::Renderer;
use razor_parse::ParserOptions;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "razor", version, about = "Inspect Razor documents")]
enum Options {
    /// Print the syntax tree.
    Parse(Input),
    /// Report diagnostics. Exits with a failure if any is an error.
    Check(Input),
    /// Print the lowered document IR.
    Lower(Input),
}

#[derive(Args)]
struct Input {
    path: Utf8PathBuf,
    /// Keep incomplete constructs for editor tooling.
    #[arg(long)]
    design_time: bool,
    /// Parse `@using` and friends as plain expressions.
    #[arg(long)]
    no_directives: bool,
}

impl Input {
    fn parser_options(&self) -> ParserOptions {
        ParserOptions { design_time: self.design_time, allow_directives: !self.no_directives }
    }

    fn open(&self, db: &RootDatabase) -> anyhow::Result<Document> {
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read `{}`", self.path))?;
        Ok(Document::new(db, self.path.clone(), text, self.parser_options()))
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let filter = EnvFilter::try_from_env("RAZOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let db = RootDatabase::default();

    match Options::parse() {
        Options::Parse(input) => {
            let document = input.open(&db)?;
            print!("{}", document.syntax_tree(&db).root().debug_dump());
        }
        Options::Lower(input) => {
            let document = input.open(&db)?;
            print!("{}", document.document_ir(&db));
        }
        Options::Check(input) => {
            let document = input.open(&db)?;
            return Ok(check(&db, document));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn check(db: &RootDatabase, document: Document) -> ExitCode {
    let renderer =
        if std::io::stderr().is_terminal() { Renderer::styled() } else { Renderer::plain() };

    let path = document.path(db).as_str();
    let text = document.text(db);
    let diagnostics = document.diagnostics(db);

    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic.render(&renderer, path, text));
    }

    let errors = diagnostics.iter().filter(|diagnostic| diagnostic.is_error()).count();
    tracing::info!(errors, warnings = diagnostics.len() - errors, "checked {path}");

    if errors == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
