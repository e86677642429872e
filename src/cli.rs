use crate::config::Config;
use crate::export;
use crate::helpers::reader::expand_patterns;
use crate::mailbox;
use crate::merge;
use crate::shell::render_table;
use crate::shell::Session;
use crate::shell::Shell;
use crate::timesheet::Band;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use owo_colors::OwoColorize;
use std::fmt;
use std::io::IsTerminal;
use std::path::Path;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rusty-timesheet")]
#[command(about = "Filter extra hours out of timesheet exports, merge CSV files and collect CSV attachments", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file, defaults to <config dir>/rusty-timesheet/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Folder receiving exported files, overrides `output_dir`
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Disable coloured messages
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Without a command the interactive menu starts
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a timesheet and save one band as CSV
    Filter {
        /// `.csv`, `.xlsx` or `.txt` timesheet
        file: PathBuf,

        /// all, 2, 3 or 4
        #[arg(long, default_value = "all", value_parser = parse_band)]
        band: Band,
    },

    /// Concatenate CSV files in the order given
    Merge {
        /// Files or patterns such as `exports/*.csv`
        #[arg(required = true)]
        files: Vec<String>,

        #[arg(long, default_value = merge::DEFAULT_OUTPUT_NAME)]
        output: String,
    },

    /// Copy the CSV attachments of the local inbox into a folder
    Attachments {
        #[arg(long)]
        dest: PathBuf,

        /// Inbox location, overrides `maildir`
        #[arg(long)]
        maildir: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

fn parse_band(text: &str) -> Result<Band, String> {
    Band::parse(text).ok_or_else(|| format!("unknown band '{text}', expected all, 2, 3 or 4"))
}

/// `RUST_LOG` wins over `--log-level`; events go to stderr.
fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    let color = !cli.no_color && std::io::stdout().is_terminal();

    match cli.command {
        None => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            Shell::new(stdin.lock(), stdout.lock(), config)
                .with_color(color)
                .run()
                .context("Interactive shell failed")?;
        }
        Some(Commands::Filter { file, band }) => {
            let (grid, path) = filter_file(&config, &file, band)?;
            print!("{grid}");
            print_success(color, format!("Arquivo filtrado salvo em: {}", path.display()));
        }
        Some(Commands::Merge { files, output }) => {
            let paths = expand_patterns(&files).context("Invalid file pattern")?;
            let outcome = merge::concat_files(&paths, &output)?;
            for failure in &outcome.failures {
                let message = format!("Erro ao ler o arquivo {}: {}", failure.file_name, failure.error);
                if color {
                    eprintln!("{}", message.red());
                } else {
                    eprintln!("{message}");
                }
            }
            let path = outcome
                .into_result()
                .and_then(|artifact| artifact.save(&config.output_dir))
                .context("Failed to merge files")?;
            print_success(color, format!("Arquivo combinado salvo em: {}", path.display()));
        }
        Some(Commands::Attachments { dest, maildir }) => {
            let maildir = maildir.unwrap_or(config.maildir);
            let source = mailbox::default_source(&maildir)?;
            let files = mailbox::export_csv_attachments(source.as_ref(), &dest).context("Erro ao baixar anexos")?;
            if files.is_empty() {
                let message = "Nenhum anexo CSV encontrado.";
                if color {
                    println!("{}", message.yellow());
                } else {
                    println!("{message}");
                }
            } else {
                for file in &files {
                    println!("  {file}");
                }
                print_success(color, format!("Anexos CSV baixados para: {}", dest.display()));
            }
        }
    }
    Ok(())
}

/// Renders the whole projected table and saves only the chosen band.
fn filter_file(config: &Config, file: &Path, band: Band) -> Result<(String, PathBuf)> {
    let mut session = Session::new(config.columns.clone());
    let grid = session
        .upload_file(file)
        .map(|classification| render_table(classification.base()))
        .with_context(|| format!("Erro ao processar o arquivo: {}", file.display()))?;
    session.select(band)?;
    let path = session
        .artifact(export::today())
        .and_then(|artifact| artifact.save(&config.output_dir))
        .context("Failed to save filtered file")?;
    Ok((grid, path))
}

fn print_success(color: bool, message: String) {
    if color {
        println!("{}", message.green());
    } else {
        println!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_filter_band() {
        let cli = Cli::try_parse_from(["rusty-timesheet", "filter", "horas.xlsx", "--band", "3"]).unwrap();
        match cli.command {
            Some(Commands::Filter { file, band }) => {
                assert_eq!(file, PathBuf::from("horas.xlsx"));
                assert_eq!(band, Band::From3To4);
            }
            _ => panic!("expected filter"),
        }
        assert!(Cli::try_parse_from(["rusty-timesheet", "filter", "horas.csv", "--band", "9"]).is_err());
    }

    #[test]
    fn merge_defaults_output_name() {
        let cli = Cli::try_parse_from(["rusty-timesheet", "merge", "a.csv", "b.csv"]).unwrap();
        match cli.command {
            Some(Commands::Merge { files, output }) => {
                assert_eq!(files, vec!["a.csv", "b.csv"]);
                assert_eq!(output, "combinado.csv");
            }
            _ => panic!("expected merge"),
        }
        assert!(Cli::try_parse_from(["rusty-timesheet", "merge"]).is_err());
    }

    #[test]
    fn no_command_means_interactive() {
        let cli = Cli::try_parse_from(["rusty-timesheet", "--log-level", "debug"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn filter_command_saves_band() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("horas.txt");
        std::fs::write(
            &file,
            "Colaborador\tFunção\tData\tHoras Extr.\tCPF\nAna\tMotorista\t2024-03-01\t02:30\t111\nBia\tAjudante\t2024-03-01\t04:30\t222\n",
        )
        .unwrap();
        let cli = Cli {
            config: Some(dir.path().join("config.toml")),
            output_dir: Some(dir.path().join("saida")),
            log_level: LogLevel::Warn,
            no_color: true,
            command: Some(Commands::Filter { file, band: Band::From2To3 }),
        };
        run(cli).unwrap();

        let name = export::file_name(Band::From2To3.base_name(), export::today());
        let saved = std::fs::read_to_string(dir.path().join("saida").join(name)).unwrap();
        assert_eq!(saved, "Colaborador,Função,Data,Horas Extr.,CPF\nAna,Motorista,2024-03-01,02:30,111\n");
    }

    #[test]
    fn filter_renders_every_row_but_saves_one_band() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("horas.csv");
        std::fs::write(
            &file,
            "Colaborador,Função,Data,Horas Extr.,CPF\nAna,Motorista,2024-03-01,02:30,111\nBia,Ajudante,2024-03-01,04:30,222\nCai,Ajudante,2024-03-01,01:00,333\n",
        )
        .unwrap();
        let config = Config {
            output_dir: dir.path().join("saida"),
            ..Config::default()
        };

        let (grid, path) = filter_file(&config, &file, Band::From2To3).unwrap();
        assert!(grid.contains("Ana"));
        assert!(grid.contains("Bia"));
        assert!(grid.contains("Cai"));
        let saved = std::fs::read_to_string(path).unwrap();
        assert!(saved.contains("Ana"));
        assert!(!saved.contains("Bia"));
        assert!(!saved.contains("Cai"));
    }
}
