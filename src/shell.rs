//! # Interactive Shell
//!
//! A terminal rendition of the three pages of the timesheet utility:
//!
//! - **Filtrando Horas Extras**: load a timesheet, inspect the projected
//!   table, pick a band and save it as a CSV file
//! - **Juntar Arquivos CSV**: concatenate several CSV exports
//! - **Baixar Arquivos do Outlook**: copy CSV attachments out of the inbox
//!
//! The export selection lives in a [`Session`], which the shell owns and
//! passes through every pipeline call. Every action is wrapped so that a data
//! error is printed and the menu comes back; only terminal I/O failures end
//! [`Shell::run`].
use crate::config::Config;
use crate::error::TimesheetError;
use crate::export;
use crate::export::ExportArtifact;
use crate::helpers::reader::expand_patterns;
use crate::helpers::reader::Upload;
use crate::mailbox;
use crate::merge;
use crate::spreadsheet;
use crate::timesheet::classify;
use crate::timesheet::Band;
use crate::timesheet::Classification;
use crate::timesheet::Columns;
use crate::timesheet::ProjectedTable;
use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Cell;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::fmt::Display;
use std::io;
use std::io::BufRead;
use std::io::Write;
use std::path::Path;

/// A successfully classified upload and the band chosen for export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loaded {
    pub file_name: String,
    pub classification: Classification,
    pub selected: Band,
}

/// Upload and selection state of one user.
///
/// Starts with no file loaded; a successful upload loads it.
#[derive(Clone, Debug, Default)]
pub struct Session {
    columns: Columns,
    loaded: Option<Loaded>,
}

impl Session {
    pub fn new(columns: Columns) -> Self {
        Self { columns, loaded: None }
    }

    /// The current upload, `None` while no file is loaded
    pub fn loaded(&self) -> Option<&Loaded> {
        self.loaded.as_ref()
    }

    /// Parses and classifies an upload.
    ///
    /// Success moves to `Loaded` with the whole table selected. Failure
    /// leaves the session in `NoFileLoaded`, dropping any earlier upload.
    pub fn upload(&mut self, upload: &Upload) -> Result<&Classification, TimesheetError> {
        self.loaded = None;
        let table = spreadsheet::parse(upload)?;
        let classification = classify(&table, &self.columns)?;
        tracing::info!(file = %upload.name, rows = classification.base().len(), "loaded timesheet");
        let loaded = Loaded {
            file_name: upload.name.to_owned(),
            classification,
            selected: Band::All,
        };
        Ok(&self.loaded.insert(loaded).classification)
    }

    /// Reads a local file and uploads it; see [`Session::upload`].
    pub fn upload_file(&mut self, path: &Path) -> Result<&Classification, TimesheetError> {
        match Upload::open(path) {
            Ok(upload) => self.upload(&upload),
            Err(error) => {
                self.loaded = None;
                Err(error)
            }
        }
    }

    /// Chooses the band to export; selecting the current band again changes nothing.
    pub fn select(&mut self, band: Band) -> Result<(), TimesheetError> {
        let loaded = self.loaded.as_mut().ok_or(TimesheetError::NoFileLoaded)?;
        loaded.selected = band;
        Ok(())
    }

    pub fn selected(&self) -> Option<Band> {
        self.loaded.as_ref().map(|loaded| loaded.selected)
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.loaded.as_ref().map(|loaded| &loaded.classification)
    }

    /// Serializes the selected partition, stamped with `date`.
    pub fn artifact(&self, date: NaiveDate) -> Result<ExportArtifact, TimesheetError> {
        let loaded = self.loaded.as_ref().ok_or(TimesheetError::NoFileLoaded)?;
        let band = loaded.selected;
        export::export(loaded.classification.partition(band), band.base_name(), date)
    }
}

/// Lays a projected table out as a bordered text grid.
pub fn render_table(table: &ProjectedTable) -> String {
    let mut grid = Table::new();
    grid.load_preset(UTF8_FULL).set_header(table.columns.iter().map(Cell::new));
    for record in &table.records {
        grid.add_row(record.cells().iter().map(Cell::new));
    }
    format!("{grid}\n")
}

const PAGES: [&str; 3] = [
    "Filtrando Horas Extras",
    "Juntar Arquivos CSV",
    "Baixar Arquivos do Outlook",
];

/// Menu driven front end over any line input and text output.
pub struct Shell<R, W> {
    input: R,
    output: W,
    config: Config,
    session: Session,
    color: bool,
    today: fn() -> NaiveDate,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W, config: Config) -> Self {
        let session = Session::new(config.columns.clone());
        Self {
            input,
            output,
            config,
            session,
            color: false,
            today: export::today,
        }
    }

    /// Colours errors, warnings and successes
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Shows the navigation menu until the user leaves or input ends.
    pub fn run(&mut self) -> Result<(), TimesheetError> {
        loop {
            writeln!(self.output, "\nNavegação")?;
            for (index, page) in PAGES.iter().enumerate() {
                writeln!(self.output, "  {}) {}", index + 1, page)?;
            }
            writeln!(self.output, "  0) Sair")?;
            let Some(choice) = self.prompt("Escolha a página: ")? else {
                return Ok(());
            };
            match choice.as_str() {
                "1" => self.filter_page()?,
                "2" => self.merge_page()?,
                "3" => self.attachments_page()?,
                "0" | "q" | "sair" => return Ok(()),
                "" => (),
                other => self.warning(format!("Página inválida: {other}"))?,
            }
        }
    }

    fn filter_page(&mut self) -> io::Result<()> {
        self.title(PAGES[0])?;
        let Some(path) = self.prompt("Escolha o arquivo a ser transformado (.csv, .xlsx, .txt): ")? else {
            return Ok(());
        };
        if path.is_empty() {
            return self.warning(TimesheetError::NoFileLoaded);
        }
        let rendered = self
            .session
            .upload_file(Path::new(&path))
            .map(|classification| render_table(classification.base()));
        match rendered {
            Ok(grid) => {
                write!(self.output, "{grid}")?;
            }
            Err(error) => return self.error(format!("Erro ao processar o arquivo: {error}")),
        }

        loop {
            writeln!(self.output, "\nEscolha qual filtro deseja exportar:")?;
            let selected = self.session.selected();
            for (index, band) in Band::ALL.iter().enumerate() {
                let mark = if selected == Some(*band) { "x" } else { " " };
                writeln!(self.output, "  [{mark}] {}) {}", index + 1, band.label())?;
            }
            let Some(choice) = self.prompt("Opção (1-4), 'b' para baixar o arquivo filtrado, Enter para voltar: ")? else {
                return Ok(());
            };
            match choice.as_str() {
                "" => return Ok(()),
                "b" | "baixar" => {
                    let date = (self.today)();
                    let saved = self
                        .session
                        .artifact(date)
                        .and_then(|artifact| artifact.save(&self.config.output_dir));
                    match saved {
                        Ok(path) => self.success(format!("Arquivo filtrado salvo em: {}", path.display()))?,
                        Err(error) => self.error(format!("Erro ao processar o arquivo: {error}"))?,
                    }
                }
                other => match Band::parse(other) {
                    Some(band) => {
                        if let Err(error) = self.session.select(band) {
                            self.error(error)?;
                        }
                    }
                    None => self.warning(format!("Opção inválida: {other}"))?,
                },
            }
        }
    }

    fn merge_page(&mut self) -> io::Result<()> {
        self.title(PAGES[1])?;
        writeln!(self.output, "Escolha os arquivos CSV para combinar (um caminho ou padrão por linha, linha vazia para terminar):")?;
        let mut patterns = Vec::<String>::new();
        while let Some(line) = self.prompt("> ")? {
            if line.is_empty() {
                break;
            }
            patterns.push(line);
        }
        if patterns.is_empty() {
            return Ok(());
        }
        let question = format!(
            "Nome do arquivo CSV combinado (ex: {0}) [{0}]: ",
            merge::DEFAULT_OUTPUT_NAME
        );
        let output_name = match self.prompt(&question)? {
            Some(name) if !name.is_empty() => name,
            _ => merge::DEFAULT_OUTPUT_NAME.to_owned(),
        };

        let outcome = expand_patterns(&patterns).and_then(|paths| merge::concat_files(&paths, &output_name));
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => return self.error(format!("Erro ao combinar arquivos: {error}")),
        };
        for failure in &outcome.failures {
            let message = format!("Erro ao ler o arquivo {}: {}", failure.file_name, failure.error);
            self.error(message)?;
        }
        let saved = outcome
            .into_result()
            .and_then(|artifact| artifact.save(&self.config.output_dir));
        match saved {
            Ok(path) => self.success(format!("Arquivo combinado salvo em: {}", path.display())),
            Err(error @ TimesheetError::NoValidInputError) => self.warning(error),
            Err(error) => self.error(format!("Erro ao combinar arquivos: {error}")),
        }
    }

    fn attachments_page(&mut self) -> io::Result<()> {
        self.title(PAGES[2])?;
        let Some(destination) = self.prompt("Escolha a pasta de destino para salvar os anexos: ")? else {
            return Ok(());
        };
        if destination.is_empty() {
            return self.error("Por favor, insira um caminho válido para a pasta de destino.");
        }
        let written = mailbox::default_source(&self.config.maildir)
            .and_then(|source| mailbox::export_csv_attachments(source.as_ref(), Path::new(&destination)));
        match written {
            Ok(files) if files.is_empty() => self.warning("Nenhum anexo CSV encontrado."),
            Ok(files) => {
                for file in &files {
                    writeln!(self.output, "  {file}")?;
                }
                self.success(format!("Anexos CSV baixados para: {destination}"))
            }
            Err(error) => self.error(format!("Erro ao baixar anexos: {error}")),
        }
    }

    /// Prints `question` and reads one trimmed line, `None` at end of input
    fn prompt(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn title(&mut self, title: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "\n{}", title.bold())
        } else {
            writeln!(self.output, "\n{title}")
        }
    }

    fn error(&mut self, message: impl Display) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{}", message.to_string().red())
        } else {
            writeln!(self.output, "{message}")
        }
    }

    fn warning(&mut self, message: impl Display) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{}", message.to_string().yellow())
        } else {
            writeln!(self.output, "{message}")
        }
    }

    fn success(&mut self, message: impl Display) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{}", message.to_string().green())
        } else {
            writeln!(self.output, "{message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    const TIMESHEET: &str = "Colaborador,Função,Data,Horas Extr.,CPF,Setor\n\
Ana,Motorista,2024-03-01,01:30,111,A\n\
Bia,Ajudante,2024-03-01,02:30,222,B\n\
Caio,Motorista,2024-03-02,03:30,333,C\n\
Dani,Ajudante,2024-03-02,04:30,444,D\n\
Edu,Motorista,2024-03-03,05:00,555,E\n";

    fn fixed_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    fn upload() -> Upload {
        Upload::new("horas.csv", TIMESHEET)
    }

    #[test]
    fn session_starts_without_file() {
        let session = Session::new(Columns::default());
        assert!(session.loaded().is_none());
        assert_eq!(session.selected(), None);
        assert!(matches!(session.artifact(fixed_date()), Err(TimesheetError::NoFileLoaded)));
    }

    #[test]
    fn upload_loads_and_selects_whole_table() {
        let mut session = Session::new(Columns::default());
        let rows = session.upload(&upload()).unwrap().base().len();
        assert_eq!(rows, 5);
        assert_eq!(session.selected(), Some(Band::All));
        assert_eq!(session.loaded().map(|loaded| loaded.file_name.as_str()), Some("horas.csv"));

        let artifact = session.artifact(fixed_date()).unwrap();
        assert_eq!(artifact.file_name, "Tabela_Filtrada_07-03-2024.csv");
        assert_eq!(artifact.contents.lines().count(), 6);
    }

    #[test]
    fn selection_decides_the_artifact() {
        let mut session = Session::new(Columns::default());
        session.upload(&upload()).unwrap();
        session.select(Band::Above4).unwrap();
        session.select(Band::Above4).unwrap();

        let artifact = session.artifact(fixed_date()).unwrap();
        assert_eq!(artifact.file_name, "Tabela_Filtrada_4_07-03-2024.csv");
        assert_eq!(
            artifact.contents,
            "Colaborador,Função,Data,Horas Extr.,CPF\n\
             Dani,Ajudante,2024-03-02,04:30,444\n\
             Edu,Motorista,2024-03-03,05:00,555\n"
        );
    }

    #[test]
    fn failed_upload_returns_to_no_file_loaded() {
        let mut session = Session::new(Columns::default());
        session.upload(&upload()).unwrap();

        let missing_cpf = Upload::new("horas.csv", "Colaborador,Função,Data,Horas Extr.\nAna,M,d,02:30\n");
        let error = session.upload(&missing_cpf).unwrap_err();
        assert!(matches!(error, TimesheetError::MissingColumnError(name) if name == "CPF"));
        assert!(session.loaded().is_none());
        assert!(session.classification().is_none());
        assert!(matches!(session.select(Band::From2To3), Err(TimesheetError::NoFileLoaded)));
    }

    #[test]
    fn unreadable_path_leaves_no_file_loaded() {
        let mut session = Session::new(Columns::default());
        assert!(session.upload_file(Path::new("nao_existe.csv")).is_err());
        assert!(session.loaded().is_none());
    }

    #[test]
    fn renders_header_and_partition_rows() {
        let mut session = Session::new(Columns::default());
        let grid = render_table(session.upload(&upload()).unwrap().partition(Band::From2To3));
        let lines: Vec<&str> = grid.lines().collect();
        assert!(lines[1].contains("Colaborador") && lines[1].contains("Horas Extr.") && lines[1].contains("CPF"));
        let rows: Vec<&&str> = lines.iter().filter(|line| line.contains("2024-")).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains("Bia") && rows[0].contains("02:30") && rows[0].contains("222"));
        assert!(!grid.contains("Ana"));
        assert!(grid.ends_with('\n'));
    }

    #[test]
    fn renders_columns_aligned() {
        let mut session = Session::new(Columns::default());
        let grid = render_table(session.upload(&upload()).unwrap().base());
        let widths: Vec<usize> = grid.lines().map(|line| line.chars().count()).collect();
        assert!(widths.iter().all(|width| *width == widths[0]), "{grid}");
    }

    fn run_shell(input: String, config: Config) -> String {
        let mut output = Vec::new();
        Shell::new(Cursor::new(input), &mut output, config)
            .with_clock(fixed_date)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn shell_exports_selected_band() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("horas.csv");
        fs::write(&source, TIMESHEET).unwrap();
        let config = Config {
            output_dir: dir.path().join("saida"),
            ..Config::default()
        };

        let input = format!("1\n{}\n3\nb\n\n0\n", source.display());
        let output = run_shell(input, config);

        assert!(output.contains("Filtrando Horas Extras"));
        assert!(output.contains("[x] 3) Filtro 3: Horas entre 03:00 e 03:59"));
        let saved = dir.path().join("saida").join("Tabela_Filtrada_3_07-03-2024.csv");
        assert_eq!(
            fs::read_to_string(saved).unwrap(),
            "Colaborador,Função,Data,Horas Extr.,CPF\nCaio,Motorista,2024-03-02,03:30,333\n"
        );
    }

    #[test]
    fn shell_reports_errors_and_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("horas.csv");
        fs::write(&source, "Colaborador,Função,Data,Horas Extr.\nAna,M,d,02:30\n").unwrap();

        let input = format!("1\n{}\n1\n\n", source.display());
        let output = run_shell(input, Config::default());

        assert!(output.contains("Erro ao processar o arquivo: Coluna 'CPF' não encontrada"));
        assert!(output.contains("Por favor, carregue um arquivo para visualizar os dados."));
        assert!(!output.contains("Escolha qual filtro deseja exportar"));
    }

    #[test]
    fn shell_merges_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "Colaborador,CPF\nAna,111\n").unwrap();
        fs::write(dir.path().join("b.csv"), "Colaborador,CPF\nBia,222,x\n").unwrap();
        fs::write(dir.path().join("c.csv"), "Colaborador,CPF\nCaio,333\n").unwrap();
        let config = Config {
            output_dir: dir.path().join("saida"),
            ..Config::default()
        };

        let pattern = dir.path().join("*.csv");
        let output = run_shell(format!("2\n{}\n\n\n0\n", pattern.display()), config);

        assert!(output.contains("Erro ao ler o arquivo b.csv"));
        let combined = fs::read_to_string(dir.path().join("saida").join("combinado.csv")).unwrap();
        assert_eq!(combined, "Colaborador,CPF\nAna,111\nCaio,333\n");
    }

    #[test]
    fn shell_merges_paths_with_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("horas extras");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("janeiro 2024.csv"), "Colaborador,CPF\nAna,111\n").unwrap();
        fs::write(folder.join("fevereiro 2024.csv"), "Colaborador,CPF\nBia,222\n").unwrap();
        let config = Config {
            output_dir: dir.path().join("saida"),
            ..Config::default()
        };

        let input = format!(
            "2\n{}\n{}\n\ntotal.csv\n0\n",
            folder.join("janeiro 2024.csv").display(),
            folder.join("fevereiro 2024.csv").display()
        );
        let output = run_shell(input, config);

        assert!(!output.contains("Erro"), "{output}");
        let combined = fs::read_to_string(dir.path().join("saida").join("total.csv")).unwrap();
        assert_eq!(combined, "Colaborador,CPF\nAna,111\nBia,222\n");
    }

    #[test]
    fn shell_requires_attachment_destination() {
        let output = run_shell("3\n\n0\n".to_owned(), Config::default());
        assert!(output.contains("Por favor, insira um caminho válido para a pasta de destino."));
    }

    #[cfg(unix)]
    #[test]
    fn shell_exports_attachments_from_maildir() {
        let dir = tempfile::tempdir().unwrap();
        let maildir = dir.path().join("Maildir");
        fs::create_dir_all(maildir.join("new")).unwrap();
        fs::write(
            maildir.join("new").join("1.mail"),
            "Content-Type: multipart/mixed; boundary=b\n\n--b\nContent-Disposition: attachment; filename=horas.csv\n\nCPF\n--b--\n",
        )
        .unwrap();
        let config = Config {
            maildir,
            ..Config::default()
        };
        let destination = dir.path().join("anexos");

        let output = run_shell(format!("3\n{}\n0\n", destination.display()), config);
        assert!(output.contains("Anexos CSV baixados para:"));
        assert_eq!(fs::read_to_string(destination.join("horas.csv")).unwrap(), "CPF");
    }
}
