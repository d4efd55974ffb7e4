use crate::classifier::DocumentStatus;
use crate::config::ScanConfig;
use crate::decoder::Encoding;
use crate::error::{ScanError, ScanResult};
use crate::record::StatusRecord;
use crate::report::ReportSink;
use crate::scanner::BatchScanner;
use crate::signature::SignatureInspector;
use crate::vcs::{CommitInfo, CommitSource};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SSPT_FILE: &str = "SSPT_20240206B_PRISIB_Alfonso Leiva - còpia.pdf";

const README: &str = "# abpresclin

### Status
Pendent validacions finals

## Dades
- Nom: JavierArranz
- Correu: fcsdfc@fdf.cs
- Codi: 22011
- Data inici: 01/12/2022
- Sol·licitud:
- Pressupost:
";

#[derive(Default)]
struct FakeCommits {
    repos: HashMap<String, CommitInfo>,
    broken: HashSet<String>,
    denied: HashSet<String>,
}

impl CommitSource for FakeCommits {
    fn last_commit(&self, path: &Path) -> ScanResult<CommitInfo> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if self.broken.contains(&name) {
            return Err(ScanError::Vcs { path: path.to_path_buf(), message: "reference 'HEAD' not found".into() });
        }
        if self.denied.contains(&name) {
            return Err(ScanError::PermissionDenied { path: path.to_path_buf() });
        }
        self.repos.get(&name).cloned().ok_or_else(|| ScanError::NotARepository { path: path.to_path_buf() })
    }
}

struct FakeInspector {
    signed: bool,
}

impl SignatureInspector for FakeInspector {
    fn is_signed(&self, _path: &Path) -> ScanResult<bool> {
        Ok(self.signed)
    }
}

#[derive(Default)]
struct MemorySink {
    header: Option<Vec<String>>,
    records: Vec<StatusRecord>,
    flushed: bool,
}

impl MemorySink {
    fn row(&self, folder: &str) -> &StatusRecord {
        self.records.iter().find(|r| r.get("Folder") == Some(folder)).unwrap()
    }
}

impl ReportSink for MemorySink {
    fn write_header(&mut self, columns: &[String]) -> ScanResult<()> {
        self.header = Some(columns.to_vec());
        Ok(())
    }

    fn write_record(&mut self, record: &StatusRecord) -> ScanResult<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> ScanResult<()> {
        self.flushed = true;
        Ok(())
    }
}

fn project(root: &Path, name: &str, readme: Option<&[u8]>, files: &[&str]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    if let Some(readme) = readme {
        fs::write(dir.join("README.md"), readme).unwrap();
    }
    for file in files {
        fs::write(dir.join(file), b"%PDF-1.5").unwrap();
    }
}

fn run(config: &ScanConfig, commits: &FakeCommits, signed: bool, root: &Path) -> MemorySink {
    let inspector = FakeInspector { signed };
    let scanner = BatchScanner::new(config, commits, &inspector).unwrap();
    let mut sink = MemorySink::default();
    scanner.scan(root, &mut sink).unwrap();
    sink
}

#[test]
fn test_end_to_end_row() {
    let root = TempDir::new().unwrap();
    project(root.path(), "abpresclin", Some(README.as_bytes()), &[SSPT_FILE]);

    let mut commits = FakeCommits::default();
    commits.repos.insert(
        "abpresclin".into(),
        CommitInfo { date: "2024-02-06".into(), author: "pau@example.org".into(), message: "Afegeix SSPT".into() },
    );

    for (signed, expected) in [(false, "YES"), (true, "SIGNED")] {
        let sink = run(&ScanConfig::default(), &commits, signed, root.path());
        assert_eq!(sink.records.len(), 1);
        assert!(sink.flushed);

        let row = sink.row("abpresclin");
        assert_eq!(row.get("Nom"), Some("JavierArranz"));
        assert_eq!(row.get("Correu"), Some("fcsdfc@fdf.cs"));
        assert_eq!(row.get("Codi"), Some("22011"));
        assert_eq!(row.get("Data inici"), Some("01/12/2022"));
        assert_eq!(row.get("Status"), Some("Pendent validacions finals"));
        assert_eq!(row.get("SSPT Status"), Some(expected));
        assert_eq!(row.get("Solicitud"), Some(SSPT_FILE));
        assert_eq!(row.get("PSPT Status"), Some("NO"));
        assert_eq!(row.get("Pressupost"), None);
        assert_eq!(row.get("Last Commit Author"), Some("pau@example.org"));
    }
}

#[test]
fn test_empty_folder_row() {
    let root = TempDir::new().unwrap();
    project(root.path(), "buit", None, &[]);

    let sink = run(&ScanConfig::default(), &FakeCommits::default(), true, root.path());
    let row = sink.row("buit");
    for column in ["Codi", "Status", "Nom", "Correu", "Data inici", "Last Commit Date", "Solicitud"] {
        assert_eq!(row.get(column), None, "column {column}");
    }
    for column in ["SSPT Status", "PSPT Status", "CEIM Status", "Data Model Status"] {
        assert_eq!(row.get(column), Some(DocumentStatus::Absent.as_str()), "column {column}");
    }
    assert_eq!(sink.header.as_ref().unwrap(), &ScanConfig::default().columns());
}

#[test]
fn test_undecodable_readme_does_not_stop_the_batch() {
    let root = TempDir::new().unwrap();
    project(root.path(), "a-latin", Some(b"- Nom: c\xF2pia\n- Codi: 1\n"), &[]);
    project(root.path(), "b-utf8", Some("- Nom: còpia\n".as_bytes()), &[]);

    let mut config = ScanConfig::default();
    config.encodings = vec![Encoding::Utf8];
    let sink = run(&config, &FakeCommits::default(), false, root.path());

    assert_eq!(sink.records.len(), 2);
    assert_eq!(sink.row("a-latin").get("Nom"), None);
    assert_eq!(sink.row("b-utf8").get("Nom"), Some("còpia"));
}

#[test]
fn test_unexpected_error_skips_only_that_folder() {
    let root = TempDir::new().unwrap();
    project(root.path(), "bo", Some(README.as_bytes()), &[]);
    project(root.path(), "trencat", Some(README.as_bytes()), &[]);
    project(root.path(), "tancat", Some(README.as_bytes()), &[]);

    let mut commits = FakeCommits::default();
    commits.broken.insert("trencat".into());
    commits.denied.insert("tancat".into());
    let inspector = FakeInspector { signed: false };
    let config = ScanConfig::default();
    let scanner = BatchScanner::new(&config, &commits, &inspector).unwrap();

    let mut sink = MemorySink::default();
    let summary = scanner.scan(root.path(), &mut sink).unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.partial, 2);
    assert_eq!(summary.skipped, 1);

    // Permission failures keep the values computed for the folder itself
    let denied = sink.row("tancat");
    assert_eq!(denied.get("Nom"), Some("JavierArranz"));
    assert_eq!(denied.get("Last Commit Date"), None);
    assert!(sink.records.iter().all(|r| r.get("Folder") != Some("trencat")));
}

#[test]
fn test_code_from_folder_name_binds_data_model() {
    let root = TempDir::new().unwrap();
    project(root.path(), "registre-33333", Some(b"# Registre\n- Nom: Anna\n"), &["Data Model 33333.xlsx"]);

    let sink = run(&ScanConfig::default(), &FakeCommits::default(), true, root.path());
    let row = sink.row("registre-33333");
    assert_eq!(row.get("Codi"), Some("33333"));
    assert_eq!(row.get("Data Model Status"), Some("YES"));
    assert_eq!(row.get("Data Model"), Some("Data Model 33333.xlsx"));
}

#[test]
fn test_write_back_is_idempotent() {
    let root = TempDir::new().unwrap();
    project(root.path(), "abpresclin", Some(README.as_bytes()), &[SSPT_FILE, "acta_Dictamen_CEI.pdf"]);
    let readme = root.path().join("abpresclin").join("README.md");

    let mut config = ScanConfig::default();
    config.write_back = true;
    let commits = FakeCommits::default();

    run(&config, &commits, false, root.path());
    let first = fs::read(&readme).unwrap();
    run(&config, &commits, false, root.path());
    let second = fs::read(&readme).unwrap();
    assert_eq!(first, second);

    let text = String::from_utf8(second).unwrap();
    assert_eq!(text.matches(SSPT_FILE).count(), 1);
    assert!(text.contains(&format!("- Sol·licitud: {SSPT_FILE}\n")));
    assert!(text.contains("### Status\nPendent validacions finals\n"));
    // No label for the ethics opinion in this README, so nothing to record
    assert!(!text.contains("acta_Dictamen_CEI.pdf"));
    assert_eq!(text.lines().count(), README.lines().count());
}

#[test]
fn test_write_back_reencodes_as_utf8() {
    let root = TempDir::new().unwrap();
    let latin1 = b"# p\n\n### Status\nActiu\n\n- Nom: c\xF2pia\n- Pressupost:\n";
    project(root.path(), "p", Some(latin1), &["PSPT_20240115_budget.pdf"]);

    let mut config = ScanConfig::default();
    config.write_back = true;
    run(&config, &FakeCommits::default(), false, root.path());

    let text = fs::read_to_string(root.path().join("p").join("README.md")).unwrap();
    assert_eq!(text, "# p\n\n### Status\nActiu\n\n- Nom: còpia\n- Pressupost: PSPT_20240115_budget.pdf\n");
}

#[test]
fn test_append_mode_skips_header() {
    let root = TempDir::new().unwrap();
    project(root.path(), "p", None, &[]);

    let mut config = ScanConfig::default();
    config.append_mode = true;
    let sink = run(&config, &FakeCommits::default(), false, root.path());
    assert!(sink.header.is_none());
    assert_eq!(sink.records.len(), 1);
}

#[test]
fn test_scan_and_apply_through_csv() {
    let root = TempDir::new().unwrap();
    let projects = root.path().join("projectes");
    fs::create_dir(&projects).unwrap();
    project(&projects, "abpresclin", Some(README.as_bytes()), &[]);
    project(&projects, "nou", Some(b"# nou\nintro\n- Nom: Marta\n"), &[]);
    let table = root.path().join("Projectes.csv");

    let config = ScanConfig::default();
    let rows = crate::scan(&projects, &table, &config).unwrap();
    assert_eq!(rows, 2);

    let written = fs::read_to_string(&table).unwrap();
    assert!(written.starts_with("Folder,Codi,Status,Nom,Correu,Data inici,"));

    // Edit the status column the way a spreadsheet user would
    let edited = written
        .lines()
        .map(|line| {
            if line.starts_with("nou,") {
                line.replacen("nou,,,", "nou,,En curs,", 1)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(&table, edited).unwrap();

    assert_eq!(crate::apply_table(&projects, &table, &config).unwrap(), 1);
    let readme = fs::read_to_string(projects.join("nou").join("README.md")).unwrap();
    assert_eq!(readme, "# nou\nintro\n### Status\nEn curs\n\n- Nom: Marta\n");

    assert_eq!(crate::apply_table(&projects, &table, &config).unwrap(), 0);
}

#[test]
fn test_apply_requires_status_column() {
    let root = TempDir::new().unwrap();
    let table = root.path().join("t.csv");
    fs::write(&table, "Folder,Nom\na,b\n").unwrap();

    let result = crate::apply_table(root.path(), &table, &ScanConfig::default());
    assert!(matches!(result, Err(ScanError::Report { .. })));
}
