//! Release reader: turns the two official release artifacts into records.
//!
//! A release directory carries a symbol-list table (plain CSV or a
//! single-entry ZIP) and a title-list ZIP of per-section text files.
//! Artifacts are located by their stem plus release stamp, e.g.
//! `CPCSymbolList202601.zip`, so a newer release needs no code change.
//!
//! Row order of the symbol list is preserved exactly: it is the
//! hierarchical sort order the builder depends on.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use zip::ZipArchive;

use crate::domain::entities::{ClassificationSymbol, DEFAULT_STATUS};
use crate::infrastructure::error::{InfraError, InfraResult};

/// Raw symbol-list record as it appears in the release CSV.
#[derive(Debug, Deserialize)]
struct SymbolRecord {
    #[serde(rename = "SYMBOL")]
    symbol: String,
    level: u32,
    #[serde(rename = "not-allocatable")]
    not_allocatable: Option<String>,
    #[serde(rename = "additional-only")]
    additional_only: Option<String>,
    status: Option<String>,
}

impl SymbolRecord {
    fn into_symbol(self) -> ClassificationSymbol {
        ClassificationSymbol {
            symbol: self.symbol.trim().to_string(),
            level: self.level,
            not_allocatable: flag(self.not_allocatable.as_deref()),
            additional_only: flag(self.additional_only.as_deref()),
            status: self
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        }
    }
}

/// Release flags are literal TRUE/FALSE; anything else counts as FALSE.
fn flag(value: Option<&str>) -> bool {
    value == Some("TRUE")
}

/// Reads release artifacts from a source directory.
pub struct ReleaseReader {
    symbol_list_stem: String,
    title_list_stem: String,
    brace_re: Regex,
    whitespace_re: Regex,
}

impl ReleaseReader {
    pub fn new(symbol_list_stem: &str, title_list_stem: &str) -> Self {
        Self {
            symbol_list_stem: symbol_list_stem.to_string(),
            title_list_stem: title_list_stem.to_string(),
            brace_re: Regex::new(r"\{[^}]*\}").unwrap(),
            whitespace_re: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Read the symbol list, preserving file order.
    ///
    /// Accepts either `<stem><stamp>.csv` or `<stem><stamp>.zip` containing
    /// a single CSV member. Neither being present is fatal.
    pub fn read_symbols(&self, dir: &Path) -> InfraResult<Vec<ClassificationSymbol>> {
        if let Some(csv_path) = find_artifact(dir, &self.symbol_list_stem, ".csv")? {
            debug!("reading symbol list: {}", csv_path.display());
            let file = File::open(&csv_path)
                .map_err(|e| InfraError::io(format!("open {}", csv_path.display()), e))?;
            return self.parse_symbol_csv(file, &csv_path);
        }

        if let Some(zip_path) = find_artifact(dir, &self.symbol_list_stem, ".zip")? {
            debug!("extracting symbol list: {}", zip_path.display());
            let content = read_zip_member(&zip_path, |name| name.ends_with(".csv"))?;
            return self.parse_symbol_csv(Cursor::new(content), &zip_path);
        }

        Err(InfraError::MissingArtifact {
            dir: dir.to_path_buf(),
            artifact: self.symbol_list_stem.clone(),
        })
    }

    fn parse_symbol_csv<R: Read>(
        &self,
        reader: R,
        path: &Path,
    ) -> InfraResult<Vec<ClassificationSymbol>> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let mut symbols = Vec::new();
        for record in rdr.deserialize::<SymbolRecord>() {
            let record = record.map_err(|e| InfraError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;
            symbols.push(record.into_symbol());
        }

        debug!("read {} symbol rows", symbols.len());
        Ok(symbols)
    }

    /// Read titles from every text member of the title-list archive.
    ///
    /// Each line is `SYMBOL<TAB>...<TAB>TITLE` with the title in the last
    /// field; lines with fewer than two fields are skipped. Titles are
    /// normalized before storing: `{...}` editorial notes stripped and
    /// whitespace runs collapsed.
    pub fn read_titles(&self, dir: &Path) -> InfraResult<HashMap<String, String>> {
        let zip_path = find_artifact(dir, &self.title_list_stem, ".zip")?.ok_or_else(|| {
            InfraError::MissingArtifact {
                dir: dir.to_path_buf(),
                artifact: self.title_list_stem.clone(),
            }
        })?;

        debug!("extracting titles: {}", zip_path.display());
        let file = File::open(&zip_path)
            .map_err(|e| InfraError::io(format!("open {}", zip_path.display()), e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| InfraError::Archive {
            path: zip_path.clone(),
            source: e,
        })?;

        let mut titles = HashMap::new();
        for i in 0..archive.len() {
            let mut member = archive.by_index(i).map_err(|e| InfraError::Archive {
                path: zip_path.clone(),
                source: e,
            })?;
            if member.is_dir() || !member.name().ends_with(".txt") {
                continue;
            }

            let mut content = String::new();
            member.read_to_string(&mut content).map_err(|e| {
                InfraError::io(format!("read {} from {}", member.name(), zip_path.display()), e)
            })?;

            for line in content.lines() {
                let line = line.trim_end_matches(['\n', '\r']);
                if line.is_empty() {
                    continue;
                }
                let parts: Vec<&str> = line.split('\t').collect();
                if parts.len() < 2 {
                    continue;
                }
                let symbol = parts[0].trim().to_string();
                let title = parts[parts.len() - 1].trim();
                titles.insert(symbol, self.normalize_title(title));
            }
        }

        debug!("loaded {} titles", titles.len());
        Ok(titles)
    }

    fn normalize_title(&self, raw: &str) -> String {
        let stripped = self.brace_re.replace_all(raw, "");
        self.whitespace_re
            .replace_all(stripped.trim(), " ")
            .trim()
            .to_string()
    }
}

/// Locate an artifact by stem and extension, e.g. `CPCSymbolList*.csv`.
/// When several release stamps are present the newest (lexically greatest)
/// wins.
fn find_artifact(dir: &Path, stem: &str, extension: &str) -> InfraResult<Option<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| InfraError::io(format!("read release directory {}", dir.display()), e))?;

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|name| name.starts_with(stem) && name.ends_with(extension))
                .unwrap_or(false)
        })
        .collect();

    matches.sort();
    Ok(matches.pop())
}

/// Read the first archive member matching `select` into a string.
fn read_zip_member(path: &Path, select: impl Fn(&str) -> bool) -> InfraResult<String> {
    let file =
        File::open(path).map_err(|e| InfraError::io(format!("open {}", path.display()), e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| InfraError::Archive {
        path: path.to_path_buf(),
        source: e,
    })?;

    let name = (0..archive.len())
        .filter_map(|i| archive.name_for_index(i))
        .find(|n| select(n))
        .map(str::to_string)
        .ok_or_else(|| InfraError::Archive {
            path: path.to_path_buf(),
            source: zip::result::ZipError::FileNotFound,
        })?;

    let mut member = archive.by_name(&name).map_err(|e| InfraError::Archive {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut content = String::new();
    member
        .read_to_string(&mut content)
        .map_err(|e| InfraError::io(format!("read {} from {}", name, path.display()), e))?;
    Ok(content)
}
