use std::path::Path;

pub type Result<T> = std::result::Result<T, String>;

pub fn handle_error_and_exit(err: String) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

/// Strips compression and table extensions, so `SRR1.kmers.tsv.gz` becomes `SRR1`.
pub fn sample_name_from_path(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("Invalid coverage file name: {}", path.display()))?;

    let mut stem = file_name;
    for suffix in [".gz", ".gzip", ".tsv", ".txt", ".kmers", ".counts"] {
        stem = stem.strip_suffix(suffix).unwrap_or(stem);
    }
    if stem.is_empty() {
        return Err(format!("Invalid coverage file name: {}", path.display()));
    }
    Ok(stem.to_string())
}
