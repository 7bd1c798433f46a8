use crate::utils::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Opens the report destination; `None` or `-` means stdout.
pub fn create_writer(output_path: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    match output_path {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path)
                .map_err(|e| format!("Invalid output path {}: {}", path.display(), e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}
