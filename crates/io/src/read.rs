// Input file reading - UTF-8 with legacy-encoding fallback

use std::io::Read;
use std::path::Path;

/// Read an input or database file and convert to UTF-8 if needed.
///
/// Thermodynamic databases in the wild are frequently Windows-1252 (degree
/// signs and accented author names in comment blocks), so invalid UTF-8
/// falls back to that instead of failing the run.
pub fn input_file(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
