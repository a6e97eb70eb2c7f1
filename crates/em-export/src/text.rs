use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Write a rendered glyph grid to any sink (stdout, file, buffer).
///
/// The text is written as-is and the sink is flushed.
///
/// # Errors
/// Returns an error if the sink fails.
///
/// # Example
/// ```
/// use em_export::text::write_text;
/// let mut out = Vec::new();
/// write_text("🌑🌞\n", &mut out).unwrap();
/// assert_eq!(out, "🌑🌞\n".as_bytes());
/// ```
pub fn write_text<W: Write>(text: &str, out: &mut W) -> Result<()> {
    out.write_all(text.as_bytes())
        .context("Échec de l'écriture de la grille")?;
    out.flush().context("Échec du flush de la sortie")?;
    Ok(())
}

/// Write a rendered glyph grid to a file, replacing it.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_text_file(text: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Impossible de créer {}", path.display()))?;
    write_text(text, &mut file).with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::info!("Wrote {} ({} lines)", path.display(), text.lines().count());
    Ok(())
}
