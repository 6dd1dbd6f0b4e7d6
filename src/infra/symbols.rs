// ============================================================
// Layer 6 — Symbol Table
// ============================================================
// Maps decoder output ids back to printable symbols.
// File format: one symbol per line, line number (from 0) is the id.

use anyhow::{Context, Result};
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: Vec<String>,
}

impl SymbolTable {
    pub fn new(symbols: Vec<String>) -> Self {
        Self { symbols }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read symbol table '{}'", path.display()))?;
        let symbols: Vec<String> = text.lines().map(str::to_owned).collect();
        tracing::info!("Loaded {} symbols from '{}'", symbols.len(), path.display());
        Ok(Self { symbols })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbol(&self, id: u32) -> Option<&str> {
        self.symbols.get(id as usize).map(String::as_str)
    }

    /// Concatenate the symbols for `ids`, leaving out any id in `skip`.
    pub fn render(&self, ids: &[u32], skip: &[u32]) -> Result<String> {
        ids.iter()
            .filter(|&&id| !skip.contains(&id))
            .map(|&id| {
                self.symbol(id)
                    .with_context(|| format!("Id {id} is outside the symbol table ({} entries)", self.len()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SymbolTable {
        SymbolTable::new(["<blank>", "<sos>", "<eos>", "新", "闻"].iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_render_skips_special_ids() {
        assert_eq!(table().render(&[1, 3, 4, 2], &[1, 2]).unwrap(), "新闻");
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        assert!(table().render(&[1, 9], &[]).is_err());
    }

    #[test]
    fn test_load_uses_line_numbers_as_ids() {
        let dir = std::env::temp_dir().join(format!("nmt-titlegen-sym-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("symbols.txt");
        fs::write(&path, "<blank>\n<sos>\n<eos>\na\n").unwrap();

        let table = SymbolTable::load(&path).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.symbol(3), Some("a"));
    }
}
