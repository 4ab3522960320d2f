use crate::data::persistence::get_data_dir;
use crate::data::{FileStore, ShoppingList};
use anyhow::Result;

pub fn run() -> Result<()> {
    let store = FileStore::open(&get_data_dir()?);
    let list = ShoppingList::load(&store);
    write_shopping(&list, &mut std::io::stdout())
}

pub(crate) fn write_shopping<W: std::io::Write>(list: &ShoppingList, out: &mut W) -> Result<()> {
    writeln!(out, "Shopping list")?;
    writeln!(out, "---")?;
    for (i, item) in list.items.iter().enumerate() {
        writeln!(out, "  {:<4} {}", i + 1, item)?;
    }
    writeln!(out, "---")?;
    writeln!(out, "Total: {} item(s)", list.items.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_shopping_default_list() {
        let mut buf = Vec::new();
        write_shopping(&ShoppingList::default(), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Olive Oil"));
        assert!(out.contains("Total: 3 item(s)"));
    }

    #[test]
    fn test_write_shopping_empty() {
        let list = ShoppingList { items: vec![] };
        let mut buf = Vec::new();
        write_shopping(&list, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Total: 0 item(s)"));
    }
}
