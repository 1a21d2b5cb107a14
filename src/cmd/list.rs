use std::io::{self, Write};

use eyre::Result;

use crate::registry::Registry;

/// Prints every registered command with its versions. The version `get`
/// selects is marked with `*`.
pub fn run(registry: &Registry) -> Result<()> {
    let mut out = io::stdout().lock();
    Ok(write_list(&mut out, registry)?)
}

fn write_list<W: Write>(out: &mut W, registry: &Registry) -> io::Result<()> {
    for name in registry.names() {
        let selected = registry.get(name);
        let versions: Vec<String> = registry
            .versions(name)
            .iter()
            .map(|entry| {
                let version = entry.version().unwrap_or("-");
                if selected.is_some_and(|s| std::ptr::eq(s, entry)) {
                    format!("*{version}")
                } else {
                    version.to_string()
                }
            })
            .collect();
        writeln!(out, "{name}\t{}", versions.join(" "))?;
    }
    Ok(())
}
