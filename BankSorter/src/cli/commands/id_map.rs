//! CLI command for inspecting a knowledge base page

use std::path::Path;

use crate::knowledge::KnowledgeBase;

/// Print the ID → display name map of one page
pub fn execute(wiki: &Path, key: &str) -> anyhow::Result<()> {
    let knowledge = KnowledgeBase::load(wiki)?;

    // Exact key first, then the same lookup the rename stage uses
    let found = knowledge
        .get(key)
        .map(|page| (key, page))
        .or_else(|| knowledge.find_page(key));

    let Some((page_key, page)) = found else {
        anyhow::bail!("No page matches '{key}' ({} pages loaded)", knowledge.len());
    };

    let map = page.id_map();
    println!("{page_key}");
    if !page.url.is_empty() {
        println!("{}", page.url);
    }
    println!("{} IDs:", map.len());
    for (id, name) in map.sorted() {
        println!("  {id:>12}  {name}");
    }

    Ok(())
}
