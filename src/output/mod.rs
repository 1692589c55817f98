//! Output module for rendering the site map as indented text

use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::sitemap::{MapNode, SiteMap};
use crate::Result;

/// Buffer size for the traversal stream feeding the renderer
const RENDER_BUFFER: usize = 20;

/// Writes the site map to `out` as an indented hierarchy
///
/// A header line naming the seed comes first, then one line per traversal
/// entry: four spaces per depth level, a space, the page URL, and the
/// title in brackets.
///
/// # Arguments
///
/// * `out` - Destination byte sink (a file or standard output)
/// * `seed` - The seed URL shown in the header
/// * `site_map` - The crawled site map to render
pub async fn render_site_map<W: Write>(
    out: &mut W,
    seed: &str,
    site_map: Arc<SiteMap>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<MapNode>(RENDER_BUFFER);
    let traversal = tokio::spawn(async move { site_map.traverse(tx).await });

    writeln!(out, "\n\n ----- Site Map for website  {} -----", seed)?;
    while let Some(node) = rx.recv().await {
        writeln!(
            out,
            "{} {} [{}]",
            "    ".repeat(node.depth),
            node.page.url,
            node.page.title
        )?;
    }

    traversal.await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::Page;
    use url::Url;

    #[tokio::test]
    async fn test_render_format() {
        let seed = Url::parse("https://test.com").unwrap();
        let mut site = SiteMap::new(&seed);

        let mut root = Page::new("https://test.com", "Home");
        root.internal_links.insert("https://test.com/a".to_string());
        site.add_page(root).unwrap();
        site.add_page(Page::new("https://test.com/a", "A Page")).unwrap();

        let mut buffer: Vec<u8> = Vec::new();
        render_site_map(&mut buffer, "https://test.com", Arc::new(site))
            .await
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "\n\n ----- Site Map for website  https://test.com -----\n\
             \x20https://test.com [Home]\n\
             \x20    https://test.com/a [A Page]\n"
        );
    }

    #[tokio::test]
    async fn test_render_empty_site_map() {
        let seed = Url::parse("https://test.com").unwrap();
        let site = SiteMap::new(&seed);

        let mut buffer: Vec<u8> = Vec::new();
        render_site_map(&mut buffer, "https://test.com", Arc::new(site))
            .await
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "\n\n ----- Site Map for website  https://test.com -----\n");
    }
}
