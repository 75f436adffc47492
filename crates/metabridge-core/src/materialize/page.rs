use crate::{
    catalog::{CatalogClient, CatalogObject, SearchQuery},
    materialize::MaterializeError,
};

/// Run `query` page by page, materializing each item, until `budget` items
/// were produced or the catalog has nothing more. A budget of zero means no
/// limit.
///
/// Placeholder objects are skipped without counting against the budget, as
/// are items `materialize` declines (`Ok(None)`) or reports as not known.
/// An empty page always ends the loop, whatever `has_more` claims.
pub fn drain_pages<C, T, F>(
    client: &C,
    query: SearchQuery,
    budget: usize,
    mut materialize: F,
) -> Result<Vec<T>, MaterializeError>
where
    C: CatalogClient + ?Sized,
    F: FnMut(&CatalogObject) -> Result<Option<T>, MaterializeError>,
{
    let mut out = Vec::new();
    let mut query = query;

    loop {
        let page = client.search(&query)?;
        log::debug!(
            target: "metabridge::materialize",
            "page at {} for {:?}: {} items, more={}",
            query.begin_at,
            query.types,
            page.items.len(),
            page.has_more
        );

        if page.items.is_empty() {
            break;
        }

        for item in &page.items {
            if item.is_placeholder() {
                log::debug!(target: "metabridge::materialize", "skipping placeholder object {}", item.id);
                continue;
            }

            match materialize(item) {
                Ok(Some(value)) => out.push(value),
                Ok(None) => continue,
                Err(MaterializeError::EntityNotKnown { guid }) => {
                    log::error!(target: "metabridge::materialize", "entity {guid} vanished during paging");
                    continue;
                }
                Err(e) => return Err(e),
            }

            if budget > 0 && out.len() >= budget {
                return Ok(out);
            }
        }

        if !page.has_more {
            break;
        }
        query = query.next_page(page.items.len());
    }

    Ok(out)
}
