//! Aggregation of the provider's cursor-paginated call listing.

use super::{CallFilters, CallPage, CallProvider, ExternalCall, ProviderError};

/// Fetch the complete call list, page by page.
///
/// Pagination stops when the provider returns no further cursor, when a page
/// comes back shorter than the requested size, or when `max_pages` is hit
/// (a hard bound against a misbehaving API paginating forever).
///
/// # Errors
///
/// A failure on the first page propagates. A failure on a later page ends
/// pagination early and returns whatever was accumulated: bulk listings
/// favor availability over completeness.
pub async fn fetch_all_calls(
    provider: &dyn CallProvider,
    filters: &CallFilters,
    page_size: u32,
    max_pages: u32,
) -> Result<Vec<ExternalCall>, ProviderError> {
    let mut filters = filters.clone();
    filters.limit = Some(page_size);

    let mut calls: Vec<ExternalCall> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page_number = 0u32;

    loop {
        page_number += 1;
        if page_number > max_pages {
            tracing::warn!(
                max_pages,
                fetched = calls.len(),
                "Page ceiling reached, stopping pagination"
            );
            break;
        }

        let page: CallPage = match provider.list_page(&filters, cursor.as_deref()).await {
            Ok(page) => page,
            Err(e) if page_number == 1 => return Err(e),
            Err(e) => {
                tracing::warn!(
                    page = page_number,
                    fetched = calls.len(),
                    error = %e,
                    "Page fetch failed, returning partial call list"
                );
                break;
            }
        };

        let item_count = page.items.len();
        calls.extend(page.items);

        let short_page = item_count < page_size as usize;
        if short_page || page.next_cursor.is_none() {
            break;
        }
        cursor = page.next_cursor;
    }

    tracing::debug!(total = calls.len(), pages = page_number, "Fetched call list");
    Ok(calls)
}
