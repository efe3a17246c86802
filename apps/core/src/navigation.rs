use crate::model::{ResultKind, SearchResult};

/// Resolves a chosen result to the location the host should navigate to.
/// Navigation entries carry their own destination; entities map to
/// `/{kind}s/{id}`. Anything else resolves to nothing.
pub fn resolve(result: &SearchResult) -> Option<String> {
    match result.kind() {
        ResultKind::Navigation => result.destination().map(str::to_string),
        kind => {
            let segment = kind.route_segment()?;
            let id = result.id().trim();
            if id.is_empty() {
                return None;
            }
            Some(format!("/{segment}/{id}"))
        }
    }
}
