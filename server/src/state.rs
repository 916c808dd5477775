use pages::SiteMeta;

/// Shared by the page handlers: the content API collaborator and site metadata
pub struct AppState<A> {
    pub api: A,
    pub site: SiteMeta,
}

impl<A> AppState<A> {
    pub fn new(api: A, site: SiteMeta) -> Self {
        Self { api, site }
    }
}
