use server_api::ContactContext;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) contact: ContactContext,
}
